use recursion::{Collapsible, MappableFrame, PartiallyApplied};

use super::Expr;

/// Single layer of a borrowed [`Expr`], used to run recursive algorithms
/// over deep trees on the heap instead of the call stack
pub enum ExprFrame<X, P> {
    And(X, X),
    Or(X, X),
    Predicate(P),
    Literal(bool),
}

impl<P> MappableFrame for ExprFrame<PartiallyApplied, P> {
    type Frame<X> = ExprFrame<X, P>;

    fn map_frame<A, B>(input: Self::Frame<A>, mut f: impl FnMut(A) -> B) -> Self::Frame<B> {
        use ExprFrame::*;
        match input {
            And(a, b) => And(f(a), f(b)),
            Or(a, b) => Or(f(a), f(b)),
            Predicate(p) => Predicate(p),
            Literal(b) => Literal(b),
        }
    }
}

impl<'a, P> Collapsible for &'a Expr<P> {
    type FrameToken = ExprFrame<PartiallyApplied, &'a P>;

    fn into_frame(self) -> ExprFrame<Self, &'a P> {
        match self {
            Expr::And(a, b) => ExprFrame::And(a, b),
            Expr::Or(a, b) => ExprFrame::Or(a, b),
            Expr::Predicate(p) => ExprFrame::Predicate(p),
            Expr::Literal(b) => ExprFrame::Literal(*b),
        }
    }
}
