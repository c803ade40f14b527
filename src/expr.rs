pub mod frame;

use std::fmt::{self, Display};
use std::mem;

use recursion::CollapsibleExt;

use self::frame::ExprFrame;

/// Boolean expression tree over predicates `P`.
///
/// Bound queries are `Expr<Comparison<R>>`; the shape mirrors the parsed AST
/// one to one. A chain like `a || b || … || z` is as deep as it is long, so
/// every pass over the tree (evaluation, display, clone, drop) runs on an
/// explicit stack.
#[derive(Debug)]
pub enum Expr<P> {
    // boolean operators
    And(Box<Self>, Box<Self>),
    Or(Box<Self>, Box<Self>),
    // predicates
    Predicate(P),
    // literal boolean values
    Literal(bool),
}

impl<P> Expr<P> {
    pub fn and(a: Self, b: Self) -> Self {
        Self::And(Box::new(a), Box::new(b))
    }

    pub fn or(a: Self, b: Self) -> Self {
        Self::Or(Box::new(a), Box::new(b))
    }

    /// Evaluate left to right, stopping as soon as the result is known.
    ///
    /// A right-hand operand that is never reached never gets to fail.
    pub fn evaluate<E, F>(&self, f: &F) -> Result<bool, E>
    where
        F: Fn(&P) -> Result<bool, E>,
    {
        // right operands of the junctions above the current subtree, with
        // `true` marking an `&&`
        let mut pending: Vec<(bool, &Self)> = Vec::new();
        let mut current = self;

        loop {
            let value = loop {
                match current {
                    Self::And(a, b) => {
                        pending.push((true, &**b));
                        current = &**a;
                    }
                    Self::Or(a, b) => {
                        pending.push((false, &**b));
                        current = &**a;
                    }
                    Self::Predicate(p) => break f(p)?,
                    Self::Literal(b) => break *b,
                }
            };

            // `true && x` and `false || x` both take the value of `x`; any
            // other junction is already decided by `value`
            let mut undecided = None;
            while let Some((is_and, right)) = pending.pop() {
                if is_and == value {
                    undecided = Some(right);
                    break;
                }
            }

            match undecided {
                Some(right) => current = right,
                None => return Ok(value),
            }
        }
    }

    /// Leaves in left-to-right order
    pub fn predicates(&self) -> Vec<&P> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(expr) = stack.pop() {
            match expr {
                Self::And(a, b) | Self::Or(a, b) => {
                    stack.push(&**b);
                    stack.push(&**a);
                }
                Self::Predicate(p) => out.push(p),
                Self::Literal(_) => {}
            }
        }
        out
    }

    /// Same tree with every predicate replaced by `f(predicate)`
    pub fn map_predicates<Q>(&self, mut f: impl FnMut(&P) -> Q) -> Expr<Q> {
        self.collapse_frames(|frame| match frame {
            ExprFrame::And(a, b) => Expr::and(a, b),
            ExprFrame::Or(a, b) => Expr::or(a, b),
            ExprFrame::Predicate(p) => Expr::Predicate(f(p)),
            ExprFrame::Literal(b) => Expr::Literal(b),
        })
    }

    fn is_junction(&self) -> bool {
        matches!(self, Self::And(..) | Self::Or(..))
    }

    /// Move nested junctions out into `out`, leaving literals behind
    fn detach_junctions(&mut self, out: &mut Vec<Self>) {
        if let Self::And(a, b) | Self::Or(a, b) = self {
            for child in [a, b] {
                if child.is_junction() {
                    out.push(mem::replace(&mut **child, Self::Literal(false)));
                }
            }
        }
    }
}

impl<P> Drop for Expr<P> {
    fn drop(&mut self) {
        let mut detached = Vec::new();
        self.detach_junctions(&mut detached);
        while let Some(mut expr) = detached.pop() {
            expr.detach_junctions(&mut detached);
        }
    }
}

impl<P: Clone> Clone for Expr<P> {
    fn clone(&self) -> Self {
        self.map_predicates(P::clone)
    }
}

impl<P: PartialEq> PartialEq for Expr<P> {
    fn eq(&self, other: &Self) -> bool {
        let mut pairs = vec![(self, other)];
        while let Some(pair) = pairs.pop() {
            match pair {
                (Self::And(a, b), Self::And(c, d)) | (Self::Or(a, b), Self::Or(c, d)) => {
                    pairs.push((&**b, &**d));
                    pairs.push((&**a, &**c));
                }
                (Self::Predicate(p), Self::Predicate(q)) if p == q => {}
                (Self::Literal(x), Self::Literal(y)) if x == y => {}
                _ => return false,
            }
        }
        true
    }
}

enum Piece<'a, P> {
    Expr(&'a Expr<P>, bool),
    Text(&'static str),
}

impl<P: Display> Display for Expr<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // pieces are pushed in reverse so they pop in writing order
        let mut pieces = vec![Piece::Expr(self, false)];
        while let Some(piece) = pieces.pop() {
            let (expr, parenthesize) = match piece {
                Piece::Text(text) => {
                    f.write_str(text)?;
                    continue;
                }
                Piece::Expr(expr, parenthesize) => (expr, parenthesize),
            };

            let (a, b, symbol, left_parens, right_parens) = match expr {
                Self::And(a, b) => (a, b, " && ", matches!(**a, Self::Or(..)), b.is_junction()),
                Self::Or(a, b) => (a, b, " || ", false, matches!(**b, Self::Or(..))),
                Self::Predicate(p) => {
                    write!(f, "{}", p)?;
                    continue;
                }
                Self::Literal(b) => {
                    write!(f, "{}", b)?;
                    continue;
                }
            };

            if parenthesize {
                pieces.push(Piece::Text(")"));
            }
            pieces.push(Piece::Expr(&**b, right_parens));
            pieces.push(Piece::Text(symbol));
            pieces.push(Piece::Expr(&**a, left_parens));
            if parenthesize {
                pieces.push(Piece::Text("("));
            }
        }
        Ok(())
    }
}
