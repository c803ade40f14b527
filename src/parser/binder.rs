use std::{mem, sync::Arc};

use recursion::{Collapsible, CollapsibleExt, MappableFrame, PartiallyApplied};

use crate::{
    accessor::Registry,
    expr::Expr,
    parser::{ast::Node, error::QueryParseError},
    predicate::{Comparison, Condition},
};

/// Resolves field names in a parsed [`Node`] against a [`Registry`].
///
/// Binding is purely structural: literals are carried through unchanged and
/// only coerced when a record is tested.
pub struct Binder;

impl Binder {
    /// Transform an AST into an evaluable expression
    ///
    /// # Errors
    /// `UnknownField` for a field with no accessor, `EmptyMembership` for an
    /// `∈` with no elements, `UnsupportedNode` for a node the binder does not
    /// recognise. The leftmost failing leaf is reported.
    pub fn bind<R>(node: Node, registry: &Registry<R>) -> Result<Expr<Comparison<R>>, QueryParseError> {
        Unbound(node).collapse_frames(|frame| match frame {
            NodeFrame::And(left, right) => Ok(Expr::and(left?, right?)),
            NodeFrame::Or(left, right) => Ok(Expr::or(left?, right?)),
            NodeFrame::Leaf(field, condition) => leaf(registry, field, condition),
            NodeFrame::Unsupported => Err(QueryParseError::UnsupportedNode {
                kind: Node::Unsupported.kind().to_string(),
            }),
        })
    }
}

/// Owned AST taken apart one layer at a time
struct Unbound(Node);

enum NodeFrame<X> {
    And(X, X),
    Or(X, X),
    Leaf(String, Condition),
    Unsupported,
}

impl MappableFrame for NodeFrame<PartiallyApplied> {
    type Frame<X> = NodeFrame<X>;

    fn map_frame<A, B>(input: Self::Frame<A>, mut f: impl FnMut(A) -> B) -> Self::Frame<B> {
        match input {
            NodeFrame::And(a, b) => NodeFrame::And(f(a), f(b)),
            NodeFrame::Or(a, b) => NodeFrame::Or(f(a), f(b)),
            NodeFrame::Leaf(field, condition) => NodeFrame::Leaf(field, condition),
            NodeFrame::Unsupported => NodeFrame::Unsupported,
        }
    }
}

impl Collapsible for Unbound {
    type FrameToken = NodeFrame<PartiallyApplied>;

    fn into_frame(self) -> NodeFrame<Self> {
        let mut node = self.0;
        let (field, condition) = match &mut node {
            Node::And { left, right } => {
                return NodeFrame::And(Unbound(left.detach()), Unbound(right.detach()))
            }
            Node::Or { left, right } => {
                return NodeFrame::Or(Unbound(left.detach()), Unbound(right.detach()))
            }
            Node::Equals { field, literal } => (field, Condition::Equals(mem::take(literal))),
            Node::NotEquals { field, literal } => (field, Condition::NotEquals(mem::take(literal))),
            Node::GreaterThan { field, literal } => {
                (field, Condition::GreaterThan(mem::take(literal)))
            }
            Node::GreaterThanOrEquals { field, literal } => {
                (field, Condition::GreaterThanOrEquals(mem::take(literal)))
            }
            Node::LessThan { field, literal } => (field, Condition::LessThan(mem::take(literal))),
            Node::LessThanOrEquals { field, literal } => {
                (field, Condition::LessThanOrEquals(mem::take(literal)))
            }
            Node::Matches { field, literal } => (field, Condition::Matches(mem::take(literal))),
            Node::NotMatches { field, literal } => {
                (field, Condition::NotMatches(mem::take(literal)))
            }
            Node::In { field, literals } => (field, Condition::In(mem::take(literals))),
            Node::Unsupported => return NodeFrame::Unsupported,
        };
        NodeFrame::Leaf(mem::take(field), condition)
    }
}

fn leaf<R>(
    registry: &Registry<R>,
    field: String,
    condition: Condition,
) -> Result<Expr<Comparison<R>>, QueryParseError> {
    let Some(accessor) = registry.accessor(&field) else {
        let suggestions = suggest_fields(registry, &field);
        return Err(QueryParseError::UnknownField {
            field,
            suggestions,
            span: None,
            src: None,
        });
    };
    if matches!(&condition, Condition::In(literals) if literals.is_empty()) {
        return Err(QueryParseError::EmptyMembership { field });
    }
    let coercer = registry.coercer(&field).cloned();

    log::trace!(
        "bound {field} {} (kind {}, {})",
        condition.operator(),
        accessor.kind(),
        if coercer.is_some() { "coerced" } else { "raw text" }
    );

    Ok(Expr::Predicate(Comparison::new(
        Arc::clone(accessor),
        coercer,
        condition,
    )))
}

fn suggest_fields<R>(registry: &Registry<R>, field: &str) -> Option<String> {
    let known = registry.field_names();
    if known.is_empty() {
        return None;
    }

    let close: Vec<&str> = known
        .iter()
        .copied()
        .filter(|name| name.eq_ignore_ascii_case(field))
        .collect();

    if close.is_empty() {
        Some(format!("Known fields: {}", known.join(", ")))
    } else {
        Some(format!("Did you mean: {}?", close.join(", ")))
    }
}
