use std::fmt;
use std::mem;

use serde::{Deserialize, Serialize};

/// Comparison operators, in the order the grammar lists them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    Equals,              // =
    NotEquals,           // !=
    GreaterThan,         // >
    GreaterThanOrEquals, // >=
    LessThan,            // <
    LessThanOrEquals,    // <=
    Matches,             // ≈
    NotMatches,          // !≈
    In,                  // ∈
}

impl Operator {
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Equals => "=",
            Operator::NotEquals => "!=",
            Operator::GreaterThan => ">",
            Operator::GreaterThanOrEquals => ">=",
            Operator::LessThan => "<",
            Operator::LessThanOrEquals => "<=",
            Operator::Matches => "≈",
            Operator::NotMatches => "!≈",
            Operator::In => "∈",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Parsed query before field names are resolved.
///
/// Serialized documents are tagged by `kind`. A document with an unrecognised
/// kind deserializes to [`Node::Unsupported`], which binding rejects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Node {
    And { left: Box<Node>, right: Box<Node> },
    Or { left: Box<Node>, right: Box<Node> },
    Equals { field: String, literal: String },
    NotEquals { field: String, literal: String },
    GreaterThan { field: String, literal: String },
    GreaterThanOrEquals { field: String, literal: String },
    LessThan { field: String, literal: String },
    LessThanOrEquals { field: String, literal: String },
    Matches { field: String, literal: String },
    NotMatches { field: String, literal: String },
    In { field: String, literals: Vec<String> },
    #[serde(other)]
    Unsupported,
}

impl Node {
    pub fn and(left: Node, right: Node) -> Self {
        Node::And {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn or(left: Node, right: Node) -> Self {
        Node::Or {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Build the leaf for `operator` with a single literal. For `In` the
    /// literal becomes a one-element set.
    pub fn comparison(
        operator: Operator,
        field: impl Into<String>,
        literal: impl Into<String>,
    ) -> Self {
        let field = field.into();
        let literal = literal.into();
        match operator {
            Operator::Equals => Node::Equals { field, literal },
            Operator::NotEquals => Node::NotEquals { field, literal },
            Operator::GreaterThan => Node::GreaterThan { field, literal },
            Operator::GreaterThanOrEquals => Node::GreaterThanOrEquals { field, literal },
            Operator::LessThan => Node::LessThan { field, literal },
            Operator::LessThanOrEquals => Node::LessThanOrEquals { field, literal },
            Operator::Matches => Node::Matches { field, literal },
            Operator::NotMatches => Node::NotMatches { field, literal },
            Operator::In => Node::In {
                field,
                literals: vec![literal],
            },
        }
    }

    /// `field ∈ [literals]`
    pub fn membership(field: impl Into<String>, literals: Vec<String>) -> Self {
        Node::In {
            field: field.into(),
            literals,
        }
    }

    /// Variant name, as used for the serde tag
    pub fn kind(&self) -> &'static str {
        match self {
            Node::And { .. } => "And",
            Node::Or { .. } => "Or",
            Node::Equals { .. } => "Equals",
            Node::NotEquals { .. } => "NotEquals",
            Node::GreaterThan { .. } => "GreaterThan",
            Node::GreaterThanOrEquals { .. } => "GreaterThanOrEquals",
            Node::LessThan { .. } => "LessThan",
            Node::LessThanOrEquals { .. } => "LessThanOrEquals",
            Node::Matches { .. } => "Matches",
            Node::NotMatches { .. } => "NotMatches",
            Node::In { .. } => "In",
            Node::Unsupported => "Unsupported",
        }
    }

    /// Field name of a comparison leaf
    pub fn field(&self) -> Option<&str> {
        match self {
            Node::Equals { field, .. }
            | Node::NotEquals { field, .. }
            | Node::GreaterThan { field, .. }
            | Node::GreaterThanOrEquals { field, .. }
            | Node::LessThan { field, .. }
            | Node::LessThanOrEquals { field, .. }
            | Node::Matches { field, .. }
            | Node::NotMatches { field, .. }
            | Node::In { field, .. } => Some(field),
            Node::And { .. } | Node::Or { .. } | Node::Unsupported => None,
        }
    }

    fn operator(&self) -> Option<Operator> {
        match self {
            Node::Equals { .. } => Some(Operator::Equals),
            Node::NotEquals { .. } => Some(Operator::NotEquals),
            Node::GreaterThan { .. } => Some(Operator::GreaterThan),
            Node::GreaterThanOrEquals { .. } => Some(Operator::GreaterThanOrEquals),
            Node::LessThan { .. } => Some(Operator::LessThan),
            Node::LessThanOrEquals { .. } => Some(Operator::LessThanOrEquals),
            Node::Matches { .. } => Some(Operator::Matches),
            Node::NotMatches { .. } => Some(Operator::NotMatches),
            Node::In { .. } => Some(Operator::In),
            Node::And { .. } | Node::Or { .. } | Node::Unsupported => None,
        }
    }
}

impl Node {
    /// Move this node out, leaving `Unsupported` in its place
    pub(crate) fn detach(&mut self) -> Node {
        mem::replace(self, Node::Unsupported)
    }

    fn is_junction(&self) -> bool {
        matches!(self, Node::And { .. } | Node::Or { .. })
    }

    fn detach_junctions(&mut self, out: &mut Vec<Node>) {
        if let Node::And { left, right } | Node::Or { left, right } = self {
            for child in [left, right] {
                if child.is_junction() {
                    out.push(child.detach());
                }
            }
        }
    }
}

impl Drop for Node {
    fn drop(&mut self) {
        let mut detached = Vec::new();
        self.detach_junctions(&mut detached);
        while let Some(mut node) = detached.pop() {
            node.detach_junctions(&mut detached);
        }
    }
}

/// Renders query text that parses back to the same tree
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // pushed in reverse so they pop in writing order
        let mut pieces = vec![Piece::Node(self, false)];
        while let Some(piece) = pieces.pop() {
            let (node, parenthesize) = match piece {
                Piece::Text(text) => {
                    f.write_str(text)?;
                    continue;
                }
                Piece::Node(node, parenthesize) => (node, parenthesize),
            };

            let (left, right, symbol, left_parens, right_parens) = match node {
                Node::And { left, right } => (
                    left,
                    right,
                    " && ",
                    matches!(**left, Node::Or { .. }),
                    right.is_junction(),
                ),
                Node::Or { left, right } => {
                    (left, right, " || ", false, matches!(**right, Node::Or { .. }))
                }
                leaf => {
                    write_leaf(f, leaf)?;
                    continue;
                }
            };

            if parenthesize {
                pieces.push(Piece::Text(")"));
            }
            pieces.push(Piece::Node(&**right, right_parens));
            pieces.push(Piece::Text(symbol));
            pieces.push(Piece::Node(&**left, left_parens));
            if parenthesize {
                pieces.push(Piece::Text("("));
            }
        }
        Ok(())
    }
}

enum Piece<'a> {
    Node(&'a Node, bool),
    Text(&'static str),
}

fn write_leaf(f: &mut fmt::Formatter<'_>, node: &Node) -> fmt::Result {
    match node {
        Node::In { field, literals } => write!(f, "{field} ∈ [{}]", literals.join(", ")),
        Node::Equals { field, literal }
        | Node::NotEquals { field, literal }
        | Node::GreaterThan { field, literal }
        | Node::GreaterThanOrEquals { field, literal }
        | Node::LessThan { field, literal }
        | Node::LessThanOrEquals { field, literal }
        | Node::Matches { field, literal }
        | Node::NotMatches { field, literal } => {
            let op = node.operator().map_or("?", Operator::symbol);
            write!(f, "{field} {op} {literal}")
        }
        Node::Unsupported => write!(f, "<unsupported>"),
        Node::And { .. } | Node::Or { .. } => Ok(()),
    }
}
