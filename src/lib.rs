//! Compile textual filter queries into reusable predicates over typed records.
//!
//! A query is a boolean combination of `field operator value` comparisons:
//!
//! ```text
//! age >= 18 && (status = active || tier ∈ [gold, platinum])
//! ```
//!
//! Operators are `=`, `!=`, `>`, `>=`, `<`, `<=`, `≈` (wildcard text match),
//! `!≈` and `∈` (set membership). `&&` binds tighter than `||`.
//!
//! Fields are resolved through a [`Registry`] of named [`Accessor`]s and
//! optional [`Coercer`]s supplied by the embedding application. Parsing and
//! binding fail eagerly with a [`QueryParseError`]; literal coercion happens
//! per record and fails with a [`QueryError`].

pub mod accessor;
pub mod coerce;
pub mod error;
pub mod expr;
pub mod parser;
pub mod predicate;
pub mod query;
pub mod value;

pub use accessor::{Accessor, FieldAccessor, Registry, RegistryBuilder};
pub use coerce::{Coercer, LiteralCoercer};
pub use error::{CoercionError, QueryError};
pub use expr::Expr;
pub use parser::{Lexeme, Node, Operator, QueryParseError, Token};
pub use predicate::{wildcard_match, Comparison, Condition};
pub use query::{Query, QueryParser};
pub use value::{Value, ValueKind};

/// Split query text into tokens
pub fn tokenize(text: &str) -> Result<Vec<Lexeme<'_>>, QueryParseError> {
    parser::tokenize(text)
}

/// Parse query text into an unbound AST
pub fn parse_node(text: &str) -> Result<Node, QueryParseError> {
    parser::RawParser::parse_node(text)
}
