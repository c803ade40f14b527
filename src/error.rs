use miette::Diagnostic;
use thiserror::Error;

use crate::parser::Operator;

/// A literal could not be converted into a field's value domain
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Cannot read '{literal}' as {expected}")]
pub struct CoercionError {
    pub literal: String,
    pub expected: String,
}

impl CoercionError {
    pub fn new(literal: impl Into<String>, expected: impl Into<String>) -> Self {
        Self {
            literal: literal.into(),
            expected: expected.into(),
        }
    }
}

/// Evaluation error raised while testing a record.
///
/// Parsing never produces these; a query whose literals are all malformed
/// still binds, and fails here when a leaf is actually reached.
#[derive(Debug, Clone, PartialEq, Diagnostic, Error)]
pub enum QueryError {
    #[error("Field '{field}': {source}")]
    #[diagnostic(code(sift::coercion))]
    Coercion {
        field: String,
        #[source]
        source: CoercionError,
    },

    #[error("Operator '{operator}' does not apply to {kind} value of field '{field}'")]
    #[diagnostic(
        code(sift::unsupported_operator),
        help("'≈' and '!≈' only apply to text values")
    )]
    UnsupportedOperator {
        field: String,
        operator: Operator,
        kind: &'static str,
    },

    #[error("Field '{field}': cannot compare {left} with {right} using '{operator}'")]
    #[diagnostic(code(sift::not_comparable))]
    NotComparable {
        field: String,
        operator: Operator,
        left: &'static str,
        right: &'static str,
    },
}
