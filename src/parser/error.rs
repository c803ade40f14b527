use std::ops::Range;

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

use super::ast::Operator;
use super::lexer::{tokenize, Token};

/// Structural error raised while parsing or binding a query, before any
/// record is examined
#[allow(dead_code)] // Fields are used by miette's derive macros
#[derive(Debug, Clone, Diagnostic, Error)]
pub enum QueryParseError {
    #[error("Unexpected '{found}', expected {expected}")]
    #[diagnostic(code(sift::unexpected_token))]
    UnexpectedToken {
        found: String,
        expected: &'static str,
        #[label("unexpected token")]
        span: SourceSpan,
        #[source_code]
        src: String,
    },

    #[error("Query ended early, expected {expected}")]
    #[diagnostic(
        code(sift::unexpected_end),
        help("Complete the comparison, like: age >= 18")
    )]
    UnexpectedEnd {
        expected: &'static str,
        #[label("query ends here")]
        span: SourceSpan,
        #[source_code]
        src: String,
    },

    #[error("Unclosed parenthesis")]
    #[diagnostic(code(sift::unclosed_paren), help("Add a matching ')'"))]
    UnclosedParen {
        #[label("opened here")]
        span: SourceSpan,
        #[source_code]
        src: String,
    },

    #[error("Unmatched closing parenthesis")]
    #[diagnostic(code(sift::unmatched_paren))]
    UnmatchedParen {
        #[label("no matching '('")]
        span: SourceSpan,
        #[source_code]
        src: String,
    },

    #[error("Unclosed set literal")]
    #[diagnostic(code(sift::unclosed_bracket), help("Add a matching ']'"))]
    UnclosedBracket {
        #[label("set opened here")]
        span: SourceSpan,
        #[source_code]
        src: String,
    },

    #[error("Missing operator after field '{field}'")]
    #[diagnostic(
        code(sift::missing_operator),
        help("Valid operators: = != > >= < <= ≈ !≈ ∈")
    )]
    MissingOperator {
        field: String,
        #[label("expected an operator")]
        span: SourceSpan,
        #[source_code]
        src: String,
    },

    #[error("Empty set literal")]
    #[diagnostic(
        code(sift::empty_set),
        help("A set needs at least one element, like: [gold, platinum]")
    )]
    EmptySet {
        #[label("no elements")]
        span: SourceSpan,
        #[source_code]
        src: String,
    },

    #[error("Set literal is only valid with '∈', not '{operator}'")]
    #[diagnostic(code(sift::set_not_allowed))]
    SetNotAllowed {
        operator: Operator,
        #[label("set literal")]
        span: SourceSpan,
        #[source_code]
        src: String,
    },

    #[error("Query nests parentheses deeper than {limit} levels")]
    #[diagnostic(
        code(sift::nesting_too_deep),
        help("'&&' and '||' chains of any length need no parentheses")
    )]
    NestingTooDeep {
        limit: usize,
        #[label("too deep")]
        span: SourceSpan,
        #[source_code]
        src: String,
    },

    /// Raised by binding, which sees only the AST; query text and span are
    /// attached when the query was parsed from text
    #[error("Unknown field: {field}")]
    #[diagnostic(code(sift::unknown_field))]
    UnknownField {
        field: String,
        #[help]
        suggestions: Option<String>,
        #[label("not a registered field")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<String>,
    },

    #[error("Empty set literal for field '{field}'")]
    #[diagnostic(
        code(sift::empty_set),
        help("A set needs at least one element, like: [gold, platinum]")
    )]
    EmptyMembership { field: String },

    #[error("Unsupported query node: {kind}")]
    #[diagnostic(
        code(sift::unsupported_node),
        help("Only And, Or and comparison nodes can be bound")
    )]
    UnsupportedNode { kind: String },

    #[error("Internal parser error: {message}")]
    #[diagnostic(code(sift::internal))]
    Internal {
        message: String,
        #[source_code]
        src: String,
    },
}

impl QueryParseError {
    /// Create an internal error
    pub fn internal(message: impl Into<String>, src: &str) -> Self {
        QueryParseError::Internal {
            message: message.into(),
            src: src.to_string(),
        }
    }

    /// Attach the query text to an error raised while binding
    pub(crate) fn with_source(self, source: &str) -> Self {
        match self {
            QueryParseError::UnknownField {
                field, suggestions, ..
            } => QueryParseError::UnknownField {
                span: field_span(source, &field),
                src: Some(source.to_string()),
                field,
                suggestions,
            },
            other => other,
        }
    }
}

/// First place `field` is used as a field name, i.e. followed by an operator
fn field_span(source: &str, field: &str) -> Option<SourceSpan> {
    let lexemes = tokenize(source).ok()?;
    lexemes
        .windows(2)
        .find(|pair| {
            pair[0].token == Token::Literal(field) && matches!(pair[1].token, Token::Operator(_))
        })
        .map(|pair| to_source_span(&pair[0].span))
}

pub(crate) fn to_source_span(span: &Range<usize>) -> SourceSpan {
    (span.start, span.end.saturating_sub(span.start)).into()
}
