use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use crate::{
    accessor::Accessor, coerce::Coercer, error::QueryError, parser::Operator, value::Value,
};

/// Operator together with its raw, not yet coerced literal(s)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    Equals(String),
    NotEquals(String),
    GreaterThan(String),
    GreaterThanOrEquals(String),
    LessThan(String),
    LessThanOrEquals(String),
    Matches(String),
    NotMatches(String),
    In(Vec<String>),
}

impl Condition {
    pub fn operator(&self) -> Operator {
        match self {
            Condition::Equals(_) => Operator::Equals,
            Condition::NotEquals(_) => Operator::NotEquals,
            Condition::GreaterThan(_) => Operator::GreaterThan,
            Condition::GreaterThanOrEquals(_) => Operator::GreaterThanOrEquals,
            Condition::LessThan(_) => Operator::LessThan,
            Condition::LessThanOrEquals(_) => Operator::LessThanOrEquals,
            Condition::Matches(_) => Operator::Matches,
            Condition::NotMatches(_) => Operator::NotMatches,
            Condition::In(_) => Operator::In,
        }
    }
}

/// A bound comparison leaf: reads one field and tests it against literals.
///
/// Literals are coerced on every call to [`Comparison::test`], so a malformed
/// literal is only reported once a record actually reaches this leaf.
pub struct Comparison<R> {
    accessor: Arc<dyn Accessor<R>>,
    coercer: Option<Arc<dyn Coercer>>,
    condition: Condition,
}

impl<R> Comparison<R> {
    pub fn new(
        accessor: Arc<dyn Accessor<R>>,
        coercer: Option<Arc<dyn Coercer>>,
        condition: Condition,
    ) -> Self {
        Self {
            accessor,
            coercer,
            condition,
        }
    }

    pub fn field(&self) -> &str {
        self.accessor.name()
    }

    pub fn operator(&self) -> Operator {
        self.condition.operator()
    }

    pub fn condition(&self) -> &Condition {
        &self.condition
    }

    pub fn accessor(&self) -> &Arc<dyn Accessor<R>> {
        &self.accessor
    }

    pub fn coercer(&self) -> Option<&Arc<dyn Coercer>> {
        self.coercer.as_ref()
    }

    pub fn test(&self, record: &R) -> Result<bool, QueryError> {
        let value = self.accessor.get(record);
        match &self.condition {
            Condition::Equals(literal) => Ok(value.equals(&self.coerce(literal)?)),
            Condition::NotEquals(literal) => Ok(!value.equals(&self.coerce(literal)?)),
            Condition::GreaterThan(literal) => {
                Ok(self.ordering(&value, literal)? == Ordering::Greater)
            }
            Condition::GreaterThanOrEquals(literal) => {
                Ok(self.ordering(&value, literal)? != Ordering::Less)
            }
            Condition::LessThan(literal) => Ok(self.ordering(&value, literal)? == Ordering::Less),
            Condition::LessThanOrEquals(literal) => {
                Ok(self.ordering(&value, literal)? != Ordering::Greater)
            }
            Condition::Matches(pattern) => self.matches(&value, pattern),
            Condition::NotMatches(pattern) => self.matches(&value, pattern).map(|m| !m),
            Condition::In(literals) => {
                // every element must coerce, even after a match is found
                let candidates = literals
                    .iter()
                    .map(|literal| self.coerce(literal))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(candidates.iter().any(|candidate| value.equals(candidate)))
            }
        }
    }

    fn coerce<'s>(&self, literal: &'s str) -> Result<Value<'s>, QueryError> {
        match &self.coercer {
            Some(coercer) => coercer
                .coerce(literal)
                .map_err(|source| QueryError::Coercion {
                    field: self.field().to_string(),
                    source,
                }),
            None => Ok(Value::Text(Cow::Borrowed(literal))),
        }
    }

    fn ordering(&self, value: &Value<'_>, literal: &str) -> Result<Ordering, QueryError> {
        let literal = self.coerce(literal)?;
        value
            .compare(&literal)
            .ok_or_else(|| QueryError::NotComparable {
                field: self.field().to_string(),
                operator: self.operator(),
                left: value.type_name(),
                right: literal.type_name(),
            })
    }

    fn matches(&self, value: &Value<'_>, pattern: &str) -> Result<bool, QueryError> {
        match value.as_text() {
            Some(text) => Ok(wildcard_match(text, pattern)),
            None => Err(QueryError::UnsupportedOperator {
                field: self.field().to_string(),
                operator: self.operator(),
                kind: value.type_name(),
            }),
        }
    }
}

impl<R> Clone for Comparison<R> {
    fn clone(&self) -> Self {
        Self {
            accessor: Arc::clone(&self.accessor),
            coercer: self.coercer.clone(),
            condition: self.condition.clone(),
        }
    }
}

impl<R> fmt::Debug for Comparison<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Comparison")
            .field("field", &self.field())
            .field("coerced", &self.coercer.is_some())
            .field("condition", &self.condition)
            .finish()
    }
}

impl<R> fmt::Display for Comparison<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let field = self.field();
        match &self.condition {
            Condition::In(literals) => write!(f, "{field} ∈ [{}]", literals.join(", ")),
            Condition::Equals(literal)
            | Condition::NotEquals(literal)
            | Condition::GreaterThan(literal)
            | Condition::GreaterThanOrEquals(literal)
            | Condition::LessThan(literal)
            | Condition::LessThanOrEquals(literal)
            | Condition::Matches(literal)
            | Condition::NotMatches(literal) => {
                write!(f, "{field} {} {literal}", self.operator())
            }
        }
    }
}

/// Single-wildcard text match used by `≈`.
///
/// `*m*` is a substring test, `*s` a suffix test, `p*` a prefix test, and a
/// pattern without a leading or trailing `*` must equal the text exactly.
pub fn wildcard_match(text: &str, pattern: &str) -> bool {
    if let Some(inner) = pattern
        .strip_prefix('*')
        .and_then(|rest| rest.strip_suffix('*'))
    {
        return text.contains(inner);
    }
    if let Some(suffix) = pattern.strip_prefix('*') {
        return text.ends_with(suffix);
    }
    if let Some(prefix) = pattern.strip_suffix('*') {
        return text.starts_with(prefix);
    }
    text == pattern
}
