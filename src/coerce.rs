//! Literal coercion: turning query text into a field's value domain.

pub mod time;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::CoercionError;
use crate::value::Value;

pub use self::time::{parse_date, parse_date_time, parse_timestamp};

/// Converts a literal into a typed value for one named field
pub trait Coercer: Send + Sync {
    /// Field this coercer serves
    fn name(&self) -> &str;

    fn coerce(&self, literal: &str) -> Result<Value<'static>, CoercionError>;
}

type Rule = Arc<dyn Fn(&str) -> Result<Value<'static>, CoercionError> + Send + Sync>;

/// Closure-backed [`Coercer`], with one constructor per built-in rule
#[derive(Clone)]
pub struct LiteralCoercer {
    name: String,
    rule: Rule,
}

impl LiteralCoercer {
    /// Coercer for an embedder-defined domain
    pub fn custom<F>(name: impl Into<String>, rule: F) -> Self
    where
        F: Fn(&str) -> Result<Value<'static>, CoercionError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            rule: Arc::new(rule),
        }
    }

    /// `true` in any ASCII case is true, every other literal is false
    pub fn boolean(name: impl Into<String>) -> Self {
        Self::custom(name, |literal| Ok(Value::Bool(parse_boolean(literal))))
    }

    pub fn byte(name: impl Into<String>) -> Self {
        Self::custom(name, |literal| strict::<i8>(literal, "a byte").map(Value::Byte))
    }

    /// Exactly one character
    pub fn char(name: impl Into<String>) -> Self {
        Self::custom(name, |literal| {
            let mut chars = literal.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(Value::Char(c)),
                _ => Err(CoercionError::new(literal, "a single character")),
            }
        })
    }

    pub fn short(name: impl Into<String>) -> Self {
        Self::custom(name, |literal| strict::<i16>(literal, "a short").map(Value::Short))
    }

    pub fn int(name: impl Into<String>) -> Self {
        Self::custom(name, |literal| strict::<i32>(literal, "an int").map(Value::Int))
    }

    pub fn long(name: impl Into<String>) -> Self {
        Self::custom(name, |literal| strict::<i64>(literal, "a long").map(Value::Long))
    }

    pub fn float(name: impl Into<String>) -> Self {
        Self::custom(name, |literal| strict::<f32>(literal, "a float").map(Value::Float))
    }

    pub fn double(name: impl Into<String>) -> Self {
        Self::custom(name, |literal| strict::<f64>(literal, "a double").map(Value::Double))
    }

    /// `YYYY-MM-DD`
    pub fn date(name: impl Into<String>) -> Self {
        Self::custom(name, |literal| parse_date(literal).map(Value::Date))
    }

    /// See [`time`] for the accepted shapes
    pub fn date_time(name: impl Into<String>) -> Self {
        Self::custom(name, |literal| parse_date_time(literal).map(Value::DateTime))
    }

    /// See [`time`] for the accepted shapes
    pub fn timestamp(name: impl Into<String>) -> Self {
        Self::custom(name, |literal| parse_timestamp(literal).map(Value::Timestamp))
    }
}

impl Coercer for LiteralCoercer {
    fn name(&self) -> &str {
        &self.name
    }

    fn coerce(&self, literal: &str) -> Result<Value<'static>, CoercionError> {
        (self.rule)(literal)
    }
}

impl fmt::Debug for LiteralCoercer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiteralCoercer")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Boolean literal rule. Never fails.
pub fn parse_boolean(literal: &str) -> bool {
    literal.eq_ignore_ascii_case("true")
}

fn strict<T: FromStr>(literal: &str, expected: &str) -> Result<T, CoercionError> {
    literal
        .parse::<T>()
        .map_err(|_| CoercionError::new(literal, expected))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boolean_never_fails() {
        let coercer = LiteralCoercer::boolean("flag");
        assert_eq!(coercer.coerce("TRUE"), Ok(Value::Bool(true)));
        assert_eq!(coercer.coerce("yes"), Ok(Value::Bool(false)));
        assert_eq!(coercer.coerce(""), Ok(Value::Bool(false)));
    }

    #[test]
    fn test_integers_are_strict() {
        let coercer = LiteralCoercer::byte("b");
        assert_eq!(coercer.coerce("-128"), Ok(Value::Byte(-128)));
        assert!(coercer.coerce("128").is_err());
        assert!(coercer.coerce("1.0").is_err());
        assert!(LiteralCoercer::int("i").coerce(" 1").is_err());
    }

    #[test]
    fn test_char_needs_exactly_one_character() {
        let coercer = LiteralCoercer::char("c");
        assert_eq!(coercer.coerce("é"), Ok(Value::Char('é')));
        assert!(coercer.coerce("ab").is_err());
        assert!(coercer.coerce("").is_err());
    }

    #[test]
    fn test_error_names_the_expected_domain() {
        let err = LiteralCoercer::double("d").coerce("X").unwrap_err();
        assert_eq!(err, CoercionError::new("X", "a double"));
        assert_eq!(err.to_string(), "Cannot read 'X' as a double");
    }

    #[test]
    fn test_custom_rule() {
        let coercer = LiteralCoercer::custom("tier", |literal| {
            Ok(Value::Text(literal.to_ascii_lowercase().into()))
        });
        assert_eq!(coercer.name(), "tier");
        assert_eq!(coercer.coerce("GOLD"), Ok(Value::from("gold")));
    }
}
