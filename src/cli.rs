//! Record schema for the command line: maps `--field NAME:KIND` declarations
//! onto a registry and decodes JSON lines into rows.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, bail, Context};
use serde_json::Value as Json;
use sift::{
    coerce::{parse_date, parse_date_time, parse_timestamp},
    FieldAccessor, LiteralCoercer, Registry, Value, ValueKind,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Bool,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    Text,
    Date,
    DateTime,
    Timestamp,
}

impl FieldKind {
    const ALL: [FieldKind; 12] = [
        FieldKind::Bool,
        FieldKind::Byte,
        FieldKind::Char,
        FieldKind::Short,
        FieldKind::Int,
        FieldKind::Long,
        FieldKind::Float,
        FieldKind::Double,
        FieldKind::Text,
        FieldKind::Date,
        FieldKind::DateTime,
        FieldKind::Timestamp,
    ];

    fn as_str(self) -> &'static str {
        match self {
            FieldKind::Bool => "bool",
            FieldKind::Byte => "byte",
            FieldKind::Char => "char",
            FieldKind::Short => "short",
            FieldKind::Int => "int",
            FieldKind::Long => "long",
            FieldKind::Float => "float",
            FieldKind::Double => "double",
            FieldKind::Text => "text",
            FieldKind::Date => "date",
            FieldKind::DateTime => "datetime",
            FieldKind::Timestamp => "timestamp",
        }
    }

    fn value_kind(self) -> ValueKind {
        match self {
            FieldKind::Bool => ValueKind::Boolean,
            FieldKind::Byte => ValueKind::Byte,
            FieldKind::Char => ValueKind::Char,
            FieldKind::Short => ValueKind::Short,
            FieldKind::Int => ValueKind::Int,
            FieldKind::Long => ValueKind::Long,
            FieldKind::Float => ValueKind::Float,
            FieldKind::Double => ValueKind::Double,
            FieldKind::Text | FieldKind::Date | FieldKind::DateTime | FieldKind::Timestamp => {
                ValueKind::Ordered
            }
        }
    }

    /// Text fields compare literals as-is and get no coercer
    fn coercer(self, name: &str) -> Option<LiteralCoercer> {
        let coercer = match self {
            FieldKind::Bool => LiteralCoercer::boolean(name),
            FieldKind::Byte => LiteralCoercer::byte(name),
            FieldKind::Char => LiteralCoercer::char(name),
            FieldKind::Short => LiteralCoercer::short(name),
            FieldKind::Int => LiteralCoercer::int(name),
            FieldKind::Long => LiteralCoercer::long(name),
            FieldKind::Float => LiteralCoercer::float(name),
            FieldKind::Double => LiteralCoercer::double(name),
            FieldKind::Text => return None,
            FieldKind::Date => LiteralCoercer::date(name),
            FieldKind::DateTime => LiteralCoercer::date_time(name),
            FieldKind::Timestamp => LiteralCoercer::timestamp(name),
        };
        Some(coercer)
    }

    fn decode(self, json: &Json) -> anyhow::Result<Value<'static>> {
        let value = match self {
            FieldKind::Bool => Value::Bool(json.as_bool().ok_or_else(|| mismatch(self, json))?),
            FieldKind::Byte => Value::Byte(integer(self, json)?),
            FieldKind::Char => {
                let text = json.as_str().ok_or_else(|| mismatch(self, json))?;
                let mut chars = text.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Value::Char(c),
                    _ => return Err(mismatch(self, json)),
                }
            }
            FieldKind::Short => Value::Short(integer(self, json)?),
            FieldKind::Int => Value::Int(integer(self, json)?),
            FieldKind::Long => Value::Long(integer(self, json)?),
            FieldKind::Float => {
                Value::Float(json.as_f64().ok_or_else(|| mismatch(self, json))? as f32)
            }
            FieldKind::Double => Value::Double(json.as_f64().ok_or_else(|| mismatch(self, json))?),
            FieldKind::Text => Value::from(text(self, json)?.to_string()),
            FieldKind::Date => Value::Date(parse_date(text(self, json)?)?),
            FieldKind::DateTime => Value::DateTime(parse_date_time(text(self, json)?)?),
            FieldKind::Timestamp => Value::Timestamp(parse_timestamp(text(self, json)?)?),
        };
        Ok(value)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| {
                let known: Vec<&str> = FieldKind::ALL.iter().map(|k| k.as_str()).collect();
                format!("unknown kind '{s}', expected one of: {}", known.join(", "))
            })
    }
}

fn mismatch(kind: FieldKind, json: &Json) -> anyhow::Error {
    anyhow!("expected {kind}, found {json}")
}

fn integer<T: TryFrom<i64>>(kind: FieldKind, json: &Json) -> anyhow::Result<T> {
    json.as_i64()
        .and_then(|n| T::try_from(n).ok())
        .ok_or_else(|| mismatch(kind, json))
}

fn text(kind: FieldKind, json: &Json) -> anyhow::Result<&str> {
    json.as_str().ok_or_else(|| mismatch(kind, json))
}

/// A `NAME:KIND` declaration from the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
}

impl FromStr for FieldSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, kind) = s
            .rsplit_once(':')
            .ok_or_else(|| format!("expected NAME:KIND, got '{s}'"))?;
        if name.is_empty() {
            return Err(format!("missing field name in '{s}'"));
        }
        Ok(FieldSpec {
            name: name.to_string(),
            kind: kind.parse()?,
        })
    }
}

/// One decoded record; values are stored in declaration order
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    values: Vec<Value<'static>>,
}

#[derive(Debug, Clone)]
pub struct Schema {
    fields: Vec<FieldSpec>,
}

impl Schema {
    pub fn new(fields: Vec<FieldSpec>) -> anyhow::Result<Self> {
        let mut seen = HashSet::new();
        for field in &fields {
            if !seen.insert(field.name.as_str()) {
                bail!("field '{}' declared more than once", field.name);
            }
        }
        Ok(Self { fields })
    }

    pub fn registry(&self) -> Registry<Row> {
        let mut builder = Registry::builder();
        for (index, field) in self.fields.iter().enumerate() {
            builder = builder.accessor(FieldAccessor::new(
                field.name.as_str(),
                field.kind.value_kind(),
                move |row: &Row| row.values[index].reborrow(),
            ));
            if let Some(coercer) = field.kind.coercer(&field.name) {
                builder = builder.coercer(coercer);
            }
        }
        builder.build()
    }

    /// Decode one JSON object. Every declared field must be present.
    pub fn decode(&self, line: &str) -> anyhow::Result<Row> {
        let json: Json = serde_json::from_str(line).context("invalid JSON")?;
        let object = json
            .as_object()
            .ok_or_else(|| anyhow!("expected a JSON object"))?;

        let values = self
            .fields
            .iter()
            .map(|field| {
                let raw = object
                    .get(&field.name)
                    .ok_or_else(|| anyhow!("missing field '{}'", field.name))?;
                field
                    .kind
                    .decode(raw)
                    .with_context(|| format!("field '{}'", field.name))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        Ok(Row { values })
    }
}
