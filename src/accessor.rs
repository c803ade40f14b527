//! Field accessors and the registry queries are bound against.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};

use crate::coerce::Coercer;
use crate::value::{Value, ValueKind};

/// Reads one named field from a record of type `R`
pub trait Accessor<R>: Send + Sync {
    fn name(&self) -> &str;

    /// Declared kind. For [`ValueKind::Ordered`] the runtime variant may be
    /// text or any of the date representations.
    fn kind(&self) -> ValueKind;

    fn get<'r>(&self, record: &'r R) -> Value<'r>;
}

type Read<R> = Arc<dyn for<'r> Fn(&'r R) -> Value<'r> + Send + Sync>;

/// Closure-backed [`Accessor`]
pub struct FieldAccessor<R> {
    name: String,
    kind: ValueKind,
    read: Read<R>,
}

impl<R: 'static> FieldAccessor<R> {
    pub fn new<F>(name: impl Into<String>, kind: ValueKind, read: F) -> Self
    where
        F: for<'r> Fn(&'r R) -> Value<'r> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            kind,
            read: Arc::new(read),
        }
    }

    pub fn boolean<F>(name: impl Into<String>, read: F) -> Self
    where
        F: Fn(&R) -> bool + Send + Sync + 'static,
    {
        Self::new(name, ValueKind::Boolean, move |r| Value::Bool(read(r)))
    }

    pub fn byte<F>(name: impl Into<String>, read: F) -> Self
    where
        F: Fn(&R) -> i8 + Send + Sync + 'static,
    {
        Self::new(name, ValueKind::Byte, move |r| Value::Byte(read(r)))
    }

    pub fn char<F>(name: impl Into<String>, read: F) -> Self
    where
        F: Fn(&R) -> char + Send + Sync + 'static,
    {
        Self::new(name, ValueKind::Char, move |r| Value::Char(read(r)))
    }

    pub fn short<F>(name: impl Into<String>, read: F) -> Self
    where
        F: Fn(&R) -> i16 + Send + Sync + 'static,
    {
        Self::new(name, ValueKind::Short, move |r| Value::Short(read(r)))
    }

    pub fn int<F>(name: impl Into<String>, read: F) -> Self
    where
        F: Fn(&R) -> i32 + Send + Sync + 'static,
    {
        Self::new(name, ValueKind::Int, move |r| Value::Int(read(r)))
    }

    pub fn long<F>(name: impl Into<String>, read: F) -> Self
    where
        F: Fn(&R) -> i64 + Send + Sync + 'static,
    {
        Self::new(name, ValueKind::Long, move |r| Value::Long(read(r)))
    }

    pub fn float<F>(name: impl Into<String>, read: F) -> Self
    where
        F: Fn(&R) -> f32 + Send + Sync + 'static,
    {
        Self::new(name, ValueKind::Float, move |r| Value::Float(read(r)))
    }

    pub fn double<F>(name: impl Into<String>, read: F) -> Self
    where
        F: Fn(&R) -> f64 + Send + Sync + 'static,
    {
        Self::new(name, ValueKind::Double, move |r| Value::Double(read(r)))
    }

    /// Text borrowed from the record
    pub fn text<F>(name: impl Into<String>, read: F) -> Self
    where
        F: Fn(&R) -> &str + Send + Sync + 'static,
    {
        Self::new(name, ValueKind::Ordered, move |r| {
            Value::Text(Cow::Borrowed(read(r)))
        })
    }

    /// Any ordered value; the variant is picked per record
    pub fn ordered<F>(name: impl Into<String>, read: F) -> Self
    where
        F: for<'r> Fn(&'r R) -> Value<'r> + Send + Sync + 'static,
    {
        Self::new(name, ValueKind::Ordered, read)
    }

    pub fn date<F>(name: impl Into<String>, read: F) -> Self
    where
        F: Fn(&R) -> NaiveDate + Send + Sync + 'static,
    {
        Self::new(name, ValueKind::Ordered, move |r| Value::Date(read(r)))
    }

    pub fn date_time<F>(name: impl Into<String>, read: F) -> Self
    where
        F: Fn(&R) -> NaiveDateTime + Send + Sync + 'static,
    {
        Self::new(name, ValueKind::Ordered, move |r| Value::DateTime(read(r)))
    }

    pub fn timestamp<F>(name: impl Into<String>, read: F) -> Self
    where
        F: Fn(&R) -> DateTime<Local> + Send + Sync + 'static,
    {
        Self::new(name, ValueKind::Ordered, move |r| Value::Timestamp(read(r)))
    }
}

impl<R> Accessor<R> for FieldAccessor<R> {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ValueKind {
        self.kind
    }

    fn get<'r>(&self, record: &'r R) -> Value<'r> {
        (self.read)(record)
    }
}

impl<R> Clone for FieldAccessor<R> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            kind: self.kind,
            read: Arc::clone(&self.read),
        }
    }
}

impl<R> fmt::Debug for FieldAccessor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldAccessor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Named accessors and coercers, keyed by field name.
///
/// A field needs an accessor to be queryable. A coercer is optional; without
/// one, literals for that field are compared as text.
pub struct Registry<R> {
    accessors: HashMap<String, Arc<dyn Accessor<R>>>,
    coercers: HashMap<String, Arc<dyn Coercer>>,
}

impl<R> Registry<R> {
    pub fn new(
        accessors: impl IntoIterator<Item = Arc<dyn Accessor<R>>>,
        coercers: impl IntoIterator<Item = Arc<dyn Coercer>>,
    ) -> Self {
        let mut builder = RegistryBuilder::default();
        for accessor in accessors {
            builder = builder.shared_accessor(accessor);
        }
        for coercer in coercers {
            builder = builder.shared_coercer(coercer);
        }
        builder.build()
    }

    pub fn builder() -> RegistryBuilder<R> {
        RegistryBuilder::default()
    }

    pub fn accessor(&self, name: &str) -> Option<&Arc<dyn Accessor<R>>> {
        self.accessors.get(name)
    }

    pub fn coercer(&self, name: &str) -> Option<&Arc<dyn Coercer>> {
        self.coercers.get(name)
    }

    /// Queryable field names, sorted
    pub fn field_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.accessors.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl<R> Default for Registry<R> {
    fn default() -> Self {
        Self {
            accessors: HashMap::new(),
            coercers: HashMap::new(),
        }
    }
}

impl<R> Clone for Registry<R> {
    fn clone(&self) -> Self {
        Self {
            accessors: self.accessors.clone(),
            coercers: self.coercers.clone(),
        }
    }
}

impl<R> fmt::Debug for Registry<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut coercers: Vec<&str> = self.coercers.keys().map(String::as_str).collect();
        coercers.sort_unstable();
        f.debug_struct("Registry")
            .field("accessors", &self.field_names())
            .field("coercers", &coercers)
            .finish()
    }
}

/// Builder for [`Registry`]; a later entry replaces an earlier one of the
/// same name
pub struct RegistryBuilder<R> {
    registry: Registry<R>,
}

impl<R> Default for RegistryBuilder<R> {
    fn default() -> Self {
        Self {
            registry: Registry::default(),
        }
    }
}

impl<R> RegistryBuilder<R> {
    pub fn accessor(self, accessor: impl Accessor<R> + 'static) -> Self {
        self.shared_accessor(Arc::new(accessor))
    }

    pub fn coercer(self, coercer: impl Coercer + 'static) -> Self {
        self.shared_coercer(Arc::new(coercer))
    }

    pub fn shared_accessor(mut self, accessor: Arc<dyn Accessor<R>>) -> Self {
        let name = accessor.name().to_string();
        if let Some(previous) = self.registry.accessors.insert(name, accessor) {
            log::warn!("accessor '{}' registered twice, keeping the last", previous.name());
        }
        self
    }

    pub fn shared_coercer(mut self, coercer: Arc<dyn Coercer>) -> Self {
        let name = coercer.name().to_string();
        if let Some(previous) = self.registry.coercers.insert(name, coercer) {
            log::warn!("coercer '{}' registered twice, keeping the last", previous.name());
        }
        self
    }

    pub fn build(self) -> Registry<R> {
        self.registry
    }
}
