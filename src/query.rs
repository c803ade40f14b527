//! Compiling query text into reusable record predicates

use std::fmt;

use crate::{
    accessor::Registry,
    error::QueryError,
    expr::Expr,
    parser::{Binder, Node, QueryParseError, RawParser},
    predicate::Comparison,
};

/// Compiles query text against a fixed [`Registry`].
///
/// ```
/// use sift::{FieldAccessor, LiteralCoercer, QueryParser, Registry};
///
/// struct User {
///     age: i32,
///     status: String,
/// }
///
/// let registry = Registry::builder()
///     .accessor(FieldAccessor::int("age", |u: &User| u.age))
///     .coercer(LiteralCoercer::int("age"))
///     .accessor(FieldAccessor::text("status", |u: &User| u.status.as_str()))
///     .build();
///
/// let query = QueryParser::new(registry)
///     .parse("age >= 18 && status ∈ [active, trial]")
///     .unwrap();
///
/// let user = User { age: 30, status: "trial".to_string() };
/// assert!(query.test(&user).unwrap());
/// ```
pub struct QueryParser<R> {
    registry: Registry<R>,
}

impl<R> QueryParser<R> {
    pub fn new(registry: Registry<R>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Registry<R> {
        &self.registry
    }

    /// Parse and bind query text.
    ///
    /// Only structural problems fail here. Malformed literals are reported by
    /// [`Query::test`].
    pub fn parse(&self, text: &str) -> Result<Query<R>, QueryParseError> {
        let node = RawParser::parse_node(text)?;
        let query = self.bind(node).map_err(|e| e.with_source(text))?;
        log::debug!("parsed query: {}", query);
        Ok(query)
    }

    /// Bind an AST produced elsewhere, such as a deserialized [`Node`]
    pub fn bind(&self, node: Node) -> Result<Query<R>, QueryParseError> {
        Binder::bind(node, &self.registry).map(|expr| Query { expr })
    }
}

impl<R> Clone for QueryParser<R> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
        }
    }
}

impl<R> fmt::Debug for QueryParser<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryParser")
            .field("registry", &self.registry)
            .finish()
    }
}

/// A compiled query; cheap to test against many records
pub struct Query<R> {
    expr: Expr<Comparison<R>>,
}

impl<R> Query<R> {
    /// Evaluate against one record, short-circuiting left to right
    pub fn test(&self, record: &R) -> Result<bool, QueryError> {
        self.expr.evaluate(&|comparison: &Comparison<R>| comparison.test(record))
    }

    pub fn expr(&self) -> &Expr<Comparison<R>> {
        &self.expr
    }

    /// Matching records in input order; stops at the first evaluation error
    pub fn filter<'r, I>(&self, records: I) -> Result<Vec<&'r R>, QueryError>
    where
        I: IntoIterator<Item = &'r R>,
    {
        let mut matched = Vec::new();
        for record in records {
            if self.test(record)? {
                matched.push(record);
            }
        }
        Ok(matched)
    }

    pub fn count<'r, I>(&self, records: I) -> Result<usize, QueryError>
    where
        R: 'r,
        I: IntoIterator<Item = &'r R>,
    {
        let mut count = 0;
        for record in records {
            if self.test(record)? {
                count += 1;
            }
        }
        Ok(count)
    }
}

impl<R> Clone for Query<R> {
    fn clone(&self) -> Self {
        Self {
            expr: self.expr.clone(),
        }
    }
}

impl<R> fmt::Debug for Query<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query").field("expr", &self.expr).finish()
    }
}

impl<R> fmt::Display for Query<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expr)
    }
}
