//! Boundary to the SQL execution surface.
//!
//! The engine never talks to a database driver directly. It builds statement
//! text with a [`SqlDialect`] and hands it to a [`SqlExecutor`]. Each executor
//! call is its own commit scope.

use crate::types::DomainType;
use crate::values::{TypedValue, Value};
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// Schema-qualified table name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    pub schema: String,
    pub name: String,
}

impl TableRef {
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
        }
    }

    /// Quoted `"schema"."table"` form.
    pub fn qualified(&self) -> String {
        format!(
            "{}.{}",
            quote_identifier(&self.schema),
            quote_identifier(&self.name)
        )
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.name)
    }
}

/// Quote an identifier, doubling embedded quotes.
pub fn quote_identifier(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Column name and type bound to a bulk-insert position.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnBinding {
    pub name: String,
    pub domain_type: DomainType,
}

impl ColumnBinding {
    pub fn new(name: impl Into<String>, domain_type: DomainType) -> Self {
        Self {
            name: name.into(),
            domain_type,
        }
    }
}

/// A parameterized statement. Placeholders are `$1..$n` in `params` order.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<TypedValue>,
}

impl Statement {
    /// A statement without parameters (DDL).
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    pub fn with_params(sql: impl Into<String>, params: Vec<TypedValue>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }
}

/// Errors reported by a SQL executor.
#[derive(Debug, Error)]
pub enum SqlError {
    /// The underlying driver or server rejected the call
    #[error("Database error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A value cannot be bound as a parameter of the given type
    #[error("Cannot bind {value} as {domain_type}")]
    UnsupportedValue { domain_type: DomainType, value: Value },

    /// The executor refused the statement
    #[error("Statement rejected: {0}")]
    Rejected(String),
}

impl SqlError {
    /// Wrap a driver error.
    pub fn backend<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend(Box::new(error))
    }
}

/// Type naming rules of a SQL dialect.
pub trait SqlDialect: Send + Sync {
    /// Native type name used in DDL.
    fn type_name(&self, domain_type: &DomainType) -> String;

    /// Cast suffix needed when an array of `element` values is bound for a
    /// set-membership test (`= ANY($1::uuid[])`), or `None` if the untyped
    /// parameter is enough.
    fn array_cast(&self, element: &DomainType) -> Option<String>;
}

/// The SQL execution surface consumed by the engine.
///
/// Every method commits independently; a failed call leaves nothing behind.
#[async_trait]
pub trait SqlExecutor: Send + Sync {
    /// Dialect used to render statements for this executor.
    fn dialect(&self) -> &dyn SqlDialect;

    /// Execute one statement and return the affected row count.
    async fn execute(&self, statement: &Statement) -> Result<u64, SqlError>;

    /// Execute statements in order inside one transaction.
    async fn execute_in_transaction(&self, statements: &[Statement]) -> Result<u64, SqlError>;

    /// Insert all `rows` into `table` as one all-or-nothing write.
    ///
    /// Each row holds one value per entry of `columns`, in the same order.
    async fn bulk_insert(
        &self,
        table: &TableRef,
        columns: &[ColumnBinding],
        rows: &[Vec<Value>],
    ) -> Result<u64, SqlError>;
}
