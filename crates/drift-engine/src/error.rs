//! Error types for the drift engine.

use drift_core::{ConfigError, LookupError, ProducerError, SqlError};
use std::fmt;
use thiserror::Error;

/// Statement class of a failed SQL call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlOperation {
    CreateTable,
    DropTable,
    AddColumn,
    DropColumn,
    Insert,
    Update,
    Delete,
}

impl SqlOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateTable => "create table",
            Self::DropTable => "drop table",
            Self::AddColumn => "add column",
            Self::DropColumn => "drop column",
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for SqlOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by the schema state machine, batch generator, mutation
/// executor and evolution controller.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Invalid configuration
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Column or primary-key lookup failed
    #[error(transparent)]
    Lookup(#[from] LookupError),

    /// A column producer failed
    #[error("Producer for column '{column}' failed: {source}")]
    Producer {
        column: String,
        #[source]
        source: ProducerError,
    },

    /// A SQL call failed
    #[error("{operation} failed{}: {source}", column_suffix(.column))]
    Sql {
        operation: SqlOperation,
        column: Option<String>,
        #[source]
        source: SqlError,
    },
}

fn column_suffix(column: &Option<String>) -> String {
    match column {
        Some(column) => format!(" for column '{column}'"),
        None => String::new(),
    }
}

impl EngineError {
    /// Build a closure that wraps a [`SqlError`] for `operation`.
    pub(crate) fn sql(
        operation: SqlOperation,
        column: Option<&str>,
    ) -> impl FnOnce(SqlError) -> EngineError {
        let column = column.map(str::to_string);
        move |source| EngineError::Sql {
            operation,
            column,
            source,
        }
    }

    /// The failed statement class, if this is a SQL error.
    pub fn operation(&self) -> Option<SqlOperation> {
        match self {
            Self::Sql { operation, .. } => Some(*operation),
            _ => None,
        }
    }
}

/// Errors raised by a simulation run.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// Invalid simulation settings
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Creating or dropping the table failed
    #[error("Table setup failed: {0}")]
    Setup(#[source] EngineError),

    /// A batch cycle failed
    #[error("Batch {batch} failed: {source}")]
    Batch {
        batch: u64,
        #[source]
        source: EngineError,
    },
}

impl SimulationError {
    /// Index of the failed batch, if the failure happened inside a batch.
    pub fn batch(&self) -> Option<u64> {
        match self {
            Self::Batch { batch, .. } => Some(*batch),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_error_names_operation_and_column() {
        let err = EngineError::sql(SqlOperation::AddColumn, Some("coupon"))(SqlError::Rejected(
            "permission denied".to_string(),
        ));
        assert_eq!(
            err.to_string(),
            "add column failed for column 'coupon': Statement rejected: permission denied"
        );
        assert_eq!(err.operation(), Some(SqlOperation::AddColumn));
    }

    #[test]
    fn test_sql_error_without_column() {
        let err = EngineError::sql(SqlOperation::Insert, None)(SqlError::Rejected("x".into()));
        assert_eq!(err.to_string(), "insert failed: Statement rejected: x");
    }

    #[test]
    fn test_batch_error_carries_index() {
        let err = SimulationError::Batch {
            batch: 7,
            source: EngineError::Lookup(LookupError::ColumnNotFound("age".into())),
        };
        assert_eq!(err.batch(), Some(7));
        assert_eq!(
            err.to_string(),
            "Batch 7 failed: Column not found in active schema: age"
        );
    }
}
