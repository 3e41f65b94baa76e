//! Error types for the PostgreSQL executor.

use drift_core::SqlError;
use thiserror::Error;

/// Errors that can occur while connecting to or talking with PostgreSQL.
#[derive(Error, Debug)]
pub enum PostgreSQLError {
    /// PostgreSQL connection or query error.
    #[error("PostgreSQL error: {0}")]
    PostgreSQL(#[from] tokio_postgres::Error),

    /// Connection error.
    #[error("Connection error: {0}")]
    Connection(String),
}

impl From<PostgreSQLError> for SqlError {
    fn from(error: PostgreSQLError) -> Self {
        SqlError::backend(error)
    }
}
