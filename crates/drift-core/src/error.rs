//! Error types shared by the schema-drift crates.

use thiserror::Error;

/// Invalid catalog, column or policy configuration.
///
/// Configuration errors are raised before any state is created.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Catalog contains no columns
    #[error("Column catalog is empty")]
    EmptyCatalog,

    /// Column name is not a usable SQL identifier
    #[error("Invalid column name '{name}': {reason}")]
    InvalidColumnName { name: String, reason: &'static str },

    /// Two catalog entries share a name
    #[error("Duplicate column '{0}' in catalog")]
    DuplicateColumn(String),

    /// A referenced column is not part of the catalog
    #[error("Column '{0}' is not defined in the catalog")]
    UnknownColumn(String),

    /// Evolution policy or simulation settings out of range
    #[error("Invalid policy: {0}")]
    InvalidPolicy(String),

    /// Generator configuration cannot produce values for its column
    #[error("Invalid generator for column '{column}': {reason}")]
    InvalidGenerator { column: String, reason: String },
}

/// A name lookup against the active schema failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// Column is not part of the active schema
    #[error("Column not found in active schema: {0}")]
    ColumnNotFound(String),

    /// A row handed to the engine lacks its primary-key value
    #[error("Row {row} has no value for primary key '{column}'")]
    MissingPrimaryKey { row: usize, column: String },
}

/// A column producer failed to produce a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ProducerError {
    message: String,
}

impl ProducerError {
    /// Create a producer error with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The failure message.
    pub fn message(&self) -> &str {
        &self.message
    }
}
