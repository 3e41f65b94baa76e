//! Batch generation against the current active schema.

use crate::error::EngineError;
use crate::schema::SchemaState;
use drift_core::{LookupError, Row, Value};
use std::collections::HashSet;

/// Produces rows for whatever the active schema is at call time.
///
/// The generator borrows the schema state, so it cannot outlive a structural
/// change: build a new one after every `evolve`.
#[derive(Debug, Clone, Copy)]
pub struct BatchGenerator<'a> {
    schema: &'a SchemaState,
}

impl<'a> BatchGenerator<'a> {
    pub fn new(schema: &'a SchemaState) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &'a SchemaState {
        self.schema
    }

    /// Generate `n` rows, each with exactly the active column names.
    ///
    /// Every value is a fresh producer call. The first producer failure aborts
    /// the batch.
    pub fn generate_batch(&self, n: usize) -> Result<Vec<Row>, EngineError> {
        (0..n).map(|_| self.generate_row()).collect()
    }

    /// Generate one row over the active schema.
    pub fn generate_row(&self) -> Result<Row, EngineError> {
        let mut row = Row::with_capacity(self.schema.active_len());
        for column in self.schema.active() {
            let value = column.produce().map_err(|source| EngineError::Producer {
                column: column.name().to_string(),
                source,
            })?;
            row.push(column.name(), value);
        }
        Ok(row)
    }

    /// Generate a value for one active column.
    pub fn generate_value(&self, name: &str) -> Result<Value, EngineError> {
        let column = self
            .schema
            .column(name)
            .ok_or_else(|| LookupError::ColumnNotFound(name.to_string()))?;
        column.produce().map_err(|source| EngineError::Producer {
            column: name.to_string(),
            source,
        })
    }

    /// Active columns that may be picked for random updates, in active order.
    ///
    /// Protected columns, reserved columns and the `exclude`d names are left
    /// out. A reserved column stays unmodifiable after it is promoted.
    pub fn modifiable_columns(&self, exclude: &HashSet<&str>) -> Vec<&'a str> {
        self.schema
            .active()
            .filter(|column| !column.is_protected() && !column.is_reserved())
            .map(|column| column.name())
            .filter(|name| !exclude.contains(name))
            .collect()
    }
}
