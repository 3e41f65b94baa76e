//! Core types for the schema-drift simulation engine.
//!
//! This crate provides the foundational types shared by every schema-drift
//! crate:
//!
//! - [`DomainType`] - semantic column type, mapped to native SQL types by dialects
//! - [`Value`] / [`TypedValue`] / [`Row`] - runtime values produced by columns
//! - [`ColumnSpec`] - immutable column description with its value producer
//! - [`Catalog`] / [`CatalogBuilder`] - the ordered set of known columns
//! - [`RandomSource`] - injected randomness for every engine decision
//! - [`SqlExecutor`] / [`SqlDialect`] - the boundary to the database
//!
//! # Architecture
//!
//! ```text
//! drift-core (this crate)
//!    │
//!    ├─── drift-generator   (builds producers from YAML generator configs)
//!    ├─── drift-postgresql  (implements SqlExecutor / SqlDialect for PostgreSQL)
//!    │
//!    └─── drift-engine      (schema state machine, evolution, batches, mutations)
//! ```

pub mod catalog;
pub mod column;
pub mod error;
pub mod random;
pub mod sql;
pub mod types;
pub mod values;

// Re-exports for convenience
pub use catalog::{Catalog, CatalogBuilder};
pub use column::{validate_identifier, ColumnSpec, Producer};
pub use error::{ConfigError, LookupError, ProducerError};
pub use random::{choose, FirstChoiceRandom, RandomSource, ScriptedRandom, SeededRandom};
pub use sql::{
    quote_identifier, ColumnBinding, SqlDialect, SqlError, SqlExecutor, Statement, TableRef,
};
pub use types::DomainType;
pub use values::{Row, TypedValue, Value};
