//! PostgreSQL backend for the schema-drift simulator.
//!
//! This crate provides [`PostgreSQLExecutor`], an implementation of
//! [`drift_core::SqlExecutor`] over `tokio-postgres`, and
//! [`PostgreSQLDialect`], which maps domain types to PostgreSQL type names.
//!
//! # Example
//!
//! ```ignore
//! use drift_postgresql::PostgreSQLExecutor;
//!
//! let executor = PostgreSQLExecutor::connect(
//!     "host=localhost user=postgres password=postgres dbname=testdb",
//! ).await?;
//! ```

pub mod dialect;
pub mod error;
pub mod executor;
pub mod insert;
pub mod value;

pub use dialect::PostgreSQLDialect;
pub use error::PostgreSQLError;
pub use executor::PostgreSQLExecutor;
pub use value::PostgreSQLValue;
