//! Column value producers for the schema-drift simulation engine.
//!
//! This crate turns declarative column definitions from a YAML simulation file
//! into [`drift_core::ColumnSpec`]s whose producers generate deterministic
//! values. Every column gets its own seeded RNG derived from the run seed and
//! the column's catalog position.
//!
//! # Architecture
//!
//! ```text
//! columns: (YAML)
//!        │
//!        ▼
//! ┌──────────────────┐
//! │ ColumnDefinition │ name, type, generator, flags
//! └────────┬─────────┘
//!          │ build_producer(seed)
//!          ▼
//! ┌──────────────────┐
//! │     Producer     │ StdRng + call index
//! └────────┬─────────┘
//!          │
//!          ▼
//!    ColumnSpec ──► Catalog
//! ```
//!
//! # Example
//!
//! ```rust
//! use drift_generator::{build_catalog, ColumnDefinition};
//!
//! let columns: Vec<ColumnDefinition> = serde_yaml::from_str(r#"
//! - name: id
//!   type: big_int
//!   generator: { type: sequential, start: 1 }
//!   constraints: PRIMARY KEY
//!   protected: true
//! - name: email
//!   type: text
//!   generator: { type: pattern, pattern: "user_{index}@example.com" }
//!   reserved: true
//! "#).unwrap();
//!
//! let catalog = build_catalog(&columns, 42).unwrap();
//! let email = catalog.get("email").unwrap();
//! assert_eq!(email.produce().unwrap().to_string(), "user_0@example.com");
//! ```
//!
//! # Generators
//!
//! The following generator types are supported:
//!
//! - `uuid_v4` - Random UUID v4
//! - `sequential` - Sequential integers
//! - `pattern` - Pattern strings with placeholders (`{index}`, `{uuid}`, `{rand:N}`)
//! - `int_range` - Random integers in a range
//! - `float_range` - Random floats in a range
//! - `decimal_range` - Random decimals in a range
//! - `timestamp_range` - Random timestamps in a date range
//! - `timestamp_now` - Current time
//! - `weighted_bool` - Boolean with configurable true probability
//! - `one_of` - Random selection from a list
//! - `static` - Static value
//! - `null` - Null value

pub mod config;
pub mod definition;
pub mod generators;
pub mod producer;

// Re-exports for convenience
pub use config::GeneratorConfig;
pub use definition::{build_catalog, ColumnDefinition};
pub use producer::{build_producer, column_seed};
