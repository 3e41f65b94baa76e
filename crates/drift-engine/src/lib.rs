//! Schema evolution and mutation engine.
//!
//! This crate holds the parts of schema-drift with real invariants:
//!
//! - [`SchemaState`] - which catalog columns are live, the version counter and
//!   the per-version history of active columns
//! - [`EvolutionController`] - decides per batch whether to add or drop a
//!   column, within budgets, and issues the DDL
//! - [`BatchGenerator`] - rows matching the active schema at call time
//! - [`MutationExecutor`] - bulk inserts plus random updates and deletes
//! - [`Simulation`] - the batch loop tying them together
//!
//! # Architecture
//!
//! ```text
//!                 ┌──────────────────────┐
//!                 │ EvolutionController  │── ALTER TABLE ──┐
//!                 │   owns SchemaState   │                 │
//!                 └──────────┬───────────┘                 │
//!                            │ &SchemaState                ▼
//!                 ┌──────────▼───────────┐         ┌──────────────┐
//!                 │    BatchGenerator    │         │ SqlExecutor  │
//!                 └──────────┬───────────┘         └──────────────┘
//!                            │ rows                        ▲
//!                 ┌──────────▼───────────┐                 │
//!                 │   MutationExecutor   │── INSERT/UPDATE/DELETE
//!                 └──────────────────────┘
//! ```

pub mod batch;
pub mod ddl;
pub mod error;
pub mod evolution;
pub mod mutation;
pub mod schema;
pub mod simulation;
pub mod testing;

// Re-exports for convenience
pub use batch::BatchGenerator;
pub use error::{EngineError, SimulationError, SqlOperation};
pub use evolution::{
    EvolutionAction, EvolutionController, EvolutionEvent, EvolutionOutcome, EvolutionPolicy,
    EvolutionSummary,
};
pub use mutation::{MutationConfig, MutationCounters, MutationExecutor};
pub use schema::{ColumnStatus, SchemaState};
pub use simulation::{Simulation, SimulationReport, SimulationSettings};
