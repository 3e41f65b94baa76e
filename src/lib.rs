//! schema-drift: synthetic table traffic with an evolving column set.
//!
//! The binary reads a YAML simulation file (see [`config`]), connects to
//! PostgreSQL and runs the batch loop from [`drift_engine::Simulation`]:
//! rows are inserted, updated and deleted while columns are added and
//! dropped, so downstream replication or CDC consumers see realistic drift.

pub mod commands;
pub mod config;
pub mod logging;

pub use config::{SimulationConfig, SimulationParts, TableConfig};
pub use logging::mask_connection_password;
