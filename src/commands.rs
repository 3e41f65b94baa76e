//! Command handlers behind the CLI.

use anyhow::Context;
use drift_core::SqlExecutor;
use drift_engine::{ddl, Simulation, SimulationReport};
use drift_postgresql::{PostgreSQLDialect, PostgreSQLExecutor};
use tracing::info;

use crate::config::SimulationConfig;
use crate::logging::mask_connection_password;

/// Connect, create the table and run every batch.
pub async fn run_simulation(
    config: &SimulationConfig,
    connection_string: &str,
    recreate: bool,
) -> anyhow::Result<SimulationReport> {
    // Fail on a bad config before opening a connection.
    config.build()?;

    info!(
        "Connecting to PostgreSQL: {}",
        mask_connection_password(connection_string)
    );
    let executor = PostgreSQLExecutor::connect(connection_string)
        .await
        .context("Failed to connect to PostgreSQL")?;

    run_with_executor(executor, config, recreate).await
}

/// Run a configured simulation over any executor.
pub async fn run_with_executor<E: SqlExecutor>(
    executor: E,
    config: &SimulationConfig,
    recreate: bool,
) -> anyhow::Result<SimulationReport> {
    let parts = config.build()?;
    let mut simulation = Simulation::new(executor, parts.controller, parts.mutator, parts.settings)
        .context("Failed to assemble simulation")?;

    simulation
        .prepare_table(recreate)
        .await
        .with_context(|| format!("Failed to prepare table {}", config.table_ref()))?;

    simulation
        .run()
        .await
        .with_context(|| format!("Simulation on {} failed", config.table_ref()))
}

/// Validate a configuration without touching a database.
pub fn dry_run(config: &SimulationConfig) -> anyhow::Result<()> {
    let parts = config.build()?;
    let state = parts.controller.state();
    info!("[DRY-RUN] Table: {}", config.table_ref());
    info!(
        "[DRY-RUN] Would run {} batches of {} rows (seed={})",
        parts.settings.batches(),
        parts.settings.batch_size,
        config.seed
    );
    info!("[DRY-RUN] Initial columns: {:?}", state.active_names());
    info!(
        "[DRY-RUN] Reserved columns: {:?}",
        state.promotion_candidates()
    );
    info!("[DRY-RUN] Config validated successfully");
    Ok(())
}

/// `CREATE TABLE` for the initial active schema.
pub fn create_table_sql(config: &SimulationConfig) -> anyhow::Result<String> {
    let parts = config.build()?;
    let statement = ddl::create_table(
        &PostgreSQLDialect,
        parts.controller.table(),
        parts.controller.state().active(),
    );
    Ok(statement.sql)
}
