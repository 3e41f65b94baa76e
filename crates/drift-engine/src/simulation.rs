//! Simulation runner: a fixed number of batch cycles against one table.
//!
//! Each batch runs the same steps in the same order for the whole run:
//!
//! ```text
//! for batch in 1..=total_records / batch_size:
//!     evolve(batch)          (if enabled)
//!     generate(batch_size)   (current active schema)
//!     insert
//!     maybe mutate
//! ```

use crate::batch::BatchGenerator;
use crate::ddl;
use crate::error::{EngineError, SimulationError, SqlOperation};
use crate::evolution::{EvolutionController, EvolutionSummary};
use crate::mutation::{MutationCounters, MutationExecutor};
use drift_core::{ConfigError, SqlExecutor};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Size of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationSettings {
    pub total_records: u64,
    pub batch_size: u64,
    pub evolution_enabled: bool,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            total_records: 10_000,
            batch_size: 500,
            evolution_enabled: true,
        }
    }
}

impl SimulationSettings {
    /// Number of whole batches; a trailing partial batch is not run.
    pub fn batches(&self) -> u64 {
        if self.batch_size == 0 {
            0
        } else {
            self.total_records / self.batch_size
        }
    }
}

/// Final state of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub table: String,
    pub batches: u64,
    pub counters: MutationCounters,
    pub evolution: EvolutionSummary,
    pub active_columns: Vec<String>,
}

/// Drives the controller and the mutation executor over one executor.
pub struct Simulation<E> {
    executor: E,
    controller: EvolutionController,
    mutator: MutationExecutor,
    settings: SimulationSettings,
}

impl<E: SqlExecutor> Simulation<E> {
    /// Assemble a simulation.
    ///
    /// Both components must target the same table, and the mutation key
    /// columns must be valid for the controller's catalog.
    pub fn new(
        executor: E,
        controller: EvolutionController,
        mutator: MutationExecutor,
        settings: SimulationSettings,
    ) -> Result<Self, ConfigError> {
        if controller.table() != &mutator.config().table {
            return Err(ConfigError::InvalidPolicy(format!(
                "evolution targets {} but mutations target {}",
                controller.table(),
                mutator.config().table
            )));
        }
        mutator.config().validate(controller.state().catalog())?;

        Ok(Self {
            executor,
            controller,
            mutator,
            settings,
        })
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn controller(&self) -> &EvolutionController {
        &self.controller
    }

    pub fn counters(&self) -> MutationCounters {
        self.mutator.counters()
    }

    pub fn settings(&self) -> &SimulationSettings {
        &self.settings
    }

    /// Create the table from the current active schema, dropping any
    /// existing table first when `recreate` is set.
    pub async fn prepare_table(&self, recreate: bool) -> Result<(), SimulationError> {
        let table = self.controller.table();
        let executor: &dyn SqlExecutor = &self.executor;

        if recreate {
            info!(table = %table, "Dropping table");
            executor
                .execute(&ddl::drop_table(table))
                .await
                .map_err(EngineError::sql(SqlOperation::DropTable, None))
                .map_err(SimulationError::Setup)?;
        }

        let statement = ddl::create_table(
            executor.dialect(),
            table,
            self.controller.state().active(),
        );
        info!(table = %table, "Creating table");
        debug!(sql = %statement.sql, "DDL");
        executor
            .execute(&statement)
            .await
            .map_err(EngineError::sql(SqlOperation::CreateTable, None))
            .map_err(SimulationError::Setup)?;
        Ok(())
    }

    /// Run every batch, stopping at the first failure.
    pub async fn run(&mut self) -> Result<SimulationReport, SimulationError> {
        let batches = self.settings.batches();
        info!(
            table = %self.controller.table(),
            batches,
            batch_size = self.settings.batch_size,
            evolution = self.settings.evolution_enabled,
            "Starting simulation"
        );

        for batch in 1..=batches {
            self.run_batch(batch)
                .await
                .map_err(|source| SimulationError::Batch { batch, source })?;
        }

        let report = self.report(batches);
        info!(
            inserts = report.counters.total_inserts,
            updates = report.counters.total_updates,
            deletes = report.counters.total_deletes,
            version = report.evolution.version,
            changes = report.evolution.log.len(),
            "Simulation complete"
        );
        Ok(report)
    }

    /// One batch cycle: evolve, generate, insert, mutate.
    pub async fn run_batch(&mut self, batch: u64) -> Result<(), EngineError> {
        let executor: &dyn SqlExecutor = &self.executor;

        if self.settings.evolution_enabled {
            self.controller.evolve(batch, executor).await?;
        }

        let generator = BatchGenerator::new(self.controller.state());
        let rows = generator.generate_batch(self.settings.batch_size as usize)?;
        let ids = self
            .mutator
            .insert_batch(executor, generator.schema(), &rows)
            .await?;
        let (updated, deleted) = self
            .mutator
            .maybe_mutate_batch(executor, &ids, &generator)
            .await?;

        debug!(
            batch,
            version = generator.schema().version(),
            inserted = ids.len(),
            updated,
            deleted,
            "Batch complete"
        );
        Ok(())
    }

    pub fn report(&self, batches: u64) -> SimulationReport {
        SimulationReport {
            table: self.controller.table().to_string(),
            batches,
            counters: self.mutator.counters(),
            evolution: self.controller.summary(),
            active_columns: self
                .controller
                .state()
                .active_names()
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}
