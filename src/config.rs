//! Simulation configuration file.
//!
//! A simulation is described by one YAML document:
//!
//! ```yaml
//! table:
//!   schema: public
//!   name: sales
//!   primary_key: id
//!   audit_column: updated_at
//! seed: 42
//! total_records: 10000
//! batch_size: 500
//! evolution:
//!   interval: 25
//!   probability: 0.2
//! columns:
//!   - name: id
//!     type: uuid
//!     generator: { type: uuid_v4 }
//!     constraints: PRIMARY KEY
//!     protected: true
//! ```

use anyhow::Context;
use drift_core::{validate_identifier, Catalog, SeededRandom, TableRef};
use drift_engine::{
    EvolutionController, EvolutionPolicy, MutationConfig, MutationExecutor, SchemaState,
    SimulationSettings,
};
use drift_generator::{build_catalog, ColumnDefinition};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Offsets keeping the engine's random streams apart from the column producers'.
const EVOLUTION_SEED_OFFSET: u64 = 0x5eed_0002;
const MUTATION_SEED_OFFSET: u64 = 0x5eed_0001;

/// Target table and its key columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableConfig {
    #[serde(default = "default_schema")]
    pub schema: String,
    pub name: String,
    pub primary_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audit_column: Option<String>,
}

fn default_schema() -> String {
    "public".to_string()
}

fn default_seed() -> u64 {
    42
}

fn default_total_records() -> u64 {
    SimulationSettings::default().total_records
}

fn default_batch_size() -> u64 {
    SimulationSettings::default().batch_size
}

fn default_true() -> bool {
    true
}

/// Complete description of one simulation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub table: TableConfig,

    /// Seed for every producer and engine decision
    #[serde(default = "default_seed")]
    pub seed: u64,

    #[serde(default = "default_total_records")]
    pub total_records: u64,

    #[serde(default = "default_batch_size")]
    pub batch_size: u64,

    #[serde(default = "default_true")]
    pub evolution_enabled: bool,

    #[serde(default)]
    pub evolution: EvolutionPolicy,

    pub columns: Vec<ColumnDefinition>,
}

/// Everything a run needs, built from a [`SimulationConfig`].
pub struct SimulationParts {
    pub controller: EvolutionController,
    pub mutator: MutationExecutor,
    pub settings: SimulationSettings,
}

impl SimulationConfig {
    /// Load a configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Parse a configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn table_ref(&self) -> TableRef {
        TableRef::new(self.table.schema.clone(), self.table.name.clone())
    }

    pub fn settings(&self) -> SimulationSettings {
        SimulationSettings {
            total_records: self.total_records,
            batch_size: self.batch_size,
            evolution_enabled: self.evolution_enabled,
        }
    }

    pub fn mutation_config(&self) -> MutationConfig {
        let config = MutationConfig::new(self.table_ref(), self.table.primary_key.clone());
        match &self.table.audit_column {
            Some(column) => config.with_audit_column(column.clone()),
            None => config,
        }
    }

    /// Build the column catalog with producers seeded from `seed`.
    pub fn catalog(&self) -> anyhow::Result<Catalog> {
        validate_identifier(&self.table.schema).context("Invalid table schema")?;
        validate_identifier(&self.table.name).context("Invalid table name")?;
        build_catalog(&self.columns, self.seed).context("Invalid column definitions")
    }

    fn evolution_seed(&self) -> u64 {
        self.seed.wrapping_add(EVOLUTION_SEED_OFFSET)
    }

    fn mutation_seed(&self) -> u64 {
        self.seed.wrapping_add(MUTATION_SEED_OFFSET)
    }

    /// Build and validate the controller and mutation executor.
    pub fn build(&self) -> anyhow::Result<SimulationParts> {
        let catalog = self.catalog()?;
        let mutation_config = self.mutation_config();
        mutation_config
            .validate(&catalog)
            .context("Invalid table keys")?;

        let controller = EvolutionController::new(
            self.table_ref(),
            SchemaState::initialize(catalog),
            self.evolution.clone(),
            Box::new(SeededRandom::new(self.evolution_seed())),
        )
        .context("Invalid evolution policy")?;

        let mutator = MutationExecutor::new(
            mutation_config,
            Box::new(SeededRandom::new(self.mutation_seed())),
        );

        Ok(SimulationParts {
            controller,
            mutator,
            settings: self.settings(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
table:
  name: sales
  primary_key: id
columns:
  - name: id
    type: uuid
    generator: { type: uuid_v4 }
    constraints: PRIMARY KEY
    protected: true
  - name: item
    type: text
    generator: { type: one_of, values: [widget, gadget] }
"#;

    #[test]
    fn test_defaults() {
        let config = SimulationConfig::from_yaml(MINIMAL).unwrap();
        assert_eq!(config.table.schema, "public");
        assert_eq!(config.seed, 42);
        assert_eq!(config.total_records, 10_000);
        assert_eq!(config.batch_size, 500);
        assert!(config.evolution_enabled);
        assert_eq!(config.evolution, EvolutionPolicy::default());
        assert_eq!(config.settings().batches(), 20);
        assert_eq!(config.table_ref().qualified(), "\"public\".\"sales\"");
    }

    #[test]
    fn test_build_parts() {
        let config = SimulationConfig::from_yaml(MINIMAL).unwrap();
        let parts = config.build().unwrap();
        assert_eq!(parts.controller.state().active_names(), vec!["id", "item"]);
        assert_eq!(parts.controller.state().version(), 1);
        assert_eq!(parts.mutator.config().primary_key, "id");
    }

    #[test]
    fn test_engine_seeds_differ_from_column_seeds() {
        let config = SimulationConfig::from_yaml(MINIMAL).unwrap();
        let engine = [config.evolution_seed(), config.mutation_seed()];
        assert_ne!(engine[0], engine[1]);
        for position in 0..config.columns.len() {
            let column = drift_generator::column_seed(config.seed, position);
            assert!(!engine.contains(&column), "column {position} shares an engine seed");
        }
    }

    #[test]
    fn test_partial_policy_keeps_other_defaults() {
        let yaml = format!("{MINIMAL}evolution:\n  interval: 5\n");
        let config = SimulationConfig::from_yaml(&yaml).unwrap();
        assert_eq!(config.evolution.interval, 5);
        assert_eq!(config.evolution.max_additions, 7);
    }

    #[test]
    fn test_unknown_primary_key_rejected() {
        let yaml = MINIMAL.replace("primary_key: id", "primary_key: order_id");
        let config = SimulationConfig::from_yaml(&yaml).unwrap();
        assert!(config.build().is_err());
    }

    #[test]
    fn test_invalid_policy_rejected() {
        let yaml = format!("{MINIMAL}evolution:\n  interval: 0\n");
        let config = SimulationConfig::from_yaml(&yaml).unwrap();
        let err = config.build().err().unwrap();
        assert!(format!("{err:#}").contains("interval"));
    }

    #[test]
    fn test_invalid_table_name_rejected() {
        let yaml = MINIMAL.replace("name: sales", "name: \"sales; drop\"");
        let config = SimulationConfig::from_yaml(&yaml).unwrap();
        assert!(config.build().is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sim.yaml");
        fs::write(&path, MINIMAL).unwrap();
        let config = SimulationConfig::from_file(&path).unwrap();
        assert_eq!(config.columns.len(), 2);

        let err = SimulationConfig::from_file(dir.path().join("missing.yaml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
