//! Evolution controller: the policy layer over the schema state machine.
//!
//! Per batch the controller decides whether to evolve at all, whether to add
//! a reserved column or drop an active one, issues the DDL, and only then
//! commits the change to the [`SchemaState`]. Additions and drops are capped
//! by per-run budgets, and every structural change is appended to the log.
//!
//! ```text
//! evolve(batch)
//!   │
//!   ├─ should_evolve? ── no ──► NoChange
//!   │
//!   ├─ choose_action ── none ──► NotPossible
//!   │
//!   ├─ pick candidate ─ ALTER TABLE ─ commit ─ log
//!   │
//!   └─► Evolved { version, action, column }
//! ```

use crate::ddl;
use crate::error::{EngineError, SqlOperation};
use crate::schema::SchemaState;
use drift_core::{ConfigError, LookupError, RandomSource, SqlExecutor, TableRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

/// Knobs of the evolution policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionPolicy {
    /// Evolution is considered every `interval` batches
    pub interval: u64,
    /// Chance to evolve on an eligible batch
    pub probability: f64,
    /// Chance to add rather than drop when both are possible
    pub add_probability: f64,
    /// Budget of additions for the run
    pub max_additions: u32,
    /// Budget of drops for the run
    pub max_drops: u32,
}

impl Default for EvolutionPolicy {
    fn default() -> Self {
        Self {
            interval: 25,
            probability: 0.2,
            add_probability: 0.7,
            max_additions: 7,
            max_drops: 3,
        }
    }
}

impl EvolutionPolicy {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval == 0 {
            return Err(ConfigError::InvalidPolicy(
                "evolution interval must be at least 1".to_string(),
            ));
        }
        for (name, value) in [
            ("probability", self.probability),
            ("add_probability", self.add_probability),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidPolicy(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Kind of structural change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvolutionAction {
    Add,
    Drop,
}

impl EvolutionAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Drop => "drop",
        }
    }
}

impl fmt::Display for EvolutionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the evolution log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvolutionEvent {
    /// Schema version after the change
    pub version: u64,
    pub action: EvolutionAction,
    pub column: String,
}

impl fmt::Display for EvolutionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{} {} {}", self.version, self.action, self.column)
    }
}

/// Result of one `evolve` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvolutionOutcome {
    /// Not an evolution batch, or the probability draw said no
    NoChange,
    /// Evolution was due but no budget or candidate was left
    NotPossible,
    /// The schema changed
    Evolved(EvolutionEvent),
}

impl EvolutionOutcome {
    pub fn event(&self) -> Option<&EvolutionEvent> {
        match self {
            Self::Evolved(event) => Some(event),
            _ => None,
        }
    }
}

/// Snapshot of the controller for reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionSummary {
    pub version: u64,
    pub additions: u32,
    pub drops: u32,
    pub max_additions: u32,
    pub max_drops: u32,
    pub log: Vec<EvolutionEvent>,
}

/// Owns the schema state and applies the evolution policy to it.
pub struct EvolutionController {
    table: TableRef,
    state: SchemaState,
    policy: EvolutionPolicy,
    rng: Box<dyn RandomSource>,
    additions_performed: u32,
    drops_performed: u32,
    log: Vec<EvolutionEvent>,
}

impl EvolutionController {
    /// Create a controller for `table`. The policy is validated first.
    pub fn new(
        table: TableRef,
        state: SchemaState,
        policy: EvolutionPolicy,
        rng: Box<dyn RandomSource>,
    ) -> Result<Self, ConfigError> {
        policy.validate()?;
        Ok(Self {
            table,
            state,
            policy,
            rng,
            additions_performed: 0,
            drops_performed: 0,
            log: Vec::new(),
        })
    }

    pub fn table(&self) -> &TableRef {
        &self.table
    }

    /// Read-only view of the schema state.
    pub fn state(&self) -> &SchemaState {
        &self.state
    }

    pub fn policy(&self) -> &EvolutionPolicy {
        &self.policy
    }

    pub fn additions_performed(&self) -> u32 {
        self.additions_performed
    }

    pub fn drops_performed(&self) -> u32 {
        self.drops_performed
    }

    pub fn log(&self) -> &[EvolutionEvent] {
        &self.log
    }

    /// Whether `batch` is an evolution batch and the probability draw passes.
    ///
    /// The draw is only taken on interval batches.
    pub fn should_evolve(&mut self, batch: u64) -> bool {
        batch % self.policy.interval == 0 && self.rng.next_f64() < self.policy.probability
    }

    /// Pick the next action given the remaining budgets and candidates.
    ///
    /// A remaining budget without an eligible column counts as exhausted.
    pub fn choose_action(&mut self) -> Option<EvolutionAction> {
        let can_add = self.additions_performed < self.policy.max_additions
            && !self.state.promotion_candidates().is_empty();
        let can_drop = self.drops_performed < self.policy.max_drops
            && !self.state.demotion_candidates().is_empty();

        match (can_add, can_drop) {
            (true, false) => Some(EvolutionAction::Add),
            (false, true) => Some(EvolutionAction::Drop),
            (false, false) => None,
            (true, true) => {
                if self.rng.next_f64() < self.policy.add_probability {
                    Some(EvolutionAction::Add)
                } else {
                    Some(EvolutionAction::Drop)
                }
            }
        }
    }

    /// Run the policy for `batch`.
    ///
    /// The DDL is executed before the state changes; if it fails the error is
    /// returned and neither the schema nor the budgets are touched.
    pub async fn evolve(
        &mut self,
        batch: u64,
        executor: &dyn SqlExecutor,
    ) -> Result<EvolutionOutcome, EngineError> {
        if !self.should_evolve(batch) {
            return Ok(EvolutionOutcome::NoChange);
        }

        let Some(action) = self.choose_action() else {
            debug!(batch, "Evolution due but budgets or candidates are exhausted");
            return Ok(EvolutionOutcome::NotPossible);
        };

        let candidate = match action {
            EvolutionAction::Add => self.state.promotion_candidate(self.rng.as_mut()),
            EvolutionAction::Drop => self.state.demotion_candidate(self.rng.as_mut()),
        };
        let Some(column) = candidate else {
            return Ok(EvolutionOutcome::NotPossible);
        };

        let (statement, operation) = match action {
            EvolutionAction::Add => {
                let spec = self
                    .state
                    .catalog()
                    .get(&column)
                    .ok_or_else(|| LookupError::ColumnNotFound(column.clone()))?;
                (
                    ddl::add_column(executor.dialect(), &self.table, spec),
                    SqlOperation::AddColumn,
                )
            }
            EvolutionAction::Drop => (
                ddl::drop_column(&self.table, &column),
                SqlOperation::DropColumn,
            ),
        };

        debug!(sql = %statement.sql, "Applying schema change");
        executor
            .execute(&statement)
            .await
            .map_err(EngineError::sql(operation, Some(&column)))?;

        let committed = match action {
            EvolutionAction::Add => self.state.commit_promotion(&column),
            EvolutionAction::Drop => self.state.commit_demotion(&column),
        };
        let Some(version) = committed else {
            return Ok(EvolutionOutcome::NotPossible);
        };

        match action {
            EvolutionAction::Add => self.additions_performed += 1,
            EvolutionAction::Drop => self.drops_performed += 1,
        }

        let event = EvolutionEvent {
            version,
            action,
            column,
        };
        info!(
            table = %self.table,
            batch,
            version,
            action = %event.action,
            column = %event.column,
            "Schema evolved"
        );
        self.log.push(event.clone());

        Ok(EvolutionOutcome::Evolved(event))
    }

    pub fn summary(&self) -> EvolutionSummary {
        EvolutionSummary {
            version: self.state.version(),
            additions: self.additions_performed,
            drops: self.drops_performed,
            max_additions: self.policy.max_additions,
            max_drops: self.policy.max_drops,
            log: self.log.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingExecutor;
    use drift_core::{
        CatalogBuilder, ColumnSpec, DomainType, FirstChoiceRandom, ScriptedRandom, Value,
    };
    use drift_postgresql::PostgreSQLDialect;

    fn column(name: &str) -> ColumnSpec {
        ColumnSpec::new(name, DomainType::Text, || Ok(Value::Null)).unwrap()
    }

    fn state() -> SchemaState {
        let mut builder = CatalogBuilder::new();
        builder
            .register(column("id").protected(true))
            .register(column("name"))
            .register(column("age").reserved(true))
            .register(column("email").reserved(true));
        SchemaState::initialize(builder.build().unwrap())
    }

    fn controller(policy: EvolutionPolicy, rng: impl RandomSource + 'static) -> EvolutionController {
        EvolutionController::new(
            TableRef::new("public", "people"),
            state(),
            policy,
            Box::new(rng),
        )
        .unwrap()
    }

    fn always() -> EvolutionPolicy {
        EvolutionPolicy {
            interval: 1,
            probability: 1.0,
            add_probability: 1.0,
            max_additions: 2,
            max_drops: 1,
        }
    }

    #[test]
    fn test_default_policy() {
        let policy = EvolutionPolicy::default();
        assert_eq!(policy.interval, 25);
        assert_eq!(policy.probability, 0.2);
        assert_eq!(policy.add_probability, 0.7);
        assert_eq!(policy.max_additions, 7);
        assert_eq!(policy.max_drops, 3);
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn test_invalid_policies_rejected() {
        let zero_interval = EvolutionPolicy {
            interval: 0,
            ..Default::default()
        };
        assert!(matches!(
            zero_interval.validate(),
            Err(ConfigError::InvalidPolicy(_))
        ));

        let bad_probability = EvolutionPolicy {
            probability: 1.5,
            ..Default::default()
        };
        assert!(bad_probability.validate().is_err());

        let nan = EvolutionPolicy {
            add_probability: f64::NAN,
            ..Default::default()
        };
        assert!(nan.validate().is_err());
    }

    #[test]
    fn test_policy_from_partial_yaml() {
        let policy: EvolutionPolicy = serde_yaml::from_str("interval: 5\nmax_drops: 0").unwrap();
        assert_eq!(policy.interval, 5);
        assert_eq!(policy.max_drops, 0);
        assert_eq!(policy.max_additions, 7);
    }

    #[test]
    fn test_should_evolve_respects_interval() {
        let policy = EvolutionPolicy {
            interval: 5,
            probability: 1.0,
            ..Default::default()
        };
        let mut controller = controller(policy, FirstChoiceRandom::new());
        assert!(!controller.should_evolve(4));
        assert!(controller.should_evolve(5));
        assert!(controller.should_evolve(10));
        assert!(!controller.should_evolve(11));
    }

    #[test]
    fn test_should_evolve_draws_against_probability() {
        let policy = EvolutionPolicy {
            interval: 1,
            probability: 0.2,
            ..Default::default()
        };
        let mut controller = controller(policy, ScriptedRandom::new([0.1, 0.2, 0.9], []));
        assert!(controller.should_evolve(1));
        assert!(!controller.should_evolve(2));
        assert!(!controller.should_evolve(3));
    }

    #[test]
    fn test_choose_action_when_both_possible() {
        let policy = EvolutionPolicy {
            add_probability: 0.7,
            ..always()
        };
        let mut controller = controller(policy, ScriptedRandom::new([0.69, 0.7], []));
        assert_eq!(controller.choose_action(), Some(EvolutionAction::Add));
        assert_eq!(controller.choose_action(), Some(EvolutionAction::Drop));
    }

    #[test]
    fn test_choose_action_without_candidates() {
        let policy = EvolutionPolicy {
            max_drops: 0,
            ..always()
        };
        let mut controller = controller(policy, FirstChoiceRandom::new());
        controller.state.promote(&mut FirstChoiceRandom::new());
        controller.state.promote(&mut FirstChoiceRandom::new());
        // Additions budget left, but nothing in reserve
        assert_eq!(controller.choose_action(), None);
    }

    #[tokio::test]
    async fn test_evolve_issues_ddl_then_commits() {
        let executor = RecordingExecutor::new(PostgreSQLDialect);
        let mut controller = controller(always(), FirstChoiceRandom::new());

        let outcome = controller.evolve(1, &executor).await.unwrap();
        assert_eq!(
            outcome,
            EvolutionOutcome::Evolved(EvolutionEvent {
                version: 2,
                action: EvolutionAction::Add,
                column: "age".to_string(),
            })
        );
        assert_eq!(
            executor.executed_sql(),
            vec!["ALTER TABLE \"public\".\"people\" ADD COLUMN \"age\" TEXT"]
        );
        assert_eq!(controller.additions_performed(), 1);
    }

    #[tokio::test]
    async fn test_no_change_skips_ddl() {
        let executor = RecordingExecutor::new(PostgreSQLDialect);
        let policy = EvolutionPolicy {
            interval: 2,
            ..always()
        };
        let mut controller = controller(policy, FirstChoiceRandom::new());

        assert_eq!(
            controller.evolve(1, &executor).await.unwrap(),
            EvolutionOutcome::NoChange
        );
        assert!(executor.calls().is_empty());
        assert_eq!(controller.state().version(), 1);
    }

    #[tokio::test]
    async fn test_failed_ddl_leaves_state_untouched() {
        let executor = RecordingExecutor::new(PostgreSQLDialect);
        executor.fail_on("ADD COLUMN");
        let mut controller = controller(always(), FirstChoiceRandom::new());

        let err = controller.evolve(1, &executor).await.unwrap_err();
        assert!(matches!(
            err,
            EngineError::Sql {
                operation: SqlOperation::AddColumn,
                column: Some(ref c),
                ..
            } if c == "age"
        ));
        assert_eq!(controller.state().version(), 1);
        assert_eq!(controller.additions_performed(), 0);
        assert!(controller.log().is_empty());
        assert!(!controller.state().is_active("age"));
    }

    #[tokio::test]
    async fn test_summary_serializes() {
        let executor = RecordingExecutor::new(PostgreSQLDialect);
        let mut controller = controller(always(), FirstChoiceRandom::new());
        controller.evolve(1, &executor).await.unwrap();

        let json = serde_json::to_value(controller.summary()).unwrap();
        assert_eq!(json["version"], 2);
        assert_eq!(json["additions"], 1);
        assert_eq!(json["max_drops"], 1);
        assert_eq!(json["log"][0]["action"], "add");
        assert_eq!(json["log"][0]["column"], "age");
    }
}
