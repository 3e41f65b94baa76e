//! Mutation executor: inserts generated batches and randomly perturbs a
//! subset of the rows it just inserted.
//!
//! ```text
//! insert_batch(rows) ──► bulk insert ──► primary keys
//!                                            │
//! maybe_mutate_batch(ids) ◄──────────────────┘
//!   │ draw > 0.5 ──► (0, 0)
//!   │ sample max(1, len/4) ids
//!   ├─ update: one random modifiable column per row (+ audit column), one transaction
//!   └─ delete: DELETE ... WHERE pk = ANY($1)
//! ```

use crate::batch::BatchGenerator;
use crate::ddl;
use crate::error::{EngineError, SqlOperation};
use crate::schema::SchemaState;
use chrono::Utc;
use drift_core::{
    Catalog, ColumnBinding, ColumnSpec, ConfigError, LookupError, RandomSource, Row,
    SqlExecutor, TableRef, TypedValue, Value,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// Draws above this leave a batch untouched.
const MUTATION_SKIP_THRESHOLD: f64 = 0.5;

/// Fraction of a batch picked for mutation (`len / 4`, at least one row).
const MUTATION_FRACTION_DIVISOR: usize = 4;

/// Target table and key columns for inserts and mutations.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationConfig {
    pub table: TableRef,
    pub primary_key: String,
    /// Timestamp column refreshed by every update, if configured
    pub audit_column: Option<String>,
}

impl MutationConfig {
    pub fn new(table: TableRef, primary_key: impl Into<String>) -> Self {
        Self {
            table,
            primary_key: primary_key.into(),
            audit_column: None,
        }
    }

    pub fn with_audit_column(mut self, column: impl Into<String>) -> Self {
        self.audit_column = Some(column.into());
        self
    }

    /// Check the key columns against the catalog.
    ///
    /// The primary key must exist, start active and be protected so that it
    /// can never be dropped. The audit column must hold a date/time or text.
    pub fn validate(&self, catalog: &Catalog) -> Result<(), ConfigError> {
        let pk = catalog
            .get(&self.primary_key)
            .ok_or_else(|| ConfigError::UnknownColumn(self.primary_key.clone()))?;
        if pk.is_reserved() {
            return Err(ConfigError::InvalidPolicy(format!(
                "primary key '{}' cannot be reserved",
                pk.name()
            )));
        }
        if !pk.is_protected() {
            return Err(ConfigError::InvalidPolicy(format!(
                "primary key '{}' must be protected",
                pk.name()
            )));
        }

        if let Some(audit) = &self.audit_column {
            let column = catalog
                .get(audit)
                .ok_or_else(|| ConfigError::UnknownColumn(audit.clone()))?;
            let ty = column.domain_type();
            if !(ty.is_temporal() || ty.is_textual()) {
                return Err(ConfigError::InvalidPolicy(format!(
                    "audit column '{audit}' has type {ty}, expected a date/time or text type"
                )));
            }
        }
        Ok(())
    }
}

/// Cumulative insert/update/delete totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationCounters {
    pub total_inserts: u64,
    pub total_updates: u64,
    pub total_deletes: u64,
}

/// Inserts batches and applies random updates/deletes.
pub struct MutationExecutor {
    config: MutationConfig,
    rng: Box<dyn RandomSource>,
    counters: MutationCounters,
}

impl MutationExecutor {
    pub fn new(config: MutationConfig, rng: Box<dyn RandomSource>) -> Self {
        Self {
            config,
            rng,
            counters: MutationCounters::default(),
        }
    }

    pub fn config(&self) -> &MutationConfig {
        &self.config
    }

    /// Snapshot of the cumulative counters.
    pub fn counters(&self) -> MutationCounters {
        self.counters
    }

    /// Insert `rows` with one bulk write and return their primary keys in
    /// input order.
    ///
    /// Every row must carry the primary key. Column types come from the
    /// schema's catalog; the column list is taken from the first row.
    pub async fn insert_batch(
        &mut self,
        executor: &dyn SqlExecutor,
        schema: &SchemaState,
        rows: &[Row],
    ) -> Result<Vec<Value>, EngineError> {
        let Some(first) = rows.first() else {
            return Ok(Vec::new());
        };

        let pk = &self.config.primary_key;
        let ids = rows
            .iter()
            .enumerate()
            .map(|(row, values)| {
                values
                    .get(pk)
                    .cloned()
                    .ok_or_else(|| LookupError::MissingPrimaryKey {
                        row,
                        column: pk.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let columns = first
            .names()
            .map(|name| {
                schema
                    .catalog()
                    .get(name)
                    .map(|column| ColumnBinding::new(name, column.domain_type().clone()))
                    .ok_or_else(|| LookupError::ColumnNotFound(name.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let values: Vec<Vec<Value>> = rows
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .map(|c| row.get(&c.name).cloned().unwrap_or(Value::Null))
                    .collect()
            })
            .collect();

        executor
            .bulk_insert(&self.config.table, &columns, &values)
            .await
            .map_err(EngineError::sql(SqlOperation::Insert, None))?;

        self.counters.total_inserts += rows.len() as u64;
        debug!(table = %self.config.table, rows = rows.len(), "Inserted batch");
        Ok(ids)
    }

    /// Randomly update or delete a subset of `ids`.
    ///
    /// Returns `(updated, deleted)`; at most one of them is non-zero.
    pub async fn maybe_mutate_batch(
        &mut self,
        executor: &dyn SqlExecutor,
        ids: &[Value],
        generator: &BatchGenerator<'_>,
    ) -> Result<(u64, u64), EngineError> {
        if ids.is_empty() || self.rng.next_f64() > MUTATION_SKIP_THRESHOLD {
            return Ok((0, 0));
        }

        let update = self.rng.choose_index(2) == 0;
        let amount = (ids.len() / MUTATION_FRACTION_DIVISOR).max(1);
        let subset: Vec<Value> = self
            .rng
            .sample_indices(ids.len(), amount)
            .into_iter()
            .map(|i| ids[i].clone())
            .collect();

        if update {
            Ok((self.update_rows(executor, &subset, generator).await?, 0))
        } else {
            Ok((0, self.delete_rows(executor, &subset, generator.schema()).await?))
        }
    }

    /// Give each row a fresh value in one uniformly chosen modifiable column,
    /// refreshing the audit column alongside. All updates share a transaction.
    pub async fn update_rows(
        &mut self,
        executor: &dyn SqlExecutor,
        ids: &[Value],
        generator: &BatchGenerator<'_>,
    ) -> Result<u64, EngineError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let schema = generator.schema();
        let pk = self.primary_key(schema)?;
        let candidates = generator.modifiable_columns(&HashSet::from([pk.name()]));
        if candidates.is_empty() {
            debug!(table = %self.config.table, "No modifiable columns, skipping update");
            return Ok(0);
        }
        let audit = self
            .config
            .audit_column
            .as_deref()
            .and_then(|name| schema.column(name));

        let mut statements = Vec::with_capacity(ids.len());
        for id in ids {
            let name = candidates[self.rng.choose_index(candidates.len())];
            let mut assignments = Vec::with_capacity(2);

            if audit.map(ColumnSpec::name) != Some(name) {
                let column = schema
                    .column(name)
                    .ok_or_else(|| LookupError::ColumnNotFound(name.to_string()))?;
                let value = generator.generate_value(name)?;
                assignments.push((
                    name.to_string(),
                    TypedValue::new(column.domain_type().clone(), value),
                ));
            }
            if let Some(audit) = audit {
                assignments.push((audit.name().to_string(), audit_timestamp(audit)?));
            }

            statements.push(ddl::update_row(
                &self.config.table,
                assignments,
                pk.name(),
                TypedValue::new(pk.domain_type().clone(), id.clone()),
            ));
        }

        executor
            .execute_in_transaction(&statements)
            .await
            .map_err(EngineError::sql(SqlOperation::Update, None))?;

        let updated = statements.len() as u64;
        self.counters.total_updates += updated;
        debug!(table = %self.config.table, updated, "Updated rows");
        Ok(updated)
    }

    /// Delete every row whose primary key is in `ids` with one statement.
    pub async fn delete_rows(
        &mut self,
        executor: &dyn SqlExecutor,
        ids: &[Value],
        schema: &SchemaState,
    ) -> Result<u64, EngineError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let pk = self.primary_key(schema)?;
        let statement = ddl::delete_rows(
            executor.dialect(),
            &self.config.table,
            pk.name(),
            TypedValue::new(pk.domain_type().clone(), Value::Array(ids.to_vec())),
        );
        executor
            .execute(&statement)
            .await
            .map_err(EngineError::sql(SqlOperation::Delete, None))?;

        let deleted = ids.len() as u64;
        self.counters.total_deletes += deleted;
        debug!(table = %self.config.table, deleted, "Deleted rows");
        Ok(deleted)
    }

    fn primary_key<'s>(&self, schema: &'s SchemaState) -> Result<&'s ColumnSpec, LookupError> {
        schema
            .column(&self.config.primary_key)
            .ok_or_else(|| LookupError::ColumnNotFound(self.config.primary_key.clone()))
    }
}

/// "Now" in the representation of the audit column's type.
fn audit_timestamp(audit: &ColumnSpec) -> Result<TypedValue, ConfigError> {
    let domain_type = audit.domain_type();
    let value = Value::TimestampTz(Utc::now())
        .conform_to(domain_type)
        .ok_or_else(|| {
            ConfigError::InvalidPolicy(format!(
                "audit column '{}' has type {domain_type}, which cannot hold a timestamp",
                audit.name()
            ))
        })?;
    Ok(TypedValue::new(domain_type.clone(), value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordedCall, RecordingExecutor};
    use drift_core::{CatalogBuilder, DomainType, FirstChoiceRandom, ScriptedRandom};
    use drift_postgresql::PostgreSQLDialect;
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::Arc;

    fn counter(name: &str, ty: DomainType) -> ColumnSpec {
        let next = Arc::new(AtomicI64::new(1));
        ColumnSpec::new(name, ty, move || {
            Ok(Value::Int64(next.fetch_add(1, Ordering::SeqCst)))
        })
        .unwrap()
    }

    fn text(name: &str, value: &'static str) -> ColumnSpec {
        ColumnSpec::new(name, DomainType::Text, move || Ok(Value::Text(value.to_string())))
            .unwrap()
    }

    fn now(name: &str, ty: DomainType) -> ColumnSpec {
        ColumnSpec::new(name, ty, || Ok(Value::Null)).unwrap()
    }

    fn state(extra: Vec<ColumnSpec>) -> SchemaState {
        let mut builder = CatalogBuilder::new();
        builder.register(counter("id", DomainType::Int64).protected(true));
        for column in extra {
            builder.register(column);
        }
        SchemaState::initialize(builder.build().unwrap())
    }

    fn config() -> MutationConfig {
        MutationConfig::new(TableRef::new("public", "sales"), "id")
    }

    fn ids(n: i64) -> Vec<Value> {
        (1..=n).map(Value::Int64).collect()
    }

    #[tokio::test]
    async fn test_insert_returns_ids_in_order() {
        let state = state(vec![text("item", "hat")]);
        let executor = RecordingExecutor::new(PostgreSQLDialect);
        let mut mutator = MutationExecutor::new(config(), Box::new(FirstChoiceRandom::new()));

        let rows = BatchGenerator::new(&state).generate_batch(3).unwrap();
        let inserted = mutator.insert_batch(&executor, &state, &rows).await.unwrap();

        assert_eq!(inserted, ids(3));
        assert_eq!(mutator.counters().total_inserts, 3);
        match &executor.calls()[0] {
            RecordedCall::BulkInsert { columns, rows, .. } => {
                assert_eq!(
                    columns,
                    &vec![
                        ColumnBinding::new("id", DomainType::Int64),
                        ColumnBinding::new("item", DomainType::Text),
                    ]
                );
                assert_eq!(rows[1], vec![Value::Int64(2), Value::Text("hat".into())]);
            }
            other => panic!("Expected bulk insert, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_insert_empty_is_noop() {
        let state = state(vec![]);
        let executor = RecordingExecutor::new(PostgreSQLDialect);
        let mut mutator = MutationExecutor::new(config(), Box::new(FirstChoiceRandom::new()));

        assert!(mutator.insert_batch(&executor, &state, &[]).await.unwrap().is_empty());
        assert_eq!(mutator.counters(), MutationCounters::default());
        assert!(executor.calls().is_empty());
    }

    #[tokio::test]
    async fn test_insert_requires_primary_key() {
        let state = state(vec![text("item", "hat")]);
        let executor = RecordingExecutor::new(PostgreSQLDialect);
        let mut mutator = MutationExecutor::new(config(), Box::new(FirstChoiceRandom::new()));

        let mut row = Row::default();
        row.push("item", Value::Text("hat".into()));
        let err = mutator.insert_batch(&executor, &state, &[row]).await.unwrap_err();

        assert!(matches!(
            err,
            EngineError::Lookup(LookupError::MissingPrimaryKey { row: 0, .. })
        ));
        assert_eq!(mutator.counters().total_inserts, 0);
    }

    #[tokio::test]
    async fn test_failed_insert_keeps_counters() {
        let state = state(vec![]);
        let executor = RecordingExecutor::new(PostgreSQLDialect);
        executor.fail_on("INSERT");
        let mut mutator = MutationExecutor::new(config(), Box::new(FirstChoiceRandom::new()));

        let rows = BatchGenerator::new(&state).generate_batch(2).unwrap();
        let err = mutator.insert_batch(&executor, &state, &rows).await.unwrap_err();
        assert_eq!(err.operation(), Some(SqlOperation::Insert));
        assert_eq!(mutator.counters().total_inserts, 0);
    }

    #[tokio::test]
    async fn test_mutate_empty_ids_is_noop() {
        let state = state(vec![text("item", "hat")]);
        let executor = RecordingExecutor::new(PostgreSQLDialect);
        let mut mutator = MutationExecutor::new(config(), Box::new(FirstChoiceRandom::new()));

        let result = mutator
            .maybe_mutate_batch(&executor, &[], &BatchGenerator::new(&state))
            .await
            .unwrap();
        assert_eq!(result, (0, 0));
        assert_eq!(mutator.counters(), MutationCounters::default());
    }

    #[tokio::test]
    async fn test_high_draw_skips_mutation() {
        let state = state(vec![text("item", "hat")]);
        let executor = RecordingExecutor::new(PostgreSQLDialect);
        let mut mutator =
            MutationExecutor::new(config(), Box::new(FirstChoiceRandom::with_draw(0.51)));

        let result = mutator
            .maybe_mutate_batch(&executor, &ids(8), &BatchGenerator::new(&state))
            .await
            .unwrap();
        assert_eq!(result, (0, 0));
        assert!(executor.calls().is_empty());
    }

    #[tokio::test]
    async fn test_update_path_refreshes_audit_column() {
        let state = state(vec![
            text("item", "scarf"),
            now("updated_at", DomainType::Timestamp).protected(true),
        ]);
        let executor = RecordingExecutor::new(PostgreSQLDialect);
        let mut mutator = MutationExecutor::new(
            config().with_audit_column("updated_at"),
            Box::new(FirstChoiceRandom::new()),
        );

        // 8 ids -> 2 rows updated
        let result = mutator
            .maybe_mutate_batch(&executor, &ids(8), &BatchGenerator::new(&state))
            .await
            .unwrap();
        assert_eq!(result, (2, 0));
        assert_eq!(mutator.counters().total_updates, 2);

        let calls = executor.calls();
        assert_eq!(calls.len(), 1);
        let RecordedCall::Transaction(statements) = &calls[0] else {
            panic!("Expected one transaction");
        };
        assert_eq!(statements.len(), 2);
        assert_eq!(
            statements[0].sql,
            "UPDATE \"public\".\"sales\" SET \"item\" = $1, \"updated_at\" = $2 WHERE \"id\" = $3"
        );
        assert_eq!(statements[0].params[0].value, Value::Text("scarf".into()));
        assert!(matches!(statements[0].params[1].value, Value::Timestamp(_)));
        assert_eq!(statements[0].params[2].value, Value::Int64(1));
        assert_eq!(statements[1].params[2].value, Value::Int64(2));
    }

    #[tokio::test]
    async fn test_update_skips_inactive_audit_column() {
        let state = state(vec![
            text("item", "scarf"),
            now("updated_at", DomainType::TimestampTz).reserved(true),
        ]);
        let executor = RecordingExecutor::new(PostgreSQLDialect);
        let mut mutator = MutationExecutor::new(
            config().with_audit_column("updated_at"),
            Box::new(FirstChoiceRandom::new()),
        );

        let updated = mutator
            .update_rows(&executor, &ids(1), &BatchGenerator::new(&state))
            .await
            .unwrap();
        assert_eq!(updated, 1);
        assert_eq!(
            executor.executed_sql(),
            vec!["UPDATE \"public\".\"sales\" SET \"item\" = $1 WHERE \"id\" = $2"]
        );
    }

    #[tokio::test]
    async fn test_update_rejects_audit_column_without_time() {
        let state = state(vec![text("item", "scarf"), counter("revision", DomainType::Int32)]);
        let executor = RecordingExecutor::new(PostgreSQLDialect);
        let mut mutator = MutationExecutor::new(
            config().with_audit_column("revision"),
            Box::new(FirstChoiceRandom::new()),
        );

        let err = mutator
            .update_rows(&executor, &ids(2), &BatchGenerator::new(&state))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Config(ConfigError::InvalidPolicy(_))));
        assert!(err.to_string().contains("revision"));
        assert_eq!(mutator.counters().total_updates, 0);
        assert!(executor.calls().is_empty());
    }

    #[tokio::test]
    async fn test_update_never_targets_promoted_reserved_column() {
        let mut state = state(vec![
            text("item", "scarf"),
            text("coupon", "SAVE10").reserved(true),
        ]);
        assert_eq!(
            state.promote(&mut FirstChoiceRandom::new()).as_deref(),
            Some("coupon")
        );

        let executor = RecordingExecutor::new(PostgreSQLDialect);
        // Scripted column choice 1 would be `coupon` if it were a candidate.
        let rng = ScriptedRandom::new(Vec::<f64>::new(), [1, 1, 1, 1]);
        let mut mutator = MutationExecutor::new(config(), Box::new(rng));

        let updated = mutator
            .update_rows(&executor, &ids(4), &BatchGenerator::new(&state))
            .await
            .unwrap();
        assert_eq!(updated, 4);
        for sql in executor.executed_sql() {
            assert_eq!(
                sql,
                "UPDATE \"public\".\"sales\" SET \"item\" = $1 WHERE \"id\" = $2"
            );
        }
    }

    #[tokio::test]
    async fn test_update_skips_when_only_reserved_columns_remain() {
        let mut state = state(vec![text("coupon", "SAVE10").reserved(true)]);
        state.promote(&mut FirstChoiceRandom::new());
        let executor = RecordingExecutor::new(PostgreSQLDialect);
        let mut mutator = MutationExecutor::new(config(), Box::new(FirstChoiceRandom::new()));

        let updated = mutator
            .update_rows(&executor, &ids(3), &BatchGenerator::new(&state))
            .await
            .unwrap();
        assert_eq!(updated, 0);
        assert!(executor.calls().is_empty());
    }

    #[tokio::test]
    async fn test_update_without_modifiable_columns() {
        let state = state(vec![text("item", "scarf").protected(true)]);
        let executor = RecordingExecutor::new(PostgreSQLDialect);
        let mut mutator = MutationExecutor::new(config(), Box::new(FirstChoiceRandom::new()));

        let result = mutator
            .maybe_mutate_batch(&executor, &ids(4), &BatchGenerator::new(&state))
            .await
            .unwrap();
        assert_eq!(result, (0, 0));
        assert_eq!(mutator.counters().total_updates, 0);
        assert!(executor.calls().is_empty());
    }

    #[tokio::test]
    async fn test_delete_path() {
        let state = state(vec![text("item", "hat")]);
        let executor = RecordingExecutor::new(PostgreSQLDialect);
        // draw 0.2 -> mutate, choice 1 -> delete, then sample index 3
        let rng = ScriptedRandom::new([0.2], [1, 3]);
        let mut mutator = MutationExecutor::new(config(), Box::new(rng));

        let result = mutator
            .maybe_mutate_batch(&executor, &ids(4), &BatchGenerator::new(&state))
            .await
            .unwrap();
        assert_eq!(result, (0, 1));
        assert_eq!(mutator.counters().total_deletes, 1);

        let calls = executor.calls();
        let RecordedCall::Execute(statement) = &calls[0] else {
            panic!("Expected a single statement");
        };
        assert_eq!(
            statement.sql,
            "DELETE FROM \"public\".\"sales\" WHERE \"id\" = ANY($1)"
        );
        assert_eq!(
            statement.params[0],
            TypedValue::new(DomainType::Int64, Value::Array(vec![Value::Int64(4)]))
        );
    }

    #[tokio::test]
    async fn test_delete_uuid_keys_use_cast() {
        let mut builder = CatalogBuilder::new();
        builder.register(
            ColumnSpec::new("id", DomainType::Uuid, || Ok(Value::Uuid(uuid::Uuid::new_v4())))
                .unwrap()
                .protected(true),
        );
        let state = SchemaState::initialize(builder.build().unwrap());
        let executor = RecordingExecutor::new(PostgreSQLDialect);
        let mut mutator = MutationExecutor::new(config(), Box::new(FirstChoiceRandom::new()));

        let ids = vec![Value::Uuid(uuid::Uuid::new_v4())];
        assert_eq!(mutator.delete_rows(&executor, &ids, &state).await.unwrap(), 1);
        assert_eq!(
            executor.executed_sql(),
            vec!["DELETE FROM \"public\".\"sales\" WHERE \"id\" = ANY($1::uuid[])"]
        );
    }

    #[test]
    fn test_validate_config() {
        let state = state(vec![
            text("item", "hat"),
            counter("qty", DomainType::Int32),
            now("updated_at", DomainType::Timestamp),
        ]);
        let catalog = state.catalog();

        assert!(config().validate(catalog).is_ok());
        assert!(config().with_audit_column("updated_at").validate(catalog).is_ok());
        assert_eq!(
            MutationConfig::new(TableRef::new("public", "sales"), "sku").validate(catalog),
            Err(ConfigError::UnknownColumn("sku".to_string()))
        );
        assert!(matches!(
            MutationConfig::new(TableRef::new("public", "sales"), "item").validate(catalog),
            Err(ConfigError::InvalidPolicy(_))
        ));
        assert!(matches!(
            config().with_audit_column("qty").validate(catalog),
            Err(ConfigError::InvalidPolicy(_))
        ));
    }
}
