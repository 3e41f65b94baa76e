//! In-memory [`SqlExecutor`] for tests.
//!
//! [`RecordingExecutor`] keeps every successful call in order and can be told
//! to reject statements whose text contains a given fragment. Rejected calls
//! are not recorded, mirroring a rolled-back commit.

use async_trait::async_trait;
use drift_core::{
    ColumnBinding, SqlDialect, SqlError, SqlExecutor, Statement, TableRef, Value,
};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// One successful executor call.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    Execute(Statement),
    Transaction(Vec<Statement>),
    BulkInsert {
        table: TableRef,
        columns: Vec<ColumnBinding>,
        rows: Vec<Vec<Value>>,
    },
}

#[derive(Default)]
struct Recording {
    calls: Vec<RecordedCall>,
    fail_on: Option<String>,
}

/// Executor that records calls instead of talking to a database.
pub struct RecordingExecutor {
    dialect: Box<dyn SqlDialect>,
    recording: Mutex<Recording>,
}

impl RecordingExecutor {
    pub fn new(dialect: impl SqlDialect + 'static) -> Self {
        Self {
            dialect: Box::new(dialect),
            recording: Mutex::new(Recording::default()),
        }
    }

    /// Reject every later call whose SQL contains `fragment`.
    ///
    /// Bulk inserts are matched against `INSERT INTO "schema"."table"`.
    pub fn fail_on(&self, fragment: impl Into<String>) {
        self.lock().fail_on = Some(fragment.into());
    }

    /// Stop rejecting calls.
    pub fn clear_failure(&self) {
        self.lock().fail_on = None;
    }

    /// All successful calls in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock().calls.clone()
    }

    /// SQL text of every successful statement, transactions flattened.
    /// Bulk inserts show up as `INSERT INTO "schema"."table"`.
    pub fn executed_sql(&self) -> Vec<String> {
        self.lock()
            .calls
            .iter()
            .flat_map(|call| match call {
                RecordedCall::Execute(statement) => vec![statement.sql.clone()],
                RecordedCall::Transaction(statements) => {
                    statements.iter().map(|s| s.sql.clone()).collect()
                }
                RecordedCall::BulkInsert { table, .. } => vec![insert_sql(table)],
            })
            .collect()
    }

    /// Total rows passed to `bulk_insert`.
    pub fn inserted_row_count(&self) -> usize {
        self.lock()
            .calls
            .iter()
            .map(|call| match call {
                RecordedCall::BulkInsert { rows, .. } => rows.len(),
                _ => 0,
            })
            .sum()
    }

    fn lock(&self) -> MutexGuard<'_, Recording> {
        self.recording.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check(recording: &Recording, sql: &str) -> Result<(), SqlError> {
        match &recording.fail_on {
            Some(fragment) if sql.contains(fragment.as_str()) => {
                Err(SqlError::Rejected(format!("injected failure on '{fragment}'")))
            }
            _ => Ok(()),
        }
    }
}

fn insert_sql(table: &TableRef) -> String {
    format!("INSERT INTO {}", table.qualified())
}

/// Rows a statement would touch: array length for set-membership deletes,
/// one per update, none for DDL.
fn affected_rows(statement: &Statement) -> u64 {
    if statement.sql.starts_with("DELETE") {
        match statement.params.first().map(|p| &p.value) {
            Some(Value::Array(ids)) => ids.len() as u64,
            _ => 0,
        }
    } else if statement.sql.starts_with("UPDATE") {
        1
    } else {
        0
    }
}

#[async_trait]
impl SqlExecutor for RecordingExecutor {
    fn dialect(&self) -> &dyn SqlDialect {
        self.dialect.as_ref()
    }

    async fn execute(&self, statement: &Statement) -> Result<u64, SqlError> {
        let mut recording = self.lock();
        Self::check(&recording, &statement.sql)?;
        recording.calls.push(RecordedCall::Execute(statement.clone()));
        Ok(affected_rows(statement))
    }

    async fn execute_in_transaction(&self, statements: &[Statement]) -> Result<u64, SqlError> {
        let mut recording = self.lock();
        for statement in statements {
            Self::check(&recording, &statement.sql)?;
        }
        recording
            .calls
            .push(RecordedCall::Transaction(statements.to_vec()));
        Ok(statements.iter().map(affected_rows).sum())
    }

    async fn bulk_insert(
        &self,
        table: &TableRef,
        columns: &[ColumnBinding],
        rows: &[Vec<Value>],
    ) -> Result<u64, SqlError> {
        let mut recording = self.lock();
        Self::check(&recording, &insert_sql(table))?;
        recording.calls.push(RecordedCall::BulkInsert {
            table: table.clone(),
            columns: columns.to_vec(),
            rows: rows.to_vec(),
        });
        Ok(rows.len() as u64)
    }
}
