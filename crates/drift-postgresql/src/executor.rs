//! [`SqlExecutor`] over a tokio-postgres client.

use crate::dialect::PostgreSQLDialect;
use crate::error::PostgreSQLError;
use crate::insert::{insert_params, insert_sql, rows_per_statement};
use crate::value::to_sql_param;
use async_trait::async_trait;
use drift_core::{ColumnBinding, SqlDialect, SqlError, SqlExecutor, Statement, TableRef, Value};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_postgres::types::ToSql;
use tokio_postgres::{Client, NoTls};
use tracing::debug;

/// PostgreSQL executor. Every call commits on its own.
pub struct PostgreSQLExecutor {
    client: Arc<Mutex<Client>>,
    dialect: PostgreSQLDialect,
}

impl PostgreSQLExecutor {
    /// Connect to PostgreSQL.
    ///
    /// # Arguments
    ///
    /// * `connection_string` - PostgreSQL connection string (e.g., "host=localhost user=postgres password=postgres dbname=testdb")
    ///
    /// # Example
    ///
    /// ```ignore
    /// let executor = PostgreSQLExecutor::connect(
    ///     "host=localhost user=postgres password=postgres dbname=testdb",
    /// ).await?;
    /// ```
    pub async fn connect(connection_string: &str) -> Result<Self, PostgreSQLError> {
        let (client, connection) = tokio_postgres::connect(connection_string, NoTls).await?;

        // Spawn the connection task
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!("PostgreSQL connection error: {}", e);
            }
        });

        // Test connection
        client
            .simple_query("SELECT 1")
            .await
            .map_err(|e| PostgreSQLError::Connection(e.to_string()))?;

        Ok(Self::with_client(Arc::new(Mutex::new(client))))
    }

    /// Create an executor over an existing client.
    pub fn with_client(client: Arc<Mutex<Client>>) -> Self {
        Self {
            client,
            dialect: PostgreSQLDialect,
        }
    }

    /// Shared handle to the underlying client.
    pub fn client(&self) -> Arc<Mutex<Client>> {
        Arc::clone(&self.client)
    }
}

fn statement_params(
    statement: &Statement,
) -> Result<Vec<Box<dyn ToSql + Sync + Send>>, SqlError> {
    statement.params.iter().map(to_sql_param).collect()
}

fn as_refs(params: &[Box<dyn ToSql + Sync + Send>]) -> Vec<&(dyn ToSql + Sync)> {
    params
        .iter()
        .map(|p| p.as_ref() as &(dyn ToSql + Sync))
        .collect()
}

#[async_trait]
impl SqlExecutor for PostgreSQLExecutor {
    fn dialect(&self) -> &dyn SqlDialect {
        &self.dialect
    }

    async fn execute(&self, statement: &Statement) -> Result<u64, SqlError> {
        let params = statement_params(statement)?;
        let client = self.client.lock().await;
        debug!(sql = %statement.sql, params = params.len(), "Executing statement");
        client
            .execute(&statement.sql, &as_refs(&params))
            .await
            .map_err(SqlError::backend)
    }

    async fn execute_in_transaction(&self, statements: &[Statement]) -> Result<u64, SqlError> {
        let prepared = statements
            .iter()
            .map(|s| statement_params(s).map(|params| (s, params)))
            .collect::<Result<Vec<_>, _>>()?;

        let mut client = self.client.lock().await;
        let tx = client.transaction().await.map_err(SqlError::backend)?;
        let mut affected = 0;
        for (statement, params) in &prepared {
            affected += tx
                .execute(&statement.sql, &as_refs(params))
                .await
                .map_err(SqlError::backend)?;
        }
        tx.commit().await.map_err(SqlError::backend)?;

        debug!(statements = statements.len(), affected, "Committed transaction");
        Ok(affected)
    }

    async fn bulk_insert(
        &self,
        table: &TableRef,
        columns: &[ColumnBinding],
        rows: &[Vec<Value>],
    ) -> Result<u64, SqlError> {
        if rows.is_empty() {
            return Ok(0);
        }
        if columns.is_empty() {
            return Err(SqlError::Rejected(format!(
                "cannot insert into {table} without columns"
            )));
        }

        let chunk_size = rows_per_statement(columns.len());
        let mut chunks = Vec::new();
        for chunk in rows.chunks(chunk_size) {
            chunks.push((insert_sql(table, columns, chunk.len()), insert_params(columns, chunk)?));
        }

        let mut client = self.client.lock().await;
        let tx = client.transaction().await.map_err(SqlError::backend)?;
        let mut inserted = 0;
        for (sql, params) in &chunks {
            inserted += tx
                .execute(sql, &as_refs(params))
                .await
                .map_err(SqlError::backend)?;
        }
        tx.commit().await.map_err(SqlError::backend)?;

        debug!(%table, rows = rows.len(), statements = chunks.len(), "Bulk insert committed");
        Ok(inserted)
    }
}
