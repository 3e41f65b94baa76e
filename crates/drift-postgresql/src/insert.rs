//! Multi-row INSERT statement building.

use drift_core::{quote_identifier, ColumnBinding, SqlError, TableRef, TypedValue, Value};
use tokio_postgres::types::ToSql;

use crate::value::to_sql_param;

/// PostgreSQL rejects statements with more bind parameters than this.
pub const MAX_BIND_PARAMETERS: usize = 65_535;

/// Rows that fit into one statement for `column_count` columns.
pub fn rows_per_statement(column_count: usize) -> usize {
    (MAX_BIND_PARAMETERS / column_count.max(1)).max(1)
}

/// `INSERT INTO "s"."t" ("a", "b") VALUES ($1, $2), ($3, $4)` for `row_count` rows.
pub fn insert_sql(table: &TableRef, columns: &[ColumnBinding], row_count: usize) -> String {
    let col_count = columns.len();
    let mut placeholders: Vec<String> = Vec::with_capacity(row_count);
    let mut param_idx = 1;

    for _ in 0..row_count {
        let row_placeholders: Vec<String> = (0..col_count)
            .map(|_| {
                let p = format!("${param_idx}");
                param_idx += 1;
                p
            })
            .collect();
        placeholders.push(format!("({})", row_placeholders.join(", ")));
    }

    format!(
        "INSERT INTO {} ({}) VALUES {}",
        table.qualified(),
        columns
            .iter()
            .map(|c| quote_identifier(&c.name))
            .collect::<Vec<_>>()
            .join(", "),
        placeholders.join(", ")
    )
}

/// Bind parameters for `rows`, row-major, typed by `columns`.
pub fn insert_params(
    columns: &[ColumnBinding],
    rows: &[Vec<Value>],
) -> Result<Vec<Box<dyn ToSql + Sync + Send>>, SqlError> {
    let mut params: Vec<Box<dyn ToSql + Sync + Send>> =
        Vec::with_capacity(rows.len() * columns.len());

    for row in rows {
        if row.len() != columns.len() {
            return Err(SqlError::Rejected(format!(
                "row has {} values for {} columns",
                row.len(),
                columns.len()
            )));
        }
        for (column, value) in columns.iter().zip(row) {
            let typed = TypedValue::new(column.domain_type.clone(), value.clone());
            params.push(to_sql_param(&typed)?);
        }
    }

    Ok(params)
}
