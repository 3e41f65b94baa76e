//! SQL statement text for table lifecycle, schema changes and row mutations.
//!
//! Every identifier is quoted; every value is bound as a `$n` parameter.

use drift_core::{quote_identifier, ColumnSpec, SqlDialect, Statement, TableRef, TypedValue};

/// `"name" TYPE constraints` fragment for one column.
pub fn column_definition(dialect: &dyn SqlDialect, column: &ColumnSpec) -> String {
    let mut def = format!(
        "{} {}",
        quote_identifier(column.name()),
        dialect.type_name(column.domain_type())
    );
    if let Some(constraints) = column.constraints() {
        def.push(' ');
        def.push_str(constraints);
    }
    def
}

/// `CREATE TABLE IF NOT EXISTS` for the given columns, in order.
pub fn create_table<'a>(
    dialect: &dyn SqlDialect,
    table: &TableRef,
    columns: impl IntoIterator<Item = &'a ColumnSpec>,
) -> Statement {
    let column_defs: Vec<String> = columns
        .into_iter()
        .map(|column| column_definition(dialect, column))
        .collect();

    Statement::new(format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        table.qualified(),
        column_defs.join(", ")
    ))
}

pub fn drop_table(table: &TableRef) -> Statement {
    Statement::new(format!("DROP TABLE IF EXISTS {}", table.qualified()))
}

pub fn add_column(dialect: &dyn SqlDialect, table: &TableRef, column: &ColumnSpec) -> Statement {
    Statement::new(format!(
        "ALTER TABLE {} ADD COLUMN {}",
        table.qualified(),
        column_definition(dialect, column)
    ))
}

pub fn drop_column(table: &TableRef, column: &str) -> Statement {
    Statement::new(format!(
        "ALTER TABLE {} DROP COLUMN {}",
        table.qualified(),
        quote_identifier(column)
    ))
}

/// `UPDATE ... SET a = $1, b = $2 WHERE pk = $3` for one row.
pub fn update_row(
    table: &TableRef,
    assignments: Vec<(String, TypedValue)>,
    primary_key: &str,
    id: TypedValue,
) -> Statement {
    let mut params = Vec::with_capacity(assignments.len() + 1);
    let mut sets = Vec::with_capacity(assignments.len());
    for (column, value) in assignments {
        params.push(value);
        sets.push(format!("{} = ${}", quote_identifier(&column), params.len()));
    }
    params.push(id);

    Statement::with_params(
        format!(
            "UPDATE {} SET {} WHERE {} = ${}",
            table.qualified(),
            sets.join(", "),
            quote_identifier(primary_key),
            params.len()
        ),
        params,
    )
}

/// Set-membership delete on the primary key.
///
/// `ids` must be a [`drift_core::Value::Array`] typed with the primary key's
/// element type. The dialect decides whether the parameter needs a cast.
pub fn delete_rows(
    dialect: &dyn SqlDialect,
    table: &TableRef,
    primary_key: &str,
    ids: TypedValue,
) -> Statement {
    let cast = dialect.array_cast(&ids.domain_type).unwrap_or_default();
    Statement::with_params(
        format!(
            "DELETE FROM {} WHERE {} = ANY($1{cast})",
            table.qualified(),
            quote_identifier(primary_key)
        ),
        vec![ids],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use drift_core::{DomainType, Value};
    use drift_postgresql::PostgreSQLDialect;

    fn table() -> TableRef {
        TableRef::new("public", "sales")
    }

    fn column(name: &str, ty: DomainType) -> ColumnSpec {
        ColumnSpec::new(name, ty, || Ok(Value::Null)).unwrap()
    }

    #[test]
    fn test_create_table() {
        let id = column("id", DomainType::Uuid).with_constraints("PRIMARY KEY");
        let price = column(
            "price",
            DomainType::Decimal {
                precision: 10,
                scale: 2,
            },
        );

        let stmt = create_table(&PostgreSQLDialect, &table(), [&id, &price]);
        assert_eq!(
            stmt.sql,
            "CREATE TABLE IF NOT EXISTS \"public\".\"sales\" (\"id\" UUID PRIMARY KEY, \"price\" NUMERIC(10,2))"
        );
        assert!(stmt.params.is_empty());
    }

    #[test]
    fn test_alter_statements() {
        let coupon = column("coupon", DomainType::Text).with_constraints("DEFAULT 'NONE'");
        assert_eq!(
            add_column(&PostgreSQLDialect, &table(), &coupon).sql,
            "ALTER TABLE \"public\".\"sales\" ADD COLUMN \"coupon\" TEXT DEFAULT 'NONE'"
        );
        assert_eq!(
            drop_column(&table(), "coupon").sql,
            "ALTER TABLE \"public\".\"sales\" DROP COLUMN \"coupon\""
        );
        assert_eq!(
            drop_table(&table()).sql,
            "DROP TABLE IF EXISTS \"public\".\"sales\""
        );
    }

    #[test]
    fn test_update_row_numbers_params() {
        let stmt = update_row(
            &table(),
            vec![
                ("item".to_string(), TypedValue::new(DomainType::Text, Value::Text("hat".into()))),
                ("updated_at".to_string(), TypedValue::null(DomainType::Timestamp)),
            ],
            "id",
            TypedValue::new(DomainType::Int64, Value::Int64(9)),
        );
        assert_eq!(
            stmt.sql,
            "UPDATE \"public\".\"sales\" SET \"item\" = $1, \"updated_at\" = $2 WHERE \"id\" = $3"
        );
        assert_eq!(stmt.params.len(), 3);
        assert_eq!(stmt.params[2].value, Value::Int64(9));
    }

    #[test]
    fn test_delete_casts_uuid_arrays() {
        let ids = TypedValue::new(DomainType::Uuid, Value::Array(vec![]));
        assert_eq!(
            delete_rows(&PostgreSQLDialect, &table(), "id", ids).sql,
            "DELETE FROM \"public\".\"sales\" WHERE \"id\" = ANY($1::uuid[])"
        );

        let ids = TypedValue::new(DomainType::Int64, Value::Array(vec![Value::Int64(1)]));
        assert_eq!(
            delete_rows(&PostgreSQLDialect, &table(), "id", ids).sql,
            "DELETE FROM \"public\".\"sales\" WHERE \"id\" = ANY($1)"
        );
    }
}
