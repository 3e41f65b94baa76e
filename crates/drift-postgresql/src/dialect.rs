//! PostgreSQL type names for DDL.

use drift_core::{DomainType, SqlDialect};

/// PostgreSQL dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgreSQLDialect;

impl SqlDialect for PostgreSQLDialect {
    fn type_name(&self, domain_type: &DomainType) -> String {
        match domain_type {
            DomainType::Bool => "BOOLEAN".to_string(),

            DomainType::Int16 => "SMALLINT".to_string(),
            DomainType::Int32 => "INTEGER".to_string(),
            DomainType::Int64 => "BIGINT".to_string(),

            DomainType::Float32 => "REAL".to_string(),
            DomainType::Float64 => "DOUBLE PRECISION".to_string(),
            DomainType::Decimal { precision, scale } => format!("NUMERIC({precision},{scale})"),

            DomainType::VarChar { length } => format!("VARCHAR({length})"),
            DomainType::Text => "TEXT".to_string(),

            DomainType::Uuid => "UUID".to_string(),

            DomainType::Date => "DATE".to_string(),
            DomainType::Timestamp => "TIMESTAMP".to_string(),
            DomainType::TimestampTz => "TIMESTAMPTZ".to_string(),

            DomainType::Json => "JSON".to_string(),
            DomainType::Jsonb => "JSONB".to_string(),
        }
    }

    fn array_cast(&self, element: &DomainType) -> Option<String> {
        // Untyped uuid arrays are inferred as text[] and fail the comparison.
        match element {
            DomainType::Uuid => Some("::uuid[]".to_string()),
            _ => None,
        }
    }
}
