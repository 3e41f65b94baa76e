//! Conversion of typed engine values into PostgreSQL parameters.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use drift_core::{DomainType, SqlError, TypedValue, Value};
use rust_decimal::Decimal;
use std::str::FromStr;
use tokio_postgres::types::ToSql;
use uuid::Uuid;

/// PostgreSQL value wrapper for type-safe conversions.
///
/// Every variant maps to exactly one Rust type that tokio-postgres can bind.
#[derive(Debug, Clone, PartialEq)]
pub enum PostgreSQLValue {
    /// Null bound with the column's type
    Null(DomainType),
    Bool(bool),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    Decimal(Decimal),
    Text(String),
    Uuid(Uuid),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
    TimestampTz(DateTime<Utc>),
    Json(serde_json::Value),
    /// Array of UUIDs (PostgreSQL uuid[])
    UuidArray(Vec<Uuid>),
    /// Array of i16 values (PostgreSQL smallint[])
    Int16Array(Vec<i16>),
    /// Array of i32 values (PostgreSQL integer[])
    Int32Array(Vec<i32>),
    /// Array of i64 values (PostgreSQL bigint[])
    Int64Array(Vec<i64>),
    /// Array of text values (PostgreSQL text[])
    TextArray(Vec<String>),
}

impl PostgreSQLValue {
    /// Convert a value bound to a column of `domain_type`.
    ///
    /// Values of a different runtime type are conformed first; arrays are
    /// homogeneous arrays of `domain_type` elements.
    pub fn from_value(domain_type: &DomainType, value: Value) -> Result<Self, SqlError> {
        if let Value::Array(items) = value {
            return array_value(domain_type, items);
        }

        let unsupported = |value: Value| SqlError::UnsupportedValue {
            domain_type: domain_type.clone(),
            value,
        };
        let value = value
            .clone()
            .conform_to(domain_type)
            .ok_or_else(|| unsupported(value))?;

        Ok(match value {
            Value::Null => Self::Null(domain_type.clone()),
            Value::Bool(b) => Self::Bool(b),
            Value::Int16(i) => Self::Int16(i),
            Value::Int32(i) => Self::Int32(i),
            Value::Int64(i) => Self::Int64(i),
            Value::Float32(f) => Self::Float32(f),
            Value::Float64(f) => Self::Float64(f),
            Value::Decimal(s) => match Decimal::from_str(&s) {
                Ok(d) => Self::Decimal(d),
                Err(_) => return Err(unsupported(Value::Decimal(s))),
            },
            Value::Text(s) => Self::Text(s),
            Value::Uuid(u) => Self::Uuid(u),
            Value::Date(d) => Self::Date(d),
            Value::Timestamp(ts) => Self::Timestamp(ts),
            Value::TimestampTz(ts) => Self::TimestampTz(ts),
            Value::Json(j) => Self::Json(j),
            Value::Array(items) => return Err(unsupported(Value::Array(items))),
        })
    }

    /// Box into a `ToSql` trait object.
    pub fn into_boxed(self) -> Box<dyn ToSql + Sync + Send> {
        match self {
            Self::Null(domain_type) => typed_null(&domain_type),
            Self::Bool(b) => Box::new(b),
            Self::Int16(i) => Box::new(i),
            Self::Int32(i) => Box::new(i),
            Self::Int64(i) => Box::new(i),
            Self::Float32(f) => Box::new(f),
            Self::Float64(f) => Box::new(f),
            Self::Decimal(d) => Box::new(d),
            Self::Text(s) => Box::new(s),
            Self::Uuid(u) => Box::new(u),
            Self::Date(d) => Box::new(d),
            Self::Timestamp(ts) => Box::new(ts),
            Self::TimestampTz(ts) => Box::new(ts),
            Self::Json(j) => Box::new(j),
            Self::UuidArray(arr) => Box::new(arr),
            Self::Int16Array(arr) => Box::new(arr),
            Self::Int32Array(arr) => Box::new(arr),
            Self::Int64Array(arr) => Box::new(arr),
            Self::TextArray(arr) => Box::new(arr),
        }
    }
}

impl TryFrom<TypedValue> for PostgreSQLValue {
    type Error = SqlError;

    fn try_from(tv: TypedValue) -> Result<Self, Self::Error> {
        Self::from_value(&tv.domain_type, tv.value)
    }
}

/// Convert and box a typed parameter.
pub fn to_sql_param(tv: &TypedValue) -> Result<Box<dyn ToSql + Sync + Send>, SqlError> {
    PostgreSQLValue::from_value(&tv.domain_type, tv.value.clone()).map(PostgreSQLValue::into_boxed)
}

fn typed_null(domain_type: &DomainType) -> Box<dyn ToSql + Sync + Send> {
    match domain_type {
        DomainType::Bool => Box::new(None::<bool>),
        DomainType::Int16 => Box::new(None::<i16>),
        DomainType::Int32 => Box::new(None::<i32>),
        DomainType::Int64 => Box::new(None::<i64>),
        DomainType::Float32 => Box::new(None::<f32>),
        DomainType::Float64 => Box::new(None::<f64>),
        DomainType::Decimal { .. } => Box::new(None::<Decimal>),
        DomainType::VarChar { .. } | DomainType::Text => Box::new(None::<String>),
        DomainType::Uuid => Box::new(None::<Uuid>),
        DomainType::Date => Box::new(None::<NaiveDate>),
        DomainType::Timestamp => Box::new(None::<NaiveDateTime>),
        DomainType::TimestampTz => Box::new(None::<DateTime<Utc>>),
        DomainType::Json | DomainType::Jsonb => Box::new(None::<serde_json::Value>),
    }
}

fn array_value(element: &DomainType, items: Vec<Value>) -> Result<PostgreSQLValue, SqlError> {
    let unsupported = |items: Vec<Value>| SqlError::UnsupportedValue {
        domain_type: element.clone(),
        value: Value::Array(items),
    };

    macro_rules! collect {
        ($variant:ident, $pattern:ident) => {{
            let converted = items
                .iter()
                .map(|item| match item.clone().conform_to(element) {
                    Some(Value::$pattern(v)) => Some(v),
                    _ => None,
                })
                .collect::<Option<Vec<_>>>();
            match converted {
                Some(out) => Ok(PostgreSQLValue::$variant(out)),
                None => Err(unsupported(items)),
            }
        }};
    }

    match element {
        DomainType::Uuid => collect!(UuidArray, Uuid),
        DomainType::Int16 => collect!(Int16Array, Int16),
        DomainType::Int32 => collect!(Int32Array, Int32),
        DomainType::Int64 => collect!(Int64Array, Int64),
        DomainType::Text | DomainType::VarChar { .. } => collect!(TextArray, Text),
        _ => Err(unsupported(items)),
    }
}
