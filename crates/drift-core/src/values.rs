//! Value representations produced by column producers.
//!
//! `Value` is the tagged runtime value every producer returns. `TypedValue`
//! pairs a value with the domain type of the column it is bound to, which is
//! what SQL backends need to pick a native parameter type.

use crate::types::DomainType;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// Runtime value of a single column.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Null value
    Null,

    /// Boolean value
    Bool(bool),

    /// 16-bit signed integer
    Int16(i16),

    /// 32-bit signed integer
    Int32(i32),

    /// 64-bit signed integer
    Int64(i64),

    /// 32-bit floating point
    Float32(f32),

    /// 64-bit floating point
    Float64(f64),

    /// Decimal value kept as its string representation
    Decimal(String),

    /// String value
    Text(String),

    /// UUID value
    Uuid(Uuid),

    /// Date without time
    Date(NaiveDate),

    /// Timestamp without timezone
    Timestamp(NaiveDateTime),

    /// Timestamp with timezone
    TimestampTz(DateTime<Utc>),

    /// JSON document
    Json(serde_json::Value),

    /// Homogeneous array, used for set-membership parameters
    Array(Vec<Value>),
}

impl Value {
    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Try to get this value as an i64.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int16(i) => Some(*i as i64),
            Self::Int32(i) => Some(*i as i64),
            Self::Int64(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get this value as an f64.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float32(f) => Some(*f as f64),
            Self::Float64(f) => Some(*f),
            Self::Decimal(s) => s.parse().ok(),
            other => other.as_i64().map(|i| i as f64),
        }
    }

    /// Try to get this value as a string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) | Self::Decimal(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get this value as a UUID.
    pub fn as_uuid(&self) -> Option<&Uuid> {
        match self {
            Self::Uuid(u) => Some(u),
            _ => None,
        }
    }

    /// Whether this value is a valid runtime representation of `domain_type`.
    ///
    /// Null is accepted for every type.
    pub fn matches(&self, domain_type: &DomainType) -> bool {
        matches!(
            (self, domain_type),
            (Self::Null, _)
                | (Self::Bool(_), DomainType::Bool)
                | (Self::Int16(_), DomainType::Int16)
                | (Self::Int32(_), DomainType::Int32)
                | (Self::Int64(_), DomainType::Int64)
                | (Self::Float32(_), DomainType::Float32)
                | (Self::Float64(_), DomainType::Float64)
                | (Self::Decimal(_), DomainType::Decimal { .. })
                | (Self::Text(_), DomainType::Text | DomainType::VarChar { .. })
                | (Self::Uuid(_), DomainType::Uuid)
                | (Self::Date(_), DomainType::Date)
                | (Self::Timestamp(_), DomainType::Timestamp)
                | (Self::TimestampTz(_), DomainType::TimestampTz)
                | (Self::Json(_), DomainType::Json | DomainType::Jsonb)
        )
    }

    /// Convert this value into the runtime representation of `domain_type`.
    ///
    /// Returns `None` when no lossless-enough conversion exists (for example a
    /// non-numeric string into an integer column).
    pub fn conform_to(self, domain_type: &DomainType) -> Option<Value> {
        if self.matches(domain_type) {
            return Some(self);
        }

        match (self, domain_type) {
            (v, DomainType::Int16) => v.as_i64().and_then(|i| i16::try_from(i).ok()).map(Value::Int16),
            (v, DomainType::Int32) => v.as_i64().and_then(|i| i32::try_from(i).ok()).map(Value::Int32),
            (v, DomainType::Int64) => v.as_i64().map(Value::Int64),
            (v, DomainType::Float32) => v.as_f64().map(|f| Value::Float32(f as f32)),
            (v, DomainType::Float64) => v.as_f64().map(Value::Float64),
            (v, DomainType::Decimal { scale, .. }) => v
                .as_f64()
                .map(|f| Value::Decimal(format!("{:.*}", *scale as usize, f))),
            (Value::Text(s), DomainType::Uuid) => Uuid::parse_str(&s).ok().map(Value::Uuid),
            (Value::Text(s), DomainType::Bool) => match s.to_ascii_lowercase().as_str() {
                "true" | "t" | "1" => Some(Value::Bool(true)),
                "false" | "f" | "0" => Some(Value::Bool(false)),
                _ => None,
            },
            (Value::TimestampTz(dt), DomainType::Timestamp) => Some(Value::Timestamp(dt.naive_utc())),
            (Value::TimestampTz(dt), DomainType::Date) => Some(Value::Date(dt.date_naive())),
            (Value::Timestamp(dt), DomainType::TimestampTz) => Some(Value::TimestampTz(dt.and_utc())),
            (Value::Timestamp(dt), DomainType::Date) => Some(Value::Date(dt.date())),
            (Value::Text(s), DomainType::TimestampTz) => DateTime::parse_from_rfc3339(&s)
                .ok()
                .map(|dt| Value::TimestampTz(dt.with_timezone(&Utc))),
            (Value::Text(s), DomainType::Timestamp) => DateTime::parse_from_rfc3339(&s)
                .ok()
                .map(|dt| Value::Timestamp(dt.naive_utc())),
            (Value::Text(s), DomainType::Date) => {
                NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok().map(Value::Date)
            }
            (Value::Text(s), DomainType::Json | DomainType::Jsonb) => Some(Value::Json(
                serde_json::from_str(&s).unwrap_or(serde_json::Value::String(s)),
            )),
            (v, ty) if ty.is_textual() => Some(Value::Text(v.to_string())),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int16(i) => write!(f, "{i}"),
            Self::Int32(i) => write!(f, "{i}"),
            Self::Int64(i) => write!(f, "{i}"),
            Self::Float32(v) => write!(f, "{v}"),
            Self::Float64(v) => write!(f, "{v}"),
            Self::Decimal(s) | Self::Text(s) => f.write_str(s),
            Self::Uuid(u) => write!(f, "{u}"),
            Self::Date(d) => write!(f, "{d}"),
            Self::Timestamp(ts) => write!(f, "{ts}"),
            Self::TimestampTz(ts) => write!(f, "{}", ts.to_rfc3339()),
            Self::Json(j) => write!(f, "{j}"),
            Self::Array(values) => {
                f.write_str("[")?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{v}")?;
                }
                f.write_str("]")
            }
        }
    }
}

/// A value paired with the domain type of the column it is bound to.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedValue {
    /// The declared column type
    pub domain_type: DomainType,
    /// The runtime value
    pub value: Value,
}

impl TypedValue {
    /// Create a new typed value.
    pub fn new(domain_type: DomainType, value: Value) -> Self {
        Self { domain_type, value }
    }

    /// Create a typed null.
    pub fn null(domain_type: DomainType) -> Self {
        Self::new(domain_type, Value::Null)
    }
}

/// One generated row: `(column, value)` pairs in active-schema order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Row {
    fields: Vec<(String, Value)>,
}

impl Row {
    /// Create an empty row with room for `capacity` fields.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: Vec::with_capacity(capacity),
        }
    }

    /// Append a field. Callers are responsible for name uniqueness.
    pub fn push(&mut self, name: impl Into<String>, value: Value) {
        self.fields.push((name.into(), value));
    }

    /// Get a field value by column name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    /// Column names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Values in column order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.fields.iter().map(|(_, value)| value)
    }

    /// Iterate over `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the row has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}
