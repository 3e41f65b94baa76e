//! Domain types for schema-drift columns.
//!
//! `DomainType` is the semantic tag carried by every column specification. It is
//! database-neutral: each SQL dialect maps it to a native type name through
//! [`crate::sql::SqlDialect`].

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

/// Semantic type of a column.
///
/// # YAML Format
///
/// Simple types can be specified as strings:
/// ```yaml
/// type: uuid
/// type: int
/// type: text
/// ```
///
/// Parameterized types use object format:
/// ```yaml
/// type:
///   type: var_char
///   length: 255
/// type:
///   type: decimal
///   precision: 10
///   scale: 2
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DomainType {
    /// Boolean value
    Bool,

    /// 16-bit signed integer
    Int16,

    /// 32-bit signed integer
    Int32,

    /// 64-bit signed integer
    Int64,

    /// 32-bit IEEE 754 floating point
    Float32,

    /// 64-bit IEEE 754 floating point
    Float64,

    /// Exact decimal with specified precision and scale
    Decimal {
        /// Total number of digits
        precision: u8,
        /// Number of digits after the decimal point
        scale: u8,
    },

    /// Variable-length character string with max length
    VarChar {
        /// Maximum length
        length: u16,
    },

    /// Unlimited text
    Text,

    /// UUID (128-bit)
    Uuid,

    /// Date only (YYYY-MM-DD)
    Date,

    /// Timestamp without timezone
    Timestamp,

    /// Timestamp with timezone
    TimestampTz,

    /// JSON document
    Json,

    /// Binary JSON (PostgreSQL JSONB)
    Jsonb,
}

impl DomainType {
    /// Short tag used in YAML and log output.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int16 => "small_int",
            Self::Int32 => "int",
            Self::Int64 => "big_int",
            Self::Float32 => "float",
            Self::Float64 => "double",
            Self::Decimal { .. } => "decimal",
            Self::VarChar { .. } => "var_char",
            Self::Text => "text",
            Self::Uuid => "uuid",
            Self::Date => "date",
            Self::Timestamp => "timestamp",
            Self::TimestampTz => "timestamp_tz",
            Self::Json => "json",
            Self::Jsonb => "jsonb",
        }
    }

    /// Whether values of this type are textual.
    pub fn is_textual(&self) -> bool {
        matches!(self, Self::Text | Self::VarChar { .. })
    }

    /// Whether values of this type are date/time values.
    pub fn is_temporal(&self) -> bool {
        matches!(self, Self::Date | Self::Timestamp | Self::TimestampTz)
    }
}

impl fmt::Display for DomainType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decimal { precision, scale } => write!(f, "decimal({precision},{scale})"),
            Self::VarChar { length } => write!(f, "var_char({length})"),
            other => f.write_str(other.tag()),
        }
    }
}

// Simple types serialize as a bare string ("uuid", "int"), parameterized
// types as a map ({"type": "var_char", "length": 255}).

impl Serialize for DomainType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeMap;

        match self {
            Self::Decimal { precision, scale } => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry("type", "decimal")?;
                map.serialize_entry("precision", precision)?;
                map.serialize_entry("scale", scale)?;
                map.end()
            }
            Self::VarChar { length } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("type", "var_char")?;
                map.serialize_entry("length", length)?;
                map.end()
            }
            simple => serializer.serialize_str(simple.tag()),
        }
    }
}

fn simple_type(name: &str) -> Option<DomainType> {
    match name {
        "bool" | "boolean" => Some(DomainType::Bool),
        "small_int" | "smallint" => Some(DomainType::Int16),
        "int" | "integer" => Some(DomainType::Int32),
        "big_int" | "bigint" => Some(DomainType::Int64),
        "float" => Some(DomainType::Float32),
        "double" => Some(DomainType::Float64),
        "text" => Some(DomainType::Text),
        "uuid" => Some(DomainType::Uuid),
        "date" => Some(DomainType::Date),
        "timestamp" | "date_time" | "datetime" => Some(DomainType::Timestamp),
        "timestamp_tz" | "timestamptz" => Some(DomainType::TimestampTz),
        "json" => Some(DomainType::Json),
        "jsonb" => Some(DomainType::Jsonb),
        _ => None,
    }
}

impl<'de> Deserialize<'de> for DomainType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{Error, MapAccess, Visitor};

        struct DomainTypeVisitor;

        impl<'de> Visitor<'de> for DomainTypeVisitor {
            type Value = DomainType;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string or map representing a DomainType")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: Error,
            {
                simple_type(value).ok_or_else(|| E::custom(format!("unknown simple type: {value}")))
            }

            fn visit_map<M>(self, mut map: M) -> Result<Self::Value, M::Error>
            where
                M: MapAccess<'de>,
            {
                let mut type_name: Option<String> = None;
                let mut fields: HashMap<String, serde_yaml::Value> = HashMap::new();

                while let Some(key) = map.next_key::<String>()? {
                    if key == "type" {
                        type_name = Some(map.next_value()?);
                    } else {
                        fields.insert(key, map.next_value()?);
                    }
                }

                let type_name = type_name.ok_or_else(|| M::Error::missing_field("type"))?;

                match type_name.as_str() {
                    "decimal" | "numeric" => {
                        let precision = get_field_required(&fields, "precision")?;
                        let scale = get_field_required(&fields, "scale")?;
                        Ok(DomainType::Decimal { precision, scale })
                    }
                    "var_char" | "varchar" => {
                        let length = get_field_required(&fields, "length")?;
                        Ok(DomainType::VarChar { length })
                    }
                    other => simple_type(other)
                        .ok_or_else(|| M::Error::custom(format!("unknown type: {other}"))),
                }
            }
        }

        deserializer.deserialize_any(DomainTypeVisitor)
    }
}

fn get_field_required<T: for<'de> Deserialize<'de>, E: serde::de::Error>(
    fields: &HashMap<String, serde_yaml::Value>,
    key: &'static str,
) -> Result<T, E> {
    let value = fields.get(key).ok_or_else(|| E::missing_field(key))?;
    serde_yaml::from_value(value.clone())
        .map_err(|e| E::custom(format!("invalid field '{key}': {e}")))
}
