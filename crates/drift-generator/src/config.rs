//! Generator configuration as written in simulation YAML files.

use crate::generators::numeric::integer_bounds;
use crate::generators::timestamp::TimestampBounds;
use drift_core::{ConfigError, DomainType};
use serde::{Deserialize, Serialize};

/// Generator configuration for a column.
///
/// This enum defines the different kinds of value producers available for
/// synthetic rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GeneratorConfig {
    /// Generate UUIDs (v4)
    UuidV4,

    /// Generate sequential integers
    Sequential {
        /// Starting value
        #[serde(default)]
        start: i64,
    },

    /// Generate values using a pattern with placeholders
    Pattern {
        /// Pattern string (supports {index}, {uuid}, {rand:N})
        pattern: String,
    },

    /// Generate random integers in a range
    IntRange {
        /// Minimum value (inclusive)
        min: i64,
        /// Maximum value (inclusive)
        max: i64,
    },

    /// Generate random floats in a range
    FloatRange {
        /// Minimum value (inclusive)
        min: f64,
        /// Maximum value (inclusive)
        max: f64,
    },

    /// Generate random decimals in a range
    DecimalRange {
        /// Minimum value (inclusive)
        min: f64,
        /// Maximum value (inclusive)
        max: f64,
    },

    /// Generate timestamps in a range
    TimestampRange {
        /// Start timestamp (ISO 8601)
        start: String,
        /// End timestamp (ISO 8601)
        end: String,
    },

    /// Current UTC timestamp at generation time.
    ///
    /// Not deterministic. Meant for `updated_at`/`created_at` style columns.
    TimestampNow,

    /// Generate weighted boolean values
    WeightedBool {
        /// Weight for true value (0.0 to 1.0)
        true_weight: f64,
    },

    /// Generate random selection from a pool of values
    OneOf {
        /// Pool of values to select from
        values: Vec<serde_yaml::Value>,
    },

    /// Generate a static value
    Static {
        /// The static value to use
        value: serde_yaml::Value,
    },

    /// Generate null values (for nullable columns)
    Null,
}

impl GeneratorConfig {
    /// Short name used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UuidV4 => "uuid_v4",
            Self::Sequential { .. } => "sequential",
            Self::Pattern { .. } => "pattern",
            Self::IntRange { .. } => "int_range",
            Self::FloatRange { .. } => "float_range",
            Self::DecimalRange { .. } => "decimal_range",
            Self::TimestampRange { .. } => "timestamp_range",
            Self::TimestampNow => "timestamp_now",
            Self::WeightedBool { .. } => "weighted_bool",
            Self::OneOf { .. } => "one_of",
            Self::Static { .. } => "static",
            Self::Null => "null",
        }
    }

    /// Check parameters and compatibility with the column's domain type.
    ///
    /// `one_of`, `static` and `null` are only checked at generation time
    /// because their values come from free-form YAML.
    pub fn validate(&self, column: &str, domain_type: &DomainType) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidGenerator {
            column: column.to_string(),
            reason,
        };

        match self {
            Self::IntRange { min, max } if min > max => {
                return Err(invalid(format!("int_range min {min} exceeds max {max}")))
            }
            Self::IntRange { min, max } => {
                if let Some((lo, hi)) = integer_bounds(domain_type) {
                    if *min < lo || *max > hi {
                        return Err(invalid(format!(
                            "int_range {min}..={max} does not fit {domain_type} ({lo}..={hi})"
                        )));
                    }
                }
            }
            Self::FloatRange { min, max } | Self::DecimalRange { min, max }
                if !min.is_finite() || !max.is_finite() =>
            {
                return Err(invalid(format!(
                    "{} bounds must be finite, got {min} and {max}",
                    self.kind()
                )))
            }
            Self::FloatRange { min, max } | Self::DecimalRange { min, max } if min > max => {
                return Err(invalid(format!(
                    "{} min {min} exceeds max {max}",
                    self.kind()
                )))
            }
            Self::FloatRange { min, max } | Self::DecimalRange { min, max }
                if !(max - min).is_finite() =>
            {
                return Err(invalid(format!(
                    "{} width {min}..={max} is not representable",
                    self.kind()
                )))
            }
            Self::TimestampRange { start, end } => {
                TimestampBounds::parse(start, end)
                    .map_err(|reason| invalid(format!("timestamp_range {reason}")))?;
            }
            Self::WeightedBool { true_weight } if !(0.0..=1.0).contains(true_weight) => {
                return Err(invalid(format!(
                    "weighted_bool true_weight {true_weight} is outside [0, 1]"
                )))
            }
            Self::OneOf { values } if values.is_empty() => {
                return Err(invalid("one_of needs at least one value".to_string()))
            }
            _ => {}
        }

        if self.supports(domain_type) {
            Ok(())
        } else {
            Err(invalid(format!(
                "{} cannot produce {domain_type} values",
                self.kind()
            )))
        }
    }

    /// Whether this generator can produce values for `domain_type`.
    pub fn supports(&self, domain_type: &DomainType) -> bool {
        use DomainType as T;

        if domain_type.is_textual() {
            return true;
        }

        match self {
            Self::UuidV4 => matches!(domain_type, T::Uuid),
            Self::Sequential { .. } | Self::IntRange { .. } => matches!(
                domain_type,
                T::Int16 | T::Int32 | T::Int64 | T::Float32 | T::Float64 | T::Decimal { .. }
            ),
            Self::FloatRange { .. } | Self::DecimalRange { .. } => {
                matches!(domain_type, T::Float32 | T::Float64 | T::Decimal { .. })
            }
            Self::TimestampRange { .. } | Self::TimestampNow => domain_type.is_temporal(),
            Self::WeightedBool { .. } => matches!(domain_type, T::Bool),
            // Pattern output is text; only uuid/json columns can still parse it.
            Self::Pattern { .. } => matches!(domain_type, T::Uuid | T::Json | T::Jsonb),
            Self::OneOf { .. } | Self::Static { .. } | Self::Null => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tagged_configs() {
        let config: GeneratorConfig =
            serde_yaml::from_str("{ type: int_range, min: 1, max: 5 }").unwrap();
        assert!(matches!(config, GeneratorConfig::IntRange { min: 1, max: 5 }));

        let config: GeneratorConfig = serde_yaml::from_str("type: uuid_v4").unwrap();
        assert!(matches!(config, GeneratorConfig::UuidV4));

        let config: GeneratorConfig = serde_yaml::from_str("type: sequential").unwrap();
        assert!(matches!(config, GeneratorConfig::Sequential { start: 0 }));

        let config: GeneratorConfig =
            serde_yaml::from_str("{ type: one_of, values: [NA, EU, ASIA] }").unwrap();
        if let GeneratorConfig::OneOf { values } = config {
            assert_eq!(values.len(), 3);
        } else {
            panic!("Expected OneOf");
        }
    }

    #[test]
    fn test_validate_ranges() {
        let bad = GeneratorConfig::IntRange { min: 10, max: 1 };
        assert!(matches!(
            bad.validate("quantity", &DomainType::Int32),
            Err(ConfigError::InvalidGenerator { .. })
        ));

        let bad = GeneratorConfig::FloatRange {
            min: f64::NAN,
            max: 1.0,
        };
        assert!(bad.validate("price", &DomainType::Float64).is_err());

        let bad = GeneratorConfig::WeightedBool { true_weight: 1.5 };
        assert!(bad.validate("refunded", &DomainType::Bool).is_err());

        let bad = GeneratorConfig::OneOf { values: vec![] };
        assert!(bad.validate("region", &DomainType::Text).is_err());
    }

    #[test]
    fn test_validate_rejects_unsampleable_real_ranges() {
        for (min, max) in [
            (f64::NEG_INFINITY, 1.0),
            (0.0, f64::INFINITY),
            (-1.0e308, 1.0e308),
        ] {
            for config in [
                GeneratorConfig::FloatRange { min, max },
                GeneratorConfig::DecimalRange { min, max },
            ] {
                assert!(
                    matches!(
                        config.validate("price", &DomainType::Float64),
                        Err(ConfigError::InvalidGenerator { .. })
                    ),
                    "{config:?} should be rejected"
                );
            }
        }
        assert!(GeneratorConfig::FloatRange {
            min: -1.0e300,
            max: 1.0e300
        }
        .validate("price", &DomainType::Float64)
        .is_ok());
    }

    #[test]
    fn test_validate_int_range_fits_column() {
        let config = GeneratorConfig::IntRange { min: 0, max: 40_000 };
        assert!(config.validate("qty", &DomainType::Int16).is_err());
        assert!(config.validate("qty", &DomainType::Int32).is_ok());
        assert!(config.validate("qty", &DomainType::Text).is_ok());
    }

    #[test]
    fn test_validate_timestamp_bounds() {
        let bad = GeneratorConfig::TimestampRange {
            start: "2024-13-01".to_string(),
            end: "2025-01-01".to_string(),
        };
        assert!(bad.validate("sold_at", &DomainType::Timestamp).is_err());

        let inverted = GeneratorConfig::TimestampRange {
            start: "2025-01-01".to_string(),
            end: "2024-01-01".to_string(),
        };
        assert!(inverted.validate("sold_at", &DomainType::Timestamp).is_err());
    }

    #[test]
    fn test_validate_type_compatibility() {
        assert!(GeneratorConfig::UuidV4
            .validate("id", &DomainType::Uuid)
            .is_ok());
        assert!(GeneratorConfig::UuidV4
            .validate("id", &DomainType::Int64)
            .is_err());
        assert!(GeneratorConfig::TimestampNow
            .validate("updated_at", &DomainType::Timestamp)
            .is_ok());
        assert!(GeneratorConfig::WeightedBool { true_weight: 0.3 }
            .validate("flag", &DomainType::Int32)
            .is_err());
        // Everything can be rendered into a text column.
        assert!(GeneratorConfig::IntRange { min: 0, max: 3 }
            .validate("code", &DomainType::VarChar { length: 8 })
            .is_ok());
    }
}
