//! Individual value generators for different data types.
//!
//! This module provides the generation logic for each kind of value based on
//! the generator configuration of a column.

pub mod numeric;
pub mod pattern;
pub mod static_value;
pub mod timestamp;

use crate::config::GeneratorConfig;
use chrono::Utc;
use drift_core::{DomainType, Value};
use rand::Rng;
use timestamp::{temporal_value, TimestampBounds};
use uuid::Uuid;

/// Generate a value for a column of `domain_type`.
///
/// `index` is the number of values the calling producer has generated so far.
/// Numeric and temporal generators already answer in the column's type; the
/// rest are conformed by the producer.
pub fn generate_value<R: Rng>(
    config: &GeneratorConfig,
    domain_type: &DomainType,
    rng: &mut R,
    index: u64,
) -> Value {
    match config {
        GeneratorConfig::UuidV4 => Value::Uuid(random_uuid(rng)),

        GeneratorConfig::Sequential { start } => Value::Int64(start.wrapping_add(index as i64)),

        GeneratorConfig::Pattern { pattern } => pattern::generate_pattern(pattern, rng, index),

        GeneratorConfig::IntRange { min, max } => {
            numeric::int_in_range(rng, *min, *max, domain_type)
        }

        GeneratorConfig::FloatRange { min, max } => {
            numeric::float_in_range(rng, *min, *max, domain_type)
        }

        GeneratorConfig::DecimalRange { min, max } => {
            numeric::decimal_in_range(rng, *min, *max, domain_type)
        }

        // Bounds are checked by `GeneratorConfig::validate`.
        GeneratorConfig::TimestampRange { start, end } => match TimestampBounds::parse(start, end) {
            Ok(bounds) => temporal_value(bounds.sample(rng), domain_type),
            Err(_) => Value::Null,
        },

        GeneratorConfig::TimestampNow => temporal_value(Utc::now(), domain_type),

        GeneratorConfig::WeightedBool { true_weight } => Value::Bool(rng.gen_bool(*true_weight)),

        GeneratorConfig::OneOf { values } => {
            if values.is_empty() {
                Value::Null
            } else {
                let idx = rng.gen_range(0..values.len());
                static_value::yaml_to_value(&values[idx])
            }
        }

        GeneratorConfig::Static { value } => static_value::yaml_to_value(value),

        GeneratorConfig::Null => Value::Null,
    }
}

/// Random v4 UUID drawn from `rng`, so seeded producers stay reproducible.
pub fn random_uuid<R: Rng>(rng: &mut R) -> Uuid {
    let mut bytes = [0u8; 16];
    rng.fill(&mut bytes);
    uuid::Builder::from_random_bytes(bytes).into_uuid()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_sequential_uses_index() {
        let mut rng = StdRng::seed_from_u64(1);
        let config = GeneratorConfig::Sequential { start: 100 };
        assert_eq!(generate_value(&config, &DomainType::Int64, &mut rng, 0), Value::Int64(100));
        assert_eq!(generate_value(&config, &DomainType::Int64, &mut rng, 7), Value::Int64(107));
    }

    #[test]
    fn test_one_of_picks_from_pool() {
        let mut rng = StdRng::seed_from_u64(1);
        let config: GeneratorConfig =
            serde_yaml::from_str("{ type: one_of, values: [bike, drone, pickup] }").unwrap();

        for i in 0..20 {
            let value = generate_value(&config, &DomainType::Text, &mut rng, i);
            let text = value.as_str().expect("one_of over strings yields text");
            assert!(["bike", "drone", "pickup"].contains(&text));
        }
    }

    #[test]
    fn test_weighted_bool_extremes() {
        let mut rng = StdRng::seed_from_u64(1);
        let always = GeneratorConfig::WeightedBool { true_weight: 1.0 };
        let never = GeneratorConfig::WeightedBool { true_weight: 0.0 };
        for i in 0..10 {
            assert_eq!(generate_value(&always, &DomainType::Bool, &mut rng, i), Value::Bool(true));
            assert_eq!(generate_value(&never, &DomainType::Bool, &mut rng, i), Value::Bool(false));
        }
    }

    #[test]
    fn test_null_and_static() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            generate_value(&GeneratorConfig::Null, &DomainType::Date, &mut rng, 0),
            Value::Null
        );
        let config: GeneratorConfig =
            serde_yaml::from_str("{ type: static, value: NONE }").unwrap();
        assert_eq!(
            generate_value(&config, &DomainType::Text, &mut rng, 0),
            Value::Text("NONE".to_string())
        );
    }

    #[test]
    fn test_uuid_is_v4_and_seeded() {
        let mut a = StdRng::seed_from_u64(9);
        let mut b = StdRng::seed_from_u64(9);
        let first = random_uuid(&mut a);
        assert_eq!(first.get_version_num(), 4);
        assert_eq!(first, random_uuid(&mut b));
        assert_ne!(first, random_uuid(&mut a));
    }

    #[test]
    fn test_timestamp_generators_answer_in_column_type() {
        let mut rng = StdRng::seed_from_u64(1);
        let range: GeneratorConfig =
            serde_yaml::from_str("{ type: timestamp_range, start: 2023-01-01, end: 2023-12-31 }")
                .unwrap();
        for domain_type in [DomainType::Date, DomainType::Timestamp, DomainType::TimestampTz] {
            let sampled = generate_value(&range, &domain_type, &mut rng, 0);
            let now = generate_value(&GeneratorConfig::TimestampNow, &domain_type, &mut rng, 0);
            assert!(sampled.matches(&domain_type), "{sampled:?} for {domain_type}");
            assert!(now.matches(&domain_type), "{now:?} for {domain_type}");
        }
    }
}
