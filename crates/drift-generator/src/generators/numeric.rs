//! Numeric ranges sampled straight into the column's type.
//!
//! Integer columns get their own width, decimal columns get their own scale.
//! Columns of any other type (text, mostly) get the widest natural value and
//! are converted when the producer conforms it.

use drift_core::{DomainType, Value};
use rand::Rng;

/// Scale used for `decimal_range` when the column itself has none.
pub const DEFAULT_DECIMAL_SCALE: u8 = 2;

/// Integer drawn from `min..=max`.
///
/// A draw outside the column's integer width stays `Int64` and is rejected
/// when conformed; config validation keeps the bounds inside the width.
pub fn int_in_range<R: Rng>(rng: &mut R, min: i64, max: i64, domain_type: &DomainType) -> Value {
    let n = rng.gen_range(min..=max);
    match domain_type {
        DomainType::Int16 => i16::try_from(n).map_or(Value::Int64(n), Value::Int16),
        DomainType::Int32 => i32::try_from(n).map_or(Value::Int64(n), Value::Int32),
        DomainType::Float32 => Value::Float32(n as f32),
        DomainType::Float64 => Value::Float64(n as f64),
        DomainType::Decimal { scale, .. } => decimal_text(n as f64, *scale),
        _ => Value::Int64(n),
    }
}

/// Real number drawn from `min..=max`, as a float unless the column is decimal.
pub fn float_in_range<R: Rng>(rng: &mut R, min: f64, max: f64, domain_type: &DomainType) -> Value {
    let x = rng.gen_range(min..=max);
    match domain_type {
        DomainType::Float32 => Value::Float32(x as f32),
        DomainType::Decimal { scale, .. } => decimal_text(x, *scale),
        _ => Value::Float64(x),
    }
}

/// Real number drawn from `min..=max`, as a decimal unless the column is float.
pub fn decimal_in_range<R: Rng>(
    rng: &mut R,
    min: f64,
    max: f64,
    domain_type: &DomainType,
) -> Value {
    let x = rng.gen_range(min..=max);
    match domain_type {
        DomainType::Float32 => Value::Float32(x as f32),
        DomainType::Float64 => Value::Float64(x),
        DomainType::Decimal { scale, .. } => decimal_text(x, *scale),
        _ => decimal_text(x, DEFAULT_DECIMAL_SCALE),
    }
}

/// Largest magnitude `int_range` may use for an integer column.
pub fn integer_bounds(domain_type: &DomainType) -> Option<(i64, i64)> {
    match domain_type {
        DomainType::Int16 => Some((i16::MIN.into(), i16::MAX.into())),
        DomainType::Int32 => Some((i32::MIN.into(), i32::MAX.into())),
        DomainType::Int64 => Some((i64::MIN, i64::MAX)),
        _ => None,
    }
}

fn decimal_text(x: f64, scale: u8) -> Value {
    Value::Decimal(format!("{:.*}", scale as usize, x))
}
