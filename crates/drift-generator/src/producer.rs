//! Column producers backed by generator configurations.
//!
//! Each producer owns its own seeded `StdRng` and call index, so the values of
//! one column do not depend on how often other columns were asked to produce.

use crate::config::GeneratorConfig;
use crate::generators::generate_value;
use drift_core::{ConfigError, DomainType, Producer, ProducerError};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::{Arc, Mutex};

struct ProducerState {
    rng: StdRng,
    index: u64,
}

/// Derive a per-column seed from the run seed and the column's catalog position.
pub fn column_seed(base: u64, position: usize) -> u64 {
    base.wrapping_add((position as u64).wrapping_mul(0x9E3779B97F4A7C15))
}

/// Build a producer for `column` from its generator configuration.
///
/// Every produced value is conformed to `domain_type`; a value that cannot be
/// represented in that type is reported as a [`ProducerError`].
pub fn build_producer(
    column: &str,
    config: &GeneratorConfig,
    domain_type: &DomainType,
    seed: u64,
) -> Result<Producer, ConfigError> {
    config.validate(column, domain_type)?;

    let config = config.clone();
    let domain_type = domain_type.clone();
    let column = column.to_string();
    let state = Mutex::new(ProducerState {
        rng: StdRng::seed_from_u64(seed),
        index: 0,
    });

    Ok(Arc::new(move || {
        let raw = {
            let mut state = state
                .lock()
                .map_err(|_| ProducerError::new(format!("producer for '{column}' is poisoned")))?;
            let index = state.index;
            state.index += 1;
            generate_value(&config, &domain_type, &mut state.rng, index)
        };

        let shown = raw.to_string();
        raw.conform_to(&domain_type).ok_or_else(|| {
            ProducerError::new(format!(
                "{} generator for '{column}' produced '{shown}', which is not a valid {domain_type}",
                config.kind()
            ))
        })
    }))
}
