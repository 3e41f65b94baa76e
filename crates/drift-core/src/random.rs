//! Injected randomness.
//!
//! Every uniform draw and uniform choice in the engine goes through a
//! [`RandomSource`], so tests can substitute deterministic sequences.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

/// Source of uniform draws and uniform choices.
pub trait RandomSource: Send {
    /// Uniform draw in `[0, 1)`.
    fn next_f64(&mut self) -> f64;

    /// Uniform index in `0..len`. `len` is always greater than zero.
    fn choose_index(&mut self, len: usize) -> usize;

    /// `amount` distinct indices from `0..len`, sampled without replacement.
    ///
    /// `amount` is clamped to `len`. The default implementation is a partial
    /// Fisher-Yates shuffle driven by [`RandomSource::choose_index`].
    fn sample_indices(&mut self, len: usize, amount: usize) -> Vec<usize> {
        let amount = amount.min(len);
        let mut indices: Vec<usize> = (0..len).collect();
        for i in 0..amount {
            let j = i + self.choose_index(len - i);
            indices.swap(i, j);
        }
        indices.truncate(amount);
        indices
    }
}

/// Pick one element uniformly, or `None` if `items` is empty.
pub fn choose<'a, T>(rng: &mut dyn RandomSource, items: &'a [T]) -> Option<&'a T> {
    if items.is_empty() {
        return None;
    }
    items.get(rng.choose_index(items.len()))
}

/// Seeded pseudo-random source backed by `StdRng`.
///
/// The same seed yields the same sequence of decisions.
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Seed from OS entropy.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_f64(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    fn choose_index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }

    fn sample_indices(&mut self, len: usize, amount: usize) -> Vec<usize> {
        rand::seq::index::sample(&mut self.rng, len, amount.min(len)).into_vec()
    }
}

/// Deterministic source that always picks the first candidate.
///
/// Every draw returns the configured value (0.0 by default), so probability
/// checks of the form `draw < p` pass for any `p > 0`.
#[derive(Debug, Clone, Default)]
pub struct FirstChoiceRandom {
    draw: f64,
}

impl FirstChoiceRandom {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a fixed draw value instead of 0.0.
    pub fn with_draw(draw: f64) -> Self {
        Self { draw }
    }
}

impl RandomSource for FirstChoiceRandom {
    fn next_f64(&mut self) -> f64 {
        self.draw
    }

    fn choose_index(&mut self, _len: usize) -> usize {
        0
    }
}

/// Replays scripted draws and choices, then falls back to 0.0 / index 0.
///
/// Scripted choices larger than the candidate count wrap around.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRandom {
    draws: VecDeque<f64>,
    choices: VecDeque<usize>,
}

impl ScriptedRandom {
    pub fn new(draws: impl IntoIterator<Item = f64>, choices: impl IntoIterator<Item = usize>) -> Self {
        Self {
            draws: draws.into_iter().collect(),
            choices: choices.into_iter().collect(),
        }
    }

    /// Remaining scripted draws.
    pub fn remaining_draws(&self) -> usize {
        self.draws.len()
    }

    /// Remaining scripted choices.
    pub fn remaining_choices(&self) -> usize {
        self.choices.len()
    }
}

impl RandomSource for ScriptedRandom {
    fn next_f64(&mut self) -> f64 {
        self.draws.pop_front().unwrap_or(0.0)
    }

    fn choose_index(&mut self, len: usize) -> usize {
        self.choices.pop_front().map(|c| c % len).unwrap_or(0)
    }
}
