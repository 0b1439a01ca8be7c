//! Randomness capability used by the plan generator
//!
//! The generator only ever asks for one weighted pick at a time, so the
//! abstraction is a single method. Tests substitute scripted sources.

use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of weighted random choices
pub trait RandomSource {
    /// Pick one index of `weights` with probability proportional to its weight.
    ///
    /// Returns `None` when there is nothing to pick from (empty slice or all
    /// weights zero).
    fn pick_weighted(&mut self, weights: &[u32]) -> Option<usize>;
}

/// [`RandomSource`] backed by any `rand` generator
#[derive(Debug, Clone)]
pub struct RngSource<R> {
    rng: R,
}

impl<R: Rng> RngSource<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngSource<StdRng> {
    /// Fresh, non-reproducible source. Two plans generated from it differ.
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// Reproducible source for tests and `--seed`
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> RandomSource for RngSource<R> {
    fn pick_weighted(&mut self, weights: &[u32]) -> Option<usize> {
        let distribution = WeightedIndex::new(weights).ok()?;
        Some(distribution.sample(&mut self.rng))
    }
}
