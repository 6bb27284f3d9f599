//! Seedable random sequence shared by every derivation of one engine.

use std::fmt;

use rand::SeedableRng;
use rand::distr::{Distribution, StandardUniform};
use rand::rngs::StdRng;

/// A reproducible stream of uniform reals in `[0, 1)`.
///
/// The same seed and the same sequence of calls always yield the same
/// values. The stream only moves forward; replaying it means building a new
/// sequence from the same seed.
pub struct RandomSequence {
    rng: StdRng,
    seed: u64,
    draws: u64,
}

impl RandomSequence {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed,
            draws: 0,
        }
    }

    /// Seed from the thread RNG. The chosen seed is available via
    /// [`RandomSequence::seed`] so the run can be replayed.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }

    pub fn next_real(&mut self) -> f64 {
        self.draws += 1;
        StandardUniform.sample(&mut self.rng)
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of values drawn so far.
    #[must_use]
    pub fn draws(&self) -> u64 {
        self.draws
    }
}

impl fmt::Debug for RandomSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RandomSequence")
            .field("seed", &self.seed)
            .field("draws", &self.draws)
            .finish_non_exhaustive()
    }
}
