// src/rng.rs
//! Random sources for Monte Carlo pricing
//!
//! # Design
//!
//! The engine never touches global random state. Callers hand it a
//! [`NormalSource`], a stream of standard-normal variates:
//! 1. **Reproducibility**: a seeded generator gives the same estimate every run
//! 2. **Testability**: [`ReplaySource`] feeds a fixed sequence of draws
//! 3. **Parallel safety**: [`RngFactory`] derives one independent generator per trial
//!
//! Every `rand::Rng` is a `NormalSource` through the blanket impl, sampling
//! `rand_distr::StandardNormal` (Ziggurat).

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, StandardNormal};

/// Seed used when the caller does not pick one
pub const DEFAULT_SEED: u64 = 42;

/// A stream of independent N(0,1) draws
pub trait NormalSource {
    fn next_normal(&mut self) -> f64;
}

impl<R: Rng + ?Sized> NormalSource for R {
    fn next_normal(&mut self) -> f64 {
        StandardNormal.sample(self)
    }
}

/// Replays a fixed list of normal draws, cycling when exhausted
///
/// Used to drive the engine with hand-picked `Z` values. Tracks how many
/// draws were taken so tests can check that nothing was consumed.
#[derive(Debug, Clone)]
pub struct ReplaySource {
    draws: Vec<f64>,
    position: usize,
    consumed: usize,
}

impl ReplaySource {
    /// Panics if `draws` is empty
    pub fn new(draws: Vec<f64>) -> Self {
        assert!(!draws.is_empty(), "ReplaySource needs at least one draw");
        Self {
            draws,
            position: 0,
            consumed: 0,
        }
    }

    /// Always returns the same draw
    pub fn constant(z: f64) -> Self {
        Self::new(vec![z])
    }

    pub fn consumed(&self) -> usize {
        self.consumed
    }
}

impl NormalSource for ReplaySource {
    fn next_normal(&mut self) -> f64 {
        let z = self.draws[self.position];
        self.position = (self.position + 1) % self.draws.len();
        self.consumed += 1;
        z
    }
}

/// RNG factory for reproducible parallel simulations
///
/// Trial `i` always gets the generator seeded with `base_seed + i`, so
/// results do not depend on how rayon splits the work.
#[derive(Debug, Clone, Copy)]
pub struct RngFactory {
    base_seed: u64,
}

impl RngFactory {
    pub fn new(base_seed: u64) -> Self {
        Self { base_seed }
    }

    /// Create the generator for a specific trial
    pub fn trial_rng(&self, trial: u64) -> StdRng {
        StdRng::seed_from_u64(self.base_seed.wrapping_add(trial))
    }
}

pub fn seed_rng_from_u64(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}
