//! Injectable randomness for turn processing.
//!
//! Every random roll in a turn is drawn from a stream keyed by (system, turn, settlement),
//! so the outcome for one settlement never depends on how many rolls another one made.

use std::fmt;

use rand::rngs::mock::StepRng;
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Identifier a system uses to key its random streams.
pub type SystemId = u32;

pub trait RngSource: fmt::Debug {
    fn stream(&self, system: SystemId, turn: u32, entity: u64) -> Box<dyn RngCore>;
}

/// ChaCha8 streams derived from a master seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeededRng {
    master_seed: u64,
}

impl SeededRng {
    pub fn new(seed: u64) -> Self {
        Self { master_seed: seed }
    }

    pub fn seed(&self) -> u64 {
        self.master_seed
    }

    fn derive_seed(&self, system: SystemId, turn: u32, entity: u64) -> u64 {
        let mut seed = self.master_seed;
        seed = seed
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        seed ^= u64::from(system).wrapping_mul(1103515245);
        seed = seed
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        seed ^= entity.wrapping_mul(48271);
        seed = seed
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        seed ^= u64::from(turn).wrapping_mul(69069);
        seed
    }
}

impl Default for SeededRng {
    fn default() -> Self {
        Self::new(42)
    }
}

impl RngSource for SeededRng {
    fn stream(&self, system: SystemId, turn: u32, entity: u64) -> Box<dyn RngCore> {
        Box::new(ChaCha8Rng::seed_from_u64(
            self.derive_seed(system, turn, entity),
        ))
    }
}

/// Constant streams for tests: every roll either lands or misses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedRng {
    word: u64,
}

impl FixedRng {
    /// Every `chance(p)` with `p > 0` succeeds.
    pub fn always() -> Self {
        Self { word: 0 }
    }

    /// Every `chance(p)` with `p < 1` fails.
    pub fn never() -> Self {
        Self { word: u64::MAX }
    }
}

impl RngSource for FixedRng {
    fn stream(&self, _system: SystemId, _turn: u32, _entity: u64) -> Box<dyn RngCore> {
        Box::new(StepRng::new(self.word, 0))
    }
}

pub trait RngExt {
    fn chance(&mut self, probability: f64) -> bool;
}

impl<R: Rng + ?Sized> RngExt for R {
    fn chance(&mut self, probability: f64) -> bool {
        self.gen::<f64>() < probability
    }
}
