//! Deterministic per-controller RNG.
//!
//! # Determinism strategy
//!
//! Each controller gets its own independent `SmallRng` seeded by:
//!
//!   seed = global_seed XOR (controller_id * MIXING_CONSTANT)
//!
//! so a resistance roll made by one session never shifts the rolls of
//! another, and a run replays identically for the same seed and input.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::ControllerId;

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Per-controller deterministic RNG.
pub struct SessionRng(SmallRng);

impl SessionRng {
    /// Seed deterministically from the run's global seed and a controller id.
    pub fn new(global_seed: u64, controller: ControllerId) -> Self {
        let seed = global_seed ^ (controller.0 as u64).wrapping_mul(MIXING_CONSTANT);
        SessionRng(SmallRng::seed_from_u64(seed))
    }

    /// Sample a uniformly distributed value of any `Standard`-distributed type.
    #[inline]
    pub fn random<T>(&mut self) -> T
    where
        rand::distributions::Standard: rand::distributions::Distribution<T>,
    {
        self.0.r#gen()
    }

    /// `true` with probability `p` (clamped to [0, 1]).
    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }
}
