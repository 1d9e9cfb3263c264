//! Deterministic per-vehicle and simulation-level RNG wrappers.
//!
//! # Determinism strategy
//!
//! A vehicle's random draws in tick `t` come from a `SmallRng` seeded by:
//!
//!   seed = global_seed XOR (vehicle_id + 1) * MIXING_CONSTANT
//!                      XOR (tick + 1) * TICK_MIXING_CONSTANT
//!
//! The stream is re-derived every tick instead of being carried along, so:
//!
//! - Vehicles never share RNG state (no contention, no ordering dependency).
//! - How the vehicle population is split into shards cannot change any draw.
//! - An interrupted tick can be retried and draws exactly the same values,
//!   because no RNG state was advanced by the aborted attempt.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::{Tick, VehicleId};

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Second odd constant (from SplitMix64) so tick and vehicle terms differ.
const TICK_MIXING_CONSTANT: u64 = 0xbf58_476d_1ce4_e5b9;

// ── VehicleRng ────────────────────────────────────────────────────────────────

/// Deterministic RNG for one vehicle during one tick.
pub struct VehicleRng(SmallRng);

impl VehicleRng {
    /// Seed from the run's global seed, the vehicle and the tick.
    pub fn for_tick(global_seed: u64, vehicle: VehicleId, tick: Tick) -> Self {
        let seed = global_seed
            ^ (vehicle.0 as u64 + 1).wrapping_mul(MIXING_CONSTANT)
            ^ (tick.0.wrapping_add(1)).wrapping_mul(TICK_MIXING_CONSTANT);
        VehicleRng(SmallRng::seed_from_u64(seed))
    }

    /// Expose the inner `SmallRng` for use with `rand` distribution types.
    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    /// `true` with probability `p` (clamped to [0, 1]).
    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }

    /// Sample a uniformly distributed value of any `Standard`-distributed type.
    #[inline]
    pub fn random<T>(&mut self) -> T
    where
        rand::distributions::Standard: rand::distributions::Distribution<T>,
    {
        self.0.r#gen()
    }
}

// ── SimRng ────────────────────────────────────────────────────────────────────

/// Simulation-level RNG for scenario generation (random trips, departure
/// times).  Used only in single-threaded set-up code.
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }

    /// Choose a random element from a slice.  `None` if the slice is empty.
    #[inline]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose(&mut self.0)
    }
}
