//! The `DrivingModel` trait: the per-vehicle velocity rule.

use mt_core::VehicleRng;

/// Pluggable cellular driving rule.
///
/// The step executor calls the four stages in order for every vehicle on
/// the network, once per tick:
///
/// ```text
/// v1   = accelerate(v0, v_max)
/// seen = dash(gap)           // gap = free cells ahead, see mt-sim
/// v2   = brake(v1, seen)
/// v3   = dawdle(v2, rng)
/// ```
///
/// The result must never exceed `gap`; the executor clamps it anyway.
///
/// # Thread safety
///
/// Stages may be called for many vehicles in parallel, so implementations
/// must be `Send + Sync` and keep no per-vehicle state.  Randomness comes
/// only from the supplied [`VehicleRng`], which is derived from (seed,
/// vehicle, tick) and so identical however the work is split.
pub trait DrivingModel: Send + Sync + 'static {
    /// Speed up by one cell per tick, up to the edge limit.
    fn accelerate(&self, velocity: u32, max_velocity: u32) -> u32 {
        (velocity + 1).min(max_velocity)
    }

    /// Look ahead: the cells this vehicle counts as free.  Values above
    /// `gap` are ignored.
    fn dash(&self, gap: u32) -> u32 {
        gap
    }

    /// Slow down to avoid driving into the next obstacle.
    fn brake(&self, velocity: u32, gap: u32) -> u32 {
        velocity.min(gap)
    }

    /// Random slowdown.
    fn dawdle(&self, velocity: u32, rng: &mut VehicleRng) -> u32;

    /// All four stages.
    fn next_velocity(&self, velocity: u32, max_velocity: u32, gap: u32, rng: &mut VehicleRng) -> u32 {
        let v = self.accelerate(velocity, max_velocity);
        let seen = self.dash(gap).min(gap);
        let v = self.brake(v, seen);
        self.dawdle(v, rng).min(seen)
    }
}
