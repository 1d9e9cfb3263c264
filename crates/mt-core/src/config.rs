//! Top-level simulation configuration.

use crate::{CoreError, CoreResult, StreetPriorities, Tick};

/// Configuration shared by the graph generator and the simulation runner.
///
/// Loading it from a file is left to the application; with the `serde`
/// feature the struct derives `Deserialize` for that purpose.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimConfig {
    /// Length of one lane cell in metres.  Default: 7.5.
    pub meters_per_cell: f32,

    /// Street class → priority level table.
    pub street_priorities: StreetPriorities,

    /// Master RNG seed.  The same seed always produces identical results.
    pub seed: u64,

    /// Total ticks to simulate with `Sim::run`.
    pub total_ticks: u64,

    /// Worker thread count for the sharded executor.  `Some(1)` selects the
    /// sequential executor; `None` uses all logical cores.
    pub num_threads: Option<usize>,

    /// Number of shards the vehicle and node sets are cut into per phase.
    /// `0` means one shard per worker thread.
    pub shards: usize,

    /// Deliver a snapshot to observers every N ticks (0 disables snapshots).
    pub report_interval_ticks: u64,
}

impl SimConfig {
    /// The tick at which `Sim::run` stops (exclusive upper bound).
    #[inline]
    pub fn end_tick(&self) -> Tick {
        Tick(self.total_ticks)
    }

    /// Reject values that would make the discretisation meaningless.
    pub fn validate(&self) -> CoreResult<()> {
        if !(self.meters_per_cell.is_finite() && self.meters_per_cell > 0.0) {
            return Err(CoreError::Config(format!(
                "meters_per_cell must be positive, got {}",
                self.meters_per_cell
            )));
        }
        if self.num_threads == Some(0) {
            return Err(CoreError::Config("num_threads must not be 0".into()));
        }
        Ok(())
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            meters_per_cell:       7.5,
            street_priorities:     StreetPriorities::default(),
            seed:                  42,
            total_ticks:           3_600,
            num_threads:           None,
            shards:                0,
            report_interval_ticks: 0,
        }
    }
}
