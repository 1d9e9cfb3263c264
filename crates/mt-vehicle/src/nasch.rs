//! Nagel–Schreckenberg driving rule.

use mt_core::{CoreError, CoreResult, VehicleRng};

use crate::model::DrivingModel;

/// Classic Nagel–Schreckenberg: accelerate, brake to the gap, and with
/// probability `p` drop one cell per tick.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct NagelSchreckenberg {
    dawdle_probability: f64,
}

impl NagelSchreckenberg {
    pub const DEFAULT_DAWDLE_PROBABILITY: f64 = 0.2;

    pub fn new(dawdle_probability: f64) -> CoreResult<Self> {
        if !(0.0..=1.0).contains(&dawdle_probability) {
            return Err(CoreError::Config(format!(
                "dawdle probability must lie in [0, 1], got {dawdle_probability}"
            )));
        }
        Ok(Self { dawdle_probability })
    }

    /// No dawdling: vehicles always drive as fast as the gap allows.
    pub fn deterministic() -> Self {
        Self { dawdle_probability: 0.0 }
    }

    #[inline]
    pub fn dawdle_probability(&self) -> f64 {
        self.dawdle_probability
    }
}

impl Default for NagelSchreckenberg {
    fn default() -> Self {
        Self { dawdle_probability: Self::DEFAULT_DAWDLE_PROBABILITY }
    }
}

impl DrivingModel for NagelSchreckenberg {
    fn dawdle(&self, velocity: u32, rng: &mut VehicleRng) -> u32 {
        if velocity > 0 && rng.gen_bool(self.dawdle_probability) {
            velocity - 1
        } else {
            velocity
        }
    }
}
