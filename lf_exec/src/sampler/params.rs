//! Parameters structure for the sensor sampler

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;
use util::params::LoadError;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Sensor calibration parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {

    // ---- LINE SENSOR ----

    /// Lowest raw light value the sensor can legitimately produce. Readings
    /// below this are faults.
    pub light_raw_min: f64,

    /// Highest raw light value the sensor can legitimately produce. Readings
    /// above this are faults.
    pub light_raw_max: f64,

    /// Raw light value seen with the sensor fully over the line, maps to a
    /// line error of -1.
    pub light_black: f64,

    /// Raw light value seen with the sensor fully off the line, maps to a
    /// line error of +1.
    pub light_white: f64,

    // ---- ENCODERS ----

    /// Distance travelled by a wheel per encoder tick.
    ///
    /// Units: meters/tick
    pub m_per_tick: f64,

    /// Largest change in either encoder count that is physically possible
    /// within one cycle. Larger jumps are treated as invalid readings.
    pub max_ticks_per_cycle: i64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Params {
    /// Check the calibration is usable.
    pub fn validate(&self) -> Result<(), LoadError> {
        if !(self.light_raw_min < self.light_raw_max) {
            return Err(LoadError::InvalidParam(format!(
                "sampler: light_raw_min ({}) must be less than light_raw_max ({})",
                self.light_raw_min, self.light_raw_max
            )));
        }

        if !(self.light_black - self.light_white).is_normal() {
            return Err(LoadError::InvalidParam(format!(
                "sampler: light_black ({}) and light_white ({}) must differ",
                self.light_black, self.light_white
            )));
        }

        if !(self.m_per_tick > 0.0) || !self.m_per_tick.is_finite() {
            return Err(LoadError::InvalidParam(format!(
                "sampler: m_per_tick must be positive (got {})",
                self.m_per_tick
            )));
        }

        if self.max_ticks_per_cycle <= 0 {
            return Err(LoadError::InvalidParam(format!(
                "sampler: max_ticks_per_cycle must be positive (got {})",
                self.max_ticks_per_cycle
            )));
        }

        Ok(())
    }
}
