//! Parameters structure for the simulated robot

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;
use util::params::LoadError;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the simulation, from `sim.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {

    /// Radius of the circular track. The line is the edge of a dark disc of
    /// this radius.
    ///
    /// Units: meters
    pub track_radius_m: f64,

    /// Distance of the line sensor ahead of the wheel axle.
    ///
    /// Units: meters
    pub sensor_offset_m: f64,

    /// Width of the patch seen by the line sensor. The light value changes
    /// linearly while the edge is inside the patch.
    ///
    /// Units: meters
    pub sensor_footprint_m: f64,

    /// Fixed simulation step taken on every line sensor read. If not given the
    /// simulation advances by the real time elapsed between reads.
    ///
    /// Units: seconds
    #[serde(default)]
    pub time_step_s: Option<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Params {
    pub fn validate(&self) -> Result<(), LoadError> {
        let positive = [
            ("track_radius_m", self.track_radius_m),
            ("sensor_footprint_m", self.sensor_footprint_m),
            ("time_step_s", self.time_step_s.unwrap_or(1.0)),
        ];

        for (name, value) in positive.iter() {
            if !(*value > 0.0) || !value.is_finite() {
                return Err(LoadError::InvalidParam(format!(
                    "sim: {} must be positive (got {})", name, value
                )));
            }
        }

        if !self.sensor_offset_m.is_finite() {
            return Err(LoadError::InvalidParam(format!(
                "sim: sensor_offset_m must be finite (got {})", self.sensor_offset_m
            )));
        }

        Ok(())
    }
}
