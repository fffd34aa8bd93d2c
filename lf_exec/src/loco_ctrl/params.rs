//! Parameters structure for LocoCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;
use util::params::LoadError;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for Locomotion control.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {

    // ---- CAPABILITIES ----

    /// Minimum wheel speed demand (lowest value, negative values allow reversing)
    ///
    /// Units: meters/second
    pub min_speed_ms: f64,

    /// Maximum wheel speed demand
    ///
    /// Units: meters/second
    pub max_speed_ms: f64
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Params {
    /// Check the parameters are consistent.
    pub fn validate(&self) -> Result<(), LoadError> {
        if !(self.min_speed_ms <= self.max_speed_ms) {
            return Err(LoadError::InvalidParam(format!(
                "loco_ctrl: min_speed_ms ({}) must not be greater than max_speed_ms ({})",
                self.min_speed_ms, self.max_speed_ms
            )));
        }

        Ok(())
    }
}
