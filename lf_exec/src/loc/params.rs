//! Parameters structure for localisation

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;
use util::params::LoadError;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for wheel odometry.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {

    /// Distance between the contact points of the two drive wheels.
    ///
    /// Units: meters
    pub wheel_base_m: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Params {
    /// Check the parameters are physically meaningful.
    pub fn validate(&self) -> Result<(), LoadError> {
        if !(self.wheel_base_m > 0.0) || !self.wheel_base_m.is_finite() {
            return Err(LoadError::InvalidParam(format!(
                "loc: wheel_base_m must be positive (got {})",
                self.wheel_base_m
            )));
        }

        Ok(())
    }
}
