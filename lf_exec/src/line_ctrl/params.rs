//! Line control parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;
use util::params::LoadError;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for line control
#[derive(Deserialize, Debug, Clone)]
pub struct Params {

    /// Proportional gain
    pub k_p: f64,

    /// Integral gain
    pub k_i: f64,

    /// Derivative gain
    pub k_d: f64,

    /// Lower limit on the integral accumulator.
    ///
    /// Units: seconds (error is unitless)
    pub i_min: f64,

    /// Upper limit on the integral accumulator.
    ///
    /// Units: seconds (error is unitless)
    pub i_max: f64
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Params {
    /// Check the parameters are consistent.
    pub fn validate(&self) -> Result<(), LoadError> {
        if !(self.i_min <= self.i_max) {
            return Err(LoadError::InvalidParam(format!(
                "line_ctrl: i_min ({}) must not be greater than i_max ({})",
                self.i_min, self.i_max
            )));
        }

        // The integral starts at zero, so the limits must contain it
        if !(self.i_min <= 0.0 && 0.0 <= self.i_max) {
            return Err(LoadError::InvalidParam(format!(
                "line_ctrl: integral limits [{}, {}] must contain zero",
                self.i_min, self.i_max
            )));
        }

        for (name, gain) in [("k_p", self.k_p), ("k_i", self.k_i), ("k_d", self.k_d)].iter() {
            if !gain.is_finite() {
                return Err(LoadError::InvalidParam(format!(
                    "line_ctrl: {} must be finite, found {}", name, gain
                )));
            }
        }

        Ok(())
    }
}
