//! Parameters structure for the control loop

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;
use util::params::LoadError;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the control loop.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {

    /// Forward speed demanded when the robot is centred on the line.
    ///
    /// Units: meters/second
    pub base_speed_ms: f64,

    /// Target period of one control cycle.
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    /// What to do when the line is lost.
    #[serde(default)]
    pub line_lost_policy: LineLostPolicy,

    /// Absolute line error at or above which the line is considered lost.
    #[serde(default = "default_line_lost_threshold")]
    pub line_lost_threshold: f64,

    /// Number of consecutive cycles the line must be lost for before the
    /// `Stop` policy stops the session.
    #[serde(default = "default_line_lost_cycles")]
    pub line_lost_cycles: u32,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Behaviour when the line sensor no longer sees the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineLostPolicy {
    /// Keep driving on the saturated error, the integral limits bound the
    /// correction.
    Saturate,

    /// Stop the session once the line has been lost for long enough.
    Stop,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for LineLostPolicy {
    fn default() -> Self {
        LineLostPolicy::Saturate
    }
}

impl Params {
    /// Check the parameters are consistent.
    pub fn validate(&self) -> Result<(), LoadError> {
        if !self.base_speed_ms.is_finite() {
            return Err(LoadError::InvalidParam(format!(
                "ctrl_loop: base_speed_ms must be finite (got {})",
                self.base_speed_ms
            )));
        }

        if !(self.cycle_period_s > 0.0) || !self.cycle_period_s.is_finite() {
            return Err(LoadError::InvalidParam(format!(
                "ctrl_loop: cycle_period_s must be positive (got {})",
                self.cycle_period_s
            )));
        }

        if self.line_lost_policy == LineLostPolicy::Stop {
            if !(self.line_lost_threshold > 0.0 && self.line_lost_threshold <= 1.0) {
                return Err(LoadError::InvalidParam(format!(
                    "ctrl_loop: line_lost_threshold must be in (0, 1] (got {})",
                    self.line_lost_threshold
                )));
            }

            if self.line_lost_cycles == 0 {
                return Err(LoadError::InvalidParam(
                    "ctrl_loop: line_lost_cycles must be at least 1".into()
                ));
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn default_line_lost_threshold() -> f64 {
    1.0
}

fn default_line_lost_cycles() -> u32 {
    25
}
