//! Implementations for the LocoCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use serde::Serialize;

// Internal
use super::{Params, MotorCommand};
use util::params;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Locomotion control module state.
///
/// LocoCtrl is stateless between cycles, it only holds its parameters.
#[derive(Debug, Clone)]
pub struct LocoCtrl {
    pub(crate) params: Params,
}

/// Status report for LocoCtrl processing.
#[derive(Clone, Copy, Default, Serialize, Debug, PartialEq)]
pub struct StatusReport {
    /// The left wheel demand was saturated to the speed limits
    pub left_limited: bool,

    /// The right wheel demand was saturated to the speed limits
    pub right_limited: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl LocoCtrl {
    /// Initialise the LocoCtrl module.
    pub fn init(params: Params) -> Result<Self, params::LoadError> {
        params.validate()?;

        Ok(Self { params })
    }

    /// Mix the base forward speed with the steering correction from line
    /// control into a motor command.
    pub fn mix(&self, base_speed_ms: f64, correction: f64) -> (MotorCommand, StatusReport) {
        let mut report = StatusReport::default();

        let cmd = self.calc_diff_drive(base_speed_ms, correction, &mut report);

        trace!(
            "LocoCtrl output: left {:.4}, right {:.4} (limited {}, {})",
            cmd.left, cmd.right, report.left_limited, report.right_limited
        );

        (cmd, report)
    }

    /// Get the module's parameters.
    pub fn params(&self) -> &Params {
        &self.params
    }
}
