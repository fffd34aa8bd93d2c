//! Commands output by LocoCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Speed demands for the two drive motors.
///
/// Units are those of the drive equipment, and match the limits in the LocoCtrl parameters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct MotorCommand {
    /// Left wheel speed demand
    pub left: f64,

    /// Right wheel speed demand
    pub right: f64
}

