//! # Drive Motor Equipment Interface

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors reported by the drive motors.
#[derive(Debug, thiserror::Error)]
pub enum ActuatorError {
    #[error("The drive equipment rejected the demand (left: {left}, right: {right})")]
    DemsRejected { left: f64, right: f64 },

    #[error("The drive equipment is not connected")]
    NotConnected,

    #[error("Drive equipment error: {0}")]
    EqptError(String),
}

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Interface to the left and right drive motors.
///
/// Speed units are shared with the limits used by locomotion control.
pub trait DriveIf {
    /// Demand a speed for each wheel.
    fn set_motor_speeds(&mut self, left: f64, right: f64) -> Result<(), ActuatorError>;
}

impl<T: DriveIf + ?Sized> DriveIf for Box<T> {
    fn set_motor_speeds(&mut self, left: f64, right: f64) -> Result<(), ActuatorError> {
        (**self).set_motor_speeds(left, right)
    }
}
