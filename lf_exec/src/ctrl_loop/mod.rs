//! # Control loop module
//!
//! The control loop ties the modules together. On every cycle it samples the sensors, runs line
//! control and locomotion control, sends the resulting demands to the drive, integrates the
//! odometry and emits a trajectory record.
//!
//! Line control and odometry are independent branches fed from the same sample, so the PID never
//! sees the pose update of its own cycle.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod state;

pub use params::{LineLostPolicy, Params};
pub use state::*;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;
use thiserror::Error;

use crate::sampler::SamplerError;
use comms_if::eqpt::ActuatorError;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Modes of the control loop.
///
/// The loop only moves forwards through the modes, a stopped loop cannot be
/// restarted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CtrlLoopMode {
    Idle,
    Running,
    Stopped,
}

/// Reasons the control loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StopCause {
    /// An explicit stop was requested
    StopRequested,

    /// The sensors could not provide a valid sample
    SensorFault,

    /// The drive rejected a demand
    ActuatorFault,

    /// The line was lost for longer than allowed
    LineLost,
}

/// Errors which can occur in the control loop.
#[derive(Debug, Error)]
pub enum CtrlLoopError {
    #[error("The control loop is not running (mode: {0:?})")]
    NotRunning(CtrlLoopMode),

    #[error("The control loop can only be started from Idle (mode: {0:?})")]
    NotIdle(CtrlLoopMode),

    #[error("Sensor fault: {0}")]
    Sampler(#[from] SamplerError),

    #[error("Actuator fault: {0}")]
    Actuator(#[from] ActuatorError),
}
