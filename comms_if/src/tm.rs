//! # Trajectory Telemetry
//!
//! One `TrajRecord` is produced for every control cycle. Consumers (archives, plotting tools)
//! read them as an ordered sequence, so the field order here is the column order of the
//! archive.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The state of the robot at the end of one control cycle.
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajRecord {
    /// Time since the start of the control session.
    ///
    /// Units: seconds
    pub timestamp: f64,

    /// Position along the session X axis.
    ///
    /// Units: meters
    pub x: f64,

    /// Position along the session Y axis.
    ///
    /// Units: meters
    pub y: f64,

    /// Heading from the session X axis, in (-pi, pi].
    ///
    /// Units: radians
    pub theta: f64,

    /// Normalised line error in [-1, 1].
    pub line_error: f64,

    /// Left wheel speed demand.
    pub left_speed: f64,

    /// Right wheel speed demand.
    pub right_speed: f64,
}
