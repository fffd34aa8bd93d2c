//! # Localisation module
//!
//! This module provides localisation for the robot in the form of wheel
//! odometry. The pose is integrated from the distance travelled by each wheel
//! on every control cycle, there is no absolute correction so the estimate
//! drifts over long runs.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod odometry;
mod params;

pub use odometry::integrate;
pub use params::Params;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The current pose (position and heading in the session frame) of the robot.
///
/// The session frame is fixed to the robot's pose at the start of the
/// session, with X forwards and Y to the left.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Pose {

    /// The position in the session frame
    ///
    /// Units: meters
    pub position_m: Vector2<f64>,

    /// The heading of the robot, the angle from the positive X axis, in the
    /// range (-pi, pi].
    ///
    /// Units: radians
    pub heading_rad: f64
}

/// Distance travelled by each wheel since the last cycle.
#[derive(Debug, Copy, Clone, Serialize, Default, PartialEq)]
pub struct WheelDelta {
    /// Units: meters
    pub left_m: f64,

    /// Units: meters
    pub right_m: f64
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Pose {

    /// Create a new pose from its components.
    pub fn new(x_m: f64, y_m: f64, heading_rad: f64) -> Self {
        Self {
            position_m: Vector2::new(x_m, y_m),
            heading_rad
        }
    }

    /// X position in meters.
    pub fn x(&self) -> f64 {
        self.position_m[0]
    }

    /// Y position in meters.
    pub fn y(&self) -> f64 {
        self.position_m[1]
    }

    /// Return the unit vector pointing along the robot's heading.
    pub fn forward2(&self) -> Vector2<f64> {
        Vector2::new(self.heading_rad.cos(), self.heading_rad.sin())
    }
}

impl WheelDelta {
    pub fn new(left_m: f64, right_m: f64) -> Self {
        Self { left_m, right_m }
    }
}
