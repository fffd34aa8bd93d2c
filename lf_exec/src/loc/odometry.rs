//! # Differential drive odometry

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector2;

use super::{Pose, WheelDelta};
use util::maths::wrap_pi;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Integrate one cycle of wheel motion onto the previous pose.
///
/// The position is advanced along the heading at the middle of the step,
/// rather than the heading at the start, which keeps the error small when
/// the robot is turning.
pub fn integrate(prev: &Pose, delta: &WheelDelta, wheel_base_m: f64) -> Pose {
    let d_center = (delta.left_m + delta.right_m) / 2.0;
    let d_theta = (delta.right_m - delta.left_m) / wheel_base_m;

    let theta_mid = prev.heading_rad + d_theta / 2.0;

    Pose {
        position_m: prev.position_m
            + d_center * Vector2::new(theta_mid.cos(), theta_mid.sin()),
        heading_rad: wrap_pi(prev.heading_rad + d_theta)
    }
}
