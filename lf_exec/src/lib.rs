//! # Line follower library.
//!
//! This library allows other crates in the workspace, the tests and the benchmarks to access
//! items defined inside the line follower crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Control loop - runs the modules in order at a fixed period
pub mod ctrl_loop;

/// Line control - PID steering correction from the line error
pub mod line_ctrl;

/// Localisation module - wheel odometry
pub mod loc;

/// Locomotion control module - converts the steering correction into wheel speed demands
pub mod loco_ctrl;

/// Parameters for the executable and the whole session
pub mod params;

/// Sensor sampler - calibrated line error and wheel motion from the raw sensors
pub mod sampler;

/// Simulated robot implementing the equipment interfaces
pub mod sim;

/// Path statistics over the trajectory
pub mod stats;

/// Trajectory log sinks
pub mod traj_log;
