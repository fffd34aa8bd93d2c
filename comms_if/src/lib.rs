//! # Communications interface crate.
//!
//! Provides the interfaces between the line follower software and the outside world: the
//! equipment (sensors and drive motors) and the trajectory telemetry record.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Equipment interfaces (line sensor, wheel encoders, drive motors)
pub mod eqpt;

/// Telemetry records emitted once per control cycle
pub mod tm;
