//! # Line control module
//!
//! Line control is responsible for keeping the robot's line sensor over the edge of the guide
//! line. It does this using a single PID controller operating on the normalised line error
//! reported by the sampler.
//!
//! The output of line control is a steering correction, which locomotion control combines with
//! the base speed to produce the left and right wheel demands. The correction is not limited
//! here, all limits are applied by locomotion control so that the controller is independent of
//! the motor units.
//!
//! The controller's accumulated state (`PidState`) is owned by the control loop and passed in on
//! each cycle, so that independent sessions never share an integral or previous error.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod controllers;
pub mod params;
pub mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use controllers::*;
pub use params::Params;
pub use state::*;
