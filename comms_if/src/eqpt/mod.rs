//! # Equipment Interface
//!
//! This module defines the interfaces through which the software talks to the robot's equipment.
//! Hardware drivers and the simulation both implement these traits.

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

pub mod drive;
pub mod sens;

// -----------------------------------------------------------------------------------------------
// EXPORTS
// -----------------------------------------------------------------------------------------------

pub use drive::{ActuatorError, DriveIf};
pub use sens::{EncoderCounts, SensorError, SensIf};
