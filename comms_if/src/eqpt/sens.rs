//! # Sensor Equipment Interface

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Raw counts from the two wheel encoders.
///
/// Counts accumulate from the moment the equipment is powered and increase while the wheel drives
/// forwards.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncoderCounts {
    pub left_ticks: i64,
    pub right_ticks: i64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors reported by the sensor equipment.
#[derive(Debug, thiserror::Error)]
pub enum SensorError {
    #[error("The sensor did not provide a reading")]
    NoReading,

    #[error("The sensor reading is stale")]
    Stale,

    #[error("Sensor equipment error: {0}")]
    EqptError(String),
}

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Interface to the line sensor and wheel encoders.
pub trait SensIf {
    /// Read the raw reflectance value from the line sensor.
    fn read_line_sensor(&mut self) -> Result<f64, SensorError>;

    /// Read the current counts of both wheel encoders.
    fn read_encoders(&mut self) -> Result<EncoderCounts, SensorError>;
}

impl<T: SensIf + ?Sized> SensIf for Box<T> {
    fn read_line_sensor(&mut self) -> Result<f64, SensorError> {
        (**self).read_line_sensor()
    }

    fn read_encoders(&mut self) -> Result<EncoderCounts, SensorError> {
        (**self).read_encoders()
    }
}
