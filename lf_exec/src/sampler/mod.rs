//! # Sensor sampler module
//!
//! The sampler reads the line sensor and the wheel encoders once per control cycle and turns
//! the raw values into a calibrated line error and the distance travelled by each wheel.
//!
//! Invalid readings are tolerated for a single cycle, during which the last valid value of that
//! channel is reused. A second consecutive fault on the same channel, or a fault before any valid
//! value exists, is returned as an error which stops the control session.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
pub use params::Params;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{trace, warn};
use serde::Serialize;
use thiserror::Error;

// Internal
use crate::loc::WheelDelta;
use comms_if::eqpt::{EncoderCounts, SensIf, SensorError};
use util::{
    maths::{clamp, lin_map},
    params as util_params
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of consecutive cycles a channel may reuse its last valid value.
const MAX_REUSED_CYCLES: u32 = 1;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Sensor sampler state.
#[derive(Debug, Clone)]
pub struct Sampler {
    params: Params,

    /// Last valid encoder counts, `None` until the sampler is started
    enc_baseline: Option<EncoderCounts>,

    /// Last valid line error
    last_line_error: Option<f64>,

    /// Last valid per-cycle wheel motion
    last_wheel_delta: Option<WheelDelta>,

    /// Wheel motion reported from reuse since the last valid encoder reading
    reused_wheel_delta: WheelDelta,

    num_line_faults: u32,
    num_enc_faults: u32,
}

/// One cycle's measurement.
#[derive(Debug, Copy, Clone, Default, Serialize, PartialEq)]
pub struct Sample {
    /// Calibrated line error in [-1, 1]
    pub line_error: f64,

    /// Raw light value, `None` if the line error was reused from the previous cycle
    pub line_raw: Option<f64>,

    /// Distance travelled by each wheel since the last cycle
    pub wheel_delta: WheelDelta,
}

/// Status report for sampler processing.
#[derive(Debug, Copy, Clone, Default, Serialize, PartialEq)]
pub struct StatusReport {
    /// The line sensor reading was invalid and the previous line error was reused
    pub line_reused: bool,

    /// The encoder reading was invalid and the previous wheel motion was reused
    pub wheel_delta_reused: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Reasons a single reading is considered invalid.
#[derive(Debug, Error)]
pub enum ReadingFault {
    #[error("Equipment error: {0}")]
    Eqpt(SensorError),

    #[error("Light value {0} is not finite")]
    NonFinite(f64),

    #[error("Light value {value} is outside the sensor range [{min}, {max}]")]
    OutOfRange { value: f64, min: f64, max: f64 },

    #[error("Encoder jump of ({left}, {right}) ticks exceeds the limit of {limit} ticks")]
    TickJump { left: i64, right: i64, limit: i64 },
}

/// Errors which stop the sampler.
#[derive(Debug, Error)]
pub enum SamplerError {
    #[error("The sampler has not been started")]
    NotStarted,

    #[error("Cannot read the encoder baseline: {0}")]
    NoBaseline(SensorError),

    #[error("Line sensor fault with no previous valid reading: {0}")]
    NoValidLine(ReadingFault),

    #[error("Persistent line sensor fault: {0}")]
    PersistentLineFault(ReadingFault),

    #[error("Persistent encoder fault: {0}")]
    PersistentEncoderFault(ReadingFault),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Sampler {
    /// Create a new sampler from the given calibration.
    pub fn init(params: Params) -> Result<Self, util_params::LoadError> {
        params.validate()?;

        Ok(Self {
            params,
            enc_baseline: None,
            last_line_error: None,
            last_wheel_delta: None,
            reused_wheel_delta: WheelDelta::default(),
            num_line_faults: 0,
            num_enc_faults: 0,
        })
    }

    /// Start sampling, forgetting any previous values and seeding the encoder baseline from the
    /// current counts.
    pub fn start<S: SensIf>(&mut self, sens: &mut S) -> Result<(), SamplerError> {
        let counts = sens.read_encoders().map_err(SamplerError::NoBaseline)?;

        self.enc_baseline = Some(counts);
        self.last_line_error = None;
        self.last_wheel_delta = None;
        self.reused_wheel_delta = WheelDelta::default();
        self.num_line_faults = 0;
        self.num_enc_faults = 0;

        trace!("Sampler baseline: {:?}", counts);

        Ok(())
    }

    /// Take one sample from the sensors.
    pub fn sample<S: SensIf>(
        &mut self,
        sens: &mut S
    ) -> Result<(Sample, StatusReport), SamplerError> {
        let baseline = self.enc_baseline.ok_or(SamplerError::NotStarted)?;
        let mut report = StatusReport::default();

        // ---- LINE SENSOR ----

        let (line_error, line_raw) = match self.read_line(sens) {
            Ok((err, raw)) => {
                self.last_line_error = Some(err);
                self.num_line_faults = 0;
                (err, Some(raw))
            },
            Err(fault) => {
                let prev = match self.last_line_error {
                    Some(e) => e,
                    None => return Err(SamplerError::NoValidLine(fault))
                };

                self.num_line_faults += 1;
                if self.num_line_faults > MAX_REUSED_CYCLES {
                    return Err(SamplerError::PersistentLineFault(fault));
                }

                warn!("Line sensor fault ({}), reusing previous line error {:.4}", fault, prev);
                report.line_reused = true;
                (prev, None)
            }
        };

        // ---- ENCODERS ----

        let wheel_delta = match self.read_encoders(sens, &baseline) {
            Ok(counts) => {
                let num_cycles = (self.num_enc_faults + 1) as f64;
                // Differences are bounded by the jump check in `read_encoders`
                let total = WheelDelta::new(
                    counts.left_ticks.wrapping_sub(baseline.left_ticks) as f64
                        * self.params.m_per_tick,
                    counts.right_ticks.wrapping_sub(baseline.right_ticks) as f64
                        * self.params.m_per_tick,
                );

                // Motion already reported through reuse is removed so the integrated distance
                // matches the encoders once they recover.
                let delta = WheelDelta::new(
                    total.left_m - self.reused_wheel_delta.left_m,
                    total.right_m - self.reused_wheel_delta.right_m,
                );

                self.enc_baseline = Some(counts);
                self.last_wheel_delta = Some(WheelDelta::new(
                    total.left_m / num_cycles,
                    total.right_m / num_cycles
                ));
                self.reused_wheel_delta = WheelDelta::default();
                self.num_enc_faults = 0;

                delta
            },
            Err(fault) => {
                self.num_enc_faults += 1;
                if self.num_enc_faults > MAX_REUSED_CYCLES {
                    return Err(SamplerError::PersistentEncoderFault(fault));
                }

                // Before the first valid delta the robot is assumed stationary, the baseline
                // itself is a valid reading.
                let prev = self.last_wheel_delta.unwrap_or_default();

                warn!(
                    "Encoder fault ({}), reusing previous wheel motion ({:.4}, {:.4}) m",
                    fault, prev.left_m, prev.right_m
                );

                self.reused_wheel_delta.left_m += prev.left_m;
                self.reused_wheel_delta.right_m += prev.right_m;
                report.wheel_delta_reused = true;

                prev
            }
        };

        let sample = Sample {
            line_error,
            line_raw,
            wheel_delta
        };

        trace!("Sample: {:?}", sample);

        Ok((sample, report))
    }

    /// Convert a raw light value into a line error.
    ///
    /// The black level maps to -1 and the white level to +1, values beyond
    /// them are clamped.
    pub fn calibrate_light(&self, raw: f64) -> f64 {
        clamp(
            lin_map(
                (self.params.light_black, self.params.light_white),
                (-1.0, 1.0),
                raw
            ),
            -1.0,
            1.0
        ).0
    }

    /// Get the sampler's parameters.
    pub fn params(&self) -> &Params {
        &self.params
    }

    fn read_line<S: SensIf>(&self, sens: &mut S) -> Result<(f64, f64), ReadingFault> {
        let raw = sens.read_line_sensor().map_err(ReadingFault::Eqpt)?;

        if !raw.is_finite() {
            return Err(ReadingFault::NonFinite(raw));
        }

        if raw < self.params.light_raw_min || raw > self.params.light_raw_max {
            return Err(ReadingFault::OutOfRange {
                value: raw,
                min: self.params.light_raw_min,
                max: self.params.light_raw_max
            });
        }

        Ok((self.calibrate_light(raw), raw))
    }

    fn read_encoders<S: SensIf>(
        &self,
        sens: &mut S,
        baseline: &EncoderCounts
    ) -> Result<EncoderCounts, ReadingFault> {
        let counts = sens.read_encoders().map_err(ReadingFault::Eqpt)?;

        // The wheels may have moved during the faulted cycles as well
        let limit = self.params.max_ticks_per_cycle
            .saturating_mul(self.num_enc_faults as i64 + 1);

        // A difference which overflows is reported at the saturated value
        let left = counts.left_ticks.checked_sub(baseline.left_ticks);
        let right = counts.right_ticks.checked_sub(baseline.right_ticks);

        match (left, right) {
            (Some(l), Some(r)) if l.unsigned_abs() <= limit as u64
                && r.unsigned_abs() <= limit as u64 => Ok(counts),
            _ => Err(ReadingFault::TickJump {
                left: counts.left_ticks.saturating_sub(baseline.left_ticks),
                right: counts.right_ticks.saturating_sub(baseline.right_ticks),
                limit
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::collections::VecDeque;

    /// Sensors which replay a scripted sequence of readings.
    #[derive(Default)]
    struct ScriptedSens {
        light: VecDeque<Result<f64, SensorError>>,
        enc: VecDeque<Result<EncoderCounts, SensorError>>,
    }

    impl ScriptedSens {
        fn push(&mut self, light: Result<f64, SensorError>, enc: Result<(i64, i64), SensorError>) {
            self.light.push_back(light);
            self.enc.push_back(enc.map(|(l, r)| EncoderCounts { left_ticks: l, right_ticks: r }));
        }
    }

    impl SensIf for ScriptedSens {
        fn read_line_sensor(&mut self) -> Result<f64, SensorError> {
            self.light.pop_front().unwrap_or(Err(SensorError::NoReading))
        }

        fn read_encoders(&mut self) -> Result<EncoderCounts, SensorError> {
            self.enc.pop_front().unwrap_or(Err(SensorError::NoReading))
        }
    }

    fn sampler() -> Sampler {
        Sampler::init(Params {
            light_raw_min: 0.0,
            light_raw_max: 100.0,
            light_black: 20.0,
            light_white: 70.0,
            m_per_tick: 0.001,
            max_ticks_per_cycle: 50,
        }).unwrap()
    }

    fn started(sens: &mut ScriptedSens) -> Sampler {
        let mut s = sampler();
        sens.enc.push_front(Ok(EncoderCounts { left_ticks: 100, right_ticks: 200 }));
        s.start(sens).unwrap();
        s
    }

    #[test]
    fn test_calibration() {
        let s = sampler();

        assert_eq!(s.calibrate_light(20.0), -1.0);
        assert_eq!(s.calibrate_light(45.0), 0.0);
        assert_eq!(s.calibrate_light(70.0), 1.0);
        assert_eq!(s.calibrate_light(5.0), -1.0);
        assert_eq!(s.calibrate_light(95.0), 1.0);
    }

    #[test]
    fn test_not_started() {
        let mut s = sampler();
        let mut sens = ScriptedSens::default();
        sens.push(Ok(45.0), Ok((0, 0)));

        assert!(matches!(s.sample(&mut sens), Err(SamplerError::NotStarted)));
    }

    #[test]
    fn test_wheel_delta_from_baseline() {
        let mut sens = ScriptedSens::default();
        let mut s = started(&mut sens);
        sens.push(Ok(45.0), Ok((110, 220)));
        sens.push(Ok(57.5), Ok((110, 230)));

        let (sample, report) = s.sample(&mut sens).unwrap();
        assert_eq!(report, StatusReport::default());
        assert_eq!(sample.line_raw, Some(45.0));
        assert_relative_eq!(sample.wheel_delta.left_m, 0.010, epsilon = 1e-12);
        assert_relative_eq!(sample.wheel_delta.right_m, 0.020, epsilon = 1e-12);

        let (sample, _) = s.sample(&mut sens).unwrap();
        assert_eq!(sample.line_error, 0.5);
        assert_eq!(sample.wheel_delta.left_m, 0.0);
        assert_relative_eq!(sample.wheel_delta.right_m, 0.010, epsilon = 1e-12);
    }

    #[test]
    fn test_line_fault_reused_once() {
        let mut sens = ScriptedSens::default();
        let mut s = started(&mut sens);
        sens.push(Ok(57.5), Ok((100, 200)));
        sens.push(Ok(150.0), Ok((100, 200)));
        sens.push(Ok(45.0), Ok((100, 200)));
        sens.push(Err(SensorError::Stale), Ok((100, 200)));
        sens.push(Ok(std::f64::NAN), Ok((100, 200)));

        assert_eq!(s.sample(&mut sens).unwrap().0.line_error, 0.5);

        // Out of range, reuse the previous value
        let (sample, report) = s.sample(&mut sens).unwrap();
        assert!(report.line_reused);
        assert_eq!(sample.line_error, 0.5);
        assert_eq!(sample.line_raw, None);

        // Recovery resets the count
        let (sample, report) = s.sample(&mut sens).unwrap();
        assert!(!report.line_reused);
        assert_eq!(sample.line_error, 0.0);

        // Two in a row is fatal
        assert!(s.sample(&mut sens).is_ok());
        assert!(matches!(
            s.sample(&mut sens),
            Err(SamplerError::PersistentLineFault(ReadingFault::NonFinite(_)))
        ));
    }

    #[test]
    fn test_line_fault_without_previous_value() {
        let mut sens = ScriptedSens::default();
        let mut s = started(&mut sens);
        sens.push(Err(SensorError::NoReading), Ok((100, 200)));

        assert!(matches!(
            s.sample(&mut sens),
            Err(SamplerError::NoValidLine(ReadingFault::Eqpt(SensorError::NoReading)))
        ));
    }

    #[test]
    fn test_encoder_fault_recovery_keeps_total_distance() {
        let mut sens = ScriptedSens::default();
        let mut s = started(&mut sens);
        sens.push(Ok(45.0), Ok((110, 210)));
        sens.push(Ok(45.0), Err(SensorError::Stale));
        sens.push(Ok(45.0), Ok((125, 225)));

        let mut total = WheelDelta::default();
        for i in 0..3 {
            let (sample, report) = s.sample(&mut sens).unwrap();
            assert_eq!(report.wheel_delta_reused, i == 1);
            total.left_m += sample.wheel_delta.left_m;
            total.right_m += sample.wheel_delta.right_m;
        }

        assert_relative_eq!(total.left_m, 0.025, epsilon = 1e-12);
        assert_relative_eq!(total.right_m, 0.025, epsilon = 1e-12);
    }

    #[test]
    fn test_encoder_jump_is_fault() {
        let mut sens = ScriptedSens::default();
        let mut s = started(&mut sens);
        sens.push(Ok(45.0), Ok((110, 210)));
        sens.push(Ok(45.0), Ok((10_000, 210)));
        sens.push(Ok(45.0), Ok((-5_000, 210)));

        assert!(s.sample(&mut sens).is_ok());

        let (sample, report) = s.sample(&mut sens).unwrap();
        assert!(report.wheel_delta_reused);
        assert_relative_eq!(sample.wheel_delta.left_m, 0.010, epsilon = 1e-12);

        assert!(matches!(
            s.sample(&mut sens),
            Err(SamplerError::PersistentEncoderFault(ReadingFault::TickJump { .. }))
        ));
    }

    #[test]
    fn test_encoder_counts_at_integer_limits() {
        let mut sens = ScriptedSens::default();
        let mut s = started(&mut sens);
        sens.push(Ok(45.0), Ok((110, 210)));
        sens.push(Ok(45.0), Ok((i64::MIN, 210)));
        sens.push(Ok(45.0), Ok((120, 220)));
        sens.push(Ok(45.0), Ok((130, i64::MAX)));
        sens.push(Ok(45.0), Ok((i64::MIN, i64::MIN)));

        assert!(s.sample(&mut sens).is_ok());

        // Wrapped difference is a jump, the previous motion is reused
        let (sample, report) = s.sample(&mut sens).unwrap();
        assert!(report.wheel_delta_reused);
        assert_relative_eq!(sample.wheel_delta.left_m, 0.010, epsilon = 1e-12);

        let (sample, report) = s.sample(&mut sens).unwrap();
        assert!(!report.wheel_delta_reused);
        assert_relative_eq!(sample.wheel_delta.left_m, 0.0, epsilon = 1e-12);

        let (_, report) = s.sample(&mut sens).unwrap();
        assert!(report.wheel_delta_reused);

        assert!(matches!(
            s.sample(&mut sens),
            Err(SamplerError::PersistentEncoderFault(ReadingFault::TickJump { .. }))
        ));
    }
}
