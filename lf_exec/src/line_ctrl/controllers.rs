//! # Line controllers module
//!
//! This module provides the PID controller used by LineCtrl and the state it carries between
//! cycles.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::warn;
use serde::Serialize;

// Internal
use super::{Params, StatusReport};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A PID controller.
///
/// The controller itself only holds the gains and limits, everything which changes from cycle to
/// cycle lives in a `PidState`.
#[derive(Debug, Serialize, Clone)]
pub struct PidController {
    /// Proportional gain
    k_p: f64,

    /// Integral gain
    k_i: f64,

    /// Dervative gain
    k_d: f64,

    /// Lower limit of the integral accumulation
    i_min: f64,

    /// Upper limit of the integral accumulation
    i_max: f64,
}

/// The state of a PID controller which is carried between cycles.
#[derive(Debug, Default, Serialize, Clone, PartialEq)]
pub struct PidState {
    /// The integral accumulation
    integral: f64,

    /// Previous error, `None` on the first cycle of a session
    prev_error: Option<f64>,

    /// Output of the previous cycle
    prev_output: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PidController {

    /// Create a new controller from the line control parameters.
    pub fn new(params: &Params) -> Self {
        Self {
            k_p: params.k_p,
            k_i: params.k_i,
            k_d: params.k_d,
            i_min: params.i_min,
            i_max: params.i_max,
        }
    }

    /// Get the value of the controller for the given error.
    ///
    /// `dt_s` is the time elapsed since the previous call. If it is not
    /// positive the timer has faulted, the previous output is returned and
    /// the state is left untouched.
    pub fn compute(
        &self,
        state: &mut PidState,
        error: f64,
        dt_s: f64,
        report: &mut StatusReport
    ) -> f64 {
        // Negated so that NaN is also caught
        if !(dt_s > 0.0) {
            warn!(
                "Non-positive PID time step ({} s), holding previous output {}",
                dt_s, state.prev_output
            );
            report.timing_fault = true;
            return state.prev_output;
        }

        // Accumulate the integral term, then limit it to prevent windup when
        // the error saturates.
        state.integral += error * dt_s;
        if state.integral > self.i_max {
            state.integral = self.i_max;
            report.integral_limited = true;
        }
        if state.integral < self.i_min {
            state.integral = self.i_min;
            report.integral_limited = true;
        }

        // Calculate the derivative.
        //
        // On the first cycle there's no previous error, and differencing
        // against zero would give a spike, so we assume no derivative.
        let deriv = match state.prev_error {
            Some(e) => (error - e) / dt_s,
            None => 0f64
        };

        report.p_term = self.k_p * error;
        report.i_term = self.k_i * state.integral;
        report.d_term = self.k_d * deriv;

        // Calculate the output
        let out = report.p_term + report.i_term + report.d_term;

        // Remember the previous error and output
        state.prev_error = Some(error);
        state.prev_output = out;

        out
    }
}

impl PidState {
    /// Create a new state, as at the start of a session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current integral accumulation.
    pub fn integral(&self) -> f64 {
        self.integral
    }

    /// Get the previous error, or `None` if no error has been processed.
    pub fn prev_error(&self) -> Option<f64> {
        self.prev_error
    }

    /// Get the output of the previous cycle.
    pub fn prev_output(&self) -> f64 {
        self.prev_output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn controller(k_p: f64, k_i: f64, k_d: f64, i_lim: f64) -> PidController {
        PidController::new(&Params {
            k_p,
            k_i,
            k_d,
            i_min: -i_lim,
            i_max: i_lim
        })
    }

    #[test]
    fn test_proportional_only() {
        let pid = controller(1.0, 0.0, 0.0, 1.0);
        let mut state = PidState::new();
        let mut report = StatusReport::default();

        assert_eq!(pid.compute(&mut state, 0.5, 0.02, &mut report), 0.5);
    }

    #[test]
    fn test_zero_error_no_drift() {
        let pid = controller(1.3, 0.7, 0.2, 1.0);
        let mut state = PidState::new();

        for _ in 0..1000 {
            let mut report = StatusReport::default();
            assert_eq!(pid.compute(&mut state, 0.0, 0.02, &mut report), 0.0);
        }
        assert_eq!(state.integral(), 0.0);
    }

    #[test]
    fn test_first_cycle_no_derivative() {
        let pid = controller(0.0, 0.0, 1.0, 1.0);
        let mut state = PidState::new();
        let mut report = StatusReport::default();

        // First cycle has no derivative at all
        assert_eq!(pid.compute(&mut state, 0.8, 0.1, &mut report), 0.0);

        // Second cycle differences against the first
        let out = pid.compute(&mut state, 0.4, 0.1, &mut report);
        assert_relative_eq!(out, -4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_anti_windup() {
        let pid = controller(0.0, 1.0, 0.0, 0.5);
        let mut state = PidState::new();

        let mut prev_integral = state.integral();
        let mut hit_limit = false;

        for _ in 0..500 {
            let mut report = StatusReport::default();
            pid.compute(&mut state, 1.0, 0.01, &mut report);

            // Monotonic growth, never beyond the limit
            assert!(state.integral() >= prev_integral);
            assert!(state.integral() <= 0.5);
            prev_integral = state.integral();

            if report.integral_limited {
                hit_limit = true;
                assert_eq!(state.integral(), 0.5);
            }
        }

        assert!(hit_limit);
        assert_eq!(state.integral(), 0.5);

        // Same for the negative limit
        for _ in 0..500 {
            let mut report = StatusReport::default();
            pid.compute(&mut state, -1.0, 0.01, &mut report);
            assert!(state.integral() >= -0.5);
        }
        assert_eq!(state.integral(), -0.5);
    }

    #[test]
    fn test_timing_fault_holds_output() {
        let pid = controller(2.0, 1.0, 0.5, 1.0);
        let mut state = PidState::new();
        let mut report = StatusReport::default();

        let first = pid.compute(&mut state, 0.3, 0.05, &mut report);
        assert!(!report.timing_fault);
        let state_before = state.clone();

        for dt in [0.0, -0.01, std::f64::NAN].iter() {
            let mut report = StatusReport::default();
            let out = pid.compute(&mut state, -0.9, *dt, &mut report);
            assert_eq!(out, first);
            assert!(report.timing_fault);
            assert_eq!(state, state_before);
        }
    }
}
