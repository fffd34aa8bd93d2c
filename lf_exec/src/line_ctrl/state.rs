//! Line control module state

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use serde::Serialize;

// Internal
use super::*;
use util::params;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Line control module.
#[derive(Debug, Clone)]
pub struct LineCtrl {
    pub(crate) params: Params,

    /// Controller used to calculate the steering correction
    controller: PidController,
}

/// The status report containing the controller terms and fault flags.
#[derive(Debug, Default, Copy, Clone, Serialize)]
pub struct StatusReport {
    /// Proportional contribution to the output
    pub p_term: f64,

    /// Integral contribution to the output
    pub i_term: f64,

    /// Derivative contribution to the output
    pub d_term: f64,

    /// If true the integral accumulation reached one of its limits
    pub integral_limited: bool,

    /// If true the time step was not positive and the previous output was held
    pub timing_fault: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl LineCtrl {
    /// Initialise the LineCtrl module from the given parameters.
    pub fn init(params: Params) -> Result<Self, params::LoadError> {
        params.validate()?;

        Ok(Self {
            controller: PidController::new(&params),
            params,
        })
    }

    /// Process line control.
    ///
    /// Returns the steering correction for this cycle. Positive corrections speed up the right
    /// wheel and slow the left.
    pub fn proc(
        &self,
        state: &mut PidState,
        line_error: f64,
        dt_s: f64
    ) -> (f64, StatusReport) {
        let mut report = StatusReport::default();

        let correction = self.controller.compute(state, line_error, dt_s, &mut report);

        trace!(
            "LineCtrl: err {:.4}, corr {:.4} (p {:.4}, i {:.4}, d {:.4})",
            line_error, correction, report.p_term, report.i_term, report.d_term
        );

        (correction, report)
    }

    /// Get the module's parameters.
    pub fn params(&self) -> &Params {
        &self.params
    }
}
