//! Differential drive calculations

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal imports
use super::*;
use util::maths::clamp;

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl LocoCtrl {

    /// Perform the differential drive mixing.
    ///
    /// The correction is subtracted from the left wheel and added to the
    /// right. Each wheel is then saturated to the speed limits on its own,
    /// so a wheel hitting its limit does not change the other wheel's demand.
    pub(crate) fn calc_diff_drive(
        &self,
        base_speed_ms: f64,
        correction: f64,
        report: &mut StatusReport
    ) -> MotorCommand {
        let (left, left_limited) = clamp(
            base_speed_ms - correction,
            self.params.min_speed_ms,
            self.params.max_speed_ms
        );
        let (right, right_limited) = clamp(
            base_speed_ms + correction,
            self.params.min_speed_ms,
            self.params.max_speed_ms
        );

        report.left_limited = left_limited;
        report.right_limited = right_limited;

        MotorCommand { left, right }
    }
}
