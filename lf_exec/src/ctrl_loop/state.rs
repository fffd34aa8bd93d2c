//! Implementations for the control loop state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{error, info, trace, warn};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

// Internal
use super::{CtrlLoopError, CtrlLoopMode, LineLostPolicy, Params, StopCause};
use crate::{
    line_ctrl::{self, LineCtrl, PidState},
    loc::{self, Pose},
    loco_ctrl::{self, LocoCtrl, MotorCommand},
    params::LfParams,
    sampler::{self, Sampler},
    traj_log::TrajLog,
};
use comms_if::{
    eqpt::{DriveIf, SensIf},
    tm::TrajRecord,
};
use util::params::LoadError;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The control loop.
///
/// Owns the equipment, the trajectory log sink and the state carried between cycles (the PID
/// state and the pose).
pub struct CtrlLoop<S, D, L> {
    params: Params,
    wheel_base_m: f64,

    sampler: Sampler,
    line_ctrl: LineCtrl,
    loco_ctrl: LocoCtrl,

    sens: S,
    drive: D,
    traj_log: L,

    mode: CtrlLoopMode,
    stop_cause: Option<StopCause>,

    pid_state: Option<PidState>,
    pose: Option<Pose>,

    /// Time since the loop started, the sum of all valid cycle time steps
    timestamp_s: f64,

    /// Instant at the top of the previous cycle, or of the start
    prev_cycle_instant: Option<Instant>,

    num_cycles: u64,
    num_line_lost_cycles: u32,

    report: StatusReport,
}

/// Status reports from each module for the last cycle.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StatusReport {
    pub sampler: sampler::StatusReport,
    pub line_ctrl: line_ctrl::StatusReport,
    pub loco_ctrl: loco_ctrl::StatusReport,
    pub motor_cmd: MotorCommand,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<S, D, L> CtrlLoop<S, D, L>
where
    S: SensIf,
    D: DriveIf,
    L: TrajLog
{
    /// Initialise the control loop and its modules from the given parameters.
    pub fn init(params: &LfParams, sens: S, drive: D, traj_log: L) -> Result<Self, LoadError> {
        params.ctrl_loop.validate()?;
        params.loc.validate()?;

        Ok(Self {
            params: params.ctrl_loop.clone(),
            wheel_base_m: params.loc.wheel_base_m,
            sampler: Sampler::init(params.sampler.clone())?,
            line_ctrl: LineCtrl::init(params.line_ctrl.clone())?,
            loco_ctrl: LocoCtrl::init(params.loco_ctrl.clone())?,
            sens,
            drive,
            traj_log,
            mode: CtrlLoopMode::Idle,
            stop_cause: None,
            pid_state: None,
            pose: None,
            timestamp_s: 0.0,
            prev_cycle_instant: None,
            num_cycles: 0,
            num_line_lost_cycles: 0,
            report: StatusReport::default(),
        })
    }

    /// Start the loop, moving from Idle to Running.
    ///
    /// The PID state and the pose are reset and the encoder baseline is taken
    /// from the current counts. If the baseline cannot be read the loop stops.
    pub fn start(&mut self) -> Result<(), CtrlLoopError> {
        if self.mode != CtrlLoopMode::Idle {
            return Err(CtrlLoopError::NotIdle(self.mode));
        }

        if let Err(e) = self.sampler.start(&mut self.sens) {
            error!("Could not start the control loop: {}", e);
            self.stop_with(StopCause::SensorFault);
            return Err(e.into());
        }

        self.pid_state = Some(PidState::new());
        self.pose = Some(Pose::default());
        self.timestamp_s = 0.0;
        self.num_cycles = 0;
        self.num_line_lost_cycles = 0;
        self.prev_cycle_instant = Some(Instant::now());
        self.mode = CtrlLoopMode::Running;

        info!("Control loop running");

        Ok(())
    }

    /// Request the loop to stop.
    ///
    /// Has no effect if the loop has already stopped.
    pub fn stop(&mut self) {
        self.stop_with(StopCause::StopRequested);
    }

    /// Execute a single control cycle with the given time step since the
    /// previous cycle.
    ///
    /// Returns the cycle's trajectory record, or `None` if the loop stopped
    /// this cycle without a fault (line lost).
    pub fn proc(&mut self, dt_s: f64) -> Result<Option<TrajRecord>, CtrlLoopError> {
        if self.mode != CtrlLoopMode::Running {
            return Err(CtrlLoopError::NotRunning(self.mode));
        }

        self.report = StatusReport::default();

        // ---- SAMPLE ----

        let (sample, sampler_rpt) = match self.sampler.sample(&mut self.sens) {
            Ok(s) => s,
            Err(e) => {
                error!("Sampling failed, stopping: {}", e);
                self.stop_with(StopCause::SensorFault);
                return Err(e.into());
            }
        };
        self.report.sampler = sampler_rpt;

        if self.line_lost(sample.line_error) {
            warn!(
                "Line lost for {} cycles (error {:.3}), stopping",
                self.num_line_lost_cycles, sample.line_error
            );
            self.stop_with(StopCause::LineLost);
            return Ok(None);
        }

        // Both are always present while running
        let (pid_state, prev_pose) = match (self.pid_state.as_mut(), self.pose) {
            (Some(s), Some(p)) => (s, p),
            _ => return Err(CtrlLoopError::NotRunning(self.mode))
        };

        // ---- CONTROL ----

        let (correction, line_rpt) = self.line_ctrl.proc(pid_state, sample.line_error, dt_s);
        self.report.line_ctrl = line_rpt;

        let (cmd, loco_rpt) = self.loco_ctrl.mix(self.params.base_speed_ms, correction);
        self.report.loco_ctrl = loco_rpt;
        self.report.motor_cmd = cmd;

        // ---- ACTUATION ----

        if let Err(e) = self.drive.set_motor_speeds(cmd.left, cmd.right) {
            error!("Drive rejected the demands, stopping: {}", e);
            self.stop_with(StopCause::ActuatorFault);
            return Err(e.into());
        }

        // ---- ODOMETRY ----

        let pose = loc::integrate(&prev_pose, &sample.wheel_delta, self.wheel_base_m);
        self.pose = Some(pose);

        // ---- TRAJECTORY RECORD ----

        // Faulted time steps are not counted so the timestamp never goes backwards
        if dt_s > 0.0 {
            self.timestamp_s += dt_s;
        }

        let record = TrajRecord {
            timestamp: self.timestamp_s,
            x: pose.x(),
            y: pose.y(),
            theta: pose.heading_rad,
            line_error: sample.line_error,
            left_speed: cmd.left,
            right_speed: cmd.right,
        };

        self.traj_log.log(&record);
        self.num_cycles += 1;

        trace!("Cycle {} record: {:?}", self.num_cycles, record);

        Ok(Some(record))
    }

    /// Run the loop at its fixed period until a stop is requested, `max_cycles` cycles have been
    /// executed, or a fault stops it.
    ///
    /// The time step of each cycle is measured from the top of the previous
    /// cycle. The stop flag is only checked between cycles.
    pub fn run(
        &mut self,
        stop_flag: &AtomicBool,
        max_cycles: Option<u64>
    ) -> Result<(), CtrlLoopError> {
        if self.mode != CtrlLoopMode::Running {
            return Err(CtrlLoopError::NotRunning(self.mode));
        }

        let period = Duration::from_secs_f64(self.params.cycle_period_s);

        loop {
            // ---- CYCLE BOUNDARY ----

            if stop_flag.load(Ordering::Acquire) {
                info!("Stop signal received");
                self.stop();
                break;
            }

            if let Some(max) = max_cycles {
                if self.num_cycles >= max {
                    info!("Reached the maximum number of cycles ({})", max);
                    self.stop();
                    break;
                }
            }

            let cycle_start_instant = Instant::now();
            let dt_s = match self.prev_cycle_instant {
                Some(prev) => (cycle_start_instant - prev).as_secs_f64(),
                None => 0.0
            };
            self.prev_cycle_instant = Some(cycle_start_instant);

            // ---- CYCLE ----

            self.proc(dt_s)?;

            if self.mode != CtrlLoopMode::Running {
                break;
            }

            // ---- CYCLE MANAGEMENT ----

            let cycle_dur = Instant::now() - cycle_start_instant;

            match period.checked_sub(cycle_dur) {
                Some(d) => thread::sleep(d),
                None => warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - period.as_secs_f64()
                )
            }
        }

        Ok(())
    }

    pub fn mode(&self) -> CtrlLoopMode {
        self.mode
    }

    /// Get the reason the loop stopped, `None` if it hasn't.
    pub fn stop_cause(&self) -> Option<StopCause> {
        self.stop_cause
    }

    /// Get the current pose estimate, only available while running.
    pub fn pose(&self) -> Option<&Pose> {
        self.pose.as_ref()
    }

    /// Get the PID state, only available while running.
    pub fn pid_state(&self) -> Option<&PidState> {
        self.pid_state.as_ref()
    }

    /// Number of cycles which emitted a record.
    pub fn num_cycles(&self) -> u64 {
        self.num_cycles
    }

    /// Get the status reports of the last cycle.
    pub fn report(&self) -> &StatusReport {
        &self.report
    }

    pub fn traj_log(&self) -> &L {
        &self.traj_log
    }

    pub fn sens(&self) -> &S {
        &self.sens
    }

    pub fn drive(&self) -> &D {
        &self.drive
    }

    /// Consume the loop, returning the trajectory log sink.
    pub fn into_traj_log(mut self) -> L {
        self.traj_log.flush();
        self.traj_log
    }

    fn stop_with(&mut self, cause: StopCause) {
        if self.mode == CtrlLoopMode::Stopped {
            return;
        }

        info!(
            "Control loop stopped after {} cycles ({:?})",
            self.num_cycles, cause
        );

        self.mode = CtrlLoopMode::Stopped;
        self.stop_cause = Some(cause);
        self.pid_state = None;
        self.pose = None;
        self.prev_cycle_instant = None;
    }

    /// Update the line lost count, returning true if the loop should stop.
    fn line_lost(&mut self, line_error: f64) -> bool {
        if self.params.line_lost_policy != LineLostPolicy::Stop {
            return false;
        }

        if line_error.abs() >= self.params.line_lost_threshold {
            self.num_line_lost_cycles += 1;
        }
        else {
            self.num_line_lost_cycles = 0;
        }

        self.num_line_lost_cycles >= self.params.line_lost_cycles
    }
}
