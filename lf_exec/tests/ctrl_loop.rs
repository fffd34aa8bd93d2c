//! Control loop tests against scripted and simulated equipment

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use approx::assert_relative_eq;
use std::sync::atomic::AtomicBool;

use comms_if::eqpt::{ActuatorError, DriveIf, EncoderCounts, SensIf, SensorError};
use lf_lib::{
    ctrl_loop::{CtrlLoop, CtrlLoopError, CtrlLoopMode, LineLostPolicy, StopCause},
    params::{LfExecParams, LfParams},
    sampler::SamplerError,
    sim::{self, SimRobot},
    stats::PathStats,
    traj_log::MemTrajLog,
};
use util::params::load_str;

// ---------------------------------------------------------------------------
// HELPERS
// ---------------------------------------------------------------------------

fn lf_params(k_p: f64, k_i: f64) -> LfParams {
    let exec: LfExecParams = load_str(
        r#"
        log_queue_capacity = 16

        [ctrl_loop]
        base_speed_ms = 0.2
        cycle_period_s = 0.002
        "#
    ).unwrap();

    LfParams {
        log_queue_capacity: exec.log_queue_capacity,
        max_cycles: exec.max_cycles,
        ctrl_loop: exec.ctrl_loop,
        line_ctrl: load_str(&format!(
            "k_p = {:?}\nk_i = {:?}\nk_d = 0.0\ni_min = -1.0\ni_max = 1.0",
            k_p, k_i
        )).unwrap(),
        loco_ctrl: load_str("min_speed_ms = 0.0\nmax_speed_ms = 0.4").unwrap(),
        loc: load_str("wheel_base_m = 0.15").unwrap(),
        sampler: load_str(
            r#"
            light_raw_min = 0.0
            light_raw_max = 100.0
            light_black = 20.0
            light_white = 70.0
            m_per_tick = 0.00001
            max_ticks_per_cycle = 5000
            "#
        ).unwrap(),
    }
}

fn sim_params(time_step_s: Option<f64>) -> sim::Params {
    sim::Params {
        track_radius_m: 1.0,
        sensor_offset_m: 0.05,
        sensor_footprint_m: 0.02,
        time_step_s,
    }
}

/// Line sensor returning scripted values, encoders that never move.
struct ScriptedSens {
    light: Vec<Result<f64, SensorError>>,
    num_reads: usize,
}

impl ScriptedSens {
    fn new(light: Vec<Result<f64, SensorError>>) -> Self {
        Self { light, num_reads: 0 }
    }
}

impl SensIf for ScriptedSens {
    fn read_line_sensor(&mut self) -> Result<f64, SensorError> {
        let i = self.num_reads;
        self.num_reads += 1;

        match self.light.get(i) {
            Some(Ok(v)) => Ok(*v),
            Some(Err(_)) => Err(SensorError::Stale),
            None => Ok(45.0)
        }
    }

    fn read_encoders(&mut self) -> Result<EncoderCounts, SensorError> {
        Ok(EncoderCounts::default())
    }
}

/// Drive which records every demand and fails on a given call.
#[derive(Default)]
struct RecordingDrive {
    dems: Vec<(f64, f64)>,
    fail_on_call: Option<usize>,
}

impl DriveIf for RecordingDrive {
    fn set_motor_speeds(&mut self, left: f64, right: f64) -> Result<(), ActuatorError> {
        if self.fail_on_call == Some(self.dems.len()) {
            return Err(ActuatorError::NotConnected);
        }

        self.dems.push((left, right));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[test]
fn test_mode_transitions() {
    let params = lf_params(0.05, 0.0);
    let mut cl = CtrlLoop::init(
        &params,
        ScriptedSens::new(vec![]),
        RecordingDrive::default(),
        MemTrajLog::new()
    ).unwrap();

    assert_eq!(cl.mode(), CtrlLoopMode::Idle);
    assert!(matches!(cl.proc(0.02), Err(CtrlLoopError::NotRunning(CtrlLoopMode::Idle))));
    assert!(cl.pose().is_none());

    cl.start().unwrap();
    assert_eq!(cl.mode(), CtrlLoopMode::Running);
    assert_eq!(cl.pose().unwrap().heading_rad, 0.0);
    assert!(matches!(cl.start(), Err(CtrlLoopError::NotIdle(CtrlLoopMode::Running))));

    assert!(cl.proc(0.02).unwrap().is_some());

    cl.stop();
    assert_eq!(cl.mode(), CtrlLoopMode::Stopped);
    assert_eq!(cl.stop_cause(), Some(StopCause::StopRequested));
    assert!(cl.pose().is_none());
    assert!(cl.pid_state().is_none());

    // A stopped loop can't be restarted or cycled
    assert!(matches!(cl.start(), Err(CtrlLoopError::NotIdle(CtrlLoopMode::Stopped))));
    assert!(matches!(cl.proc(0.02), Err(CtrlLoopError::NotRunning(CtrlLoopMode::Stopped))));
    assert_eq!(cl.traj_log().records().len(), 1);
}

#[test]
fn test_proportional_mix_example() {
    let mut params = lf_params(1.0, 0.0);
    params.ctrl_loop.base_speed_ms = 10.0;
    params.loco_ctrl.max_speed_ms = 20.0;

    // Raw 57.5 is a line error of 0.5
    let mut cl = CtrlLoop::init(
        &params,
        ScriptedSens::new(vec![Ok(57.5)]),
        RecordingDrive::default(),
        MemTrajLog::new()
    ).unwrap();
    cl.start().unwrap();

    let record = cl.proc(0.02).unwrap().unwrap();

    assert_eq!(record.line_error, 0.5);
    assert_eq!(record.left_speed, 9.5);
    assert_eq!(record.right_speed, 10.5);
    assert_eq!(cl.drive().dems, vec![(9.5, 10.5)]);
}

#[test]
fn test_timing_fault_holds_correction_and_time() {
    let mut cl = CtrlLoop::init(
        &lf_params(1.0, 0.0),
        ScriptedSens::new(vec![Ok(57.5), Ok(20.0)]),
        RecordingDrive::default(),
        MemTrajLog::new()
    ).unwrap();
    cl.start().unwrap();

    let first = cl.proc(0.02).unwrap().unwrap();
    let second = cl.proc(0.0).unwrap().unwrap();

    assert!(cl.report().line_ctrl.timing_fault);
    assert_eq!(second.timestamp, first.timestamp);
    assert_eq!(second.left_speed, first.left_speed);
    assert_eq!(second.right_speed, first.right_speed);
    assert_eq!(second.line_error, -1.0);
}

#[test]
fn test_single_sensor_fault_recovers() {
    let mut cl = CtrlLoop::init(
        &lf_params(0.05, 0.0),
        ScriptedSens::new(vec![Ok(57.5), Err(SensorError::Stale), Ok(45.0)]),
        RecordingDrive::default(),
        MemTrajLog::new()
    ).unwrap();
    cl.start().unwrap();

    for _ in 0..3 {
        cl.proc(0.02).unwrap();
    }

    let records = cl.traj_log().records();
    assert_eq!(records.len(), 3);
    assert_eq!(records[1].line_error, 0.5);
    assert_eq!(records[2].line_error, 0.0);
    assert_eq!(cl.mode(), CtrlLoopMode::Running);
}

#[test]
fn test_persistent_sensor_fault_stops() {
    let mut cl = CtrlLoop::init(
        &lf_params(0.05, 0.0),
        ScriptedSens::new(vec![
            Ok(45.0), Ok(45.0), Err(SensorError::Stale), Ok(150.0), Ok(45.0)
        ]),
        RecordingDrive::default(),
        MemTrajLog::new()
    ).unwrap();
    cl.start().unwrap();

    assert!(cl.proc(0.02).is_ok());
    assert!(cl.proc(0.02).is_ok());
    assert!(cl.proc(0.02).is_ok());
    assert!(matches!(
        cl.proc(0.02),
        Err(CtrlLoopError::Sampler(SamplerError::PersistentLineFault(_)))
    ));

    assert_eq!(cl.mode(), CtrlLoopMode::Stopped);
    assert_eq!(cl.stop_cause(), Some(StopCause::SensorFault));
    assert!(cl.pose().is_none());

    // The last emitted record stays the final one, no further demands
    assert_eq!(cl.traj_log().records().len(), 3);
    assert_eq!(cl.drive().dems.len(), 3);
    assert!(cl.proc(0.02).is_err());
}

#[test]
fn test_first_sensor_fault_stops_immediately() {
    let mut cl = CtrlLoop::init(
        &lf_params(0.05, 0.0),
        ScriptedSens::new(vec![Err(SensorError::NoReading)]),
        RecordingDrive::default(),
        MemTrajLog::new()
    ).unwrap();
    cl.start().unwrap();

    assert!(matches!(
        cl.proc(0.02),
        Err(CtrlLoopError::Sampler(SamplerError::NoValidLine(_)))
    ));
    assert_eq!(cl.stop_cause(), Some(StopCause::SensorFault));
    assert!(cl.traj_log().records().is_empty());
    assert!(cl.drive().dems.is_empty());
}

#[test]
fn test_actuator_fault_stops() {
    let mut cl = CtrlLoop::init(
        &lf_params(0.05, 0.0),
        ScriptedSens::new(vec![]),
        RecordingDrive {
            dems: vec![],
            fail_on_call: Some(2)
        },
        MemTrajLog::new()
    ).unwrap();
    cl.start().unwrap();

    assert!(cl.proc(0.02).is_ok());
    assert!(cl.proc(0.02).is_ok());
    assert!(matches!(
        cl.proc(0.02),
        Err(CtrlLoopError::Actuator(ActuatorError::NotConnected))
    ));

    assert_eq!(cl.mode(), CtrlLoopMode::Stopped);
    assert_eq!(cl.stop_cause(), Some(StopCause::ActuatorFault));
    assert_eq!(cl.traj_log().records().len(), 2);
}

#[test]
fn test_line_lost_stop_policy() {
    let mut params = lf_params(0.05, 0.0);
    params.ctrl_loop.line_lost_policy = LineLostPolicy::Stop;
    params.ctrl_loop.line_lost_threshold = 1.0;
    params.ctrl_loop.line_lost_cycles = 3;

    // Fully white, then a brief sighting of the line, then white again
    let mut cl = CtrlLoop::init(
        &params,
        ScriptedSens::new(vec![
            Ok(70.0), Ok(70.0), Ok(60.0), Ok(70.0), Ok(90.0), Ok(70.0), Ok(70.0)
        ]),
        RecordingDrive::default(),
        MemTrajLog::new()
    ).unwrap();
    cl.start().unwrap();

    for _ in 0..5 {
        assert!(cl.proc(0.02).unwrap().is_some());
    }
    assert!(cl.proc(0.02).unwrap().is_none());

    assert_eq!(cl.mode(), CtrlLoopMode::Stopped);
    assert_eq!(cl.stop_cause(), Some(StopCause::LineLost));
    assert_eq!(cl.traj_log().records().len(), 5);
    assert_eq!(cl.drive().dems.len(), 5);
}

#[test]
fn test_line_lost_saturate_policy_keeps_running() {
    let mut cl = CtrlLoop::init(
        &lf_params(0.05, 1.0),
        ScriptedSens::new((0..500).map(|_| Ok(70.0)).collect()),
        RecordingDrive::default(),
        MemTrajLog::new()
    ).unwrap();
    cl.start().unwrap();

    for _ in 0..500 {
        cl.proc(0.02).unwrap();
    }

    // Integral stays clamped, so the correction is bounded
    assert_eq!(cl.pid_state().unwrap().integral(), 1.0);
    let (left, right) = *cl.drive().dems.last().unwrap();
    assert_eq!((left, right), (0.0, 0.4));
}

#[test]
fn test_follows_simulated_track() {
    let params = lf_params(0.05, 0.02);
    let robot = SimRobot::new(sim_params(Some(0.02)), &params);
    let (sens, drive) = robot.split();

    let mut cl = CtrlLoop::init(&params, sens, drive, MemTrajLog::new()).unwrap();
    cl.start().unwrap();

    for i in 0..1000 {
        let record = cl.proc(0.02).unwrap().unwrap();

        assert!(record.line_error.abs() < 0.5, "cycle {}: {:?}", i, record);
        if i >= 500 {
            assert!(record.line_error.abs() < 0.05, "cycle {}: {:?}", i, record);
        }
    }

    // Odometry matches the true motion up to encoder quantisation
    let est = *cl.pose().unwrap();
    let truth = robot.true_pose();
    assert!((est.position_m - truth.position_m).norm() < 0.01);
    assert_relative_eq!(est.heading_rad, truth.heading_rad, epsilon = 1e-3);

    // The robot has gone a good way around the track
    let records = cl.traj_log().records();
    let summary = PathStats::from_records(records);
    assert_eq!(summary.num_records, 1000);
    assert!(records.windows(2).all(|w| w[1].timestamp > w[0].timestamp));
    assert_relative_eq!(summary.total_time_s, 19.98, epsilon = 1e-9);
    assert!(summary.total_distance_m > 3.5 && summary.total_distance_m < 4.5);
}

#[test]
fn test_run_until_max_cycles() {
    let params = lf_params(0.05, 0.02);
    let robot = SimRobot::new(sim_params(None), &params);
    let (sens, drive) = robot.split();

    let mut cl = CtrlLoop::init(&params, sens, drive, MemTrajLog::new()).unwrap();
    cl.start().unwrap();

    let stop_flag = AtomicBool::new(false);
    cl.run(&stop_flag, Some(20)).unwrap();

    assert_eq!(cl.mode(), CtrlLoopMode::Stopped);
    assert_eq!(cl.stop_cause(), Some(StopCause::StopRequested));

    let records = cl.into_traj_log().into_records();
    assert_eq!(records.len(), 20);

    // Measured time steps are at least the cycle period
    assert!(records.windows(2).all(|w| w[1].timestamp - w[0].timestamp > 0.0019));
}

#[test]
fn test_run_stops_on_flag() {
    let params = lf_params(0.05, 0.0);
    let mut cl = CtrlLoop::init(
        &params,
        ScriptedSens::new(vec![]),
        RecordingDrive::default(),
        MemTrajLog::new()
    ).unwrap();

    let stop_flag = AtomicBool::new(true);
    assert!(matches!(cl.run(&stop_flag, None), Err(CtrlLoopError::NotRunning(_))));

    cl.start().unwrap();
    cl.run(&stop_flag, None).unwrap();

    assert_eq!(cl.num_cycles(), 0);
    assert_eq!(cl.stop_cause(), Some(StopCause::StopRequested));
}
