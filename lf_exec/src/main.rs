//! Main line follower executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Create the session and initialise logging
//!     - Load and validate all parameters
//!     - Initialise the equipment (the simulated robot) and the trajectory log
//!     - Run the control loop at its fixed period until stopped:
//!         - Sensor sampling
//!         - Line control
//!         - Locomotion control
//!         - Actuation
//!         - Odometry
//!         - Trajectory record emission
//!     - Report the path statistics and close the session

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{error, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use structopt::StructOpt;

// Internal
use lf_lib::{
    ctrl_loop::CtrlLoop,
    params::LfParams,
    sim::{self, SimRobot},
    stats::{PathStats, PATH_STATS_FILE},
    traj_log::{ArchiveTrajLog, QueuedTrajLog},
};
use util::{
    logger::{level_from_verbosity, logger_init, LevelFilter},
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Modules which trace every control cycle.
const PER_CYCLE_MODULES: [&str; 3] = [
    "lf_lib::sampler",
    "lf_lib::line_ctrl",
    "lf_lib::loco_ctrl",
];

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Line follower executable.
#[derive(Debug, StructOpt)]
#[structopt(name = "lf_exec")]
struct Args {
    /// Verbosity, repeat for more detail (-v: debug, -vv: trace, -vvv: per-cycle trace)
    #[structopt(short, long, parse(from_occurrences))]
    verbose: u64,

    /// Stop after this many cycles, overrides the executable parameters
    #[structopt(long)]
    max_cycles: Option<u64>,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let args = Args::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new(
        "lf_exec",
        "sessions"
    ).wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(
        level_from_verbosity(args.verbose),
        &per_cycle_log_levels(args.verbose),
        &session
    )
        .wrap_err("Failed to initialise logging")?;

    info!("Line Follower Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let lf_params = LfParams::load()
        .wrap_err("Could not load the executable parameters")?;
    let sim_params: sim::Params = util::params::load("sim.toml")
        .wrap_err("Could not load the simulation parameters")?;
    sim_params.validate()
        .wrap_err("Invalid simulation parameters")?;

    let max_cycles = args.max_cycles.or(lf_params.max_cycles);

    info!("Parameters loaded");

    // ---- INITIALISE EQUIPMENT ----

    let robot = SimRobot::new(sim_params, &lf_params);
    let (sens, drive) = robot.split();

    info!("Simulated robot initialised");

    // ---- INITIALISE TRAJECTORY LOG ----

    let archive = ArchiveTrajLog::from_session(&session)
        .wrap_err("Failed to create the trajectory archive")?;
    let traj_log = QueuedTrajLog::new(
        (archive, PathStats::new()),
        lf_params.log_queue_capacity
    );

    // ---- INITIALISE CONTROL LOOP ----

    let mut ctrl_loop = CtrlLoop::init(&lf_params, sens, drive, traj_log)
        .wrap_err("Failed to initialise the control loop")?;

    let stop_flag = Arc::new(AtomicBool::new(false));
    let stop_flag_handle = stop_flag.clone();

    ctrlc::set_handler(move || {
        stop_flag_handle.store(true, Ordering::Release);
    }).wrap_err("Failed to set the Ctrl-C handler")?;

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    ctrl_loop.start().wrap_err("Failed to start the control loop")?;

    let run_result = ctrl_loop.run(&stop_flag, max_cycles);

    let stop_cause = ctrl_loop.stop_cause();
    let num_cycles = ctrl_loop.num_cycles();

    // ---- SHUTDOWN ----

    info!("Control loop exited after {} cycles ({:?})", num_cycles, stop_cause);

    // Write out any queued records before reporting
    let (sinks, num_dropped) = ctrl_loop.into_traj_log().finish();

    match sinks {
        Some((archive, stats)) => {
            if archive.num_errors() > 0 {
                warn!("{} trajectory records could not be archived", archive.num_errors());
            }

            let summary = stats.summary();
            summary.log();
            session.save(PATH_STATS_FILE, summary);
        },
        None => error!("Trajectory log thread failed, no path statistics available")
    }

    if num_dropped > 0 {
        warn!("{} trajectory records were dropped", num_dropped);
    }

    session.exit();

    info!("End of execution");

    run_result.wrap_err("Control loop stopped on a fault")
}

/// Level caps for the per-cycle modules, which only trace from `-vvv`.
fn per_cycle_log_levels(verbosity: u64) -> Vec<(&'static str, LevelFilter)> {
    if verbosity >= 3 {
        return Vec::new();
    }

    PER_CYCLE_MODULES.iter()
        .map(|m| (*m, LevelFilter::Debug))
        .collect()
}
