//! Logging to the terminal and the session log file

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use colored::Colorize;
use log::{self, info, Level, Record};
use thiserror::Error;

// Internal imports
use crate::session;

// Re-exports
pub use log::LevelFilter;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors associated with initialising the logger.
#[derive(Debug, Error)]
pub enum LoggerInitError {
    #[error("Expected a log level of at least `INFO`, found `{0}`")]
    InvalidMinLogLevel(LevelFilter),

    #[error("Error initialising the log file: {0}")]
    LogFileInitError(std::io::Error),

    #[error("An error occured while setting up the logger: {0}")]
    FernInitError(log::SetLoggerError)
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Initialise the logger for this execution.
///
/// The terminal gets coloured level tags, the session log file plain ones. Each entry in
/// `module_levels` caps the level of a module path, for modules which log every control cycle.
///
/// # Notes
///
/// - `min_level` must be `Info` or more verbose.
/// - Must only be called once per process, later calls return `FernInitError`.
pub fn logger_init(
    min_level: LevelFilter,
    module_levels: &[(&'static str, LevelFilter)],
    session: &session::Session
) -> Result<(), LoggerInitError> {

    if min_level < Level::Info {
        return Err(LoggerInitError::InvalidMinLogLevel(min_level))
    }

    let log_file = fern::log_file(session.log_file_path.clone())
        .map_err(LoggerInitError::LogFileInitError)?;

    let mut dispatch = fern::Dispatch::new().level(min_level);
    for (module, level) in module_levels {
        dispatch = dispatch.level_for(*module, (*level).min(min_level));
    }

    let term = fern::Dispatch::new()
        .format(|out, message, record| {
            let tag = level_tag(record.level());
            let tag = match record.level() {
                Level::Trace | Level::Debug => tag.dimmed(),
                Level::Info => tag.normal(),
                Level::Warn => tag.yellow(),
                Level::Error => tag.red().bold()
            };
            out.finish(format_args!(
                "[{:10.6} {}]{} {}",
                session::get_elapsed_seconds(),
                tag,
                target_suffix(record),
                message
            ))
        })
        .chain(std::io::stdout());

    let file = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{:10.6} {}]{} {}",
                session::get_elapsed_seconds(),
                level_tag(record.level()),
                target_suffix(record),
                message
            ))
        })
        .chain(log_file);

    dispatch
        .chain(term)
        .chain(file)
        .apply()
        .map_err(LoggerInitError::FernInitError)?;

    info!("Logging initialised");
    info!("    Session epoch: {}", session::get_epoch());
    info!("    Log level: {:?}", min_level);
    for (module, level) in module_levels {
        info!("    {} capped at: {:?}", module, (*level).min(min_level));
    }
    info!("    Log file path: {:?}", session.log_file_path);

    Ok(())
}

/// Parse a log level from a verbosity count, as given by repeated `-v` flags.
///
/// Zero gives `Info`, one `Debug` and two or more `Trace`.
pub fn level_from_verbosity(verbosity: u64) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn level_tag(level: Level) -> &'static str {
    match level {
        Level::Trace => "TRC",
        Level::Debug => "DBG",
        Level::Info  => "INF",
        Level::Warn  => "WRN",
        Level::Error => "ERR"
    }
}

/// Module path shown after the tag for debug and trace records, without the crate name.
fn target_suffix(record: &Record) -> String {
    if record.level() <= Level::Info {
        return String::new();
    }

    let target = record.target();
    match target.find("::") {
        Some(i) => format!(" {}:", &target[i + 2..]),
        None => format!(" {}:", target)
    }
}
