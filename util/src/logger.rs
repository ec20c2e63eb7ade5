//! Generic logger utility functions
//!
//! Each executable runs one logger with two sinks: stdout, with colored
//! level tags, and the session log file, with plain tags so the file stays
//! grep-able. Both sinks share the session-elapsed timestamp.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use colored::Colorize;
use fern;
use log::{self, info};
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
    #[error("Expected a log level less than `INFO`, found `{0}`")]
    InvalidMinLogLevel(log::LevelFilter),

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
/// # Notes
///
/// - `min_level` must be greater than `log::Level::Info`.
///
/// # Safety
///
/// - This function must only be called once to prevent corrupting logs.
pub fn logger_init(
    min_level: self::LevelFilter,
    session: &session::Session
) -> Result<(), LoggerInitError> {

    if min_level < log::Level::Info {
        return Err(LoggerInitError::InvalidMinLogLevel(min_level))
    }

    // Stdout sink with colored level tags
    let stdout_dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}",
                format_record(record, message, true)
            ))
        })
        .chain(std::io::stdout());

    // Session log file sink, same records without the color escapes
    let file_dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}",
                format_record(record, message, false)
            ))
        })
        .chain(match fern::log_file(session.log_file_path.clone()) {
            Ok(f) => f,
            Err(e) => return Err(LoggerInitError::LogFileInitError(e))
        });

    match fern::Dispatch::new()
        .level(min_level)
        .level_for("zmq", LevelFilter::Info)
        .chain(stdout_dispatch)
        .chain(file_dispatch)
        .apply() {
            Ok(_) => (),
            Err(e) => return Err(LoggerInitError::FernInitError(e))
        };

    info!("Logging initialised");
    info!("    Session epoch: {}", session::get_epoch());
    info!("    Log level: {:?}", min_level);
    info!("    Log file path: {:?}", session.log_file_path);

    Ok(())
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Format a single log record.
///
/// Debug and trace records include the target so cross-thread output can be
/// traced back to its module, info and above don't.
fn format_record(
    record: &log::Record,
    message: &std::fmt::Arguments,
    colored: bool
) -> String {
    let level = if colored {
        level_to_str_colored(record.level())
    }
    else {
        String::from(level_to_str(record.level()))
    };

    if record.level() > log::Level::Info {
        format!(
            "[{:10.6} {}] {}: {}",
            session::get_elapsed_seconds(),
            level,
            record.target(),
            message
        )
    }
    else {
        format!(
            "[{:10.6} {}] {}",
            session::get_elapsed_seconds(),
            level,
            message
        )
    }
}

/// Get the plain string representation of a log level
fn level_to_str(level: log::Level) -> &'static str {
    match level {
        log::Level::Trace => "TRC",
        log::Level::Debug => "DBG",
        log::Level::Info  => "INF",
        log::Level::Warn  => "WRN",
        log::Level::Error => "ERR"
    }
}

/// Get the colored string representation of a log level
fn level_to_str_colored(level: log::Level) -> String {
    let tag = level_to_str(level);

    match level {
        log::Level::Trace => tag.dimmed().italic(),
        log::Level::Debug => tag.dimmed(),
        log::Level::Info  => tag.normal(),
        log::Level::Warn  => tag.yellow(),
        log::Level::Error => tag.red().bold()
    }
    .to_string()
}
