#![deny(missing_docs)]
//! Shared logging utilities for the schedule dashboard workspace.
//!
//! This crate provides the `engine_*` logging macros used across the codebase,
//! the logger initialization used by the dashboard binary, and a minimal test
//! initializer for the global logger.
//!
//! Every message emitted through the macros is prefixed with the current
//! refresh pass, so the lines belonging to one `refresh_all` can be grouped
//! when reading a log file.

use std::cell::Cell;
use std::fs::File;
use std::path::Path;

use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

thread_local! {
    /// Thread-local storage for the current refresh pass number.
    static REFRESH_PASS: Cell<u64> = const { Cell::new(0) };
}

/// Advances the refresh pass counter for the current thread and returns the new value.
/// The reconciler calls this once at the start of every full refresh.
pub fn begin_refresh_pass() -> u64 {
    REFRESH_PASS.with(|v| {
        let next = v.get().wrapping_add(1);
        v.set(next);
        next
    })
}

/// Retrieves the refresh pass number for the current thread.
/// Returns 0 before the first refresh.
pub fn refresh_pass() -> u64 {
    REFRESH_PASS.with(|v| v.get())
}

/// Logs a trace-level message tagged with the current refresh pass.
#[macro_export]
macro_rules! engine_trace {
    ($($arg:tt)*) => {{
        log::trace!("[pass {}] {}", $crate::refresh_pass(), format_args!($($arg)*));
    }};
}

/// Logs an info-level message tagged with the current refresh pass.
#[macro_export]
macro_rules! engine_info {
    ($($arg:tt)*) => {{
        log::info!("[pass {}] {}", $crate::refresh_pass(), format_args!($($arg)*));
    }};
}

/// Logs a debug-level message tagged with the current refresh pass.
#[macro_export]
macro_rules! engine_debug {
    ($($arg:tt)*) => {{
        log::debug!("[pass {}] {}", $crate::refresh_pass(), format_args!($($arg)*));
    }};
}

/// Logs a warn-level message tagged with the current refresh pass.
#[macro_export]
macro_rules! engine_warn {
    ($($arg:tt)*) => {{
        log::warn!("[pass {}] {}", $crate::refresh_pass(), format_args!($($arg)*));
    }};
}

/// Logs an error-level message tagged with the current refresh pass.
#[macro_export]
macro_rules! engine_error {
    ($($arg:tt)*) => {{
        log::error!("[pass {}] {}", $crate::refresh_pass(), format_args!($($arg)*));
    }};
}

/// Destination for log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
pub enum LogDestination {
    /// Write to the configured log file only.
    File,
    /// Write to the terminal (stderr for warnings and errors, stdout otherwise).
    #[default]
    Terminal,
    /// Write to both the log file and the terminal.
    Both,
}

/// Initializes the global logger.
///
/// File destinations create (truncate) `log_path`. When the file cannot be
/// created the file logger is skipped and a warning is printed, so the
/// dashboard keeps running with whatever loggers remain.
pub fn initialize(destination: LogDestination, level: LevelFilter, log_path: &Path) {
    let config = build_config();

    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();
    if matches!(destination, LogDestination::Terminal | LogDestination::Both) {
        loggers.push(TermLogger::new(
            level,
            config.clone(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ));
    }
    if matches!(destination, LogDestination::File | LogDestination::Both) {
        if let Some(file_logger) = create_file_logger(level, config, log_path) {
            loggers.push(file_logger);
        }
    }
    if loggers.is_empty() {
        return;
    }

    let _ = CombinedLogger::init(loggers);
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}

fn build_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .build()
}

fn create_file_logger(
    level: LevelFilter,
    config: Config,
    log_path: &Path,
) -> Option<Box<WriteLogger<File>>> {
    match File::create(log_path) {
        Ok(file) => Some(WriteLogger::new(level, config, file)),
        Err(err) => {
            eprintln!("Warning: Could not create log file at {:?}: {}", log_path, err);
            None
        }
    }
}
