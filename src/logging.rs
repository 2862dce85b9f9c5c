//! Logger for the `log` facade.
//!
//! Levels use the engine's numeric scale (0 = nothing .. 6 = all) so the
//! same number works in the setup file and on the command line.

use std::fs::File;
use std::io::Write;

use anyhow::{Context, Result};
use env_logger::{Builder, Target};
use log::LevelFilter;

/// Log levels on the engine scale
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Nothing = 0,
    User = 1,
    Error = 2,
    Warning = 3,
    Info = 4,
    Debug = 5,
    All = 6,
}

impl LogLevel {
    /// Create a LogLevel from an integer
    pub fn from_i32(level: i32) -> Self {
        match level {
            0 => LogLevel::Nothing,
            1 => LogLevel::User,
            2 => LogLevel::Error,
            3 => LogLevel::Warning,
            4 => LogLevel::Info,
            5 => LogLevel::Debug,
            6 => LogLevel::All,
            _ => LogLevel::Info,
        }
    }

    pub fn as_i32(&self) -> i32 {
        *self as i32
    }

    /// Matching filter for the `log` facade. `User` messages are reported
    /// as errors.
    pub fn level_filter(&self) -> LevelFilter {
        match self {
            LogLevel::Nothing => LevelFilter::Off,
            LogLevel::User | LogLevel::Error => LevelFilter::Error,
            LogLevel::Warning => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::All => LevelFilter::Trace,
        }
    }
}

/// Logger builder writing `[LEVEL] message` lines to `target`.
pub fn logger_builder(level: LogLevel, target: Target) -> Builder {
    let mut builder = Builder::new();
    builder
        .filter_level(level.level_filter())
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .target(target);
    builder
}

/// Install the process logger, writing to `log_file` when given and to
/// stderr otherwise. Later calls fail because the facade accepts a single
/// logger.
pub fn log_init(level: LogLevel, log_file: Option<&str>) -> Result<()> {
    let target = match log_file {
        Some(path) => {
            let file =
                File::create(path).with_context(|| format!("Failed to open log file {}", path))?;
            Target::Pipe(Box::new(file))
        }
        None => Target::Stderr,
    };
    logger_builder(level, target)
        .try_init()
        .context("Failed to install logger")
}
