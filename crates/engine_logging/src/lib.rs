#![deny(missing_docs)]
//! Per-job logging for the archive workspace.
//!
//! Jobs never touch a process-global logger directly. A [`JobLogger`] is
//! built once by the caller and handed to the archiver, which clones it into
//! the worker. The `job_*` macros format a message and route it through that
//! logger.

use std::fmt;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

pub use log::{Level, LevelFilter, Log};

const TARGET: &str = "archive";

#[derive(Clone)]
enum Sink {
    Global,
    Injected(Arc<dyn Log>),
}

/// Logger handle injected into a job at construction time.
#[derive(Clone)]
pub struct JobLogger {
    sink: Sink,
}

impl JobLogger {
    /// Wraps an existing `log::Log` implementation.
    pub fn new(sink: Arc<dyn Log>) -> Self {
        Self {
            sink: Sink::Injected(sink),
        }
    }

    /// Forwards to whatever global logger the host process installed.
    /// Useful when the archive is embedded into a larger application.
    pub fn global() -> Self {
        Self { sink: Sink::Global }
    }

    /// Emits one record at `level`. Prefer the `job_*` macros.
    pub fn log(&self, level: Level, args: fmt::Arguments<'_>) {
        let logger: &dyn Log = match &self.sink {
            Sink::Global => log::logger(),
            Sink::Injected(inner) => inner.as_ref(),
        };
        logger.log(
            &log::Record::builder()
                .args(args)
                .level(level)
                .target(TARGET)
                .build(),
        );
    }

    /// Flushes buffered output of the underlying sinks.
    pub fn flush(&self) {
        match &self.sink {
            Sink::Global => log::logger().flush(),
            Sink::Injected(inner) => inner.flush(),
        }
    }
}

impl fmt::Debug for JobLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.sink {
            Sink::Global => "global",
            Sink::Injected(_) => "injected",
        };
        f.debug_struct("JobLogger").field("sink", &kind).finish()
    }
}

/// Logs a trace-level message through a [`JobLogger`].
#[macro_export]
macro_rules! job_trace {
    ($logger:expr, $($arg:tt)*) => {{
        $logger.log($crate::Level::Trace, format_args!($($arg)*));
    }};
}

/// Logs a debug-level message through a [`JobLogger`].
#[macro_export]
macro_rules! job_debug {
    ($logger:expr, $($arg:tt)*) => {{
        $logger.log($crate::Level::Debug, format_args!($($arg)*));
    }};
}

/// Logs an info-level message through a [`JobLogger`].
#[macro_export]
macro_rules! job_info {
    ($logger:expr, $($arg:tt)*) => {{
        $logger.log($crate::Level::Info, format_args!($($arg)*));
    }};
}

/// Logs a warn-level message through a [`JobLogger`].
#[macro_export]
macro_rules! job_warn {
    ($logger:expr, $($arg:tt)*) => {{
        $logger.log($crate::Level::Warn, format_args!($($arg)*));
    }};
}

/// Logs an error-level message through a [`JobLogger`].
#[macro_export]
macro_rules! job_error {
    ($logger:expr, $($arg:tt)*) => {{
        $logger.log($crate::Level::Error, format_args!($($arg)*));
    }};
}

/// Builds the dual-sink job logger.
///
/// The terminal sink logs at Debug when `verbose` is set and Warn otherwise.
/// The file sink, if a path is given, always logs at Debug and truncates the
/// file on creation. A file that cannot be created is reported on stderr and
/// the terminal sink is used alone.
pub fn build_job_logger(verbose: bool, log_file: Option<&Path>) -> JobLogger {
    let console_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    let config = build_config();

    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        console_level,
        config.clone(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    if let Some(path) = log_file {
        match File::create(path) {
            Ok(file) => loggers.push(WriteLogger::new(LevelFilter::Debug, config, file)),
            Err(err) => eprintln!("Warning: Could not create log file at {:?}: {}", path, err),
        }
    }

    let combined: Box<dyn Log> = CombinedLogger::new(loggers);
    JobLogger::new(Arc::from(combined))
}

/// Builds a file-only logger at `level`. Returns `None` if the file cannot
/// be created.
pub fn file_logger(path: &Path, level: LevelFilter) -> Option<JobLogger> {
    let file = File::create(path).ok()?;
    let writer: Box<dyn Log> = WriteLogger::new(level, build_config(), file);
    Some(JobLogger::new(Arc::from(writer)))
}

/// Terminal logger at Debug for use in tests.
pub fn test_logger() -> JobLogger {
    let term: Box<dyn Log> = TermLogger::new(
        LevelFilter::Debug,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    );
    JobLogger::new(Arc::from(term))
}

fn build_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .build()
}
