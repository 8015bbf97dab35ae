//! # Logging Utilities
//!
//! Logging infrastructure for loupe using `tracing`.
//!
//! Printers log through `tracing` macros only; this module decides where the
//! events go. Nothing is ever written into the inspected process.
//!
//! ## Environment Variables
//!
//! - `RUST_LOG`: Set log level filter (e.g., `RUST_LOG=debug`, `RUST_LOG=loupe_core=trace`)
//! - `LOUPE_LOG_FORMAT`: Set output format (`json` or `pretty`, default: `pretty`)
//! - `LOUPE_LOG_FILE`: Optional path to log file (if not set, logs only to stderr)
//!
//! ## Example
//!
//! ```rust,no_run
//! use loupe_utils::{LogFormat, LogLevel, init_logging_with_level};
//!
//! // Keep the guard alive until exit so buffered file output is flushed
//! let _guard = init_logging_with_level(LogLevel::Debug, LogFormat::Pretty)
//!     .expect("Failed to initialize logging");
//! tracing::debug!("registry built");
//! ```

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::{env, io};

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::{self};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

const FORMAT_VAR: &str = "LOUPE_LOG_FORMAT";
const FILE_VAR: &str = "LOUPE_LOG_FILE";

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat
{
    /// Pretty-printed, human-readable format (default)
    Pretty,
    /// JSON lines, for feeding into other tools
    Json,
}

impl FromStr for LogFormat
{
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(LoggingError::InvalidFormat(s.to_string())),
        }
    }
}

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel
{
    /// Error level
    Error,
    /// Warning level (default for the CLI)
    Warn,
    /// Info level
    Info,
    /// Debug level: registry construction and printer matches
    Debug,
    /// Trace level: every dispatch, including misses
    Trace,
}

impl From<LogLevel> for Level
{
    fn from(level: LogLevel) -> Self
    {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

impl FromStr for LogLevel
{
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "error" | "err" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" | "dbg" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(LoggingError::InvalidLevel(s.to_string())),
        }
    }
}

/// Keeps the background file writer alive. Dropping it flushes and stops
/// file logging.
#[must_use = "dropping the guard stops file logging"]
#[derive(Debug)]
pub struct LoggingGuard
{
    _file: Option<WorkerGuard>,
}

/// Initialize logging from the environment
///
/// Reads `LOUPE_LOG_FORMAT` and `LOUPE_LOG_FILE`; `RUST_LOG` filters, with
/// `WARN` when unset.
///
/// ## Errors
///
/// Returns an error if:
/// - `LOUPE_LOG_FORMAT` holds an unknown format
/// - Logging is already initialized
pub fn init_logging() -> Result<LoggingGuard, LoggingError>
{
    let format = match env::var(FORMAT_VAR) {
        Ok(value) => value.parse()?,
        Err(_) => LogFormat::Pretty,
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(Level::WARN.to_string()));
    install(format, filter)
}

/// Initialize logging with an explicit level and format
///
/// The level wins over `RUST_LOG`. `LOUPE_LOG_FILE` is still honored.
///
/// ## Errors
///
/// Returns an error if logging is already initialized.
pub fn init_logging_with_level(level: LogLevel, format: LogFormat) -> Result<LoggingGuard, LoggingError>
{
    install(format, EnvFilter::new(Level::from(level).to_string()))
}

fn install(format: LogFormat, filter: EnvFilter) -> Result<LoggingGuard, LoggingError>
{
    // stderr keeps stdout free for rendered values
    let console = output_layer(format, io::stderr, true);

    let (file, guard) = match env::var(FILE_VAR).ok().map(PathBuf::from) {
        Some(path) => {
            let (writer, guard) = tracing_appender::non_blocking(file_appender(&path));
            (Some(output_layer(format, writer, false)), Some(guard))
        }
        None => (None, None),
    };

    Registry::default()
        .with(console.and_then(file).with_filter(filter))
        .try_init()
        .map_err(|err| LoggingError::InitializationFailed(err.to_string()))?;

    Ok(LoggingGuard { _file: guard })
}

fn file_appender(path: &Path) -> tracing_appender::rolling::RollingFileAppender
{
    let (directory, file_name) = split_log_path(path);
    tracing_appender::rolling::never(directory, file_name)
}

/// Directory and file name of a log path; a bare file name lives in `.`.
fn split_log_path(path: &Path) -> (&Path, &OsStr)
{
    let directory = path.parent().filter(|dir| !dir.as_os_str().is_empty()).unwrap_or(Path::new("."));
    (directory, path.file_name().unwrap_or_default())
}

fn output_layer<W>(format: LogFormat, writer: W, ansi: bool) -> Box<dyn Layer<Registry> + Send + Sync>
where
    W: for<'writer> fmt::MakeWriter<'writer> + Send + Sync + 'static,
{
    let layer = fmt::layer()
        .with_writer(writer)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_timer(ChronoUtc::rfc_3339());

    match format {
        LogFormat::Pretty => layer.with_ansi(ansi).boxed(),
        LogFormat::Json => layer.json().with_current_span(true).with_span_list(true).boxed(),
    }
}

/// Logging initialization error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError
{
    /// Invalid log format
    #[error("Unknown log format: {0}. Use 'pretty' or 'json'")]
    InvalidFormat(String),

    /// Invalid log level
    #[error("Unknown log level: {0}. Use 'error', 'warn', 'info', 'debug', or 'trace'")]
    InvalidLevel(String),

    /// Failed to initialize logging
    #[error("Failed to initialize logging: {0}")]
    InitializationFailed(String),
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_log_format_from_str()
    {
        assert_eq!(LogFormat::from_str("pretty").unwrap(), LogFormat::Pretty);
        assert_eq!(LogFormat::from_str("TEXT").unwrap(), LogFormat::Pretty);
        assert_eq!(LogFormat::from_str("json").unwrap(), LogFormat::Json);
        assert!(matches!(LogFormat::from_str("xml"), Err(LoggingError::InvalidFormat(_))));
    }

    #[test]
    fn test_log_level_from_str()
    {
        assert_eq!(LogLevel::from_str("error").unwrap(), LogLevel::Error);
        assert_eq!(LogLevel::from_str("warning").unwrap(), LogLevel::Warn);
        assert_eq!(LogLevel::from_str("info").unwrap(), LogLevel::Info);
        assert_eq!(LogLevel::from_str("dbg").unwrap(), LogLevel::Debug);
        assert_eq!(LogLevel::from_str("trace").unwrap(), LogLevel::Trace);
        assert!(LogLevel::from_str("loud").is_err());
    }

    #[test]
    fn test_log_level_to_tracing_level()
    {
        assert_eq!(Level::from(LogLevel::Error), Level::ERROR);
        assert_eq!(Level::from(LogLevel::Warn), Level::WARN);
        assert_eq!(Level::from(LogLevel::Debug), Level::DEBUG);
        assert_eq!(Level::from(LogLevel::Trace), Level::TRACE);
    }

    #[test]
    fn test_bare_log_file_name_goes_to_working_directory()
    {
        let (directory, file_name) = split_log_path(Path::new("loupe.log"));
        assert_eq!(directory, Path::new("."));
        assert_eq!(file_name, "loupe.log");

        let (directory, file_name) = split_log_path(Path::new("logs/loupe.log"));
        assert_eq!(directory, Path::new("logs"));
        assert_eq!(file_name, "loupe.log");
    }

    #[test]
    fn test_file_appender_creates_file_in_directory()
    {
        let directory = std::env::temp_dir().join("loupe-logging-test");
        std::fs::create_dir_all(&directory).unwrap();
        let _appender = file_appender(&directory.join("loupe.log"));
        assert!(directory.join("loupe.log").exists());
    }
}
