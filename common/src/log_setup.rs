use std::path::PathBuf;
use std::sync::{Once, OnceLock};

use thiserror::Error;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{InitError, Rotation};
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();
static TEST_LOG_INIT: Once = Once::new();

#[derive(Debug, Error)]
pub enum LogSetupError {
    #[error("Invalid log filter '{directives}': {source}")]
    InvalidFilter {
        directives: String,
        #[source]
        source: ParseError,
    },

    #[error("Failed to create log directory {}: {source}", path.display())]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create log file appender: {0}")]
    Appender(#[from] InitError),

    #[error("Logging already initialized")]
    AlreadyInitialized,

    #[error("Logger initialization failed: {0}")]
    Install(#[from] TryInitError),
}

/// Where and how much a binary logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Filter directives used when `RUST_LOG` is unset, e.g. `"info"` or
    /// `"sextant=debug,warn"`.
    pub base_level: String,
    /// Directory receiving the rolling log files.
    pub directory: PathBuf,
    /// Log files are named `<file_prefix>.<date>.log`.
    pub file_prefix: String,
    /// Number of daily files kept.
    pub max_files: usize,
    /// Also log to stdout, with WARN and above duplicated to stderr.
    pub console: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            base_level: "info".to_string(),
            directory: PathBuf::from("logs"),
            file_prefix: "sextant".to_string(),
            max_files: 5,
            console: true,
        }
    }
}

impl LogConfig {
    /// `RUST_LOG` if it is set and valid, otherwise `base_level`.
    pub fn env_filter(&self) -> Result<EnvFilter, LogSetupError> {
        EnvFilter::try_from_default_env().or_else(|_| parse_filter(&self.base_level))
    }
}

fn parse_filter(directives: &str) -> Result<EnvFilter, LogSetupError> {
    EnvFilter::try_new(directives).map_err(|source| LogSetupError::InvalidFilter {
        directives: directives.to_string(),
        source,
    })
}

/// Installs rolling-file logging, plus console logging if enabled, as the
/// global subscriber. Intended to be called once at binary start-up.
pub fn setup_logging(config: &LogConfig) -> Result<(), LogSetupError> {
    if LOG_GUARD.get().is_some() {
        return Err(LogSetupError::AlreadyInitialized);
    }

    let env_filter = config.env_filter()?;

    std::fs::create_dir_all(&config.directory).map_err(|source| {
        LogSetupError::CreateDirectory {
            path: config.directory.clone(),
            source,
        }
    })?;

    let file_appender = tracing_appender::rolling::Builder::new()
        .rotation(Rotation::DAILY)
        .filename_prefix(&config.file_prefix)
        .filename_suffix("log")
        .max_log_files(config.max_files)
        .build(&config.directory)?;

    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
    LOG_GUARD
        .set(guard)
        .map_err(|_| LogSetupError::AlreadyInitialized)?;

    let console_layer = config.console.then(|| {
        let console_writer = std::io::stdout.and(std::io::stderr.with_min_level(Level::WARN));
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_line_number(true)
            .with_file(true)
            .with_ansi(true)
            .with_writer(console_writer)
    });

    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(false)
        .with_writer(file_writer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()?;

    Ok(())
}

/// Routes `tracing` output through the libtest capture writer.
///
/// Safe to call from every test; only the first call installs a subscriber,
/// and a subscriber installed elsewhere is left in place.
pub fn init_test_logging() {
    TEST_LOG_INIT.call_once(|| {
        let env_filter = EnvFilter::try_from_default_env()
            .or_else(|_| parse_filter("debug"))
            .unwrap_or_else(|_| EnvFilter::new("debug"));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_test_writer()
            .try_init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_test_logging_is_idempotent() {
        init_test_logging();
        init_test_logging();
        tracing::debug!("test logging initialized twice without panicking");
    }

    #[test]
    fn test_default_config() {
        let config = LogConfig::default();
        assert_eq!(config.base_level, "info");
        assert_eq!(config.directory, PathBuf::from("logs"));
        assert_eq!(config.max_files, 5);
        assert!(config.console);
    }

    #[test]
    fn test_parse_filter_accepts_directives() {
        assert!(parse_filter("info").is_ok());
        assert!(parse_filter("sextant=debug,warn").is_ok());
    }

    #[test]
    fn test_parse_filter_rejects_bad_level() {
        let err = parse_filter("sextant=loud").unwrap_err();
        assert!(matches!(err, LogSetupError::InvalidFilter { ref directives, .. } if directives == "sextant=loud"));
        assert!(err.to_string().starts_with("Invalid log filter 'sextant=loud'"));
    }
}
