//! Logging setup for the scour service.
//!
//! Everything goes to stdout. Unless disabled, logs are also written to
//! daily-rotating files:
//!
//! - `scour.<date>.log`: all levels allowed by the filter
//! - `error.<date>.log`: warnings and errors only
//!
//! The default filter is `info`; set `RUST_LOG` to override it.
//!
//! ```no_run
//! use scour::logging::{self, LogSettings};
//!
//! logging::init(&LogSettings::default()).expect("Failed to initialize logging");
//! tracing::info!("Service started");
//! ```

use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    EnvFilter, Layer as _, fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _,
};

const LOG_PREFIX: &str = "scour";
const MAX_LOG_FILES: usize = 10;

#[derive(Debug, Clone, Default)]
pub struct LogSettings {
    /// Write rolling log files next to stdout output
    pub to_file: bool,
    /// Directory for log files; the platform data directory when `None`
    pub dir: Option<PathBuf>,
}

impl From<&crate::config::ServerConfig> for LogSettings {
    fn from(config: &crate::config::ServerConfig) -> Self {
        Self {
            to_file: config.log_to_file,
            dir: config.log_dir.clone(),
        }
    }
}

/// Resolves (and creates) the log directory.
///
/// Without an override this is the platform data directory:
/// - Windows: `%APPDATA%/scour/logs`
/// - macOS: `~/Library/Application Support/scour/logs`
/// - Linux: `~/.local/share/scour/logs`
pub fn get_log_dir(dir: Option<&Path>) -> Result<PathBuf> {
    let log_dir = match dir {
        Some(dir) => dir.to_path_buf(),
        None => dirs::data_dir()
            .context("Failed to determine data directory")?
            .join(LOG_PREFIX)
            .join("logs"),
    };

    if !log_dir.exists() {
        std::fs::create_dir_all(&log_dir)
            .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;
    }

    Ok(log_dir)
}

fn rolling_appender(log_dir: &Path, prefix: &str) -> Result<RollingFileAppender> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .max_log_files(MAX_LOG_FILES)
        .filename_prefix(prefix)
        .filename_suffix("log")
        .build(log_dir)
        .with_context(|| format!("Failed to create {prefix} log file appender"))
}

/// Installs the global tracing subscriber.
///
/// # Errors
///
/// Returns error if the log directory or file appenders cannot be created,
/// or a global subscriber is already installed.
pub fn init(settings: &LogSettings) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .context("Failed to create env filter")?;

    let stdout_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_line_number(true)
        .with_file(true)
        .pretty();

    let (log_dir, all_logs_layer, error_logs_layer) = if settings.to_file {
        let log_dir = get_log_dir(settings.dir.as_deref())?;

        let all_logs_layer = fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_line_number(true)
            .with_file(true)
            .with_ansi(false)
            .with_writer(rolling_appender(&log_dir, LOG_PREFIX)?);

        let error_logs_layer = fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_line_number(true)
            .with_file(true)
            .with_ansi(false)
            .with_writer(rolling_appender(&log_dir, "error")?)
            .with_filter(EnvFilter::new("warn"));

        (Some(log_dir), Some(all_logs_layer), Some(error_logs_layer))
    } else {
        (None, None, None)
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(all_logs_layer)
        .with(error_logs_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    match log_dir {
        Some(dir) => tracing::info!("Logging initialized, log directory: {}", dir.display()),
        None => tracing::info!("Logging initialized (stdout only)"),
    }

    Ok(())
}
