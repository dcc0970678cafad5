//! Logging setup using the tracing ecosystem.
//!
//! The server owns no terminal of its own, so logs go to stderr by default
//! or to an append-mode file when `--log-file` is given.

use crate::error::{Error, Result};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable consulted when no filter is given on the command line.
pub const LOG_ENV: &str = "TERMFOLIO_LOG";

const DEFAULT_FILTER: &str = "info";

/// Log output destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogOutput {
    Stderr,
    /// Append to this file
    File(PathBuf),
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub output: LogOutput,
    /// Log level filter (e.g., "info", "termfolio=debug,tokio=warn")
    pub filter: String,
    /// Include file/line in logs
    pub file_line: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            output: LogOutput::Stderr,
            filter: DEFAULT_FILTER.into(),
            file_line: false,
        }
    }
}

impl LogConfig {
    /// Build from command-line values, falling back to `TERMFOLIO_LOG`.
    pub fn from_args(level: Option<&str>, file: Option<PathBuf>) -> Self {
        let env = std::env::var(LOG_ENV).ok();
        Self {
            output: file.map_or(LogOutput::Stderr, LogOutput::File),
            filter: resolve_filter(level, env.as_deref()),
            file_line: false,
        }
    }
}

/// Pick the first filter that is set and non-empty.
pub fn resolve_filter(cli: Option<&str>, env: Option<&str>) -> String {
    cli.into_iter()
        .chain(env)
        .map(str::trim)
        .find(|f| !f.is_empty())
        .unwrap_or(DEFAULT_FILTER)
        .to_string()
}

/// Install the global subscriber. Fails if the filter does not parse, the log
/// file cannot be opened, or a subscriber is already installed.
pub fn init_logging(config: &LogConfig) -> Result<()> {
    let filter = EnvFilter::try_new(&config.filter)
        .map_err(|e| Error::Logging(format!("Invalid log filter {:?}: {}", config.filter, e)))?;

    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_file(config.file_line)
        .with_line_number(config.file_line);

    let installed = match &config.output {
        LogOutput::Stderr => tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.with_writer(std::io::stderr))
            .try_init(),
        LogOutput::File(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;

            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer.with_writer(Mutex::new(file)).with_ansi(false))
                .try_init()
        }
    };
    installed.map_err(|e| Error::Logging(format!("Failed to init logging: {}", e)))
}
