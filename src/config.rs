//! # Configuration
//!
//! Server settings stored in `~/.config/termfolio/config.json`.
//!
//! Every field has a default, so an empty object (or no file at all) is a
//! valid configuration. Command-line flags are applied on top with
//! [`Config::merge`].
//!
//! ```json
//! {
//!   "theme": "Dracula",
//!   "host": "0.0.0.0",
//!   "port": 2323,
//!   "transport": "ssh",
//!   "host_key_path": "/var/lib/termfolio/id_ed25519",
//!   "idle_timeout_secs": 600
//! }
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Protocol spoken on the listening socket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    #[default]
    Ssh,
    Telnet,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Name of a built-in theme.
    pub theme: String,
    /// Address the listener binds to.
    pub host: String,
    pub port: u16,
    pub transport: TransportKind,
    /// SSH host key, created on first start if missing. Relative paths are
    /// resolved against the working directory.
    pub host_key_path: PathBuf,
    /// How long live sessions may keep running after a shutdown signal.
    pub shutdown_grace_secs: u64,
    /// Close sessions that send nothing for this long. Unset means never.
    pub idle_timeout_secs: Option<u64>,
    /// Connections beyond this are turned away.
    pub max_sessions: usize,
    /// Wait this long for the client to report its window size before
    /// assuming 80x24.
    pub initial_size_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: "Ocean".to_string(),
            host: "localhost".to_string(),
            port: 23234,
            transport: TransportKind::Ssh,
            host_key_path: PathBuf::from(".ssh/id_ed25519"),
            shutdown_grace_secs: 30,
            idle_timeout_secs: None,
            max_sessions: 64,
            initial_size_timeout_ms: 500,
        }
    }
}

/// Values given on the command line. `None` keeps the file's value.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub theme: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub transport: Option<TransportKind>,
}

impl Config {
    /// Load from `path`, or from the default location when `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => Self::load_from(&Self::config_path()?),
        }
    }

    /// Load configuration from a specific path. Returns `Config::default()` if
    /// the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn config_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("", "", "termfolio")
            .context("Could not determine config directory")?;
        Ok(dirs.config_dir().join("config.json"))
    }

    pub fn merge(mut self, overrides: Overrides) -> Self {
        if let Some(theme) = overrides.theme {
            self.theme = theme;
        }
        if let Some(host) = overrides.host {
            self.host = host;
        }
        if let Some(port) = overrides.port {
            self.port = port;
        }
        if let Some(transport) = overrides.transport {
            self.transport = transport;
        }
        self
    }

    fn validate(&self) -> Result<()> {
        if self.max_sessions == 0 {
            anyhow::bail!("max_sessions must be at least 1");
        }
        if self.idle_timeout_secs == Some(0) {
            anyhow::bail!("idle_timeout_secs must be positive; omit it to disable");
        }
        Ok(())
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }

    pub fn idle_timeout(&self) -> Option<Duration> {
        self.idle_timeout_secs.map(Duration::from_secs)
    }

    pub fn initial_size_timeout(&self) -> Duration {
        Duration::from_millis(self.initial_size_timeout_ms)
    }
}
