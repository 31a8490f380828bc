//! Bootstrap configuration loading
//!
//! Two tiers of configuration:
//! 1. **Bootstrap**: database connection string, receive timeout, fault policy
//!    and logging, from command line / environment / TOML file
//! 2. **Runtime**: the polling interval, from the `configuration` table
//!    (see [`crate::db::settings`])
//!
//! # Settings Sources Priority
//!
//! 1. Command-line argument or environment variable (`CHEF_DATABASE_URL`)
//! 2. TOML configuration file
//! 3. Built-in defaults (code constants)

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

/// Default long-poll wait for a single receive call
pub const DEFAULT_RECEIVE_TIMEOUT_MS: u64 = 5000;

/// What the poller does after a fault in one cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FaultPolicy {
    /// Report the fault, back off, keep polling
    #[default]
    Continue,
    /// Report the fault and stop polling for the rest of the process
    Stop,
}

impl FromStr for FaultPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "continue" => Ok(FaultPolicy::Continue),
            "stop" => Ok(FaultPolicy::Stop),
            other => Err(Error::Config(format!(
                "Invalid fault policy '{}' (expected 'continue' or 'stop')",
                other
            ))),
        }
    }
}

/// Bootstrap configuration loaded from TOML file
///
/// Every field is optional in the file; the application must restart to pick
/// up changes.
#[derive(Debug, Clone, Deserialize)]
pub struct TomlConfig {
    /// Database connection string (e.g. `sqlite:///var/lib/chef/chef.db?mode=rwc`)
    #[serde(default)]
    pub database_url: Option<String>,

    /// Long-poll wait for one receive call, in milliseconds
    #[serde(default = "default_receive_timeout_ms")]
    pub receive_timeout_ms: u64,

    /// Behavior after a fault while polling
    #[serde(default)]
    pub fault_policy: FaultPolicy,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            receive_timeout_ms: default_receive_timeout_ms(),
            fault_policy: FaultPolicy::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_receive_timeout_ms() -> u64 {
    DEFAULT_RECEIVE_TIMEOUT_MS
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Parse TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))
    }

    /// Load TOML configuration from `path`
    ///
    /// A missing file yields the built-in defaults. An unreadable or malformed
    /// file is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml_str(&text)?;
        info!("Loaded TOML configuration from {}", path.display());
        Ok(config)
    }

    /// Long-poll wait as a Duration
    pub fn receive_timeout(&self) -> Duration {
        Duration::from_millis(self.receive_timeout_ms)
    }
}

/// Resolved bootstrap configuration
#[derive(Debug, Clone)]
pub struct BootstrapConfig {
    pub database_url: String,
    pub receive_timeout: Duration,
    pub fault_policy: FaultPolicy,
    pub logging: LoggingConfig,
}

impl BootstrapConfig {
    /// Resolve configuration from an optional CLI/env connection string and an
    /// optional explicit TOML path
    pub fn resolve(database_url: Option<&str>, config_path: Option<&Path>) -> Result<Self> {
        let toml_path = match config_path {
            Some(path) => Some(path.to_path_buf()),
            None => default_config_path(),
        };

        let toml_config = match toml_path {
            Some(path) => TomlConfig::load(&path)?,
            None => {
                debug!("No config directory on this platform, using defaults");
                TomlConfig::default()
            }
        };

        Ok(Self::from_parts(database_url, toml_config))
    }

    /// Merge a CLI/env connection string over a loaded TOML configuration
    pub fn from_parts(database_url: Option<&str>, toml_config: TomlConfig) -> Self {
        let database_url = database_url
            .map(str::to_string)
            .or(toml_config.database_url.clone())
            .unwrap_or_else(default_database_url);

        Self {
            database_url,
            receive_timeout: toml_config.receive_timeout(),
            fault_policy: toml_config.fault_policy,
            logging: toml_config.logging,
        }
    }
}

/// Platform config file location: `<config_dir>/chef-console/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("chef-console").join("config.toml"))
}

/// OS-dependent default database location
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("chef-console"))
        .unwrap_or_else(|| PathBuf::from("./chef_data"))
        .join("chef.db")
}

/// Connection string for the default database, created on first use
pub fn default_database_url() -> String {
    format!("sqlite://{}?mode=rwc", default_database_path().display())
}
