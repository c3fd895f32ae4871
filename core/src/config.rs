//! Configuration for refresh timing, initial view and kill behaviour.
//!
//! Stored as JSON at `~/.portscope/config.json`. Every field is optional
//! in the file; missing fields take their defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::domain::{SortKey, ViewParameters};
use crate::error::{Error, Result};

/// How a confirmed kill is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum KillMode {
    /// SIGTERM, wait for the grace period, then SIGKILL.
    #[default]
    Graceful,
    /// SIGKILL immediately.
    Force,
}

impl KillMode {
    pub fn is_force(&self) -> bool {
        matches!(self, KillMode::Force)
    }
}

/// Configuration data stored in JSON format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Seconds between collections.
    #[serde(default = "default_refresh_interval", rename = "refreshInterval")]
    pub refresh_interval: u64,

    /// Seconds a notification stays visible.
    #[serde(
        default = "default_notification_timeout",
        rename = "notificationTimeout"
    )]
    pub notification_timeout: u64,

    /// Start with processes without connections hidden.
    #[serde(default = "default_true", rename = "portsOnly")]
    pub ports_only: bool,

    #[serde(default, rename = "sortKey")]
    pub sort_key: SortKey,

    #[serde(default = "default_true", rename = "sortDescending")]
    pub sort_descending: bool,

    #[serde(default, rename = "killMode")]
    pub kill_mode: KillMode,

    /// Milliseconds between SIGTERM and SIGKILL in graceful mode.
    #[serde(default = "default_grace_period_ms", rename = "gracePeriodMs")]
    pub grace_period_ms: u64,
}

/// Shortest allowed refresh interval, in seconds.
pub const MIN_REFRESH_INTERVAL: u64 = 1;

fn default_refresh_interval() -> u64 {
    3
}

fn default_notification_timeout() -> u64 {
    3
}

fn default_grace_period_ms() -> u64 {
    500
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            refresh_interval: default_refresh_interval(),
            notification_timeout: default_notification_timeout(),
            ports_only: true,
            sort_key: SortKey::default(),
            sort_descending: true,
            kill_mode: KillMode::default(),
            grace_period_ms: default_grace_period_ms(),
        }
    }
}

impl Config {
    /// Refresh interval, never shorter than [`MIN_REFRESH_INTERVAL`].
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval.max(MIN_REFRESH_INTERVAL))
    }

    pub fn notification_ttl(&self) -> Duration {
        Duration::from_secs(self.notification_timeout)
    }

    pub fn grace_period(&self) -> Duration {
        Duration::from_millis(self.grace_period_ms)
    }

    /// View parameters a new session starts with.
    pub fn initial_view(&self) -> ViewParameters {
        ViewParameters::new()
            .with_ports_only(self.ports_only)
            .with_sort(self.sort_key, self.sort_descending)
    }
}

/// Configuration store.
///
/// Reads and writes the configuration at `~/.portscope/config.json`.
pub struct ConfigStore {
    config_path: PathBuf,
}

impl ConfigStore {
    /// Create a new config store with the default path.
    ///
    /// Default path: `~/.portscope/config.json`
    pub fn new() -> Result<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))?;

        let config_path = home.join(".portscope").join("config.json");
        Ok(Self { config_path })
    }

    /// Create a config store with a custom path.
    pub fn with_path(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Directory holding the config file (and the TUI log file).
    pub fn config_dir(&self) -> PathBuf {
        self.config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }

    pub fn exists(&self) -> bool {
        self.config_path.exists()
    }

    /// Load configuration from disk.
    ///
    /// Returns default config if the file doesn't exist.
    pub async fn load(&self) -> Result<Config> {
        if !self.config_path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&self.config_path)
            .await
            .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?;

        serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Save configuration to disk, creating the directory if needed.
    pub async fn save(&self, config: &Config) -> Result<()> {
        let config_dir = self.config_dir();
        if !config_dir.as_os_str().is_empty() && !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .await
                .map_err(|e| Error::Config(format!("Failed to create config directory: {}", e)))?;
        }

        let content = serde_json::to_string_pretty(config)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

        // Write atomically by writing to temp file then renaming
        let temp_path = self.config_path.with_extension("json.tmp");

        let mut file = fs::File::create(&temp_path)
            .await
            .map_err(|e| Error::Config(format!("Failed to create temp config file: {}", e)))?;

        file.write_all(content.as_bytes())
            .await
            .map_err(|e| Error::Config(format!("Failed to write config: {}", e)))?;

        file.sync_all()
            .await
            .map_err(|e| Error::Config(format!("Failed to sync config: {}", e)))?;

        fs::rename(&temp_path, &self.config_path)
            .await
            .map_err(|e| Error::Config(format!("Failed to rename config file: {}", e)))?;

        Ok(())
    }
}
