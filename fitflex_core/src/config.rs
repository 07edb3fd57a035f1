//! Configuration file support for FitFlex.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/fitflex/config.toml`.

use crate::progress::{ProgressOptions, DEFAULT_HISTORY_LIMIT, DEFAULT_WINDOW_DAYS};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub user: UserConfig,

    #[serde(default)]
    pub progress: ProgressConfig,

    #[serde(default)]
    pub session: SessionConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl DataConfig {
    /// JSONL file holding completed session records
    pub fn records_path(data_dir: &Path) -> PathBuf {
        data_dir.join("wal").join("sessions.jsonl")
    }

    /// Snapshot of a suspended (paused) session
    pub fn snapshot_path(data_dir: &Path) -> PathBuf {
        data_dir.join("wal").join("active_session.json")
    }
}

/// Which user local sessions belong to
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(default = "default_user_id")]
    pub id: String,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            id: default_user_id(),
        }
    }
}

/// Progress screen parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProgressConfig {
    #[serde(default = "default_window_days")]
    pub window_days: u32,

    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            window_days: default_window_days(),
            history_limit: default_history_limit(),
        }
    }
}

impl ProgressConfig {
    pub fn options(&self) -> ProgressOptions {
        ProgressOptions {
            window_days: self.window_days,
            history_limit: self.history_limit,
        }
    }
}

/// Live session parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Weight change applied by a single `+w` / `-w`
    #[serde(default = "default_weight_step")]
    pub weight_step: f64,

    /// Rep change applied by a single `+r` / `-r`
    #[serde(default = "default_reps_step")]
    pub reps_step: u32,

    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            weight_step: default_weight_step(),
            reps_step: default_reps_step(),
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

impl SessionConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        std::env::var_os("HOME")
            .map(|home| PathBuf::from(home).join(".local/share"))
            .unwrap_or_else(|| PathBuf::from("."))
    });
    base.join("fitflex")
}

fn default_user_id() -> String {
    "local".into()
}

fn default_window_days() -> u32 {
    DEFAULT_WINDOW_DAYS
}

fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

fn default_weight_step() -> f64 {
    5.0
}

fn default_reps_step() -> u32 {
    1
}

fn default_tick_interval_ms() -> u64 {
    1000
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            std::env::var_os("HOME")
                .map(|home| PathBuf::from(home).join(".config"))
                .unwrap_or_else(|| PathBuf::from("."))
        });
        base.join("fitflex").join("config.toml")
    }

    /// Reject values the session and aggregator cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.user.id.trim().is_empty() {
            return Err(Error::Config("user.id must not be empty".into()));
        }
        if self.progress.window_days == 0 {
            return Err(Error::Config("progress.window_days must be at least 1".into()));
        }
        if !self.session.weight_step.is_finite() || self.session.weight_step <= 0.0 {
            return Err(Error::Config(format!(
                "session.weight_step must be positive, got {}",
                self.session.weight_step
            )));
        }
        if self.session.reps_step == 0 || i32::try_from(self.session.reps_step).is_err() {
            return Err(Error::Config(format!(
                "session.reps_step must be between 1 and {}",
                i32::MAX
            )));
        }
        if self.session.tick_interval_ms == 0 {
            return Err(Error::Config("session.tick_interval_ms must be at least 1".into()));
        }
        Ok(())
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}
