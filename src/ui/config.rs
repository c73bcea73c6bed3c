//! # Configuration Persistence
//!
//! User configuration stored in `~/.config/unused-apps/config.json`.
//!
//! Every field has a default, so a partial (or missing) file is fine.
//! Command-line flags override whatever is loaded here.
//!
//! ```json
//! {
//!   "theme": "Nord",
//!   "threshold_days": 60,
//!   "mode": "conservative",
//!   "serial": "emulator-5554"
//! }
//! ```

use crate::usage::{ScanMode, ScanSettings, DEFAULT_HISTORY_DAYS, DEFAULT_THRESHOLD_DAYS};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Name used for the config and data directories.
pub const APP_DIR_NAME: &str = "unused-apps";

/// Persisted user configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Name of a built-in theme.
    #[serde(default = "default_theme_name")]
    pub theme: String,

    /// Days without use before an app is listed.
    #[serde(default = "default_threshold_days")]
    pub threshold_days: u64,

    /// How far back usage history is queried.
    #[serde(default = "default_history_days")]
    pub history_days: u64,

    #[serde(default)]
    pub mode: ScanMode,

    /// Path or name of the `adb` executable.
    #[serde(default = "default_adb_path")]
    pub adb_path: PathBuf,

    /// Device serial, for when several devices are attached.
    #[serde(default)]
    pub serial: Option<String>,

    /// Package id that should never be listed (e.g. a companion app).
    #[serde(default)]
    pub self_package: Option<String>,
}

fn default_theme_name() -> String {
    "Catppuccin Mocha".to_string()
}

fn default_threshold_days() -> u64 {
    DEFAULT_THRESHOLD_DAYS
}

fn default_history_days() -> u64 {
    DEFAULT_HISTORY_DAYS
}

fn default_adb_path() -> PathBuf {
    PathBuf::from("adb")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: default_theme_name(),
            threshold_days: default_threshold_days(),
            history_days: default_history_days(),
            mode: ScanMode::default(),
            adb_path: default_adb_path(),
            serial: None,
            self_package: None,
        }
    }
}

impl Config {
    /// Load configuration from disk. Falls back to `Config::default()` if the
    /// file cannot be read or parsed, with a warning naming the problem.
    pub fn load() -> Self {
        match Self::config_path() {
            Ok(path) => Self::load_or_default(&path),
            Err(e) => {
                warn!("Using default configuration: {e:#}");
                Self::default()
            }
        }
    }

    /// Like [`Config::load_from`], but a broken file yields the defaults.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load_from(path).unwrap_or_else(|e| {
            warn!("Ignoring config file, using defaults: {e:#}");
            eprintln!("Warning: ignoring config file, using defaults: {e:#}");
            Self::default()
        })
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
        Ok(config)
    }

    /// Scan parameters derived from this configuration.
    pub fn scan_settings(&self) -> ScanSettings {
        ScanSettings {
            threshold_days: self.threshold_days,
            history_days: self.history_days,
            mode: self.mode,
            self_package: self.self_package.clone(),
        }
    }

    pub fn config_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("", "", APP_DIR_NAME)
            .context("Could not determine config directory")?;
        Ok(dirs.config_dir().join("config.json"))
    }

    /// Directory for the log file.
    pub fn data_dir() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("", "", APP_DIR_NAME)
            .context("Could not determine data directory")?;
        Ok(dirs.data_dir().to_path_buf())
    }
}
