//! User preferences consulted by the tab coordinator.
//!
//! Preferences are stored in `~/.config/quire/preferences.yaml` (the platform
//! config directory on Windows). Every field carries a serde default so older
//! files without newer keys still load.

use crate::defaults;
use crate::error::ConfigError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Log level for the debug log file.
///
/// The `RUST_LOG` environment variable and the `--log-level` CLI flag take
/// precedence over this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// No logging (log file not created)
    Off,
    /// Errors only
    Error,
    /// Warnings and errors
    Warn,
    /// Informational messages
    #[default]
    Info,
    /// Debug messages
    Debug,
    /// Most verbose
    Trace,
}

impl LogLevel {
    /// Convert to `log::LevelFilter`
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Persisted user preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    /// Reopen the files that were open when the application last exited
    #[serde(default = "defaults::bool_true")]
    pub open_last_files: bool,

    /// Position of the tab that was current when the application last exited
    #[serde(default = "defaults::zero")]
    pub last_tab: usize,

    /// Prefix used to label blank tabs ("new file 1", "new file 2", ...)
    #[serde(default = "defaults::untitled_prefix")]
    pub untitled_prefix: String,

    /// Maximum number of rows kept in the recent-files ledger
    #[serde(default = "defaults::recent_files_limit")]
    pub recent_files_limit: usize,

    /// Upper bound on a single document save during shutdown, in milliseconds.
    /// `None` waits for every save to finish.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shutdown_save_timeout_ms: Option<u64>,

    /// Debug log verbosity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<LogLevel>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            open_last_files: defaults::bool_true(),
            last_tab: defaults::zero(),
            untitled_prefix: defaults::untitled_prefix(),
            recent_files_limit: defaults::recent_files_limit(),
            shutdown_save_timeout_ms: None,
            log_level: None,
        }
    }
}

impl Preferences {
    /// Get the application configuration directory
    pub fn config_dir() -> PathBuf {
        #[cfg(target_os = "windows")]
        {
            if let Some(config_dir) = dirs::config_dir() {
                config_dir.join(defaults::APP_DIR_NAME)
            } else {
                PathBuf::from(".")
            }
        }
        #[cfg(not(target_os = "windows"))]
        {
            // XDG convention on all other platforms: ~/.config/quire
            if let Some(home_dir) = dirs::home_dir() {
                home_dir.join(".config").join(defaults::APP_DIR_NAME)
            } else {
                PathBuf::from(".")
            }
        }
    }

    /// Load preferences from a specific file
    ///
    /// A missing or empty file yields the defaults. A file that exists but
    /// cannot be parsed is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::info!("No preferences file at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .map_err(ConfigError::from)
            .with_context(|| format!("Failed to read preferences from {:?}", path))?;

        if contents.trim().is_empty() {
            return Ok(Self::default());
        }

        let prefs: Preferences = serde_yaml_ng::from_str(&contents)
            .map_err(ConfigError::from)
            .with_context(|| format!("Failed to parse preferences from {:?}", path))?;
        prefs.validate()?;

        log::info!("Loaded preferences from {:?}", path);
        Ok(prefs)
    }

    /// Save preferences to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(ConfigError::from)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }

        let yaml = serde_yaml_ng::to_string(self)
            .map_err(ConfigError::from)
            .context("Failed to serialize preferences")?;

        // Atomic save: write to temp file then rename
        let temp_path = path.with_extension("yaml.tmp");
        fs::write(&temp_path, &yaml)
            .map_err(ConfigError::from)
            .with_context(|| format!("Failed to write preferences to {:?}", temp_path))?;
        fs::rename(&temp_path, path)
            .map_err(ConfigError::from)
            .with_context(|| format!("Failed to move preferences into {:?}", path))?;

        log::debug!("Saved preferences to {:?}", path);
        Ok(())
    }

    /// Check field values that serde cannot express
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.untitled_prefix.trim().is_empty() {
            return Err(ConfigError::Validation(
                "untitled_prefix must not be empty".to_string(),
            ));
        }
        if self.recent_files_limit == 0 {
            return Err(ConfigError::Validation(
                "recent_files_limit must be at least 1".to_string(),
            ));
        }
        if self.shutdown_save_timeout_ms == Some(0) {
            return Err(ConfigError::Validation(
                "shutdown_save_timeout_ms must be positive when set".to_string(),
            ));
        }
        Ok(())
    }

    /// Label for the `n`-th blank tab
    pub fn untitled_label(&self, n: usize) -> String {
        format!("{} {}", self.untitled_prefix, n)
    }
}
