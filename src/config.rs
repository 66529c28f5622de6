use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::Priority;
use crate::utils;

/// Current configuration version
pub const CURRENT_CONFIG_VERSION: u32 = 1;

/// Largest accepted `default_due_days`, in either direction (about a century)
pub const MAX_DUE_DAYS: i64 = 36_500;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_data_file")]
    pub data_file: String,
    #[serde(default = "default_priority")]
    pub default_priority: Priority,
    /// Days from today used to prefill the due date of a new task
    #[serde(default = "default_due_days")]
    pub default_due_days: i64,
    /// Delay before the startup overdue warning appears
    #[serde(default = "default_overdue_notice_delay_ms")]
    pub overdue_notice_delay_ms: u64,
    #[serde(default)]
    pub key_bindings: KeyBindings,
    #[serde(default)]
    pub colors: Colors,
    #[serde(default = "default_config_version")]
    pub config_version: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyBindings {
    #[serde(default = "default_quit")]
    pub quit: String,
    #[serde(default = "default_new")]
    pub new: String,
    #[serde(default = "default_edit")]
    pub edit: String,
    #[serde(default = "default_delete")]
    pub delete: String,
    #[serde(default = "default_mark_done")]
    pub mark_done: String,
    #[serde(default = "default_toggle_select")]
    pub toggle_select: String,
    #[serde(default = "default_menu")]
    pub menu: String,
    #[serde(default = "default_filter")]
    pub filter: String,
    #[serde(default = "default_refresh")]
    pub refresh: String,
    #[serde(default = "default_help")]
    pub help: String,
    #[serde(default = "default_list_up")]
    pub list_up: String,
    #[serde(default = "default_list_down")]
    pub list_down: String,
    #[serde(default = "default_save")]
    pub save: String,
}

/// Colors for the task table. Accepts names, #RRGGBB, #RGB or rgb(r,g,b).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Colors {
    #[serde(default = "default_fg")]
    pub fg: String,
    #[serde(default = "default_bg")]
    pub bg: String,
    #[serde(default = "default_highlight_bg")]
    pub highlight_bg: String,
    #[serde(default = "default_completed_bg")]
    pub completed_bg: String,
    #[serde(default = "default_overdue_bg")]
    pub overdue_bg: String,
    #[serde(default = "default_high_priority_bg")]
    pub high_priority_bg: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            default_priority: default_priority(),
            default_due_days: default_due_days(),
            overdue_notice_delay_ms: default_overdue_notice_delay_ms(),
            key_bindings: KeyBindings::default(),
            colors: Colors::default(),
            config_version: Some(CURRENT_CONFIG_VERSION),
        }
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            quit: default_quit(),
            new: default_new(),
            edit: default_edit(),
            delete: default_delete(),
            mark_done: default_mark_done(),
            toggle_select: default_toggle_select(),
            menu: default_menu(),
            filter: default_filter(),
            refresh: default_refresh(),
            help: default_help(),
            list_up: default_list_up(),
            list_down: default_list_down(),
            save: default_save(),
        }
    }
}

impl Default for Colors {
    fn default() -> Self {
        Self {
            fg: default_fg(),
            bg: default_bg(),
            highlight_bg: default_highlight_bg(),
            completed_bg: default_completed_bg(),
            overdue_bg: default_overdue_bg(),
            high_priority_bg: default_high_priority_bg(),
        }
    }
}

// Default value functions
fn default_data_file() -> String {
    data_file_for_profile(utils::Profile::Prod)
}

fn default_priority() -> Priority {
    Priority::Medium
}

fn default_due_days() -> i64 {
    1
}

fn default_overdue_notice_delay_ms() -> u64 {
    100
}

fn default_quit() -> String {
    "q".to_string()
}

fn default_new() -> String {
    "n".to_string()
}

fn default_edit() -> String {
    "e".to_string()
}

fn default_delete() -> String {
    "d".to_string()
}

fn default_mark_done() -> String {
    "x".to_string()
}

fn default_toggle_select() -> String {
    "Space".to_string()
}

fn default_menu() -> String {
    "m".to_string()
}

fn default_filter() -> String {
    "f".to_string()
}

fn default_refresh() -> String {
    "r".to_string()
}

fn default_help() -> String {
    "F1".to_string()
}

fn default_list_up() -> String {
    "k".to_string()
}

fn default_list_down() -> String {
    "j".to_string()
}

fn default_save() -> String {
    "Ctrl+s".to_string()
}

fn default_fg() -> String {
    "white".to_string()
}

fn default_bg() -> String {
    "black".to_string()
}

fn default_highlight_bg() -> String {
    "blue".to_string()
}

fn default_completed_bg() -> String {
    "#00ff3c".to_string()
}

fn default_overdue_bg() -> String {
    "#ff0015".to_string()
}

fn default_high_priority_bg() -> String {
    "#ffc815".to_string()
}

fn default_config_version() -> Option<u32> {
    Some(CURRENT_CONFIG_VERSION)
}

/// Task record path inside the profile's data directory
fn data_file_for_profile(profile: utils::Profile) -> String {
    if let Some(data_dir) = utils::get_data_dir(profile) {
        data_dir.join("tasks.json").to_string_lossy().to_string()
    } else {
        #[cfg(target_os = "macos")]
        {
            match profile {
                utils::Profile::Dev => "~/Library/Application Support/traker-dev/tasks.json".to_string(),
                utils::Profile::Prod => "~/Library/Application Support/traker/tasks.json".to_string(),
            }
        }
        #[cfg(not(target_os = "macos"))]
        {
            match profile {
                utils::Profile::Dev => "~/.local/share/traker-dev/tasks.json".to_string(),
                utils::Profile::Prod => "~/.local/share/traker/tasks.json".to_string(),
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config directory: {0}")]
    ConfigDirError(String),
    #[error("Failed to read config file: {0}")]
    ReadError(String),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to write config file: {0}")]
    WriteError(String),
    #[error("Invalid config value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Load configuration for `profile`, creating the default file if missing
    pub fn load_with_profile(profile: utils::Profile) -> Result<Self, ConfigError> {
        let config_path = Self::get_config_path(profile)?;
        let mut config = Self::load_or_create(&config_path, || Config {
            data_file: data_file_for_profile(profile),
            ..Config::default()
        })?;

        // A dev profile never points at the production record
        if profile == utils::Profile::Dev && config.data_file == default_data_file() {
            config.data_file = data_file_for_profile(profile);
        }
        Ok(config)
    }

    /// Load configuration from an explicit file, creating it with defaults if missing
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        Self::load_or_create(path, Config::default)
    }

    fn load_or_create(path: &Path, default: impl FnOnce() -> Config) -> Result<Self, ConfigError> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .map_err(|e| ConfigError::ReadError(e.to_string()))?;
            let config: Config = toml::from_str(&contents)?;
            config.validate()?;
            Ok(config)
        } else {
            let mut config = default();
            if let Err(ref e) = config.save_to(path) {
                tracing::error!(path = %path.display(), error = %e, "failed to save config file");
                return Err(ConfigError::WriteError(e.to_string()));
            }
            Ok(config)
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(-MAX_DUE_DAYS..=MAX_DUE_DAYS).contains(&self.default_due_days) {
            return Err(ConfigError::InvalidValue(format!(
                "default_due_days must be between -{max} and {max}, got {}",
                self.default_due_days,
                max = MAX_DUE_DAYS
            )));
        }
        Ok(())
    }

    /// Save configuration to `path`, creating parent directories
    pub fn save_to(&mut self, path: &Path) -> Result<(), ConfigError> {
        self.config_version = Some(CURRENT_CONFIG_VERSION);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ConfigError::WriteError(e.to_string()))?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::WriteError(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, toml_string)
            .map_err(|e| ConfigError::WriteError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the config file
    pub fn get_config_path(profile: utils::Profile) -> Result<PathBuf, ConfigError> {
        let config_dir = utils::get_config_dir(profile)
            .ok_or_else(|| ConfigError::ConfigDirError("Could not determine config directory".to_string()))?;
        Ok(config_dir.join("config.toml"))
    }

    /// Get the expanded task record path (with ~ expansion)
    pub fn get_data_file(&self) -> PathBuf {
        utils::expand_path(&self.data_file)
    }
}
