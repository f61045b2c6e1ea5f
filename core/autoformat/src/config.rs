//! Scheduler configuration.
//!
//! Loaded from `~/.autoformat/config.toml` unless a path is given. A missing
//! file yields defaults; a present but broken file is an error so that a
//! typo never silently widens the set of reformatted files.

use chrono::Duration;
use serde::Deserialize;
use std::path::PathBuf;

use crate::document::DocumentId;
use crate::error::ConfigError;

const DEFAULT_CONFIG_RELATIVE_PATH: &str = ".autoformat/config.toml";
const DEFAULT_REFORMAT_COMMAND: &str = "ReSharper_SilentCleanupCode";
const DEFAULT_TICK_INTERVAL_MS: u64 = 1000;
const DEFAULT_COOLDOWN_MS: u64 = 5000;
const DEFAULT_ALLOWED_EXTENSIONS: [&str; 8] =
    [".cs", ".xaml", ".vb", ".js", ".ts", ".css", ".html", ".xml"];

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SchedulerConfig {
    #[serde(default = "default_reformat_command")]
    pub reformat_command: String,
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u64,
    #[serde(default = "default_save_after_reformat")]
    pub save_after_reformat: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            reformat_command: default_reformat_command(),
            allowed_extensions: default_allowed_extensions(),
            tick_interval_ms: default_tick_interval_ms(),
            cooldown_ms: default_cooldown_ms(),
            save_after_reformat: default_save_after_reformat(),
        }
    }
}

impl SchedulerConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::milliseconds(self.tick_interval_ms as i64)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::milliseconds(self.cooldown_ms as i64)
    }

    pub fn is_allowed(&self, document: &DocumentId) -> bool {
        document
            .extension()
            .map(|ext| self.allowed_extensions.iter().any(|allowed| *allowed == ext))
            .unwrap_or(false)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "tick_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.tick_interval_ms > i64::MAX as u64 || self.cooldown_ms > i64::MAX as u64 {
            return Err(ConfigError::Invalid("durations out of range".to_string()));
        }
        // A pass's own re-saves arrive after it ends and are only dropped by
        // the cooldown check on the next tick.
        if self.cooldown_ms <= self.tick_interval_ms {
            return Err(ConfigError::Invalid(format!(
                "cooldown_ms ({}) must be greater than tick_interval_ms ({})",
                self.cooldown_ms, self.tick_interval_ms
            )));
        }
        if self.reformat_command.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "reformat_command must not be empty".to_string(),
            ));
        }
        if let Some(bad) = self
            .allowed_extensions
            .iter()
            .find(|ext| ext.len() < 2 || !ext.starts_with('.'))
        {
            return Err(ConfigError::Invalid(format!(
                "allowed extension must look like \".cs\": {:?}",
                bad
            )));
        }
        Ok(())
    }
}

fn default_reformat_command() -> String {
    DEFAULT_REFORMAT_COMMAND.to_string()
}

fn default_allowed_extensions() -> Vec<String> {
    DEFAULT_ALLOWED_EXTENSIONS
        .iter()
        .map(|ext| ext.to_string())
        .collect()
}

fn default_tick_interval_ms() -> u64 {
    DEFAULT_TICK_INTERVAL_MS
}

fn default_cooldown_ms() -> u64 {
    DEFAULT_COOLDOWN_MS
}

fn default_save_after_reformat() -> bool {
    true
}

pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    let home = dirs::home_dir().ok_or(ConfigError::HomeDirNotFound)?;
    Ok(home.join(DEFAULT_CONFIG_RELATIVE_PATH))
}

pub fn load_config(path: Option<PathBuf>) -> Result<SchedulerConfig, ConfigError> {
    let config_path = match path {
        Some(path) => path,
        None => default_config_path()?,
    };

    if !config_path.exists() {
        return Ok(SchedulerConfig::default());
    }

    let content = fs_err::read_to_string(&config_path).map_err(|source| ConfigError::Read {
        path: config_path.clone(),
        source,
    })?;
    let config = toml::from_str::<SchedulerConfig>(&content).map_err(|source| {
        ConfigError::Parse {
            path: config_path.clone(),
            source,
        }
    })?;
    config.validate()?;
    Ok(config)
}
