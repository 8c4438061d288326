//! Configuration management for the reference host.
//!
//! The host reads a TOML file (default `director-host.toml`). A missing file is
//! replaced by the defaults written to disk; CLI options are applied on top.

use crate::cli::CliArgs;
use crate::error::{HostError, HostResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

fn default_monitor_interval() -> u64 {
    60
}

/// Host configuration loaded from TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostConfig {
    /// Director plugin settings
    pub director: DirectorSettings,
    /// Logging configuration settings
    pub logging: LoggingSettings,
    /// Periodic session report
    #[serde(default)]
    pub monitoring: MonitoringSettings,
}

/// Where the plugin and the host data live and which map to run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectorSettings {
    /// The director's own JSON configuration file
    pub config_path: String,
    /// JSON snapshot holding the `botTypes` and `locations` tables
    pub data_path: String,
    /// Map the raid session is started on
    pub map: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Whether to output logs in JSON format
    #[serde(default)]
    pub json_format: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoringSettings {
    /// Seconds between session reports; 0 disables them
    #[serde(default = "default_monitor_interval")]
    pub interval_secs: u64,
}

impl Default for MonitoringSettings {
    fn default() -> Self {
        Self {
            interval_secs: default_monitor_interval(),
        }
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            director: DirectorSettings {
                config_path: raid_director::config::DEFAULT_CONFIG_PATH.to_string(),
                data_path: "data/snapshot.json".to_string(),
                map: "bigmap".to_string(),
            },
            logging: LoggingSettings {
                level: "info".to_string(),
                json_format: false,
            },
            monitoring: MonitoringSettings::default(),
        }
    }
}

impl HostConfig {
    /// Loads the configuration, writing the defaults to `path` when it does
    /// not exist yet.
    pub async fn load_from_file(path: &Path) -> HostResult<Self> {
        if path.exists() {
            let content = tokio::fs::read_to_string(path).await?;
            let config: HostConfig = toml::from_str(&content)?;
            Ok(config)
        } else {
            let default_config = HostConfig::default();
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent).await?;
            }
            let toml_content = toml::to_string_pretty(&default_config)?;
            tokio::fs::write(path, toml_content).await?;
            info!("Created default host configuration file: {}", path.display());
            Ok(default_config)
        }
    }

    /// Applies command-line overrides.
    pub fn apply_cli(&mut self, args: &CliArgs) {
        if let Some(data_path) = &args.data_path {
            self.director.data_path = data_path.to_string_lossy().to_string();
        }
        if let Some(map) = &args.map {
            self.director.map = map.clone();
        }
        if let Some(level) = &args.log_level {
            self.logging.level = level.clone();
        }
        if args.json_logs {
            self.logging.json_format = true;
        }
    }

    pub fn plugin_config_path(&self) -> PathBuf {
        PathBuf::from(&self.director.config_path)
    }

    pub fn data_path(&self) -> PathBuf {
        PathBuf::from(&self.director.data_path)
    }

    pub fn validate(&self) -> HostResult<()> {
        if self.director.config_path.is_empty() {
            return Err(HostError::Validation("director.config_path cannot be empty".to_string()));
        }
        if self.director.map.is_empty() {
            return Err(HostError::Validation("director.map cannot be empty".to_string()));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(HostError::Validation(format!(
                "Invalid log level: {}. Must be one of: {valid_levels:?}",
                &self.logging.level
            )));
        }

        Ok(())
    }
}
