//! Loading, persisting and querying the plugin configuration.

use super::settings::{
    BotTypeSettings, DirectorConfig, GlobalSettings, HotZoneSettings, IntegrationSettings,
    MapSettings, VegetationSettings, WaveSettings, DEFAULT_MAP_KEY,
};
use crate::error::DirectorResult;
use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Location of the persisted configuration relative to the server root.
pub const DEFAULT_CONFIG_PATH: &str = "config/config.json";

/// A partial configuration. Each present section replaces the current one
/// wholesale; absent sections are left alone.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigPatch {
    pub global: Option<GlobalSettings>,
    pub maps: Option<BTreeMap<String, MapSettings>>,
    pub bot_types: Option<BTreeMap<String, BotTypeSettings>>,
    pub waves: Option<WaveSettings>,
    pub hot_zones: Option<HotZoneSettings>,
    pub vegetation: Option<VegetationSettings>,
    pub integrations: Option<IntegrationSettings>,
}

impl ConfigPatch {
    /// Shallow merge of this patch over `base`.
    pub fn merge_into(self, base: &DirectorConfig) -> DirectorConfig {
        let mut merged = base.clone();
        if let Some(global) = self.global {
            merged.global = global;
        }
        if let Some(maps) = self.maps {
            merged.maps = maps;
        }
        if let Some(bot_types) = self.bot_types {
            merged.bot_types = bot_types;
        }
        if let Some(waves) = self.waves {
            merged.waves = waves;
        }
        if let Some(hot_zones) = self.hot_zones {
            merged.hot_zones = hot_zones;
        }
        if let Some(vegetation) = self.vegetation {
            merged.vegetation = vegetation;
        }
        if let Some(integrations) = self.integrations {
            merged.integrations = integrations;
        }
        merged
    }
}

/// Single source of truth for every tunable of the director.
///
/// Readers take an `Arc` snapshot through [`ConfigManager::get_config`]; an
/// update swaps in a new tree, so a snapshot taken before an update keeps
/// showing the old values. Callers re-fetch instead of caching nested blocks.
pub struct ConfigManager {
    path: PathBuf,
    config: ArcSwap<DirectorConfig>,
    gear_progression_enabled: AtomicBool,
}

impl ConfigManager {
    /// Creates a manager holding the compiled-in defaults until
    /// [`initialize`](Self::initialize) runs.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            config: ArcSwap::from_pointee(DirectorConfig::default()),
            gear_progression_enabled: AtomicBool::new(true),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the persisted configuration, recreating it from defaults when it
    /// is missing or unreadable, then repairs inconsistent bounds.
    ///
    /// Never fails: every problem degrades to the default tree.
    pub async fn initialize(&self) -> Arc<DirectorConfig> {
        let mut config = match Self::load_from_file(&self.path).await {
            Ok(config) => {
                info!("Loaded raid director configuration from {}", self.path.display());
                config
            }
            Err(e) => {
                warn!(
                    "Could not load configuration from {} ({}), recreating defaults",
                    self.path.display(),
                    e
                );
                let defaults = DirectorConfig::default();
                if let Err(e) = Self::write_to_file(&self.path, &defaults).await {
                    error!("Failed to write default configuration to {}: {}", self.path.display(), e);
                }
                defaults
            }
        };

        let corrections = config.validate();
        if corrections > 0 {
            warn!("Configuration validation repaired {} value(s)", corrections);
        }

        let config = Arc::new(config);
        self.config.store(config.clone());
        config
    }

    async fn load_from_file(path: &Path) -> DirectorResult<DirectorConfig> {
        let content = tokio::fs::read_to_string(path).await?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }

    async fn write_to_file(path: &Path, config: &DirectorConfig) -> DirectorResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let content = serde_json::to_string_pretty(config)?;
        tokio::fs::write(path, content).await?;
        debug!("Persisted configuration to {}", path.display());
        Ok(())
    }

    /// Current configuration snapshot.
    pub fn get_config(&self) -> Arc<DirectorConfig> {
        self.config.load_full()
    }

    /// Merges `patch` over the current tree and rewrites the whole file.
    ///
    /// # Arguments
    ///
    /// * `patch` - Top-level sections to replace; absent sections are kept
    ///
    /// # Returns
    ///
    /// The new snapshot. On a write error the in-memory tree is still replaced
    /// and the error is returned so the caller can log it.
    pub async fn update_config(&self, patch: ConfigPatch) -> DirectorResult<Arc<DirectorConfig>> {
        let merged = Arc::new(patch.merge_into(&self.config.load()));
        self.config.store(merged.clone());
        Self::write_to_file(&self.path, &merged).await?;
        info!("Configuration updated and saved to {}", self.path.display());
        Ok(merged)
    }

    /// Settings for `map_name`, falling back to the `default` entry and then to
    /// the compiled-in map defaults. Always returns a block.
    pub fn get_map_config(&self, map_name: &str) -> MapSettings {
        let config = self.config.load();
        config
            .maps
            .get(map_name)
            .or_else(|| config.maps.get(DEFAULT_MAP_KEY))
            .cloned()
            .unwrap_or_default()
    }

    pub fn is_map_enabled(&self, map_name: &str) -> bool {
        let config = self.config.load();
        config
            .maps
            .get(map_name)
            .or_else(|| config.maps.get(DEFAULT_MAP_KEY))
            .map(|map| map.enabled)
            .unwrap_or(false)
    }

    pub fn is_bot_type_enabled(&self, bot_type: &str) -> bool {
        self.config
            .load()
            .bot_types
            .get(bot_type)
            .map(|bot| bot.enabled)
            .unwrap_or(false)
    }

    /// Turns the built-in gear progression on or off. The plugin entry point
    /// switches it off when an external progression system is loaded.
    pub fn set_gear_progression_enabled(&self, enabled: bool) {
        self.gear_progression_enabled.store(enabled, Ordering::Release);
        info!("Built-in gear progression {}", if enabled { "enabled" } else { "disabled" });
    }

    pub fn is_gear_progression_enabled(&self) -> bool {
        self.gear_progression_enabled.load(Ordering::Acquire)
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIG_PATH)
    }
}
