//! Configuration tree for the raid director.
//!
//! Every section deserializes from a partial JSON document: missing fields
//! take the compiled-in defaults below, so an operator can keep only the
//! settings they actually changed in `config/config.json`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// Name of the fallback map block used for maps without their own entry.
pub const DEFAULT_MAP_KEY: &str = "default";

fn default_true() -> bool {
    true
}

fn default_max_bots_per_raid() -> u32 {
    30
}
fn default_min_bots_per_raid() -> u32 {
    10
}
fn default_boss_spawn_chance() -> f64 {
    0.35
}
fn default_raider_spawn_chance() -> f64 {
    0.25
}
fn default_rogue_spawn_chance() -> f64 {
    0.25
}

fn default_wave_count() -> u32 {
    3
}
fn default_wave_delay_seconds() -> u64 {
    300
}
fn default_bots_per_wave() -> u32 {
    4
}

fn default_min_distance_between_spawns() -> f64 {
    100.0
}
fn default_initial_delay_seconds() -> f64 {
    60.0
}
fn default_randomization_window_seconds() -> f64 {
    30.0
}
fn default_wave_spacing_seconds() -> f64 {
    300.0
}

fn default_shooting_check_interval_ms() -> u64 {
    1000
}
fn default_position_check_interval_ms() -> u64 {
    2000
}

fn default_plugin_directories() -> Vec<String> {
    vec!["plugins".to_string(), "client/plugins".to_string()]
}

fn default_pmc_bot_types() -> Vec<String> {
    vec!["usec".to_string(), "bear".to_string(), "pmcbot".to_string()]
}

/// Complete plugin configuration as persisted on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectorConfig {
    /// Raid-wide limits and category spawn chances
    #[serde(default)]
    pub global: GlobalSettings,
    /// Per-map quotas, keyed by map identifier (`default` is the fallback)
    #[serde(default)]
    pub maps: BTreeMap<String, MapSettings>,
    /// Per-bot-type gear and behavior profiles
    #[serde(default)]
    pub bot_types: BTreeMap<String, BotTypeSettings>,
    /// Wave timing applied to the host's own wave routine
    #[serde(default)]
    pub waves: WaveSettings,
    /// Optional hot zone layer
    #[serde(default)]
    pub hot_zones: HotZoneSettings,
    /// Optional vegetation fire restriction
    #[serde(default)]
    pub vegetation: VegetationSettings,
    /// Peer mod discovery settings
    #[serde(default)]
    pub integrations: IntegrationSettings,
}

/// Raid-wide bounds and spawn probabilities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalSettings {
    #[serde(default = "default_max_bots_per_raid")]
    pub max_bots_per_raid: u32,
    #[serde(default = "default_min_bots_per_raid")]
    pub min_bots_per_raid: u32,
    /// Probability in [0, 1]
    #[serde(default = "default_boss_spawn_chance")]
    pub boss_spawn_chance: f64,
    /// Probability in [0, 1]
    #[serde(default = "default_raider_spawn_chance")]
    pub raider_spawn_chance: f64,
    /// Probability in [0, 1]
    #[serde(default = "default_rogue_spawn_chance")]
    pub rogue_spawn_chance: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gear_progression: Option<GearProgression>,
}

/// Level-gated gear scaling for PMC-like bot types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GearProgression {
    #[serde(default)]
    pub level_thresholds: LevelThresholds,
    /// Bot types treated as player-like and level scaled
    #[serde(default = "default_pmc_bot_types")]
    pub pmc_bot_types: Vec<String>,
    #[serde(default)]
    pub meta_ammo: Vec<String>,
    #[serde(default)]
    pub meta_armor: Vec<String>,
    #[serde(default)]
    pub meta_weapons: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelThresholds {
    pub low: u32,
    pub mid: u32,
    /// When set, replaces the default level cap of scaled bots
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high: Option<u32>,
}

/// Per-map quotas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub max_bots: u32,
    #[serde(default)]
    pub min_bots: u32,
    #[serde(default)]
    pub bot_types: BTreeMap<String, BotTypeLimit>,
    #[serde(default)]
    pub spawn_points: BTreeMap<String, SpawnPoint>,
    /// Opaque settings forwarded to the live-raid layer untouched
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub live_settings: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotTypeLimit {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub max_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnPoint {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

/// Difficulty tier of a bot type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
    Impossible,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
            Difficulty::Impossible => "impossible",
        }
    }
}

/// Map allow-list: either the wildcard `"*"` or an explicit list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AllowedMaps {
    Pattern(String),
    List(Vec<String>),
}

impl Default for AllowedMaps {
    fn default() -> Self {
        AllowedMaps::Pattern("*".to_string())
    }
}

impl AllowedMaps {
    pub fn allows(&self, map: &str) -> bool {
        match self {
            AllowedMaps::Pattern(pattern) => pattern == "*" || pattern == map,
            AllowedMaps::List(maps) => maps.iter().any(|m| m == "*" || m == map),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GearRestrictions {
    pub weapons: Vec<String>,
    pub armor: Vec<String>,
    pub items: Vec<String>,
}

impl GearRestrictions {
    pub fn is_empty(&self) -> bool {
        self.weapons.is_empty() && self.armor.is_empty() && self.items.is_empty()
    }
}

/// Explicit behavior values; every present field wins over the difficulty table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BehaviorOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reaction_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggression: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hearing: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vision: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelRange {
    pub min_level: u32,
    pub max_level: u32,
}

/// Per-bot-type profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotTypeSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub gear_tier: u32,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub spawn_chance: f64,
    #[serde(default)]
    pub max_count: u32,
    #[serde(default)]
    pub allowed_maps: AllowedMaps,
    #[serde(default)]
    pub gear_restrictions: GearRestrictions,
    #[serde(default, alias = "behaviorProfile", skip_serializing_if = "Option::is_none")]
    pub live_behavior: Option<BehaviorOverride>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level_based_gear: Option<LevelRange>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaveSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_wave_count")]
    pub wave_count: u32,
    #[serde(default = "default_wave_delay_seconds")]
    pub wave_delay_seconds: u64,
    #[serde(default = "default_bots_per_wave")]
    pub bots_per_wave: u32,
    #[serde(default)]
    pub dynamic_scaling: bool,
}

/// Hot zone layer settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotZoneSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_min_distance_between_spawns")]
    pub min_distance_between_spawns: f64,
    #[serde(default)]
    pub priority_ranks: PriorityRanks,
    #[serde(default)]
    pub timing: WaveTiming,
    /// map -> zone name -> zone
    #[serde(default)]
    pub maps: BTreeMap<String, BTreeMap<String, HotZone>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZonePriority {
    High,
    #[default]
    Medium,
    Low,
}

/// Numeric rank per priority; lower ranks are placed first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriorityRanks {
    pub high: u32,
    pub medium: u32,
    pub low: u32,
}

impl PriorityRanks {
    pub fn rank(&self, priority: ZonePriority) -> u32 {
        match priority {
            ZonePriority::High => self.high,
            ZonePriority::Medium => self.medium,
            ZonePriority::Low => self.low,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaveTiming {
    #[serde(default = "default_initial_delay_seconds")]
    pub initial_delay_seconds: f64,
    #[serde(default = "default_randomization_window_seconds")]
    pub randomization_window_seconds: f64,
    #[serde(default = "default_wave_spacing_seconds")]
    pub wave_spacing_seconds: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneCoordinates {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

/// A named circular region with its own quota.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotZone {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub spawn_types: Vec<String>,
    #[serde(default)]
    pub max_bots: u32,
    #[serde(default)]
    pub spawn_chance: f64,
    #[serde(default)]
    pub priority: ZonePriority,
    pub coordinates: ZoneCoordinates,
    #[serde(default)]
    pub quest_related: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VegetationSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_shooting_check_interval_ms")]
    pub shooting_check_interval_ms: u64,
    #[serde(default = "default_position_check_interval_ms")]
    pub position_check_interval_ms: u64,
    /// map -> vegetation patches
    #[serde(default)]
    pub maps: BTreeMap<String, Vec<ZoneCoordinates>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationSettings {
    /// Roots scanned read-only for peer native plugins
    #[serde(default = "default_plugin_directories")]
    pub plugin_directories: Vec<String>,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            max_bots_per_raid: default_max_bots_per_raid(),
            min_bots_per_raid: default_min_bots_per_raid(),
            boss_spawn_chance: default_boss_spawn_chance(),
            raider_spawn_chance: default_raider_spawn_chance(),
            rogue_spawn_chance: default_rogue_spawn_chance(),
            gear_progression: Some(GearProgression::default()),
        }
    }
}

impl Default for GearProgression {
    fn default() -> Self {
        Self {
            level_thresholds: LevelThresholds::default(),
            pmc_bot_types: default_pmc_bot_types(),
            meta_ammo: Vec::new(),
            meta_armor: Vec::new(),
            meta_weapons: Vec::new(),
        }
    }
}

impl Default for LevelThresholds {
    fn default() -> Self {
        Self {
            low: 15,
            mid: 30,
            high: None,
        }
    }
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            max_bots: 20,
            min_bots: 8,
            bot_types: BTreeMap::new(),
            spawn_points: BTreeMap::new(),
            live_settings: serde_json::Value::Null,
        }
    }
}

impl Default for BotTypeLimit {
    fn default() -> Self {
        Self {
            enabled: true,
            max_count: 0,
        }
    }
}

impl Default for BotTypeSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            gear_tier: 1,
            difficulty: Difficulty::Normal,
            spawn_chance: 1.0,
            max_count: 0,
            allowed_maps: AllowedMaps::default(),
            gear_restrictions: GearRestrictions::default(),
            live_behavior: None,
            level_based_gear: None,
        }
    }
}

impl Default for WaveSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            wave_count: default_wave_count(),
            wave_delay_seconds: default_wave_delay_seconds(),
            bots_per_wave: default_bots_per_wave(),
            dynamic_scaling: false,
        }
    }
}

impl Default for HotZoneSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            min_distance_between_spawns: default_min_distance_between_spawns(),
            priority_ranks: PriorityRanks::default(),
            timing: WaveTiming::default(),
            maps: BTreeMap::new(),
        }
    }
}

impl Default for PriorityRanks {
    fn default() -> Self {
        Self {
            high: 1,
            medium: 2,
            low: 3,
        }
    }
}

impl Default for WaveTiming {
    fn default() -> Self {
        Self {
            initial_delay_seconds: default_initial_delay_seconds(),
            randomization_window_seconds: default_randomization_window_seconds(),
            wave_spacing_seconds: default_wave_spacing_seconds(),
        }
    }
}

impl Default for VegetationSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            shooting_check_interval_ms: default_shooting_check_interval_ms(),
            position_check_interval_ms: default_position_check_interval_ms(),
            maps: BTreeMap::new(),
        }
    }
}

impl Default for IntegrationSettings {
    fn default() -> Self {
        Self {
            plugin_directories: default_plugin_directories(),
        }
    }
}

fn map(max_bots: u32, min_bots: u32, bot_types: &[(&str, u32)]) -> MapSettings {
    MapSettings {
        enabled: true,
        max_bots,
        min_bots,
        bot_types: bot_types
            .iter()
            .map(|(name, max_count)| {
                (
                    name.to_string(),
                    BotTypeLimit {
                        enabled: true,
                        max_count: *max_count,
                    },
                )
            })
            .collect(),
        spawn_points: BTreeMap::new(),
        live_settings: serde_json::Value::Null,
    }
}

fn bot_type(difficulty: Difficulty, gear_tier: u32, spawn_chance: f64, max_count: u32) -> BotTypeSettings {
    BotTypeSettings {
        difficulty,
        gear_tier,
        spawn_chance,
        max_count,
        ..Default::default()
    }
}

impl Default for DirectorConfig {
    fn default() -> Self {
        let mut maps = BTreeMap::new();
        maps.insert(
            DEFAULT_MAP_KEY.to_string(),
            map(20, 8, &[("assault", 12), ("pmcbot", 4), ("usec", 4), ("bear", 4)]),
        );
        maps.insert(
            "bigmap".to_string(),
            map(25, 10, &[("assault", 15), ("pmcbot", 4), ("bosskilla", 1), ("usec", 5), ("bear", 5)]),
        );
        maps.insert(
            "factory4_day".to_string(),
            map(12, 4, &[("assault", 8), ("bosstagilla", 1), ("usec", 3), ("bear", 3)]),
        );
        maps.insert(
            "interchange".to_string(),
            map(24, 10, &[("assault", 14), ("bosskilla", 1), ("usec", 5), ("bear", 5)]),
        );
        maps.insert(
            "lighthouse".to_string(),
            map(22, 8, &[("assault", 10), ("exusec", 8), ("usec", 4), ("bear", 4)]),
        );

        let mut bot_types = BTreeMap::new();
        bot_types.insert("assault".to_string(), bot_type(Difficulty::Easy, 1, 1.0, 15));
        bot_types.insert("pmcbot".to_string(), bot_type(Difficulty::Hard, 3, 0.25, 4));
        bot_types.insert("usec".to_string(), bot_type(Difficulty::Normal, 2, 1.0, 5));
        bot_types.insert("bear".to_string(), bot_type(Difficulty::Normal, 2, 1.0, 5));
        bot_types.insert("exusec".to_string(), bot_type(Difficulty::Hard, 3, 0.25, 8));
        bot_types.insert("bosskilla".to_string(), bot_type(Difficulty::Impossible, 4, 0.35, 1));
        bot_types.insert("bosstagilla".to_string(), bot_type(Difficulty::Impossible, 4, 0.35, 1));

        Self {
            global: GlobalSettings::default(),
            maps,
            bot_types,
            waves: WaveSettings::default(),
            hot_zones: HotZoneSettings::default(),
            vegetation: VegetationSettings::default(),
            integrations: IntegrationSettings::default(),
        }
    }
}

impl DirectorConfig {
    /// Repairs inconsistent bounds in place and returns the number of fixes.
    ///
    /// Whenever an upper bound sits below its lower bound the upper bound is
    /// raised to the lower bound. Probabilities are clamped into [0, 1].
    /// Nothing here rejects a configuration.
    pub fn validate(&mut self) -> usize {
        let mut corrections = 0;

        let global = &mut self.global;
        if global.max_bots_per_raid < global.min_bots_per_raid {
            warn!(
                "global maxBotsPerRaid {} below minBotsPerRaid {}, raising to {}",
                global.max_bots_per_raid, global.min_bots_per_raid, global.min_bots_per_raid
            );
            global.max_bots_per_raid = global.min_bots_per_raid;
            corrections += 1;
        }
        for (label, chance) in [
            ("bossSpawnChance", &mut global.boss_spawn_chance),
            ("raiderSpawnChance", &mut global.raider_spawn_chance),
            ("rogueSpawnChance", &mut global.rogue_spawn_chance),
        ] {
            if clamp_probability(chance) {
                warn!("global {} outside [0, 1], clamped to {}", label, chance);
                corrections += 1;
            }
        }

        for (name, map) in self.maps.iter_mut() {
            if map.max_bots < map.min_bots {
                warn!(
                    map = %name,
                    "maxBots {} below minBots {}, raising to {}",
                    map.max_bots, map.min_bots, map.min_bots
                );
                map.max_bots = map.min_bots;
                corrections += 1;
            }
        }

        for (name, bot) in self.bot_types.iter_mut() {
            if clamp_probability(&mut bot.spawn_chance) {
                warn!(bot_type = %name, "spawnChance outside [0, 1], clamped to {}", bot.spawn_chance);
                corrections += 1;
            }
            if let Some(range) = bot.level_based_gear.as_mut() {
                if range.max_level < range.min_level {
                    warn!(
                        bot_type = %name,
                        "maxLevel {} below minLevel {}, raising to {}",
                        range.max_level, range.min_level, range.min_level
                    );
                    range.max_level = range.min_level;
                    corrections += 1;
                }
            }
        }

        for (map_name, zones) in self.hot_zones.maps.iter_mut() {
            for (zone_name, zone) in zones.iter_mut() {
                if clamp_probability(&mut zone.spawn_chance) {
                    warn!(map = %map_name, zone = %zone_name, "zone spawnChance clamped to {}", zone.spawn_chance);
                    corrections += 1;
                }
            }
        }

        corrections
    }
}

/// Clamps `value` into [0, 1], returning whether it changed. NaN becomes 0.
fn clamp_probability(value: &mut f64) -> bool {
    let clamped = if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) };
    if clamped != *value || value.is_nan() {
        *value = clamped;
        true
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_consistent() {
        let mut config = DirectorConfig::default();
        assert_eq!(config.validate(), 0);
        assert!(config.maps.contains_key(DEFAULT_MAP_KEY));
        assert_eq!(config.maps["bigmap"].bot_types["bosskilla"].max_count, 1);
    }

    #[test]
    fn test_validation_raises_upper_bound() {
        let mut config = DirectorConfig::default();
        config.global.max_bots_per_raid = 3;
        config.global.min_bots_per_raid = 9;
        config.maps.get_mut("bigmap").unwrap().max_bots = 2;
        config.maps.get_mut("bigmap").unwrap().min_bots = 10;

        assert_eq!(config.validate(), 2);
        assert_eq!(config.global.max_bots_per_raid, 9);
        assert_eq!(config.global.min_bots_per_raid, 9);
        assert_eq!(config.maps["bigmap"].max_bots, 10);
        assert_eq!(config.maps["bigmap"].min_bots, 10);
    }

    #[test]
    fn test_validation_holds_for_any_bounds() {
        for max in 0..20u32 {
            for min in 0..20u32 {
                let mut config = DirectorConfig::default();
                let entry = config.maps.get_mut(DEFAULT_MAP_KEY).unwrap();
                entry.max_bots = max;
                entry.min_bots = min;
                config.validate();
                let entry = &config.maps[DEFAULT_MAP_KEY];
                assert!(entry.max_bots >= entry.min_bots);
                assert_eq!(entry.min_bots, min, "lower bound must never move");
            }
        }
    }

    #[test]
    fn test_probabilities_are_clamped() {
        let mut config = DirectorConfig::default();
        config.global.boss_spawn_chance = 1.5;
        config.bot_types.get_mut("assault").unwrap().spawn_chance = -0.2;
        assert_eq!(config.validate(), 2);
        assert_eq!(config.global.boss_spawn_chance, 1.0);
        assert_eq!(config.bot_types["assault"].spawn_chance, 0.0);
    }

    #[test]
    fn test_partial_document_uses_defaults() {
        let json = r#"{
            "maps": {
                "bigmap": { "maxBots": 25, "minBots": 10,
                    "botTypes": { "bosskilla": { "enabled": true, "maxCount": 1 } } }
            },
            "botTypes": {
                "bosskilla": { "difficulty": "impossible", "allowedMaps": ["bigmap"],
                    "behaviorProfile": { "accuracy": 0.99 } }
            }
        }"#;
        let config: DirectorConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.global.max_bots_per_raid, 30);
        assert!(config.maps["bigmap"].enabled);
        assert_eq!(config.bot_types["bosskilla"].difficulty, Difficulty::Impossible);
        assert_eq!(
            config.bot_types["bosskilla"].live_behavior.unwrap().accuracy,
            Some(0.99)
        );
        assert!(config.bot_types["bosskilla"].allowed_maps.allows("bigmap"));
        assert!(!config.bot_types["bosskilla"].allowed_maps.allows("factory4_day"));
        assert_eq!(config.hot_zones.priority_ranks.rank(ZonePriority::High), 1);
    }

    #[test]
    fn test_wildcard_allowed_maps() {
        let wildcard: AllowedMaps = serde_json::from_str(r#""*""#).unwrap();
        assert!(wildcard.allows("anything"));
        let listed: AllowedMaps = serde_json::from_str(r#"["*"]"#).unwrap();
        assert!(listed.allows("anything"));
    }
}
