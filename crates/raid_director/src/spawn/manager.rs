//! Projection of the resolved configuration onto the host's tables.

use super::records::{
    self, append_unique, as_object_mut, AMMO_RESTRICTIONS, GEAR_PROGRESSION, LEVEL_BASED_GEAR,
    MAX_LEVEL, MIN_LEVEL,
};
use crate::config::{BotTypeSettings, ConfigManager, Difficulty, DEFAULT_MAP_KEY};
use crate::error::{DirectorError, DirectorResult};
use crate::host::HostDatabase;
use crate::integration::{PeerAvailability, PeerBot, SpawnDelegate};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};
use tracing::{debug, error, info};

/// Level cap of scaled bots when no high tier threshold is configured.
pub const DEFAULT_MAX_LEVEL: u32 = 60;
pub const DEFAULT_MIN_LEVEL: u32 = 1;

/// Outcome of one configuration pass over the host tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyReport {
    /// Bot types whose record was patched without error
    pub patched: usize,
    /// Enabled bot types the host has no record for
    pub skipped: usize,
    /// Bot types with at least one failed pass
    pub failed: usize,
    /// Host location records that received map bounds
    pub locations: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapStatistics {
    pub enabled: bool,
    pub max_bots: u32,
    pub min_bots: u32,
    /// bot type -> configured max count, enabled types only
    pub bot_counts: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BotTypeStatistics {
    pub enabled: bool,
    pub difficulty: Difficulty,
    pub max_count: u32,
    pub spawn_chance: f64,
    pub present_on_host: bool,
}

/// Read-only diagnostic view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpawnStatistics {
    pub maps: BTreeMap<String, MapStatistics>,
    pub bot_types: BTreeMap<String, BotTypeStatistics>,
    pub peers: PeerAvailability,
    pub gear_progression_enabled: bool,
}

/// Applies bot type, difficulty and behavior settings to the host's tables and
/// owns the effective spawn count rule.
pub struct SpawnManager {
    config: Arc<ConfigManager>,
    database: Arc<HostDatabase>,
    peers: OnceLock<PeerAvailability>,
}

impl SpawnManager {
    pub fn new(config: Arc<ConfigManager>, database: Arc<HostDatabase>) -> Self {
        Self {
            config,
            database,
            peers: OnceLock::new(),
        }
    }

    /// Stores the peer detection result. Only the first call has an effect.
    pub fn record_peer_availability(&self, peers: PeerAvailability) {
        if self.peers.set(peers).is_err() {
            debug!("Peer availability already recorded, ignoring update");
        }
    }

    pub fn peer_availability(&self) -> PeerAvailability {
        self.peers.get().cloned().unwrap_or_default()
    }

    /// Patches every enabled bot type present on the host, then projects map
    /// bounds onto host locations.
    ///
    /// Each bot type and each pass is isolated: a failure is logged and the
    /// remaining work continues.
    pub fn apply_custom_spawn_config(&self) -> ApplyReport {
        let config = self.config.get_config();
        let mut report = ApplyReport::default();

        for (bot_type, settings) in config.bot_types.iter().filter(|(_, s)| s.enabled) {
            let outcome = self
                .database
                .bot_types
                .with_record_mut(bot_type, |record| Self::patch_record(bot_type, record, settings));

            match outcome {
                None => {
                    debug!(bot_type = %bot_type, "No host record for bot type, skipping");
                    report.skipped += 1;
                }
                Some(0) => report.patched += 1,
                Some(_) => report.failed += 1,
            }
        }

        for (map_name, map) in config.maps.iter() {
            if map_name == DEFAULT_MAP_KEY || !map.enabled {
                continue;
            }
            let outcome = self.database.locations.with_record_mut(map_name, |record| {
                let record = as_object_mut(map_name, record)?;
                record.insert("botMax".to_string(), json!(map.max_bots));
                record.insert("botMin".to_string(), json!(map.min_bots));
                Ok::<_, DirectorError>(())
            });
            match outcome {
                Some(Ok(())) => report.locations += 1,
                Some(Err(e)) => error!(map = %map_name, "Failed to apply map bounds: {}", e),
                None => {}
            }
        }

        info!(
            "Applied spawn configuration: {} patched, {} skipped, {} failed, {} locations",
            report.patched, report.skipped, report.failed, report.locations
        );
        report
    }

    /// Runs the three mutation passes and returns how many failed.
    fn patch_record(bot_type: &str, record: &mut Value, settings: &BotTypeSettings) -> usize {
        let mut failures = 0;

        if let Err(e) = records::apply_gear_restrictions(bot_type, record, settings) {
            error!(bot_type = %bot_type, "Gear restriction pass failed: {}", e);
            failures += 1;
        }
        if let Err(e) = records::apply_difficulty(bot_type, record, settings.difficulty) {
            error!(bot_type = %bot_type, "Difficulty pass failed: {}", e);
            failures += 1;
        }
        if let Some(behavior) = settings.live_behavior.as_ref() {
            if let Err(e) = records::apply_behavior(bot_type, record, behavior) {
                error!(bot_type = %bot_type, "Behavior pass failed: {}", e);
                failures += 1;
            }
        }

        failures
    }

    /// Effective spawn count for a spawn request.
    ///
    /// # Arguments
    ///
    /// * `bot_type` - Bot type the host is about to spawn
    /// * `location` - Location id of the running map
    /// * `requested_count` - Number of bots the host asked for
    ///
    /// # Returns
    ///
    /// * unknown or disabled location: `requested_count` (fail open)
    /// * bot type unknown or disabled on that location: `0` (fail closed)
    /// * otherwise: `min(max_count, requested_count)`
    pub fn calculate_custom_bot_count(&self, bot_type: &str, location: &str, requested_count: u32) -> u32 {
        let config = self.config.get_config();
        let map = match config.maps.get(location) {
            Some(map) if map.enabled => map,
            _ => return requested_count,
        };
        match map.bot_types.get(bot_type) {
            Some(limit) if limit.enabled => limit.max_count.min(requested_count),
            _ => 0,
        }
    }

    /// Marks player-like bot types as level scaled and propagates the meta
    /// gear lists, then enforces the meta ammo list.
    ///
    /// Does nothing while the built-in progression is switched off or no
    /// progression block is configured. Returns the number of records touched.
    pub fn apply_gear_progression(&self) -> usize {
        if !self.config.is_gear_progression_enabled() {
            info!("Built-in gear progression disabled, skipping");
            return 0;
        }
        let config = self.config.get_config();
        let Some(progression) = config.global.gear_progression.as_ref() else {
            return 0;
        };
        let max_level = progression.level_thresholds.high.unwrap_or(DEFAULT_MAX_LEVEL);

        let mut touched = 0;
        for bot_type in &progression.pmc_bot_types {
            let outcome = self.database.bot_types.with_record_mut(bot_type, |record| {
                let record = as_object_mut(bot_type, record)?;
                record.insert(LEVEL_BASED_GEAR.to_string(), Value::Bool(true));
                record.insert(MIN_LEVEL.to_string(), json!(DEFAULT_MIN_LEVEL));
                record.insert(MAX_LEVEL.to_string(), json!(max_level));

                let gear = record
                    .entry(GEAR_PROGRESSION.to_string())
                    .or_insert_with(|| json!({}))
                    .as_object_mut()
                    .ok_or_else(|| DirectorError::shape(bot_type.as_str(), "`gearProgression` is not an object"))?;
                append_unique(bot_type, gear, "metaAmmo", &progression.meta_ammo)?;
                append_unique(bot_type, gear, "metaArmor", &progression.meta_armor)?;
                append_unique(bot_type, gear, "metaWeapons", &progression.meta_weapons)?;
                Ok::<_, DirectorError>(())
            });

            match outcome {
                Some(Ok(())) => touched += 1,
                Some(Err(e)) => error!(bot_type = %bot_type, "Gear progression pass failed: {}", e),
                None => debug!(bot_type = %bot_type, "No host record for progression bot type"),
            }
        }

        self.enforce_meta_ammo();
        info!("Gear progression applied to {} bot type(s), max level {}", touched, max_level);
        touched
    }

    /// Appends the meta ammo list to the ammo restriction list of every
    /// progression bot type. Repeated calls add nothing new.
    pub fn enforce_meta_ammo(&self) -> usize {
        let config = self.config.get_config();
        let Some(progression) = config.global.gear_progression.as_ref() else {
            return 0;
        };

        let mut added = 0;
        for bot_type in &progression.pmc_bot_types {
            let outcome = self.database.bot_types.with_record_mut(bot_type, |record| {
                let record = as_object_mut(bot_type, record)?;
                append_unique(bot_type, record, AMMO_RESTRICTIONS, &progression.meta_ammo)
            });
            match outcome {
                Some(Ok(count)) => added += count,
                Some(Err(e)) => error!(bot_type = %bot_type, "Meta ammo enforcement failed: {}", e),
                None => {}
            }
        }
        added
    }

    /// Diagnostic snapshot. Does not touch any state.
    pub fn get_spawn_statistics(&self) -> SpawnStatistics {
        let config = self.config.get_config();

        let maps = config
            .maps
            .iter()
            .map(|(name, map)| {
                let bot_counts = map
                    .bot_types
                    .iter()
                    .filter(|(_, limit)| limit.enabled)
                    .map(|(bot_type, limit)| (bot_type.clone(), limit.max_count))
                    .collect();
                (
                    name.clone(),
                    MapStatistics {
                        enabled: map.enabled,
                        max_bots: map.max_bots,
                        min_bots: map.min_bots,
                        bot_counts,
                    },
                )
            })
            .collect();

        let bot_types = config
            .bot_types
            .iter()
            .map(|(name, settings)| {
                (
                    name.clone(),
                    BotTypeStatistics {
                        enabled: settings.enabled,
                        difficulty: settings.difficulty,
                        max_count: settings.max_count,
                        spawn_chance: settings.spawn_chance,
                        present_on_host: self.database.bot_types.contains(name),
                    },
                )
            })
            .collect();

        SpawnStatistics {
            maps,
            bot_types,
            peers: self.peer_availability(),
            gear_progression_enabled: self.config.is_gear_progression_enabled(),
        }
    }
}

impl SpawnDelegate for SpawnManager {
    fn compute_effective_count(&self, bot_type: &str, location: &str, requested_count: u32) -> u32 {
        self.calculate_custom_bot_count(bot_type, location, requested_count)
    }

    fn apply_modifiers(&self, bot: &mut PeerBot) -> DirectorResult<()> {
        let config = self.config.get_config();
        let Some(settings) = config.bot_types.get(&bot.bot_type).filter(|s| s.enabled) else {
            return Ok(());
        };
        records::apply_gear_restrictions(&bot.id, &mut bot.data, settings)?;
        records::apply_difficulty(&bot.id, &mut bot.data, settings.difficulty)?;
        if let Some(behavior) = settings.live_behavior.as_ref() {
            records::apply_behavior(&bot.id, &mut bot.data, behavior)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        BehaviorOverride, BotTypeLimit, ConfigPatch, GearProgression, GearRestrictions, LevelThresholds,
        MapSettings,
    };
    use tempfile::TempDir;

    async fn setup(database: HostDatabase) -> (TempDir, Arc<ConfigManager>, SpawnManager) {
        let dir = TempDir::new().unwrap();
        let config = Arc::new(ConfigManager::new(dir.path().join("config.json")));
        config.initialize().await;
        let database = Arc::new(database);
        let manager = SpawnManager::new(config.clone(), database);
        (dir, config, manager)
    }

    fn host_with(bot_types: &[&str]) -> HostDatabase {
        let database = HostDatabase::new();
        for bot_type in bot_types {
            database.bot_types.insert(*bot_type, json!({}));
        }
        database
    }

    #[tokio::test]
    async fn test_count_rule_branches() {
        let (_dir, config, manager) = setup(HostDatabase::new()).await;
        let mut maps = config.get_config().maps.clone();
        maps.insert(
            "closed".to_string(),
            MapSettings { enabled: false, ..Default::default() },
        );
        maps.get_mut("bigmap")
            .unwrap()
            .bot_types
            .insert("exusec".to_string(), BotTypeLimit { enabled: false, max_count: 5 });
        config
            .update_config(ConfigPatch { maps: Some(maps), ..Default::default() })
            .await
            .unwrap();

        assert_eq!(manager.calculate_custom_bot_count("bosskilla", "bigmap", 5), 1);
        assert_eq!(manager.calculate_custom_bot_count("assault", "bigmap", 5), 5);
        assert_eq!(manager.calculate_custom_bot_count("assault", "bigmap", 40), 15);
        assert_eq!(manager.calculate_custom_bot_count("exusec", "bigmap", 5), 0);
        assert_eq!(manager.calculate_custom_bot_count("unknown", "bigmap", 5), 0);
        assert_eq!(manager.calculate_custom_bot_count("assault", "closed", 9), 9);
        assert_eq!(manager.calculate_custom_bot_count("assault", "nowhere", 9), 9);
    }

    #[tokio::test]
    async fn test_count_never_exceeds_request() {
        let (_dir, _config, manager) = setup(HostDatabase::new()).await;
        for requested in 0..30 {
            for bot_type in ["assault", "bosskilla", "usec", "missing"] {
                for location in ["bigmap", "factory4_day", "unknown"] {
                    assert!(manager.calculate_custom_bot_count(bot_type, location, requested) <= requested);
                }
            }
        }
    }

    #[tokio::test]
    async fn test_apply_patches_present_records_only() {
        let database = host_with(&["assault", "bosskilla"]);
        database.locations.insert("bigmap", json!({ "Id": "bigmap" }));
        let (_dir, _config, manager) = setup(database).await;

        let report = manager.apply_custom_spawn_config();

        assert_eq!(report.patched, 2);
        assert_eq!(report.failed, 0);
        assert_eq!(report.skipped, 5);
        assert_eq!(report.locations, 1);
        let killa = manager.database.bot_types.get("bosskilla").unwrap();
        assert_eq!(killa["difficulty"], json!("impossible"));
        assert_eq!(killa["behaviorModifiers"]["accuracy"], json!(0.95));
        let bigmap = manager.database.locations.get("bigmap").unwrap();
        assert_eq!(bigmap["botMax"], json!(25));
        assert_eq!(bigmap["botMin"], json!(10));
    }

    #[tokio::test]
    async fn test_failing_record_does_not_stop_batch() {
        let database = host_with(&["assault", "usec"]);
        database.bot_types.insert("bear", json!("corrupt"));
        let (_dir, _config, manager) = setup(database).await;

        let report = manager.apply_custom_spawn_config();

        assert_eq!(report.failed, 1);
        assert_eq!(report.patched, 2);
        assert_eq!(manager.database.bot_types.get("bear").unwrap(), json!("corrupt"));
        assert_eq!(manager.database.bot_types.get("usec").unwrap()["difficulty"], json!("normal"));
    }

    #[tokio::test]
    async fn test_behavior_override_wins_over_difficulty() {
        let (_dir, config, manager) = setup(host_with(&["pmcbot"])).await;
        let mut bot_types = config.get_config().bot_types.clone();
        let pmcbot = bot_types.get_mut("pmcbot").unwrap();
        pmcbot.live_behavior = Some(BehaviorOverride {
            accuracy: Some(0.42),
            vision: Some(1.5),
            ..Default::default()
        });
        pmcbot.gear_restrictions = GearRestrictions {
            weapons: vec!["mp5".to_string()],
            ..Default::default()
        };
        config
            .update_config(ConfigPatch { bot_types: Some(bot_types), ..Default::default() })
            .await
            .unwrap();

        manager.apply_custom_spawn_config();

        let record = manager.database.bot_types.get("pmcbot").unwrap();
        assert_eq!(
            record["behaviorModifiers"],
            json!({ "accuracy": 0.42, "reactionTime": 0.8, "aggression": 0.9, "vision": 1.5 })
        );
        assert_eq!(record["weaponRestrictions"], json!(["mp5"]));
    }

    #[tokio::test]
    async fn test_disabled_bot_type_is_not_applied() {
        let (_dir, config, manager) = setup(host_with(&["assault"])).await;
        let mut bot_types = config.get_config().bot_types.clone();
        bot_types.get_mut("assault").unwrap().enabled = false;
        config
            .update_config(ConfigPatch { bot_types: Some(bot_types), ..Default::default() })
            .await
            .unwrap();

        let report = manager.apply_custom_spawn_config();
        assert_eq!(report.patched, 0);
        assert_eq!(manager.database.bot_types.get("assault").unwrap(), json!({}));
    }

    #[tokio::test]
    async fn test_gear_progression_respects_toggle() {
        let (_dir, config, manager) = setup(host_with(&["usec", "bear"])).await;
        config.set_gear_progression_enabled(false);
        assert_eq!(manager.apply_gear_progression(), 0);
        assert_eq!(manager.database.bot_types.get("usec").unwrap(), json!({}));

        config.set_gear_progression_enabled(true);
        assert_eq!(manager.apply_gear_progression(), 2);
        let usec = manager.database.bot_types.get("usec").unwrap();
        assert_eq!(usec["levelBasedGear"], json!(true));
        assert_eq!(usec["minLevel"], json!(1));
        assert_eq!(usec["maxLevel"], json!(60));
    }

    #[tokio::test]
    async fn test_gear_progression_is_idempotent() {
        let (_dir, config, manager) = setup(host_with(&["usec"])).await;
        let mut global = config.get_config().global.clone();
        global.gear_progression = Some(GearProgression {
            level_thresholds: LevelThresholds { low: 10, mid: 25, high: Some(42) },
            pmc_bot_types: vec!["usec".to_string()],
            meta_ammo: vec!["m995".to_string(), "bs".to_string()],
            meta_armor: vec!["slick".to_string()],
            meta_weapons: vec![],
        });
        config
            .update_config(ConfigPatch { global: Some(global), ..Default::default() })
            .await
            .unwrap();

        manager.apply_gear_progression();
        manager.apply_gear_progression();

        let usec = manager.database.bot_types.get("usec").unwrap();
        assert_eq!(usec["maxLevel"], json!(42));
        assert_eq!(usec["ammoRestrictions"], json!(["m995", "bs"]));
        assert_eq!(usec["gearProgression"]["metaAmmo"], json!(["m995", "bs"]));
        assert_eq!(usec["gearProgression"]["metaArmor"], json!(["slick"]));
        assert_eq!(manager.enforce_meta_ammo(), 0);
    }

    #[tokio::test]
    async fn test_statistics_are_read_only() {
        let (_dir, _config, manager) = setup(host_with(&["assault"])).await;
        manager.record_peer_availability(PeerAvailability { bot_behavior: true, multiplayer: false });

        let stats = manager.get_spawn_statistics();

        assert!(stats.peers.bot_behavior);
        assert!(stats.bot_types["assault"].present_on_host);
        assert!(!stats.bot_types["bosskilla"].present_on_host);
        assert_eq!(stats.maps["bigmap"].bot_counts["bosskilla"], 1);
        assert_eq!(manager.database.bot_types.get("assault").unwrap(), json!({}));
    }

    #[tokio::test]
    async fn test_delegate_applies_modifiers_to_peer_bots() {
        let (_dir, config, manager) = setup(HostDatabase::new()).await;
        let mut bot_types = config.get_config().bot_types.clone();
        bot_types.get_mut("assault").unwrap().live_behavior =
            Some(BehaviorOverride { hearing: Some(0.5), ..Default::default() });
        config
            .update_config(ConfigPatch { bot_types: Some(bot_types), ..Default::default() })
            .await
            .unwrap();

        let mut bot = PeerBot::new("bot-1", "assault", json!({}));
        manager.apply_modifiers(&mut bot).unwrap();
        assert_eq!(bot.data["difficulty"], json!("easy"));
        assert_eq!(
            bot.data["behaviorModifiers"],
            json!({ "accuracy": 0.3, "reactionTime": 2.0, "aggression": 0.4, "hearing": 0.5 })
        );

        let mut boss = PeerBot::new("bot-3", "bosskilla", json!({}));
        manager.apply_modifiers(&mut boss).unwrap();
        let mut on_host = json!({});
        records::apply_difficulty("bosskilla", &mut on_host, Difficulty::Impossible).unwrap();
        assert_eq!(boss.data["difficulty"], on_host["difficulty"]);
        assert_eq!(boss.data["behaviorModifiers"], on_host["behaviorModifiers"]);

        let mut stranger = PeerBot::new("bot-2", "unknown", json!({ "x": 1 }));
        manager.apply_modifiers(&mut stranger).unwrap();
        assert_eq!(stranger.data, json!({ "x": 1 }));
    }
}
