//! End-to-end behavior through the public API.

use raid_director::config::{
    BotTypeLimit, ConfigPatch, Difficulty, HotZone, HotZoneSettings, MapSettings, PriorityRanks, ZoneCoordinates,
    ZonePriority,
};
use raid_director::hot_zones::generate_spawn_positions;
use raid_director::{ConfigManager, HostDatabase, SpawnManager};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use tempfile::TempDir;

async fn config_in(dir: &TempDir) -> Arc<ConfigManager> {
    let config = Arc::new(ConfigManager::new(dir.path().join("config").join("config.json")));
    config.initialize().await;
    config
}

#[tokio::test]
async fn bosskilla_on_bigmap_is_capped_at_one() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir).await;

    let mut bot_types = BTreeMap::new();
    bot_types.insert("bosskilla".to_string(), BotTypeLimit { enabled: true, max_count: 1 });
    let mut maps = BTreeMap::new();
    maps.insert(
        "bigmap".to_string(),
        MapSettings { enabled: true, max_bots: 25, min_bots: 10, bot_types, ..Default::default() },
    );
    config
        .update_config(ConfigPatch { maps: Some(maps), ..Default::default() })
        .await
        .unwrap();

    let spawn = SpawnManager::new(config, Arc::new(HostDatabase::new()));
    assert_eq!(spawn.calculate_custom_bot_count("bosskilla", "bigmap", 5), 1);
}

#[tokio::test]
async fn unknown_map_follows_default_enabled_flag() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir).await;

    assert!(config.is_map_enabled("customMap"));

    let mut maps = config.get_config().maps.clone();
    maps.get_mut("default").unwrap().enabled = false;
    config
        .update_config(ConfigPatch { maps: Some(maps), ..Default::default() })
        .await
        .unwrap();

    assert!(!config.is_map_enabled("customMap"));
    assert!(!config.get_map_config("customMap").enabled);
}

#[test]
fn single_small_zone_respects_spacing() {
    let mut zones = BTreeMap::new();
    zones.insert(
        "lone".to_string(),
        HotZone {
            enabled: true,
            description: String::new(),
            spawn_types: vec!["assault".to_string()],
            max_bots: 3,
            spawn_chance: 1.0,
            priority: ZonePriority::High,
            coordinates: ZoneCoordinates { x: 0.0, y: 0.0, radius: 50.0 },
            quest_related: false,
        },
    );

    for seed in 0..50 {
        let mut rng = StdRng::seed_from_u64(seed);
        let positions = generate_spawn_positions(&zones, &PriorityRanks::default(), 100.0, &mut rng);

        assert!(positions.len() <= 3);
        for (i, a) in positions.iter().enumerate() {
            for b in &positions[i + 1..] {
                assert!(a.distance_to(b.x, b.y) >= 100.0);
            }
        }
    }
}

#[tokio::test]
async fn hard_difficulty_leaves_hearing_and_vision() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir).await;

    let mut bot_types = config.get_config().bot_types.clone();
    let pmcbot = bot_types.get_mut("pmcbot").unwrap();
    pmcbot.difficulty = Difficulty::Hard;
    pmcbot.live_behavior = None;
    config
        .update_config(ConfigPatch { bot_types: Some(bot_types), ..Default::default() })
        .await
        .unwrap();

    let database = Arc::new(HostDatabase::new());
    database.bot_types.insert(
        "pmcbot",
        json!({ "behaviorModifiers": { "hearing": 1.1, "vision": 0.9 } }),
    );
    let spawn = SpawnManager::new(config, database.clone());
    spawn.apply_custom_spawn_config();

    let record = database.bot_types.get("pmcbot").unwrap();
    assert_eq!(record["difficulty"], json!("hard"));
    assert_eq!(
        record["behaviorModifiers"],
        json!({ "accuracy": 0.8, "reactionTime": 0.8, "aggression": 0.9, "hearing": 1.1, "vision": 0.9 })
    );
}

#[tokio::test]
async fn update_survives_reload() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir).await;

    let mut hot_zones = HotZoneSettings { enabled: true, ..Default::default() };
    hot_zones.min_distance_between_spawns = 42.0;
    config
        .update_config(ConfigPatch { hot_zones: Some(hot_zones.clone()), ..Default::default() })
        .await
        .unwrap();

    let reloaded = ConfigManager::new(config.path().to_path_buf());
    let tree = reloaded.initialize().await;
    assert_eq!(tree.hot_zones, hot_zones);
    assert_eq!(*tree, *config.get_config());
}
