//! In-process stand-ins for the parts of a game server the director talks to.
//!
//! The snapshot file feeds all of them:
//!
//! ```json
//! {
//!   "botTypes":   { "assault": { .. } },
//!   "locations":  { "bigmap": { "waves": [{ "botType": "assault", "timeSeconds": 0, "slots": 2 }] } },
//!   "activeBots": { "bigmap": [{ "id": "b1", "x": 10.0, "y": 4.0, "shooting": false }] }
//! }
//! ```

use crate::error::HostResult;
use dashmap::DashMap;
use raid_director::integration::{WaveAdjuster, WaveEntry};
use raid_director::{ActiveBot, BotActivity, HostDatabase, HotZoneWave, WaveSpawner};
use serde_json::Value;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Reads the snapshot at `path`. A missing file yields an empty snapshot.
pub async fn load_snapshot(path: &Path) -> HostResult<Value> {
    if !path.exists() {
        warn!("Snapshot {} not found, starting with empty tables", path.display());
        return Ok(Value::Object(Default::default()));
    }
    let content = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&content)?)
}

/// Logs every hot zone wave instead of spawning bots.
#[derive(Debug, Default)]
pub struct LoggingWaveSpawner {
    waves: AtomicU64,
    positions: AtomicU64,
}

impl LoggingWaveSpawner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn waves_dispatched(&self) -> u64 {
        self.waves.load(Ordering::Relaxed)
    }

    pub fn positions_dispatched(&self) -> u64 {
        self.positions.load(Ordering::Relaxed)
    }
}

impl WaveSpawner for LoggingWaveSpawner {
    fn spawn_wave(&self, wave: HotZoneWave) {
        self.waves.fetch_add(1, Ordering::Relaxed);
        self.positions.fetch_add(wave.positions.len() as u64, Ordering::Relaxed);
        info!(
            map = %wave.map,
            zone = %wave.zone,
            wave = wave.wave,
            "🔥 Hot zone wave: {} position(s) for [{}]",
            wave.positions.len(),
            wave.bot_types.join(", ")
        );
    }
}

/// Bot positions taken from the snapshot's `activeBots` table.
#[derive(Debug, Default)]
pub struct SnapshotBotActivity {
    bots: DashMap<String, Vec<ActiveBot>>,
    restricted: DashMap<String, bool>,
}

impl SnapshotBotActivity {
    pub fn from_snapshot(snapshot: &Value) -> Self {
        let activity = Self::default();
        let Some(maps) = snapshot.get("activeBots").and_then(Value::as_object) else {
            return activity;
        };
        for (map, bots) in maps {
            let parsed: Vec<ActiveBot> = bots
                .as_array()
                .map(|list| list.iter().filter_map(parse_bot).collect())
                .unwrap_or_default();
            activity.bots.insert(map.clone(), parsed);
        }
        activity
    }

    pub fn bot_count(&self, map: &str) -> usize {
        self.bots.get(map).map(|bots| bots.len()).unwrap_or(0)
    }

    pub fn is_fire_restricted(&self, bot_id: &str) -> bool {
        self.restricted.get(bot_id).map(|entry| *entry).unwrap_or(false)
    }
}

fn parse_bot(value: &Value) -> Option<ActiveBot> {
    Some(ActiveBot {
        id: value.get("id")?.as_str()?.to_string(),
        x: value.get("x")?.as_f64()?,
        y: value.get("y")?.as_f64()?,
        shooting: value.get("shooting").and_then(Value::as_bool).unwrap_or(false),
    })
}

impl BotActivity for SnapshotBotActivity {
    fn active_bots(&self, map: &str) -> Vec<ActiveBot> {
        self.bots.get(map).map(|bots| bots.clone()).unwrap_or_default()
    }

    fn set_fire_restricted(&self, bot_id: &str, restricted: bool) {
        self.restricted.insert(bot_id.to_string(), restricted);
        debug!("Bot {} fire restriction: {}", bot_id, restricted);
    }
}

/// The host's own wave routine: replaces the list with the `waves` array of
/// the location record, when it has one.
pub struct LocationWaveAdjuster {
    database: Arc<HostDatabase>,
}

impl LocationWaveAdjuster {
    pub fn new(database: Arc<HostDatabase>) -> Self {
        Self { database }
    }
}

impl WaveAdjuster for LocationWaveAdjuster {
    fn adjust_waves(&self, location: &str, waves: &mut Vec<WaveEntry>) {
        let Some(record) = self.database.locations.get(location) else {
            return;
        };
        let Some(list) = record.get("waves") else {
            return;
        };
        match serde_json::from_value::<Vec<WaveEntry>>(list.clone()) {
            Ok(entries) => *waves = entries,
            Err(e) => warn!(location = %location, "Ignoring malformed wave list: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use raid_director::SpawnPosition;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_snapshot_is_empty() {
        let dir = TempDir::new().unwrap();
        let snapshot = load_snapshot(&dir.path().join("absent.json")).await.unwrap();
        assert_eq!(snapshot, json!({}));
    }

    #[tokio::test]
    async fn test_malformed_snapshot_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("snapshot.json");
        tokio::fs::write(&path, "{ not json").await.unwrap();
        assert!(load_snapshot(&path).await.is_err());
    }

    #[test]
    fn test_bot_activity_skips_incomplete_entries() {
        let activity = SnapshotBotActivity::from_snapshot(&json!({
            "activeBots": {
                "bigmap": [
                    { "id": "b1", "x": 1.0, "y": 2.0, "shooting": true },
                    { "id": "b2", "x": 3.0 },
                    { "id": "b3", "x": 5.0, "y": 6.0 }
                ]
            }
        }));

        let bots = activity.active_bots("bigmap");
        assert_eq!(bots.len(), 2);
        assert!(bots[0].shooting);
        assert!(!bots[1].shooting);
        assert!(activity.active_bots("woods").is_empty());

        activity.set_fire_restricted("b1", true);
        assert!(activity.is_fire_restricted("b1"));
        activity.set_fire_restricted("b1", false);
        assert!(!activity.is_fire_restricted("b1"));
    }

    #[test]
    fn test_wave_spawner_counts() {
        let spawner = LoggingWaveSpawner::new();
        spawner.spawn_wave(HotZoneWave {
            map: "bigmap".to_string(),
            zone: "dorms".to_string(),
            bot_types: vec!["pmcbot".to_string()],
            positions: vec![
                SpawnPosition { zone: "dorms".to_string(), x: 0.0, y: 0.0 },
                SpawnPosition { zone: "dorms".to_string(), x: 90.0, y: 0.0 },
            ],
            wave: 0,
        });

        assert_eq!(spawner.waves_dispatched(), 1);
        assert_eq!(spawner.positions_dispatched(), 2);
    }

    #[test]
    fn test_location_waves() {
        let database = Arc::new(HostDatabase::from_snapshot(&json!({
            "locations": {
                "bigmap": { "waves": [{ "botType": "assault", "timeSeconds": 30, "slots": 2 }] },
                "woods": { "waves": "broken" }
            }
        })));
        let adjuster = LocationWaveAdjuster::new(database);

        let mut waves = Vec::new();
        adjuster.adjust_waves("bigmap", &mut waves);
        assert_eq!(
            waves,
            vec![WaveEntry { bot_type: "assault".to_string(), time_seconds: 30, slots: 2 }]
        );

        adjuster.adjust_waves("woods", &mut waves);
        assert_eq!(waves.len(), 1);
        adjuster.adjust_waves("shoreline", &mut waves);
        assert_eq!(waves.len(), 1);
    }
}
