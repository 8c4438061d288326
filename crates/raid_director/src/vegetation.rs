//! Fire restriction for bots hiding in vegetation.
//!
//! Two timers per map: a position check records which bots stand inside a
//! configured vegetation patch, and a faster shooting check restricts fire for
//! shooting bots in a patch and lifts the restriction once they leave it.

use crate::config::{ConfigManager, VegetationSettings, ZoneCoordinates};
use crate::error::DirectorResult;
use crate::host::{ActiveBot, BotActivity};
use crate::tasks::{spawn_periodic, TaskHandle};
use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Default)]
struct MapState {
    /// Bots inside a patch as of the last position check
    in_vegetation: HashSet<String>,
    /// Bots the host was told to hold fire
    restricted: HashSet<String>,
}

pub struct VegetationGuard {
    config: Arc<ConfigManager>,
    activity: Arc<dyn BotActivity>,
    state: Arc<DashMap<String, MapState>>,
    tasks: DashMap<String, Vec<TaskHandle>>,
}

impl VegetationGuard {
    pub fn new(config: Arc<ConfigManager>, activity: Arc<dyn BotActivity>) -> Self {
        Self {
            config,
            activity,
            state: Arc::new(DashMap::new()),
            tasks: DashMap::new(),
        }
    }

    /// Starts both checks for `map_name`.
    ///
    /// Returns false when the feature is disabled, the map has no vegetation
    /// patches, or no tokio runtime is available to run the checks.
    pub fn start(&self, map_name: &str) -> bool {
        let config = self.config.get_config();
        let settings = &config.vegetation;
        if !settings.enabled {
            return false;
        }
        let Some(patches) = settings.maps.get(map_name).filter(|patches| !patches.is_empty()) else {
            debug!(map = %map_name, "No vegetation patches configured");
            return false;
        };

        self.stop(map_name);
        self.state.insert(map_name.to_string(), MapState::default());

        match self.spawn_checks(map_name, Arc::new(patches.clone()), settings) {
            Ok(tasks) => {
                self.tasks.insert(map_name.to_string(), tasks);
                info!(map = %map_name, "Vegetation fire restriction active");
                true
            }
            Err(e) => {
                self.state.remove(map_name);
                warn!(map = %map_name, "Vegetation fire restriction inactive: {}", e);
                false
            }
        }
    }

    fn spawn_checks(
        &self,
        map_name: &str,
        patches: Arc<Vec<ZoneCoordinates>>,
        settings: &VegetationSettings,
    ) -> DirectorResult<Vec<TaskHandle>> {
        let position_check = {
            let map = map_name.to_string();
            let activity = self.activity.clone();
            let state = self.state.clone();
            spawn_periodic(
                format!("{map}:vegetation-positions"),
                Duration::from_millis(settings.position_check_interval_ms),
                move || {
                    check_positions(&map, activity.as_ref(), &state, &patches);
                    async {}
                },
            )?
        };

        let shooting_check = {
            let map = map_name.to_string();
            let activity = self.activity.clone();
            let state = self.state.clone();
            spawn_periodic(
                format!("{map}:vegetation-shooting"),
                Duration::from_millis(settings.shooting_check_interval_ms),
                move || {
                    check_shooting(&map, activity.as_ref(), &state);
                    async {}
                },
            )?
        };

        Ok(vec![position_check, shooting_check])
    }

    /// Stops both checks and lifts every restriction placed on this map.
    pub fn stop(&self, map_name: &str) -> bool {
        let Some((_, tasks)) = self.tasks.remove(map_name) else {
            return false;
        };
        for task in &tasks {
            task.cancel();
        }
        if let Some((_, state)) = self.state.remove(map_name) {
            for bot_id in &state.restricted {
                self.activity.set_fire_restricted(bot_id, false);
            }
        }
        debug!(map = %map_name, "Vegetation checks stopped");
        true
    }

    pub fn is_running(&self, map_name: &str) -> bool {
        self.tasks.contains_key(map_name)
    }

    pub fn is_in_vegetation(&self, map_name: &str, bot_id: &str) -> bool {
        self.state
            .get(map_name)
            .map(|state| state.in_vegetation.contains(bot_id))
            .unwrap_or(false)
    }

    pub fn restricted_bots(&self, map_name: &str) -> Vec<String> {
        let mut bots: Vec<String> = self
            .state
            .get(map_name)
            .map(|state| state.restricted.iter().cloned().collect())
            .unwrap_or_default();
        bots.sort();
        bots
    }
}

impl Drop for VegetationGuard {
    fn drop(&mut self) {
        let maps: Vec<String> = self.tasks.iter().map(|entry| entry.key().clone()).collect();
        for map in maps {
            self.stop(&map);
        }
    }
}

fn inside_any(bot: &ActiveBot, patches: &[ZoneCoordinates]) -> bool {
    patches
        .iter()
        .any(|patch| (bot.x - patch.x).powi(2) + (bot.y - patch.y).powi(2) <= patch.radius.powi(2))
}

fn check_positions(map: &str, activity: &dyn BotActivity, state: &DashMap<String, MapState>, patches: &[ZoneCoordinates]) {
    let inside: HashSet<String> = activity
        .active_bots(map)
        .into_iter()
        .filter(|bot| inside_any(bot, patches))
        .map(|bot| bot.id)
        .collect();
    if let Some(mut entry) = state.get_mut(map) {
        entry.in_vegetation = inside;
    }
}

/// Updates the restricted set under the map's entry lock, then tells the
/// host about each change once the lock is released.
fn check_shooting(map: &str, activity: &dyn BotActivity, state: &DashMap<String, MapState>) {
    let bots = activity.active_bots(map);
    let changes: Vec<(String, bool)> = {
        let Some(mut entry) = state.get_mut(map) else {
            return;
        };
        let entry = &mut *entry;
        let mut changes = Vec::new();

        for bot in &bots {
            let hidden = entry.in_vegetation.contains(&bot.id);
            if bot.shooting && hidden && entry.restricted.insert(bot.id.clone()) {
                changes.push((bot.id.clone(), true));
            } else if !hidden && entry.restricted.remove(&bot.id) {
                changes.push((bot.id.clone(), false));
            }
        }

        // Bots that despawned while restricted.
        let alive: HashSet<&str> = bots.iter().map(|bot| bot.id.as_str()).collect();
        let gone: Vec<String> = entry
            .restricted
            .iter()
            .filter(|id| !alive.contains(id.as_str()))
            .cloned()
            .collect();
        for id in gone {
            entry.restricted.remove(&id);
            changes.push((id, false));
        }
        changes
    };

    for (bot_id, restricted) in changes {
        activity.set_fire_restricted(&bot_id, restricted);
        if restricted {
            debug!(map = %map, bot = %bot_id, "Fire restricted in vegetation");
        } else {
            debug!(map = %map, bot = %bot_id, "Fire restriction lifted");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigPatch, VegetationSettings};
    use std::collections::{BTreeMap, HashMap};
    use std::sync::Mutex;
    use tempfile::TempDir;

    #[derive(Default)]
    struct FakeRaid {
        bots: Mutex<Vec<ActiveBot>>,
        restrictions: Mutex<HashMap<String, bool>>,
    }

    impl FakeRaid {
        fn set_bot(&self, id: &str, x: f64, y: f64, shooting: bool) {
            let mut bots = self.bots.lock().unwrap();
            bots.retain(|bot| bot.id != id);
            bots.push(ActiveBot { id: id.to_string(), x, y, shooting });
        }

        fn restricted(&self, id: &str) -> Option<bool> {
            self.restrictions.lock().unwrap().get(id).copied()
        }
    }

    impl BotActivity for FakeRaid {
        fn active_bots(&self, _map: &str) -> Vec<ActiveBot> {
            self.bots.lock().unwrap().clone()
        }

        fn set_fire_restricted(&self, bot_id: &str, restricted: bool) {
            self.restrictions.lock().unwrap().insert(bot_id.to_string(), restricted);
        }
    }

    async fn guard_with(enabled: bool) -> (TempDir, VegetationGuard, Arc<FakeRaid>) {
        let dir = TempDir::new().unwrap();
        let config = Arc::new(ConfigManager::new(dir.path().join("config.json")));
        config.initialize().await;
        let mut maps = BTreeMap::new();
        maps.insert("woods".to_string(), vec![ZoneCoordinates { x: 0.0, y: 0.0, radius: 10.0 }]);
        config
            .update_config(ConfigPatch {
                vegetation: Some(VegetationSettings { enabled, maps, ..Default::default() }),
                ..Default::default()
            })
            .await
            .unwrap();

        let raid = Arc::new(FakeRaid::default());
        (dir, VegetationGuard::new(config, raid.clone()), raid)
    }

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    /// Advances the paused clock in half-second steps so every tick runs.
    async fn run_for(ms: u64) {
        for _ in 0..ms / 500 {
            tokio::time::advance(Duration::from_millis(500)).await;
            settle().await;
        }
    }

    #[tokio::test]
    async fn test_disabled_or_unknown_map() {
        let (_dir, guard, _raid) = guard_with(false).await;
        assert!(!guard.start("woods"));

        let (_dir, guard, _raid) = guard_with(true).await;
        assert!(!guard.start("customs"));
        assert!(!guard.is_running("customs"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_restrict_and_lift() {
        let (_dir, guard, raid) = guard_with(true).await;
        raid.set_bot("hidden", 3.0, 4.0, true);
        raid.set_bot("open", 50.0, 0.0, true);

        assert!(guard.start("woods"));
        settle().await;

        run_for(3000).await;
        assert!(guard.is_in_vegetation("woods", "hidden"));
        assert!(!guard.is_in_vegetation("woods", "open"));
        assert_eq!(raid.restricted("hidden"), Some(true));
        assert_eq!(raid.restricted("open"), None);
        assert_eq!(guard.restricted_bots("woods"), vec!["hidden".to_string()]);

        raid.set_bot("hidden", 30.0, 0.0, false);
        run_for(2000).await;
        assert_eq!(raid.restricted("hidden"), Some(false));
        assert!(guard.restricted_bots("woods").is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_lifts_restrictions() {
        let (_dir, guard, raid) = guard_with(true).await;
        raid.set_bot("hidden", 1.0, 1.0, true);
        guard.start("woods");
        settle().await;
        run_for(3000).await;
        assert_eq!(raid.restricted("hidden"), Some(true));

        assert!(guard.stop("woods"));
        assert_eq!(raid.restricted("hidden"), Some(false));
        assert!(!guard.is_running("woods"));
        assert!(!guard.stop("woods"));
    }

    /// Host callback that reads the guard's own state while being notified.
    struct ReentrantRaid {
        bots: Vec<ActiveBot>,
        state: Arc<DashMap<String, MapState>>,
        seen: Mutex<Vec<(String, bool, usize)>>,
    }

    impl BotActivity for ReentrantRaid {
        fn active_bots(&self, _map: &str) -> Vec<ActiveBot> {
            self.bots.clone()
        }

        fn set_fire_restricted(&self, bot_id: &str, restricted: bool) {
            let count = self.state.get("woods").map(|s| s.restricted.len()).unwrap_or(0);
            self.seen.lock().unwrap().push((bot_id.to_string(), restricted, count));
        }
    }

    #[test]
    fn test_host_may_read_state_while_notified() {
        let state = Arc::new(DashMap::new());
        let mut initial = MapState::default();
        initial.in_vegetation.insert("hidden".to_string());
        initial.restricted.insert("despawned".to_string());
        state.insert("woods".to_string(), initial);

        let raid = ReentrantRaid {
            bots: vec![ActiveBot { id: "hidden".to_string(), x: 0.0, y: 0.0, shooting: true }],
            state: state.clone(),
            seen: Mutex::new(Vec::new()),
        };

        check_shooting("woods", &raid, &state);

        let mut seen = raid.seen.lock().unwrap().clone();
        seen.sort();
        assert_eq!(
            seen,
            vec![("despawned".to_string(), false, 1), ("hidden".to_string(), true, 1)]
        );
    }

    #[test]
    fn test_start_without_runtime_stays_inactive() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let (_dir, guard, _raid) = runtime.block_on(guard_with(true));

        assert!(!guard.start("woods"));
        assert!(!guard.is_running("woods"));
        assert!(guard.restricted_bots("woods").is_empty());
    }
}
