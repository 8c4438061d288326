//! # Hot Zone Sessions
//!
//! One session per map: the spawn positions sampled when the raid starts plus
//! the timers that turn them into waves.
//!
//! ## Timeline
//!
//! 1. [`HotZoneManager::initialize_hot_zones`] samples positions and schedules
//!    the initial spawn after `initialDelaySeconds` plus a random share of
//!    `randomizationWindowSeconds`
//! 2. The initial spawn emits wave 0 and starts a periodic timer, one wave
//!    every `waveSpacingSeconds`
//! 3. [`HotZoneManager::cleanup_map`] aborts the timers and drops the session
//!
//! Each zone passes its `spawnChance` independently on every wave.

use super::sampling::{generate_spawn_positions, SpawnPosition};
use crate::config::{ConfigManager, HotZone, PriorityRanks};
use crate::host::WaveSpawner;
use crate::error::DirectorResult;
use crate::tasks::{spawn_delayed, spawn_periodic, TaskHandle};
use dashmap::{DashMap, DashSet};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Lifecycle of one map's hot zone session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionPhase {
    Uninitialized,
    /// Positions computed, initial spawn pending
    Initialized,
    /// Periodic waves running
    WaveActive,
    /// Timers cancelled, positions discarded; kept until the next
    /// initialization of the map
    CleanedUp,
}

/// A batch of bots the host should spawn at the given positions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HotZoneWave {
    pub map: String,
    pub zone: String,
    pub bot_types: Vec<String>,
    pub positions: Vec<SpawnPosition>,
    /// 0 for the initial spawn, then 1, 2, ...
    pub wave: u32,
}

struct MapSession {
    generation: u64,
    phase: SessionPhase,
    positions: Arc<Vec<SpawnPosition>>,
    tasks: Vec<TaskHandle>,
}

impl MapSession {
    fn cancel_tasks(&mut self) {
        for task in self.tasks.drain(..) {
            task.cancel();
        }
    }
}

/// Data one session's timers need, captured when the session starts.
struct WavePlan {
    map: String,
    zones: Vec<(String, HotZone)>,
    positions: Arc<Vec<SpawnPosition>>,
    spawner: Option<Arc<dyn WaveSpawner>>,
}

impl WavePlan {
    /// Emits one wave per zone that passes its spawn chance. Returns the
    /// number of waves handed to the host.
    fn emit(&self, wave: u32, rng: &mut StdRng) -> usize {
        let mut emitted = 0;
        for (zone_name, zone) in &self.zones {
            if rng.gen::<f64>() >= zone.spawn_chance {
                continue;
            }
            let positions: Vec<SpawnPosition> =
                self.positions.iter().filter(|p| &p.zone == zone_name).cloned().collect();
            if positions.is_empty() {
                continue;
            }

            match &self.spawner {
                Some(spawner) => {
                    spawner.spawn_wave(HotZoneWave {
                        map: self.map.clone(),
                        zone: zone_name.clone(),
                        bot_types: zone.spawn_types.clone(),
                        positions,
                        wave,
                    });
                    emitted += 1;
                }
                None => debug!(map = %self.map, zone = %zone_name, "No wave spawner registered, dropping wave {}", wave),
            }
        }
        emitted
    }
}

/// Per-map hot zone sessions: spawn positions plus the timers that turn them
/// into waves.
///
/// Every session must be ended with [`cleanup_map`](Self::cleanup_map); its
/// timers run until then. Cleanup removes the session; only the map name is
/// remembered so [`phase`](Self::phase) can report [`SessionPhase::CleanedUp`].
pub struct HotZoneManager {
    config: Arc<ConfigManager>,
    spawner: Option<Arc<dyn WaveSpawner>>,
    sessions: Arc<DashMap<String, MapSession>>,
    ended: DashSet<String>,
    next_generation: AtomicU64,
    seed: Option<u64>,
}

impl HotZoneManager {
    pub fn new(config: Arc<ConfigManager>, spawner: Option<Arc<dyn WaveSpawner>>) -> Self {
        Self {
            config,
            spawner,
            sessions: Arc::new(DashMap::new()),
            ended: DashSet::new(),
            next_generation: AtomicU64::new(1),
            seed: None,
        }
    }

    /// Makes sampling and timing reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn rng_for(&self, generation: u64) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(generation)),
            None => StdRng::from_entropy(),
        }
    }

    /// Computes spawn positions for `map_name` and schedules its waves.
    ///
    /// A running session for the same map is cleaned up first.
    ///
    /// # Arguments
    ///
    /// * `map_name` - Location id, as used in the `hotZones.maps` table
    ///
    /// # Returns
    ///
    /// The number of positions placed. `0` when hot zones are disabled, the
    /// map has no zones, or the waves cannot be scheduled because no tokio
    /// runtime is available; no session is left behind in those cases.
    pub fn initialize_hot_zones(&self, map_name: &str) -> usize {
        let config = self.config.get_config();
        let settings = &config.hot_zones;
        if !settings.enabled {
            debug!(map = %map_name, "Hot zones disabled");
            return 0;
        }
        let Some(zones) = settings.maps.get(map_name).filter(|zones| !zones.is_empty()) else {
            debug!(map = %map_name, "No hot zones configured");
            return 0;
        };

        self.cleanup_map(map_name);

        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let mut rng = self.rng_for(generation);
        let positions = Arc::new(generate_spawn_positions(
            zones,
            &settings.priority_ranks,
            settings.min_distance_between_spawns,
            &mut rng,
        ));

        let timing = settings.timing;
        let initial_delay = seconds(timing.initial_delay_seconds + rng.gen::<f64>() * timing.randomization_window_seconds.max(0.0));
        let spacing = seconds(timing.wave_spacing_seconds);
        let plan = Arc::new(WavePlan {
            map: map_name.to_string(),
            zones: ordered_zones(zones, &settings.priority_ranks),
            positions: positions.clone(),
            spawner: self.spawner.clone(),
        });

        let initial = match self.schedule_initial(generation, plan, initial_delay, spacing, rng) {
            Ok(task) => task,
            Err(e) => {
                warn!(map = %map_name, "Hot zones inactive: {}", e);
                return 0;
            }
        };
        self.sessions.insert(
            map_name.to_string(),
            MapSession {
                generation,
                phase: SessionPhase::Initialized,
                positions: positions.clone(),
                tasks: vec![initial],
            },
        );
        self.ended.remove(map_name);

        info!(
            map = %map_name,
            "Hot zones initialized: {} position(s) in {} zone(s), first wave in {:.1}s",
            positions.len(),
            zones.len(),
            initial_delay.as_secs_f64()
        );
        positions.len()
    }

    fn schedule_initial(
        &self,
        generation: u64,
        plan: Arc<WavePlan>,
        delay: Duration,
        spacing: Duration,
        mut rng: StdRng,
    ) -> DirectorResult<TaskHandle> {
        let sessions = self.sessions.clone();
        let task_name = format!("{}:initial-spawn", plan.map);

        spawn_delayed(task_name, delay, move || async move {
            let emitted = plan.emit(0, &mut rng);
            debug!(map = %plan.map, "Initial hot zone spawn emitted {} wave(s)", emitted);

            let periodic_plan = plan.clone();
            let mut wave = 0;
            let periodic = spawn_periodic(format!("{}:waves", plan.map), spacing, move || {
                wave += 1;
                periodic_plan.emit(wave, &mut rng);
                async {}
            });
            let periodic = match periodic {
                Ok(task) => task,
                Err(e) => {
                    warn!(map = %plan.map, "Periodic hot zone waves not scheduled: {}", e);
                    return;
                }
            };

            // A session replaced or cleaned up in the meantime drops the
            // handle here, which aborts the timer.
            if let Some(mut session) = sessions.get_mut(&plan.map) {
                if session.generation == generation && session.phase == SessionPhase::Initialized {
                    session.phase = SessionPhase::WaveActive;
                    session.tasks.push(periodic);
                }
            }
        })
    }

    /// Cancels the map's timers and removes its session, positions included.
    ///
    /// # Returns
    ///
    /// Whether a live session existed.
    pub fn cleanup_map(&self, map_name: &str) -> bool {
        let Some((_, mut session)) = self.sessions.remove(map_name) else {
            return false;
        };
        session.cancel_tasks();
        self.ended.insert(map_name.to_string());
        info!(map = %map_name, "Hot zone session cleaned up");
        true
    }

    /// Cleans up every live session.
    pub fn shutdown(&self) {
        let maps: Vec<String> = self.sessions.iter().map(|entry| entry.key().clone()).collect();
        let cleaned = maps.iter().filter(|map| self.cleanup_map(map)).count();
        if cleaned > 0 {
            warn!("Cleaned up {} hot zone session(s) left open at shutdown", cleaned);
        }
    }

    pub fn phase(&self, map_name: &str) -> SessionPhase {
        match self.sessions.get(map_name) {
            Some(session) => session.phase,
            None if self.ended.contains(map_name) => SessionPhase::CleanedUp,
            None => SessionPhase::Uninitialized,
        }
    }

    /// Positions of the live session for `map_name`, empty once cleaned up.
    pub fn get_spawn_positions(&self, map_name: &str) -> Vec<SpawnPosition> {
        self.sessions
            .get(map_name)
            .map(|session| session.positions.as_ref().clone())
            .unwrap_or_default()
    }

    /// Maps with a live session.
    pub fn active_maps(&self) -> Vec<String> {
        let mut maps: Vec<String> = self.sessions.iter().map(|entry| entry.key().clone()).collect();
        maps.sort();
        maps
    }

    /// Number of timers currently owned by the map's session.
    pub fn scheduled_tasks(&self, map_name: &str) -> usize {
        self.sessions
            .get(map_name)
            .map(|session| session.tasks.iter().filter(|task| !task.is_finished()).count())
            .unwrap_or(0)
    }
}

impl Drop for HotZoneManager {
    fn drop(&mut self) {
        for mut entry in self.sessions.iter_mut() {
            entry.cancel_tasks();
        }
    }
}

fn ordered_zones(zones: &BTreeMap<String, HotZone>, ranks: &PriorityRanks) -> Vec<(String, HotZone)> {
    let mut ordered: Vec<(String, HotZone)> = zones
        .iter()
        .filter(|(_, zone)| zone.enabled)
        .map(|(name, zone)| (name.clone(), zone.clone()))
        .collect();
    ordered.sort_by_key(|(_, zone)| ranks.rank(zone.priority));
    ordered
}

/// Non-negative duration from a configured number of seconds.
fn seconds(value: f64) -> Duration {
    if value.is_finite() && value > 0.0 {
        Duration::try_from_secs_f64(value).unwrap_or(Duration::MAX)
    } else {
        Duration::ZERO
    }
}
