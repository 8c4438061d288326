//! The mod object a host loads and drives through its lifecycle.

use crate::config::{ConfigManager, DEFAULT_CONFIG_PATH};
use crate::error::PluginFailure;
use crate::host::{HostContext, ModLifecycle};
use crate::hot_zones::HotZoneManager;
use crate::integration::{
    detect_peers, install_spawn_shims, register_native_plugins, DirectedWaveAdjuster, PeerAvailability,
    PeerDescriptor, WaveAdjuster, WAVE_ADJUSTER_SERVICE,
};
use crate::spawn::SpawnManager;
use crate::vegetation::VegetationGuard;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const PLUGIN_NAME: &str = "raid_director";
pub const PLUGIN_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Ties configuration, spawn reconciliation, hot zones and peer shims to the
/// host lifecycle.
///
/// No callback fails the host: every optional piece that cannot be set up is
/// logged and left inactive.
pub struct DirectorPlugin {
    config: Arc<ConfigManager>,
    spawn: Option<Arc<SpawnManager>>,
    hot_zones: Option<HotZoneManager>,
    vegetation: Option<VegetationGuard>,
    config_loaded: bool,
    waves_hooked: bool,
}

impl DirectorPlugin {
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config: Arc::new(ConfigManager::new(config_path)),
            spawn: None,
            hot_zones: None,
            vegetation: None,
            config_loaded: false,
            waves_hooked: false,
        }
    }

    pub fn config(&self) -> &Arc<ConfigManager> {
        &self.config
    }

    /// Available once the host database has been loaded.
    pub fn spawn_manager(&self) -> Option<&Arc<SpawnManager>> {
        self.spawn.as_ref()
    }

    pub fn hot_zones(&self) -> Option<&HotZoneManager> {
        self.hot_zones.as_ref()
    }

    pub fn vegetation(&self) -> Option<&VegetationGuard> {
        self.vegetation.as_ref()
    }

    pub fn peers(&self) -> PeerAvailability {
        self.spawn
            .as_ref()
            .map(|spawn| spawn.peer_availability())
            .unwrap_or_default()
    }

    /// Starts the per-map layers for a raid on `map_name`.
    ///
    /// # Returns
    ///
    /// The number of hot zone positions placed. Timers need a tokio runtime
    /// on the calling thread; without one the layers stay inactive and `0`
    /// is returned.
    pub fn start_raid(&self, map_name: &str) -> usize {
        let placed = self
            .hot_zones
            .as_ref()
            .map(|hot_zones| hot_zones.initialize_hot_zones(map_name))
            .unwrap_or(0);
        if let Some(vegetation) = self.vegetation.as_ref() {
            vegetation.start(map_name);
        }
        placed
    }

    /// Tears down every per-map timer and cache of `map_name`.
    pub fn end_raid(&self, map_name: &str) {
        if let Some(hot_zones) = self.hot_zones.as_ref() {
            hot_zones.cleanup_map(map_name);
        }
        if let Some(vegetation) = self.vegetation.as_ref() {
            vegetation.stop(map_name);
        }
    }

    fn hook_wave_adjuster(&mut self, context: &HostContext, spawn: &Arc<SpawnManager>) {
        if self.waves_hooked {
            return;
        }
        let config = self.config.clone();
        let delegate = spawn.clone();
        let result = context
            .services
            .decorate::<dyn WaveAdjuster, _>(WAVE_ADJUSTER_SERVICE, move |inner| -> Arc<dyn WaveAdjuster> {
                Arc::new(DirectedWaveAdjuster::new(inner, config, delegate))
            });
        match result {
            Ok(()) => {
                self.waves_hooked = true;
                info!("🌊 RaidDirector: Wave adjuster hooked");
            }
            Err(e) => warn!("RaidDirector: Wave settings inactive: {}", e),
        }
    }
}

impl Default for DirectorPlugin {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIG_PATH)
    }
}

#[async_trait]
impl ModLifecycle for DirectorPlugin {
    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    fn version(&self) -> &str {
        PLUGIN_VERSION
    }

    async fn pre_load(&mut self, _context: &HostContext) -> Result<(), PluginFailure> {
        info!("🎯 RaidDirector: Loading configuration from {}", self.config.path().display());
        let config = self.config.initialize().await;
        debug!(
            "RaidDirector: {} map(s), {} bot type(s) configured",
            config.maps.len(),
            config.bot_types.len()
        );
        self.config_loaded = true;
        Ok(())
    }

    async fn post_db_load(&mut self, context: &HostContext) -> Result<(), PluginFailure> {
        if !self.config_loaded {
            return Err(PluginFailure::InitializationFailed(
                "database loaded before the configuration; pre_load was not called".to_string(),
            ));
        }
        info!("🎯 RaidDirector: Applying spawn configuration");
        let config = self.config.get_config();

        let spawn = Arc::new(SpawnManager::new(self.config.clone(), context.database.clone()));

        let found = register_native_plugins(&context.registry, &config.integrations.plugin_directories);
        if found > 0 {
            debug!("RaidDirector: {} native peer plugin(s) found on disk", found);
        }
        spawn.record_peer_availability(detect_peers(&context.registry));

        if PeerDescriptor::gear_progression().detect(&context.registry).is_some() {
            info!("RaidDirector: External progression system loaded, built-in gear progression off");
            self.config.set_gear_progression_enabled(false);
        }

        spawn.apply_custom_spawn_config();
        spawn.apply_gear_progression();

        let shims = install_spawn_shims(&context.registry, spawn.clone());
        if shims > 0 {
            info!("🔌 RaidDirector: {} peer spawn shim(s) installed", shims);
        }
        self.hook_wave_adjuster(context, &spawn);

        self.hot_zones = Some(HotZoneManager::new(self.config.clone(), context.wave_spawner.clone()));
        self.vegetation = context
            .bot_activity
            .clone()
            .map(|activity| VegetationGuard::new(self.config.clone(), activity));

        let stats = spawn.get_spawn_statistics();
        match serde_json::to_string(&stats) {
            Ok(json) => debug!("RaidDirector: Spawn statistics {}", json),
            Err(e) => warn!("RaidDirector: Could not serialize spawn statistics: {}", e),
        }
        info!(
            "✅ RaidDirector: Ready ({} maps, {} bot types, peers: behavior={}, multiplayer={})",
            stats.maps.len(),
            stats.bot_types.len(),
            stats.peers.bot_behavior,
            stats.peers.multiplayer
        );

        self.spawn = Some(spawn);
        Ok(())
    }

    async fn on_shutdown(&mut self, _context: &HostContext) -> Result<(), PluginFailure> {
        if let Some(hot_zones) = self.hot_zones.take() {
            hot_zones.shutdown();
        }
        // Dropping the guard stops its checks and lifts restrictions.
        self.vegetation = None;
        info!("🛑 RaidDirector: Shut down");
        Ok(())
    }
}
