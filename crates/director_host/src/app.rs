//! Main application logic and lifecycle management.
//!
//! The `Application` owns the host side: the database built from the
//! snapshot, the collaborator implementations and the loaded director. It
//! drives the director through its lifecycle and a single raid session.

use crate::collaborators::{load_snapshot, LocationWaveAdjuster, LoggingWaveSpawner, SnapshotBotActivity};
use crate::config::HostConfig;
use crate::error::HostResult;
use crate::logging::display_banner;
use crate::signals::{wait_for_shutdown_signal, wait_for_shutdown_signal_silent};
use raid_director::integration::{ServiceContainer, WaveAdjuster, WaveEntry, WAVE_ADJUSTER_SERVICE};
use raid_director::{DirectorPlugin, HostContext, HostDatabase, ModLifecycle, TaskHandle};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// What the director set up for the running map.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub map: String,
    /// Hot zone positions placed for the initial spawn
    pub positions: usize,
    /// The map's wave list after the host routine and the director ran
    pub waves: Vec<WaveEntry>,
}

pub struct Application {
    config: HostConfig,
    context: HostContext,
    plugin: DirectorPlugin,
    spawner: Arc<LoggingWaveSpawner>,
    activity: Arc<SnapshotBotActivity>,
    session: Option<SessionSummary>,
}

impl Application {
    /// Builds the host tables from the snapshot and prepares the director.
    pub async fn new(config: HostConfig) -> HostResult<Self> {
        config.validate()?;

        info!("📂 Loading host data from {}", config.data_path().display());
        let snapshot = load_snapshot(&config.data_path()).await?;
        let database = Arc::new(HostDatabase::from_snapshot(&snapshot));
        let activity = Arc::new(SnapshotBotActivity::from_snapshot(&snapshot));
        let spawner = Arc::new(LoggingWaveSpawner::new());

        let services = Arc::new(ServiceContainer::new());
        services.register::<dyn WaveAdjuster>(WAVE_ADJUSTER_SERVICE, Arc::new(LocationWaveAdjuster::new(database.clone())));

        let context = HostContext::new(database)
            .with_services(services)
            .with_wave_spawner(spawner.clone())
            .with_bot_activity(activity.clone());

        let plugin = DirectorPlugin::new(config.plugin_config_path());

        Ok(Self {
            config,
            context,
            plugin,
            spawner,
            activity,
            session: None,
        })
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    pub fn context(&self) -> &HostContext {
        &self.context
    }

    pub fn plugin(&self) -> &DirectorPlugin {
        &self.plugin
    }

    pub fn spawner(&self) -> &Arc<LoggingWaveSpawner> {
        &self.spawner
    }

    pub fn activity(&self) -> &Arc<SnapshotBotActivity> {
        &self.activity
    }

    /// Runs both load callbacks and starts the configured map.
    pub async fn start(&mut self) -> HostResult<SessionSummary> {
        info!("🔌 Loading {} v{}", self.plugin.name(), self.plugin.version());
        self.plugin.pre_load(&self.context).await?;
        self.plugin.post_db_load(&self.context).await?;

        let map = self.config.director.map.clone();
        let positions = self.plugin.start_raid(&map);

        let mut waves = Vec::new();
        if let Some(adjuster) = self.context.services.resolve::<dyn WaveAdjuster>(WAVE_ADJUSTER_SERVICE) {
            adjuster.adjust_waves(&map, &mut waves);
        }

        info!(
            map = %map,
            "🗺️ Raid started: {} hot zone position(s), {} wave(s), {} bot(s) tracked",
            positions,
            waves.len(),
            self.activity.bot_count(&map)
        );

        let summary = SessionSummary { map, positions, waves };
        self.session = Some(summary.clone());
        Ok(summary)
    }

    /// Ends the running map and shuts the director down.
    pub async fn stop(&mut self) -> HostResult<()> {
        if let Some(session) = self.session.take() {
            self.plugin.end_raid(&session.map);
            info!(map = %session.map, "🏁 Raid ended");
        }
        self.plugin.on_shutdown(&self.context).await?;
        Ok(())
    }

    /// Starts the session, waits for a shutdown signal, then tears down.
    pub async fn run(mut self) -> HostResult<()> {
        display_banner();
        self.log_configuration_summary();

        self.start().await?;

        let monitoring = self.spawn_monitoring();

        info!("✅ Raid director host is running");
        info!("🛑 Press Ctrl+C to gracefully shutdown");

        wait_for_shutdown_signal().await?;

        // A second signal during teardown exits immediately.
        tokio::spawn(async move {
            if let Err(e) = wait_for_shutdown_signal_silent().await {
                error!("Failed to set up merciless shutdown signal handler: {e}");
                return;
            }
            warn!("Shutdown handler received again! I'll make this quick.");
            std::process::exit(1);
        });

        drop(monitoring);
        self.stop().await?;

        info!("📊 Final Statistics:");
        info!("  - Hot zone waves dispatched: {}", self.spawner.waves_dispatched());
        info!("  - Spawn positions dispatched: {}", self.spawner.positions_dispatched());
        info!("✅ Raid director host shutdown complete");
        Ok(())
    }

    fn spawn_monitoring(&self) -> Option<TaskHandle> {
        let secs = self.config.monitoring.interval_secs;
        if secs == 0 {
            return None;
        }
        let spawner = self.spawner.clone();
        let map = self.config.director.map.clone();
        let mut last_waves = 0u64;
        let monitoring = raid_director::tasks::spawn_periodic(
            "host-monitoring",
            Duration::from_secs(secs),
            move || {
                let waves = spawner.waves_dispatched();
                info!(
                    map = %map,
                    "📊 Session health - {} wave(s) this period, {} total",
                    waves - last_waves,
                    waves
                );
                last_waves = waves;
                async {}
            },
        );
        match monitoring {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!("Session health reports disabled: {}", e);
                None
            }
        }
    }

    fn log_configuration_summary(&self) {
        info!("📋 Configuration Summary:");
        info!("  🗺️ Map: {}", self.config.director.map);
        info!("  ⚙️ Director config: {}", self.config.director.config_path);
        info!("  📂 Host data: {}", self.config.director.data_path);
        info!(
            "  🗄️ Tables: {} bot type(s), {} location(s)",
            self.context.database.bot_types.len(),
            self.context.database.locations.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use raid_director::integration::native_library_name;
    use serde_json::json;
    use tempfile::TempDir;

    async fn application(dir: &TempDir, snapshot: serde_json::Value) -> Application {
        let data_path = dir.path().join("snapshot.json");
        tokio::fs::write(&data_path, snapshot.to_string()).await.unwrap();

        let mut config = HostConfig::default();
        config.director.config_path = dir.path().join("config").join("config.json").to_string_lossy().to_string();
        config.director.data_path = data_path.to_string_lossy().to_string();
        config.monitoring.interval_secs = 0;

        Application::new(config).await.unwrap()
    }

    #[tokio::test]
    async fn test_start_and_stop() {
        let dir = TempDir::new().unwrap();
        let mut app = application(
            &dir,
            json!({
                "botTypes": { "assault": {}, "bosskilla": {} },
                "locations": { "bigmap": { "waves": [{ "botType": "assault", "timeSeconds": 0, "slots": 4 }] } },
                "activeBots": { "bigmap": [{ "id": "b1", "x": 0.0, "y": 0.0 }] }
            }),
        )
        .await;

        let summary = app.start().await.unwrap();

        assert_eq!(summary.map, "bigmap");
        assert_eq!(summary.positions, 0);
        assert_eq!(summary.waves.len(), 1);
        assert!(app.plugin().spawn_manager().is_some());
        assert!(app.context().database.bot_types.get("assault").unwrap().get("difficulty").is_some());
        assert!(app.plugin().config().path().exists());
        assert_eq!(app.activity().bot_count("bigmap"), 1);

        app.stop().await.unwrap();
        assert!(app.plugin().hot_zones().is_none());
    }

    #[tokio::test]
    async fn test_missing_snapshot_still_loads() {
        let dir = TempDir::new().unwrap();
        let mut config = HostConfig::default();
        config.director.config_path = dir.path().join("config.json").to_string_lossy().to_string();
        config.director.data_path = dir.path().join("absent.json").to_string_lossy().to_string();

        let mut app = Application::new(config).await.unwrap();
        let summary = app.start().await.unwrap();

        assert!(app.context().database.bot_types.is_empty());
        assert!(summary.waves.is_empty());
        app.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_peer_plugins_come_from_director_config() {
        let dir = TempDir::new().unwrap();
        let plugins = dir.path().join("client_plugins");
        std::fs::create_dir_all(&plugins).unwrap();
        std::fs::write(plugins.join(native_library_name("SAIN")), b"").unwrap();

        let config_dir = dir.path().join("config");
        std::fs::create_dir_all(&config_dir).unwrap();
        let director_config = json!({ "integrations": { "pluginDirectories": [plugins.to_string_lossy()] } });
        std::fs::write(config_dir.join("config.json"), director_config.to_string()).unwrap();

        let mut app = application(&dir, json!({ "botTypes": { "assault": {} } })).await;
        app.start().await.unwrap();

        assert!(app.plugin().peers().bot_behavior);
        assert!(!app.plugin().peers().multiplayer);
        app.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_invalid_config_is_rejected() {
        let mut config = HostConfig::default();
        config.director.map.clear();
        assert!(Application::new(config).await.is_err());
    }
}
