//! # Raid Director
//!
//! Bot population control for raid-based game servers, loaded by the host as
//! a mod and driven through two lifecycle callbacks.
//!
//! ## Components
//!
//! - **Configuration** ([`ConfigManager`]): the persisted JSON tree with
//!   compiled-in defaults, self-healing on load and validated bounds
//! - **Spawn reconciliation** ([`SpawnManager`]): writes gear restrictions,
//!   difficulty and behavior onto the host's bot type records and owns the
//!   effective spawn count rule
//! - **Hot zones** ([`HotZoneManager`]): spaced spawn positions inside
//!   priority-ranked circular zones plus the wave timers that use them
//! - **Peer integration** ([`integration`]): capability probing for optional
//!   peer mods and decorators routing their spawn calls through the director
//! - **Vegetation** ([`VegetationGuard`]): fire restriction for bots shooting
//!   from cover
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use raid_director::{DirectorPlugin, HostContext, HostDatabase, ModLifecycle};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let database = Arc::new(HostDatabase::from_snapshot(&serde_json::json!({
//!         "botTypes": { "assault": {}, "bosskilla": {} },
//!         "locations": { "bigmap": {} }
//!     })));
//!     let context = HostContext::new(database);
//!
//!     let mut plugin = DirectorPlugin::default();
//!     plugin.pre_load(&context).await?;
//!     plugin.post_db_load(&context).await?;
//!
//!     let spawn = plugin.spawn_manager().expect("database loaded");
//!     assert_eq!(spawn.calculate_custom_bot_count("bosskilla", "bigmap", 5), 1);
//!
//!     plugin.start_raid("bigmap");
//!     plugin.end_raid("bigmap");
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod host;
pub mod hot_zones;
pub mod integration;
pub mod plugin;
pub mod spawn;
pub mod tasks;
pub mod vegetation;

pub use config::{ConfigManager, ConfigPatch, DirectorConfig};
pub use error::{DirectorError, DirectorResult, PluginFailure};
pub use host::{ActiveBot, BotActivity, BotRecord, HostContext, HostDatabase, ModLifecycle, RecordTable, WaveSpawner};
pub use hot_zones::{HotZoneManager, HotZoneWave, SessionPhase, SpawnPosition};
pub use plugin::{DirectorPlugin, PLUGIN_NAME, PLUGIN_VERSION};
pub use spawn::{ApplyReport, SpawnManager, SpawnStatistics};
pub use tasks::TaskHandle;
pub use vegetation::VegetationGuard;
