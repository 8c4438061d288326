//! # Host Collaborator Interfaces
//!
//! The director never owns game data. The host server hands it a
//! [`HostContext`] during its two lifecycle callbacks and the director mutates
//! the host's tables in place.
//!
//! ## Lifecycle
//!
//! 1. **Pre-load** - before any host data exists; the director loads its
//!    configuration here
//! 2. **Post-database-load** - the host tables are ready; bot types and
//!    locations are patched and hooks installed
//! 3. **Shutdown** - map sessions are torn down
//!
//! Records are free-form JSON objects: the director requires keyed lookup and
//! field mutation only, never a fixed schema.

use crate::error::PluginFailure;
use crate::hot_zones::HotZoneWave;
use crate::integration::{CapabilityRegistry, ServiceContainer};
use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use std::sync::Arc;

/// A host-owned record, e.g. one bot type template.
pub type BotRecord = serde_json::Map<String, Value>;

/// Keyed table of host records shared between the host and the director.
#[derive(Debug, Default)]
pub struct RecordTable {
    records: DashMap<String, Value>,
}

impl RecordTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, id: impl Into<String>, record: Value) {
        self.records.insert(id.into(), record);
    }

    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    /// Copy of the record stored under `id`.
    pub fn get(&self, id: &str) -> Option<Value> {
        self.records.get(id).map(|entry| entry.value().clone())
    }

    /// Runs `f` against the record under `id` while holding its entry lock.
    ///
    /// Returns `None` when the host has no such record.
    pub fn with_record_mut<R>(&self, id: &str, f: impl FnOnce(&mut Value) -> R) -> Option<R> {
        self.records.get_mut(id).map(|mut entry| f(entry.value_mut()))
    }

    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.records.iter().map(|entry| entry.key().clone()).collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// The host's database: bot type templates and location bases.
#[derive(Debug, Default)]
pub struct HostDatabase {
    pub bot_types: RecordTable,
    pub locations: RecordTable,
}

impl HostDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a database from a `{ "botTypes": {..}, "locations": {..} }` dump.
    /// Either table may be missing.
    pub fn from_snapshot(snapshot: &Value) -> Self {
        let database = Self::new();
        if let Some(bot_types) = snapshot.get("botTypes").and_then(Value::as_object) {
            for (id, record) in bot_types {
                database.bot_types.insert(id.clone(), record.clone());
            }
        }
        if let Some(locations) = snapshot.get("locations").and_then(Value::as_object) {
            for (id, record) in locations {
                database.locations.insert(id.clone(), record.clone());
            }
        }
        database
    }
}

/// Receives hot zone waves; the host turns them into actual bot spawns.
pub trait WaveSpawner: Send + Sync {
    fn spawn_wave(&self, wave: HotZoneWave);
}

/// A bot currently alive in a raid, as reported by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveBot {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub shooting: bool,
}

/// Live bot state exposed by the host for the vegetation checks.
pub trait BotActivity: Send + Sync {
    fn active_bots(&self, map: &str) -> Vec<ActiveBot>;
    fn set_fire_restricted(&self, bot_id: &str, restricted: bool);
}

/// Everything the host exposes to the director.
#[derive(Clone)]
pub struct HostContext {
    pub database: Arc<HostDatabase>,
    pub registry: Arc<CapabilityRegistry>,
    pub services: Arc<ServiceContainer>,
    pub wave_spawner: Option<Arc<dyn WaveSpawner>>,
    pub bot_activity: Option<Arc<dyn BotActivity>>,
}

impl HostContext {
    pub fn new(database: Arc<HostDatabase>) -> Self {
        Self {
            database,
            registry: Arc::new(CapabilityRegistry::new()),
            services: Arc::new(ServiceContainer::new()),
            wave_spawner: None,
            bot_activity: None,
        }
    }

    pub fn with_registry(mut self, registry: Arc<CapabilityRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_services(mut self, services: Arc<ServiceContainer>) -> Self {
        self.services = services;
        self
    }

    pub fn with_wave_spawner(mut self, spawner: Arc<dyn WaveSpawner>) -> Self {
        self.wave_spawner = Some(spawner);
        self
    }

    pub fn with_bot_activity(mut self, activity: Arc<dyn BotActivity>) -> Self {
        self.bot_activity = Some(activity);
        self
    }
}

impl std::fmt::Debug for HostContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostContext")
            .field("bot_types", &self.database.bot_types.len())
            .field("locations", &self.database.locations.len())
            .field("wave_spawner", &self.wave_spawner.is_some())
            .field("bot_activity", &self.bot_activity.is_some())
            .finish()
    }
}

/// Lifecycle callbacks a host drives on a loaded mod.
///
/// Implementations degrade instead of failing wherever they can; a returned
/// error is reserved for states where the mod cannot operate at all.
#[async_trait]
pub trait ModLifecycle: Send + Sync {
    fn name(&self) -> &str;

    fn version(&self) -> &str;

    /// Called before the host loads any data.
    async fn pre_load(&mut self, context: &HostContext) -> Result<(), PluginFailure>;

    /// Called once the host database is ready.
    async fn post_db_load(&mut self, context: &HostContext) -> Result<(), PluginFailure>;

    async fn on_shutdown(&mut self, _context: &HostContext) -> Result<(), PluginFailure> {
        Ok(())
    }
}
