//! Named service container with after-resolution decoration, and the wave
//! adjuster decorator installed through it.

use super::peer::SpawnDelegate;
use crate::config::ConfigManager;
use crate::error::{DirectorError, DirectorResult};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::sync::Arc;
use tracing::{debug, info};

/// Service key of the host's wave adjustment routine.
pub const WAVE_ADJUSTER_SERVICE: &str = "BotWaveGenerator";

/// Bot type used for waves the director adds to an empty list.
pub const DEFAULT_WAVE_BOT_TYPE: &str = "assault";

/// Named services registered by the host.
///
/// A service is stored as `Arc<T>` under its name and resolved by name and
/// type. [`decorate`](Self::decorate) swaps a registered service for a
/// wrapper around it; later resolutions see the wrapper.
#[derive(Default)]
pub struct ServiceContainer {
    services: DashMap<String, Box<dyn Any + Send + Sync>>,
}

impl ServiceContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<T>(&self, name: impl Into<String>, service: Arc<T>)
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.services.insert(name.into(), Box::new(service));
    }

    /// The service under `name`, if one of type `T` is registered.
    pub fn resolve<T>(&self, name: &str) -> Option<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.services
            .get(name)
            .and_then(|entry| entry.value().downcast_ref::<Arc<T>>().cloned())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.services.contains_key(name)
    }

    /// Replaces the service under `name` with `wrap(original)`.
    ///
    /// Fails with [`DirectorError::HookUnavailable`] when nothing of type `T`
    /// is registered under that name.
    pub fn decorate<T, F>(&self, name: &str, wrap: F) -> DirectorResult<()>
    where
        T: ?Sized + Send + Sync + 'static,
        F: FnOnce(Arc<T>) -> Arc<T>,
    {
        let mut entry = self
            .services
            .get_mut(name)
            .ok_or_else(|| DirectorError::HookUnavailable(format!("service `{name}` is not registered")))?;
        let original = entry
            .value()
            .downcast_ref::<Arc<T>>()
            .cloned()
            .ok_or_else(|| DirectorError::HookUnavailable(format!("service `{name}` has an unexpected type")))?;
        *entry.value_mut() = Box::new(wrap(original));
        debug!("Decorated service {}", name);
        Ok(())
    }
}

impl std::fmt::Debug for ServiceContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<String> = self.services.iter().map(|entry| entry.key().clone()).collect();
        names.sort();
        f.debug_struct("ServiceContainer").field("services", &names).finish()
    }
}

/// One scheduled wave of a location's bot population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaveEntry {
    pub bot_type: String,
    pub time_seconds: u64,
    pub slots: u32,
}

/// The host's wave adjustment routine.
pub trait WaveAdjuster: Send + Sync {
    fn adjust_waves(&self, location: &str, waves: &mut Vec<WaveEntry>);
}

/// Runs the host's adjuster, then applies the configured wave settings.
///
/// With waves enabled the list is resized to `waveCount`, entry `i` is timed
/// at `i * waveDelaySeconds` and gets `botsPerWave` slots clamped by the
/// effective count rule. With `dynamicScaling` the running slot total is
/// additionally capped at the map's `maxBots`.
pub struct DirectedWaveAdjuster {
    inner: Arc<dyn WaveAdjuster>,
    config: Arc<ConfigManager>,
    delegate: Arc<dyn SpawnDelegate>,
}

impl DirectedWaveAdjuster {
    pub fn new(inner: Arc<dyn WaveAdjuster>, config: Arc<ConfigManager>, delegate: Arc<dyn SpawnDelegate>) -> Self {
        Self {
            inner,
            config,
            delegate,
        }
    }
}

impl WaveAdjuster for DirectedWaveAdjuster {
    fn adjust_waves(&self, location: &str, waves: &mut Vec<WaveEntry>) {
        self.inner.adjust_waves(location, waves);

        let config = self.config.get_config();
        let settings = &config.waves;
        if !settings.enabled {
            return;
        }

        let count = settings.wave_count as usize;
        if waves.len() > count {
            waves.truncate(count);
        }
        while waves.len() < count {
            let template = waves.last().cloned().unwrap_or_else(|| WaveEntry {
                bot_type: DEFAULT_WAVE_BOT_TYPE.to_string(),
                time_seconds: 0,
                slots: 0,
            });
            waves.push(template);
        }

        let mut budget = settings
            .dynamic_scaling
            .then(|| self.config.get_map_config(location).max_bots);

        for (index, wave) in waves.iter_mut().enumerate() {
            wave.time_seconds = (index as u64).saturating_mul(settings.wave_delay_seconds);
            let mut slots = self
                .delegate
                .compute_effective_count(&wave.bot_type, location, settings.bots_per_wave);
            if let Some(remaining) = budget.as_mut() {
                slots = slots.min(*remaining);
                *remaining -= slots;
            }
            wave.slots = slots;
        }

        info!(
            location = %location,
            "Adjusted {} wave(s), {} slot(s) total",
            waves.len(),
            waves.iter().map(|w| w.slots).sum::<u32>()
        );
    }
}
