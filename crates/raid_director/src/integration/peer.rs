//! Detection of optional peer mods and the decorator that routes their spawn
//! entry points through the director's rules.

use super::discovery::discover_native_plugins;
use super::registry::{Capability, CapabilityRegistry, Probe};
use crate::error::DirectorResult;
use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A bot owned by a peer mod.
#[derive(Debug, Clone, PartialEq)]
pub struct PeerBot {
    pub id: String,
    pub bot_type: String,
    /// The peer's own record for this bot
    pub data: Value,
}

impl PeerBot {
    pub fn new(id: impl Into<String>, bot_type: impl Into<String>, data: Value) -> Self {
        Self {
            id: id.into(),
            bot_type: bot_type.into(),
            data,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnRequest {
    pub bot_type: String,
    pub location: String,
    pub count: u32,
}

/// Spawn entry points a peer mod exposes.
pub trait PeerSpawnService: Send + Sync {
    fn active_bots(&self) -> Vec<PeerBot>;

    /// Spawns bots and returns how many the peer actually created.
    fn spawn_bots(&self, request: SpawnRequest) -> DirectorResult<u32>;

    /// True for services already wrapped by the director.
    fn is_directed(&self) -> bool {
        false
    }
}

/// The director's rules as seen by a peer decorator.
pub trait SpawnDelegate: Send + Sync {
    fn compute_effective_count(&self, bot_type: &str, location: &str, requested_count: u32) -> u32;

    fn apply_modifiers(&self, bot: &mut PeerBot) -> DirectorResult<()>;
}

/// Wraps a peer's spawn service: spawn counts go through the effective count
/// rule, returned bots get the configured gear and behavior.
pub struct DirectedSpawnService {
    peer: String,
    inner: Arc<dyn PeerSpawnService>,
    delegate: Arc<dyn SpawnDelegate>,
}

impl DirectedSpawnService {
    pub fn new(peer: impl Into<String>, inner: Arc<dyn PeerSpawnService>, delegate: Arc<dyn SpawnDelegate>) -> Self {
        Self {
            peer: peer.into(),
            inner,
            delegate,
        }
    }
}

impl PeerSpawnService for DirectedSpawnService {
    fn active_bots(&self) -> Vec<PeerBot> {
        let mut bots = self.inner.active_bots();
        for bot in bots.iter_mut() {
            if let Err(e) = self.delegate.apply_modifiers(bot) {
                warn!(peer = %self.peer, bot = %bot.id, "Could not apply modifiers: {}", e);
            }
        }
        bots
    }

    fn spawn_bots(&self, mut request: SpawnRequest) -> DirectorResult<u32> {
        let effective = self
            .delegate
            .compute_effective_count(&request.bot_type, &request.location, request.count);
        if effective != request.count {
            debug!(
                peer = %self.peer,
                "Adjusted {} spawn on {} from {} to {}",
                request.bot_type, request.location, request.count, effective
            );
        }
        request.count = effective;
        self.inner.spawn_bots(request)
    }

    fn is_directed(&self) -> bool {
        true
    }
}

/// Where to look for one peer mod, in probe order.
#[derive(Debug, Clone)]
pub struct PeerDescriptor {
    pub name: &'static str,
    pub native_plugin: &'static str,
    pub probes: Vec<Probe>,
}

impl PeerDescriptor {
    /// The bot behavior enhancement mod.
    pub fn bot_behavior() -> Self {
        Self {
            name: "SAIN",
            native_plugin: "SAIN",
            probes: vec![
                Probe::Module("sain".to_string()),
                Probe::Global("SAIN".to_string()),
                Probe::Global("sainBotController".to_string()),
                Probe::Service("SAINBotService".to_string()),
                Probe::NativePlugin("SAIN".to_string()),
            ],
        }
    }

    /// The multiplayer compatibility mod.
    pub fn multiplayer() -> Self {
        Self {
            name: "Fika",
            native_plugin: "Fika.Core",
            probes: vec![
                Probe::Module("fika-server".to_string()),
                Probe::Global("Fika".to_string()),
                Probe::Global("fikaConfig".to_string()),
                Probe::Service("FikaMatchService".to_string()),
                Probe::NativePlugin("Fika.Core".to_string()),
            ],
        }
    }

    /// An external gear progression system; its presence switches off the
    /// built-in progression.
    pub fn gear_progression() -> Self {
        Self {
            name: "Progression",
            native_plugin: "Progression",
            probes: vec![
                Probe::Module("progression".to_string()),
                Probe::Global("ProgressionSystem".to_string()),
                Probe::Service("ProgressionService".to_string()),
            ],
        }
    }

    /// Peers whose spawn entry points the director routes.
    pub fn all() -> Vec<Self> {
        vec![Self::bot_behavior(), Self::multiplayer()]
    }

    /// First probe that resolves, with its capability.
    pub fn detect(&self, registry: &CapabilityRegistry) -> Option<(Probe, Capability)> {
        self.probes
            .iter()
            .find_map(|probe| registry.lookup(probe).map(|capability| (probe.clone(), capability)))
    }
}

/// Which peers were found at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerAvailability {
    pub bot_behavior: bool,
    pub multiplayer: bool,
}

/// Registers each peer native plugin found under `directories` as present.
/// Probes already registered by the host are left alone.
pub fn register_native_plugins<P: AsRef<Path>>(registry: &CapabilityRegistry, directories: &[P]) -> usize {
    let names: Vec<&str> = PeerDescriptor::all().iter().map(|peer| peer.native_plugin).collect();
    let mut registered = 0;
    for (name, path) in discover_native_plugins(directories, &names) {
        let probe = Probe::NativePlugin(name);
        if !registry.contains(&probe) {
            debug!("Registering native plugin {} from {}", probe, path.display());
            registry.register(probe, Capability::Present);
            registered += 1;
        }
    }
    registered
}

/// Probes both peers and reports which are available.
pub fn detect_peers(registry: &CapabilityRegistry) -> PeerAvailability {
    let found = |peer: PeerDescriptor| match peer.detect(registry) {
        Some((probe, _)) => {
            info!("Peer mod {} detected via {}", peer.name, probe);
            true
        }
        None => {
            debug!("Peer mod {} not present", peer.name);
            false
        }
    };
    PeerAvailability {
        bot_behavior: found(PeerDescriptor::bot_behavior()),
        multiplayer: found(PeerDescriptor::multiplayer()),
    }
}

/// Wraps the spawn service of every detected peer that exposes one and
/// registers the wrapper under the same probe. Returns the number of
/// services wrapped.
///
/// Peers found without a spawn service, and services already wrapped, are
/// left as they are.
pub fn install_spawn_shims(registry: &CapabilityRegistry, delegate: Arc<dyn SpawnDelegate>) -> usize {
    let mut installed = 0;
    for peer in PeerDescriptor::all() {
        let Some((probe, capability)) = peer.detect(registry) else {
            continue;
        };
        let Some(inner) = capability.spawner() else {
            warn!("Peer mod {} exposes no spawn service via {}, shim not installed", peer.name, probe);
            continue;
        };
        if inner.is_directed() {
            debug!("Peer mod {} already routed through the director", peer.name);
            continue;
        }

        let directed = DirectedSpawnService::new(peer.name, inner.clone(), delegate.clone());
        registry.register(probe.clone(), Capability::Spawner(Arc::new(directed)));
        info!("Spawn shim installed for peer mod {} ({})", peer.name, probe);
        installed += 1;
    }
    installed
}
