//! Host-populated registry of optional capabilities.
//!
//! The host fills the registry once at startup with whatever its plugin
//! loader found: loaded modules, exported globals, registered services and
//! native plugin binaries. The director only ever reads it.

use super::peer::PeerSpawnService;
use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;

/// One place a peer can be looked up.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Probe {
    /// A loaded module, by package name
    Module(String),
    /// A binding in the host's global namespace
    Global(String),
    /// A key in the host's service locator
    Service(String),
    /// A native plugin binary found on disk
    NativePlugin(String),
}

impl fmt::Display for Probe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Probe::Module(name) => write!(f, "module:{name}"),
            Probe::Global(name) => write!(f, "global:{name}"),
            Probe::Service(name) => write!(f, "service:{name}"),
            Probe::NativePlugin(name) => write!(f, "native:{name}"),
        }
    }
}

/// What a probe resolved to.
#[derive(Clone)]
pub enum Capability {
    /// The peer is there but exposes nothing the director can hook
    Present,
    /// The peer exposes its spawn entry points
    Spawner(Arc<dyn PeerSpawnService>),
}

impl Capability {
    pub fn spawner(&self) -> Option<&Arc<dyn PeerSpawnService>> {
        match self {
            Capability::Spawner(service) => Some(service),
            Capability::Present => None,
        }
    }
}

impl fmt::Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Present => f.write_str("Present"),
            Capability::Spawner(_) => f.write_str("Spawner(..)"),
        }
    }
}

#[derive(Default)]
pub struct CapabilityRegistry {
    entries: DashMap<Probe, Capability>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers or replaces the capability behind `probe`.
    pub fn register(&self, probe: Probe, capability: Capability) {
        self.entries.insert(probe, capability);
    }

    pub fn lookup(&self, probe: &Probe) -> Option<Capability> {
        self.entries.get(probe).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, probe: &Probe) -> bool {
        self.entries.contains_key(probe)
    }

    pub fn probes(&self) -> Vec<Probe> {
        let mut probes: Vec<Probe> = self.entries.iter().map(|entry| entry.key().clone()).collect();
        probes.sort();
        probes
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for CapabilityRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityRegistry").field("probes", &self.probes()).finish()
    }
}
