//! Cooperation with the host's service container and optional peer mods.

mod discovery;
mod peer;
mod registry;
mod services;

pub use discovery::{discover_native_plugins, native_library_name};
pub use peer::{
    detect_peers, install_spawn_shims, register_native_plugins, DirectedSpawnService, PeerAvailability, PeerBot,
    PeerDescriptor, PeerSpawnService, SpawnDelegate, SpawnRequest,
};
pub use registry::{Capability, CapabilityRegistry, Probe};
pub use services::{
    DirectedWaveAdjuster, ServiceContainer, WaveAdjuster, WaveEntry, DEFAULT_WAVE_BOT_TYPE, WAVE_ADJUSTER_SERVICE,
};
