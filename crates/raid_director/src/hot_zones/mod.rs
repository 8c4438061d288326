//! Optional hot zone layer: spawn positions clustered in named circular
//! regions and the wave timers that use them.

mod manager;
mod sampling;

pub use manager::{HotZoneManager, HotZoneWave, SessionPhase};
pub use sampling::{generate_spawn_positions, SpawnPosition, MAX_ATTEMPTS_PER_POSITION};
