//! Static spawn configuration applied to the host database.

mod behavior;
mod manager;
pub mod records;

pub use behavior::{resolve_behavior, BehaviorModifiers, ResolvedBehavior};
pub use manager::{
    ApplyReport, BotTypeStatistics, MapStatistics, SpawnManager, SpawnStatistics, DEFAULT_MAX_LEVEL,
    DEFAULT_MIN_LEVEL,
};
