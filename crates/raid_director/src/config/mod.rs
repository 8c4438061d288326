//! Configuration tree and its manager.
//!
//! The tree is resolved from the persisted JSON file with compiled-in
//! defaults underneath, repaired by [`DirectorConfig::validate`] and shared
//! through [`ConfigManager`].

mod manager;
mod settings;

pub use manager::{ConfigManager, ConfigPatch, DEFAULT_CONFIG_PATH};
pub use settings::*;
