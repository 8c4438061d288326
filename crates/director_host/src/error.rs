//! Error types for the reference host.

use raid_director::PluginFailure;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HostError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Host configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Host configuration serialize error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("Snapshot parse error: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("Invalid host configuration: {0}")]
    Validation(String),

    #[error("Plugin failure: {0}")]
    Plugin(#[from] PluginFailure),

    #[error("Logging setup failed: {0}")]
    Logging(String),
}

pub type HostResult<T> = Result<T, HostError>;
