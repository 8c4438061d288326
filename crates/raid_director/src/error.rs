//! Error types for the raid director.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DirectorError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration parse error: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Unexpected record shape for {record}: {detail}")]
    RecordShape { record: String, detail: String },

    #[error("Hook point not available: {0}")]
    HookUnavailable(String),

    #[error("Task error: {0}")]
    TaskError(String),
}

impl DirectorError {
    pub(crate) fn shape(record: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::RecordShape {
            record: record.into(),
            detail: detail.into(),
        }
    }
}

pub type DirectorResult<T> = Result<T, DirectorError>;

/// Failure reported back to the host from a lifecycle callback.
#[derive(Error, Debug)]
pub enum PluginFailure {
    #[error("Plugin initialization failed: {0}")]
    InitializationFailed(String),
}
