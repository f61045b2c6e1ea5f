//! Error types for the reformat scheduler.
//!
//! Host failures are expected and mostly recovered inside a batch pass; only
//! the ones that abort a pass ever reach `on_tick`, where they are logged and
//! surfaced through the host's diagnostic channel.

use std::path::PathBuf;

use crate::document::DocumentId;

/// Failures reported by the editor host.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("Document is no longer open: {0}")]
    DocumentClosed(DocumentId),

    #[error("Command execution failed: {command}: {details}")]
    CommandFailed { command: String, details: String },

    #[error("Window cannot be activated: {0}")]
    WindowUnavailable(String),

    #[error("{0}")]
    Other(String),
}

/// Failures while loading or validating scheduler configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Home directory not found")]
    HomeDirNotFound,

    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// All errors surfaced by the scheduler.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error(transparent)]
    Host(#[from] HostError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Reformat command is not registered with the host: {0}")]
    CommandUnavailable(String),
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
