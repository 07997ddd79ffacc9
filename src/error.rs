//! Error types
//!
//! Trie operations have no recoverable failures; the probe boundary,
//! configuration, logging setup and output rendering do.

use std::io;
use thiserror::Error;

/// Failure raised by a probe collaborator while inspecting one path.
#[derive(Debug, Error)]
#[error("Failed to probe {path}: {source}")]
pub struct ProbeError {
    pub path: String,
    #[source]
    pub source: io::Error,
}

impl ProbeError {
    pub fn new(path: impl Into<String>, source: io::Error) -> Self {
        Self {
            path: path.into(),
            source,
        }
    }

    /// Probe failure that did not originate in an I/O call.
    pub fn other(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(path, io::Error::new(io::ErrorKind::Other, message.into()))
    }
}

/// Crate-level error
#[derive(Debug, Error)]
pub enum VfsError {
    #[error(transparent)]
    Probe(#[from] ProbeError),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Configuration source error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}
