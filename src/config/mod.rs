//! Configuration
//!
//! Settings for the snapshot hierarchy and the logging system, composed from
//! built-in defaults, an optional TOML file and `SNAPSHOT_VFS__*` environment
//! variables.

pub mod loader;

pub use loader::ConfigLoader;

use crate::logging::LoggingConfig;
use crate::types::CaseSensitivity;
use serde::{Deserialize, Serialize};

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VfsConfig {
    /// Segment comparison policy for the snapshot hierarchy
    #[serde(default)]
    pub case_sensitivity: CaseSensitivity,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}
