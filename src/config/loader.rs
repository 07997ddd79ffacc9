//! ConfigLoader: layers sources and deserializes to VfsConfig.

use super::VfsConfig;
use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, Environment, File};
use std::path::Path;

/// Environment prefix; nested keys use `__`, e.g. `SNAPSHOT_VFS__LOGGING__LEVEL`.
pub const ENV_PREFIX: &str = "SNAPSHOT_VFS";

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration.
    /// Precedence: defaults (lowest) -> config file -> environment (highest).
    pub fn load(config_file: Option<&Path>) -> Result<VfsConfig, ConfigError> {
        let mut builder = Self::builder_with_defaults()?;
        if let Some(path) = config_file {
            builder = builder.add_source(File::from(path).required(true));
        }
        let builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let defaults = VfsConfig::default();
        config::Config::builder()
            .set_default("case_sensitivity", "sensitive")?
            .set_default("logging.enabled", defaults.logging.enabled)?
            .set_default("logging.level", defaults.logging.level)?
            .set_default("logging.format", defaults.logging.format)?
            .set_default("logging.output", defaults.logging.output)?
            .set_default("logging.color", defaults.logging.color)
    }
}
