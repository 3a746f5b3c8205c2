//! Config loader: assembles sources in precedence order and deserializes the result.

use super::merge::merge_policy;
use super::sources::global_file;
use super::GenStudioConfig;
use crate::error::ApiError;
use config::{Environment, File};
use std::path::Path;
use tracing::debug;

/// Loads [`GenStudioConfig`] from defaults, config files and environment.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Precedence (lowest to highest): defaults, global config file, environment.
    pub fn load() -> Result<GenStudioConfig, ApiError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let config = builder.add_source(env_source()).build()?;
        let loaded: GenStudioConfig = config.try_deserialize()?;
        Self::finish(loaded)
    }

    /// Load an explicit file instead of the global one. Environment still wins.
    pub fn load_from_file(path: &Path) -> Result<GenStudioConfig, ApiError> {
        if !path.exists() {
            return Err(ApiError::ConfigError(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        debug!(config_path = %path.display(), "Loading explicit config file");
        let config = merge_policy::builder_with_defaults()?
            .add_source(File::from(path).required(true))
            .add_source(env_source())
            .build()?;
        let loaded: GenStudioConfig = config.try_deserialize()?;
        Self::finish(loaded)
    }

    fn finish(config: GenStudioConfig) -> Result<GenStudioConfig, ApiError> {
        config.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ApiError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                error_msgs.join("\n")
            ))
        })?;
        Ok(config)
    }
}

/// `GENSTUDIO__SERVER__BASE_URL=...` style overrides.
fn env_source() -> Environment {
    Environment::with_prefix("GENSTUDIO")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}
