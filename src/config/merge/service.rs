//! MergeService: stacks the layers in precedence order and deserializes to EffectiveConfig.

use crate::config::sources::keys;
use crate::config::{ConfigOverrides, EffectiveConfig, EnvSnapshot, FileConfig, DEFAULT_API_URL};
use config::{Config, ConfigError};

/// Merge service for config composition.
pub struct MergeService;

impl MergeService {
    /// Precedence: default (lowest) -> file -> environment -> explicit (highest).
    pub fn merge(
        explicit: &ConfigOverrides,
        env: &EnvSnapshot,
        file: &FileConfig,
    ) -> Result<EffectiveConfig, ConfigError> {
        let config = Config::builder()
            .set_default(keys::API_URL, DEFAULT_API_URL)?
            .add_source(file.clone())
            .add_source(env.clone())
            .add_source(explicit.clone())
            .build()?;
        config.try_deserialize()
    }
}
