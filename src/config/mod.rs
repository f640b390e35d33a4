//! Configuration resolution.
//!
//! Four layers feed every field of [`EffectiveConfig`], highest priority first:
//! explicit invocation parameters, `TETHER_*` environment variables, the
//! persisted JSON file, and the built-in default (`api_url` only). Empty strings
//! never shadow a lower layer.

pub mod merge;
pub mod resolver;
pub mod sources;
pub mod store;

pub use resolver::ConfigResolver;
pub use sources::environment::EnvSnapshot;
pub use sources::explicit::ConfigOverrides;
pub use sources::file::FileConfig;
pub use store::{ConfigStore, JsonConfigStore};

use crate::error::{Result, TetherError};
use serde::Deserialize;

/// Built-in service endpoint.
pub const DEFAULT_API_URL: &str = "https://api.tether.name";

/// Fully resolved configuration for one command invocation.
///
/// Unset fields are empty strings. Built fresh on every command and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EffectiveConfig {
    pub credential_id: String,
    pub key_path: String,
    pub api_url: String,
    pub api_key: String,
}

impl Default for EffectiveConfig {
    fn default() -> Self {
        Self {
            credential_id: String::new(),
            key_path: String::new(),
            api_url: DEFAULT_API_URL.to_string(),
            api_key: String::new(),
        }
    }
}

impl EffectiveConfig {
    pub fn require_credential_id(&self) -> Result<&str> {
        if self.credential_id.is_empty() {
            return Err(TetherError::missing_credential_id());
        }
        Ok(&self.credential_id)
    }

    pub fn require_key_path(&self) -> Result<&str> {
        if self.key_path.is_empty() {
            return Err(TetherError::CredentialMissing);
        }
        Ok(&self.key_path)
    }

    pub fn require_api_key(&self) -> Result<&str> {
        if self.api_key.is_empty() {
            return Err(TetherError::Unauthorized);
        }
        Ok(&self.api_key)
    }
}
