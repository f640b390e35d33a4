//! Persisted configuration file access.

use crate::config::sources::environment::{EnvSnapshot, ENV_CONFIG_PATH};
use crate::config::FileConfig;
use crate::error::{Result, TetherError};
use crate::fs_secure;
use std::path::{Path, PathBuf};

const CONFIG_DIR_NAME: &str = ".tether";
const CONFIG_FILE_NAME: &str = "config.json";

/// Read/write access to the persisted configuration.
pub trait ConfigStore: Send + Sync {
    /// Location shown to the operator.
    fn path(&self) -> &Path;

    /// Current file contents. Missing, unreadable, or malformed files read as empty.
    fn load(&self) -> FileConfig;

    fn save(&self, config: &FileConfig) -> Result<()>;
}

/// JSON file store, `~/.tether/config.json` by default.
#[derive(Debug, Clone)]
pub struct JsonConfigStore {
    path: PathBuf,
}

impl JsonConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Pick the config file: explicit path, then `TETHER_CONFIG`, then the home default.
    pub fn locate(explicit: Option<PathBuf>, env: &EnvSnapshot) -> Result<Self> {
        if let Some(path) = explicit.filter(|p| !p.as_os_str().is_empty()) {
            return Ok(Self::new(path));
        }
        if let Some(path) = env.get(ENV_CONFIG_PATH) {
            return Ok(Self::new(path));
        }
        Self::default_location()
    }

    pub fn default_location() -> Result<Self> {
        let base = directories::BaseDirs::new().ok_or_else(|| {
            TetherError::Config("Could not determine home directory for config file".to_string())
        })?;
        Ok(Self::new(
            base.home_dir().join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME),
        ))
    }
}

impl ConfigStore for JsonConfigStore {
    fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> FileConfig {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return FileConfig::default(),
            Err(e) => {
                tracing::warn!(
                    "Failed to read config file {}: {}, treating as empty",
                    self.path.display(),
                    e
                );
                return FileConfig::default();
            }
        };
        FileConfig::parse(&raw).unwrap_or_else(|| {
            tracing::warn!(
                "Config file {} is not valid, treating as empty",
                self.path.display()
            );
            FileConfig::default()
        })
    }

    fn save(&self, config: &FileConfig) -> Result<()> {
        fs_secure::write_private_file_atomic(&self.path, config.to_file_contents().as_bytes())
            .map_err(|e| {
                TetherError::Config(format!(
                    "Failed to write config file {}: {}",
                    self.path.display(),
                    e
                ))
            })?;
        tracing::debug!(path = %self.path.display(), "config saved");
        Ok(())
    }
}
