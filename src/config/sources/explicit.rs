//! Explicit layer: values passed on the command line.

use super::{keys, non_empty_layer};
use config::{ConfigError, Map, Source, Value};

/// Per-invocation overrides. `None` and `Some("")` both mean "not given".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub credential_id: Option<String>,
    pub key_path: Option<String>,
    pub api_url: Option<String>,
    pub api_key: Option<String>,
}

impl Source for ConfigOverrides {
    fn clone_into_box(&self) -> Box<dyn Source + Send + Sync> {
        Box::new(self.clone())
    }

    fn collect(&self) -> Result<Map<String, Value>, ConfigError> {
        Ok(non_empty_layer(
            "command line",
            [
                (keys::CREDENTIAL_ID, self.credential_id.as_deref()),
                (keys::KEY_PATH, self.key_path.as_deref()),
                (keys::API_URL, self.api_url.as_deref()),
                (keys::API_KEY, self.api_key.as_deref()),
            ],
        ))
    }
}
