//! File layer: the persisted `config.json`.

use super::{keys, non_empty_layer};
use config::{ConfigError, Map, Source, Value};
use serde::{Deserialize, Serialize};

/// On-disk configuration. Every field is optional; unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl FileConfig {
    /// Parse file contents. Anything that is not a JSON object of strings yields `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        serde_json::from_str(raw).ok()
    }

    /// Serialized form written to disk: two-space indented JSON with a trailing newline.
    pub fn to_file_contents(&self) -> String {
        let mut out = serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string());
        out.push('\n');
        out
    }
}

impl Source for FileConfig {
    fn clone_into_box(&self) -> Box<dyn Source + Send + Sync> {
        Box::new(self.clone())
    }

    fn collect(&self) -> Result<Map<String, Value>, ConfigError> {
        Ok(non_empty_layer(
            "config file",
            [
                (keys::CREDENTIAL_ID, self.credential_id.as_deref()),
                (keys::KEY_PATH, self.key_path.as_deref()),
                (keys::API_URL, self.api_url.as_deref()),
                (keys::API_KEY, self.api_key.as_deref()),
            ],
        ))
    }
}
