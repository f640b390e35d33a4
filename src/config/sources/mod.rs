//! Configuration layers, each exposed to the merge service as a `config::Source`.

pub mod environment;
pub mod explicit;
pub mod file;

use config::{Map, Value, ValueKind};

/// Merge keys shared by every layer.
pub mod keys {
    pub const CREDENTIAL_ID: &str = "credential_id";
    pub const KEY_PATH: &str = "key_path";
    pub const API_URL: &str = "api_url";
    pub const API_KEY: &str = "api_key";
}

/// Build a layer map keeping only non-empty values, so blanks fall through.
pub(crate) fn non_empty_layer(
    origin: &str,
    fields: [(&'static str, Option<&str>); 4],
) -> Map<String, Value> {
    let origin = origin.to_string();
    let mut map = Map::new();
    for (key, value) in fields {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            map.insert(
                key.to_string(),
                Value::new(Some(&origin), ValueKind::String(value.to_string())),
            );
        }
    }
    map
}
