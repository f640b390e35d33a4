//! Environment layer: a snapshot of the `TETHER_*` variables taken once per process.

use super::{keys, non_empty_layer};
use config::{ConfigError, Map, Source, Value};
use std::collections::HashMap;

pub const ENV_CREDENTIAL_ID: &str = "TETHER_CREDENTIAL_ID";
pub const ENV_PRIVATE_KEY_PATH: &str = "TETHER_PRIVATE_KEY_PATH";
pub const ENV_API_URL: &str = "TETHER_API_URL";
pub const ENV_API_KEY: &str = "TETHER_API_KEY";
pub const ENV_CONFIG_PATH: &str = "TETHER_CONFIG";

const PREFIX: &str = "TETHER_";

/// Immutable copy of the environment variables tether reads.
///
/// Injected into the resolver instead of reading `std::env` at resolve time,
/// so tests can substitute any environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSnapshot {
    vars: HashMap<String, String>,
}

impl EnvSnapshot {
    /// Capture `TETHER_*` variables from the current process. Non-UTF-8 values are skipped.
    pub fn capture() -> Self {
        let vars = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .filter(|(k, _)| k.starts_with(PREFIX))
            .collect();
        Self { vars }
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Value of `name`, treating an empty variable as unset.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

impl Source for EnvSnapshot {
    fn clone_into_box(&self) -> Box<dyn Source + Send + Sync> {
        Box::new(self.clone())
    }

    fn collect(&self) -> Result<Map<String, Value>, ConfigError> {
        Ok(non_empty_layer(
            "environment",
            [
                (keys::CREDENTIAL_ID, self.get(ENV_CREDENTIAL_ID)),
                (keys::KEY_PATH, self.get(ENV_PRIVATE_KEY_PATH)),
                (keys::API_URL, self.get(ENV_API_URL)),
                (keys::API_KEY, self.get(ENV_API_KEY)),
            ],
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_variable_reads_as_unset() {
        let env = EnvSnapshot::from_pairs([(ENV_API_URL, ""), (ENV_API_KEY, "k")]);
        assert_eq!(env.get(ENV_API_URL), None);
        assert_eq!(env.get(ENV_API_KEY), Some("k"));
    }

    #[test]
    fn private_key_variable_maps_to_key_path() {
        let env = EnvSnapshot::from_pairs([(ENV_PRIVATE_KEY_PATH, "/keys/k.pem")]);
        let map = env.collect().unwrap();
        assert_eq!(map.len(), 1);
        assert!(map.contains_key(keys::KEY_PATH));
    }
}
