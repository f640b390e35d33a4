//! ConfigResolver: the single entry point commands use to obtain their configuration.

use super::merge::MergeService;
use super::{ConfigOverrides, ConfigStore, EffectiveConfig, EnvSnapshot, JsonConfigStore};
use crate::error::Result;
use std::path::PathBuf;
use std::sync::Arc;

/// Resolves [`EffectiveConfig`] from an injected environment snapshot and config store.
///
/// The file is re-read on every call so edits made between invocations are picked up.
#[derive(Clone)]
pub struct ConfigResolver {
    env: EnvSnapshot,
    store: Arc<dyn ConfigStore>,
}

impl ConfigResolver {
    pub fn new(env: EnvSnapshot, store: Arc<dyn ConfigStore>) -> Self {
        Self { env, store }
    }

    /// Resolver over the real process environment and the default (or given) config file.
    pub fn from_process(config_path: Option<PathBuf>) -> Result<Self> {
        let env = EnvSnapshot::capture();
        let store = JsonConfigStore::locate(config_path, &env)?;
        Ok(Self::new(env, Arc::new(store)))
    }

    pub fn env(&self) -> &EnvSnapshot {
        &self.env
    }

    pub fn store(&self) -> &dyn ConfigStore {
        self.store.as_ref()
    }

    /// Merge explicit values over environment, file, and defaults. Never fails.
    pub fn resolve(&self, explicit: &ConfigOverrides) -> EffectiveConfig {
        let file = self.store.load();
        match MergeService::merge(explicit, &self.env, &file) {
            Ok(config) => config,
            Err(e) => {
                // Every layer yields plain strings, so the builder has nothing to reject.
                tracing::warn!("Failed to merge configuration layers: {}", e);
                EffectiveConfig::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::sources::environment::{
        ENV_API_KEY, ENV_API_URL, ENV_CREDENTIAL_ID, ENV_PRIVATE_KEY_PATH,
    };
    use crate::config::{FileConfig, DEFAULT_API_URL};
    use proptest::prelude::*;

    fn resolver_with(env: EnvSnapshot, file_contents: Option<&str>) -> (ConfigResolver, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        if let Some(contents) = file_contents {
            std::fs::write(&path, contents).unwrap();
        }
        (
            ConfigResolver::new(env, Arc::new(JsonConfigStore::new(path))),
            dir,
        )
    }

    fn api_url_override(value: &str) -> ConfigOverrides {
        ConfigOverrides {
            api_url: Some(value.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn api_url_precedence_walks_down_the_layers() {
        let env = EnvSnapshot::from_pairs([(ENV_API_URL, "Y")]);
        let (resolver, _dir) = resolver_with(env, Some(r#"{"apiUrl":"Z"}"#));
        assert_eq!(resolver.resolve(&api_url_override("X")).api_url, "X");
        assert_eq!(resolver.resolve(&ConfigOverrides::default()).api_url, "Y");

        let (resolver, _dir) = resolver_with(EnvSnapshot::default(), Some(r#"{"apiUrl":"Z"}"#));
        assert_eq!(resolver.resolve(&ConfigOverrides::default()).api_url, "Z");

        let (resolver, _dir) = resolver_with(EnvSnapshot::default(), None);
        assert_eq!(
            resolver.resolve(&ConfigOverrides::default()).api_url,
            DEFAULT_API_URL
        );
    }

    #[test]
    fn environment_fills_every_field() {
        let env = EnvSnapshot::from_pairs([
            (ENV_CREDENTIAL_ID, "env-id"),
            (ENV_PRIVATE_KEY_PATH, "/env/key"),
            (ENV_API_URL, "https://env.example.com"),
            (ENV_API_KEY, "env-key"),
        ]);
        let (resolver, _dir) = resolver_with(env, None);
        let cfg = resolver.resolve(&ConfigOverrides::default());
        assert_eq!(cfg.credential_id, "env-id");
        assert_eq!(cfg.key_path, "/env/key");
        assert_eq!(cfg.api_url, "https://env.example.com");
        assert_eq!(cfg.api_key, "env-key");
    }

    #[test]
    fn explicit_flag_beats_environment() {
        let env = EnvSnapshot::from_pairs([(ENV_CREDENTIAL_ID, "env-id")]);
        let (resolver, _dir) = resolver_with(env, None);
        let cfg = resolver.resolve(&ConfigOverrides {
            credential_id: Some("flag-id".to_string()),
            ..Default::default()
        });
        assert_eq!(cfg.credential_id, "flag-id");
    }

    #[test]
    fn empty_explicit_value_falls_through() {
        let env = EnvSnapshot::from_pairs([(ENV_API_URL, "Y")]);
        let (resolver, _dir) = resolver_with(env, None);
        assert_eq!(resolver.resolve(&api_url_override("")).api_url, "Y");
    }

    #[test]
    fn malformed_file_is_treated_as_empty() {
        let (resolver, _dir) = resolver_with(EnvSnapshot::default(), Some("{ definitely not json"));
        assert_eq!(
            resolver.resolve(&ConfigOverrides::default()),
            EffectiveConfig::default()
        );
    }

    #[test]
    fn resolving_twice_is_identical() {
        let env = EnvSnapshot::from_pairs([(ENV_CREDENTIAL_ID, "env-id")]);
        let (resolver, _dir) = resolver_with(env, Some(r#"{"keyPath":"/file.pem"}"#));
        let overrides = api_url_override("X");
        assert_eq!(resolver.resolve(&overrides), resolver.resolve(&overrides));
    }

    #[test]
    fn file_edits_are_picked_up_without_caching() {
        let (resolver, _dir) = resolver_with(EnvSnapshot::default(), None);
        assert_eq!(resolver.resolve(&ConfigOverrides::default()).credential_id, "");

        resolver
            .store()
            .save(&FileConfig {
                credential_id: Some("later".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(
            resolver.resolve(&ConfigOverrides::default()).credential_id,
            "later"
        );
    }

    proptest! {
        #[test]
        fn highest_present_layer_wins(
            explicit in proptest::option::of("[a-z]{1,8}"),
            env in proptest::option::of("[a-z]{1,8}"),
            file in proptest::option::of("[a-z]{1,8}"),
        ) {
            let env_snapshot = match &env {
                Some(v) => EnvSnapshot::from_pairs([(ENV_API_KEY, v.clone())]),
                None => EnvSnapshot::default(),
            };
            let file_contents = file
                .as_ref()
                .map(|v| format!(r#"{{"apiKey":"{}"}}"#, v));
            let (resolver, _dir) = resolver_with(env_snapshot, file_contents.as_deref());
            let overrides = ConfigOverrides { api_key: explicit.clone(), ..Default::default() };

            let expected = explicit.or(env).or(file).unwrap_or_default();
            prop_assert_eq!(resolver.resolve(&overrides).api_key, expected);
        }
    }
}
