//! Shared fixtures for CLI integration tests.

#![allow(dead_code)]

use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tether::api::ScriptedTransport;
use tether::cli::{Cli, CliContext, CommandOutput};
use tether::config::{ConfigResolver, EnvSnapshot, FileConfig, JsonConfigStore, ConfigStore};
use tether::credential::CredentialStore;
use tether::init::InputSource;

pub const API_URL: &str = "https://api.test.tether";

/// Isolated home: a temp config file, a fixed environment, and a scripted network.
pub struct Harness {
    pub dir: TempDir,
    pub config_path: PathBuf,
    pub env: Vec<(String, String)>,
    pub transport: Arc<ScriptedTransport>,
}

impl Harness {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join(".tether").join("config.json");
        Self {
            dir,
            config_path,
            env: vec![("TETHER_API_URL".to_string(), API_URL.to_string())],
            transport: Arc::new(ScriptedTransport::new()),
        }
    }

    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        self.env.push((key.to_string(), value.to_string()));
        self
    }

    pub fn with_transport(mut self, transport: ScriptedTransport) -> Self {
        self.transport = Arc::new(transport);
        self
    }

    pub fn write_config(&self, config: &FileConfig) {
        JsonConfigStore::new(&self.config_path).save(config).unwrap();
    }

    pub fn read_config(&self) -> FileConfig {
        JsonConfigStore::new(&self.config_path).load()
    }

    /// Generate a keypair in the temp dir and return the private key path.
    pub fn keypair(&self) -> String {
        let paths = CredentialStore::new()
            .generate(&self.dir.path().join("keys"))
            .unwrap();
        paths.private_key.to_string_lossy().into_owned()
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn context(&self) -> CliContext {
        let resolver = ConfigResolver::new(
            EnvSnapshot::from_pairs(self.env.clone()),
            Arc::new(JsonConfigStore::new(&self.config_path)),
        );
        CliContext::new(resolver, self.transport.clone()).with_cwd(self.dir.path())
    }

    pub fn run(&self, args: &[&str]) -> CommandOutput {
        self.run_with(self.context(), args)
    }

    pub fn run_with_input(&self, input: Box<dyn InputSource>, args: &[&str]) -> CommandOutput {
        self.run_with(self.context().with_input(input), args)
    }

    fn run_with(&self, context: CliContext, args: &[&str]) -> CommandOutput {
        let argv = std::iter::once("tether").chain(args.iter().copied());
        let cli = Cli::try_parse_from(argv).unwrap();
        context.execute(&cli.command, &cli.global)
    }
}

pub fn parse_json(output: &CommandOutput) -> serde_json::Value {
    serde_json::from_str(&output.stdout)
        .unwrap_or_else(|e| panic!("stdout is not JSON ({e}): {}", output.stdout))
}
