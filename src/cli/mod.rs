//! CLI Tooling
//!
//! Command-line surface for tether: argument parsing, per-command execution,
//! and output rendering. Commands never print directly; [`CliContext::execute`]
//! returns the text for stdout and stderr plus an exit code.

pub mod format;

use crate::agents::AgentRegistry;
use crate::api::{ApiClient, HttpTransport, Transport};
use crate::config::{ConfigOverrides, ConfigResolver, EffectiveConfig};
use crate::credential::CredentialStore;
use crate::error::{Result, TetherError};
use crate::init::{InitWizard, InputSource, TerminalInput};
use crate::protocol::{ChallengeRequested, Idle, ProtocolClient};
use crate::status::StatusPoller;
use clap::{Args, Parser, Subcommand};
use format::StatusReport;
use serde::Serialize;
use std::future::Future;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Tether CLI - identity verification for AI agents
#[derive(Parser, Debug)]
#[command(name = "tether")]
#[command(version)]
#[command(about = "Identity verification for AI agents against tether.name")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Flags accepted by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Credential ID
    #[arg(long, global = true)]
    pub credential_id: Option<String>,

    /// Path to private key file
    #[arg(long, global = true)]
    pub key_path: Option<String>,

    /// Tether API base URL
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// API key for agent management
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Configuration file path (default: ~/.tether/config.json)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output result as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug output on stderr
    #[arg(long, global = true)]
    pub verbose: bool,
}

impl GlobalArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            credential_id: self.credential_id.clone(),
            key_path: self.key_path.clone(),
            api_url: self.api_url.clone(),
            api_key: self.api_key.clone(),
        }
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Interactive setup wizard
    Init,
    /// Perform a full identity verification
    Verify,
    /// Show current configuration
    Status,
    /// Request a challenge code from the API
    Challenge,
    /// Sign a challenge string and print the proof
    Sign {
        /// Challenge code to sign
        challenge: String,
    },
    /// Check the status of a challenge by code
    Check {
        /// Challenge code
        code: String,
    },
    /// Manage agents (requires an API key)
    Agent {
        #[command(subcommand)]
        command: AgentCommands,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum AgentCommands {
    /// Register a new agent
    Create {
        /// Agent name
        name: String,
        /// Agent description
        #[arg(long, default_value = "")]
        description: String,
    },
    /// List agents
    List,
    /// Delete an agent
    Delete {
        /// Agent ID
        id: String,
    },
}

impl Commands {
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Init => "init",
            Commands::Verify => "verify",
            Commands::Status => "status",
            Commands::Challenge => "challenge",
            Commands::Sign { .. } => "sign",
            Commands::Check { .. } => "check",
            Commands::Agent { command } => match command {
                AgentCommands::Create { .. } => "agent create",
                AgentCommands::List => "agent list",
                AgentCommands::Delete { .. } => "agent delete",
            },
        }
    }
}

/// Rendered result of one command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CommandOutput {
    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Output of a successful command body, before error handling.
struct Rendered {
    stdout: String,
    ok: bool,
}

impl Rendered {
    fn ok(stdout: String) -> Self {
        Self { stdout, ok: true }
    }
}

/// Everything a command needs, injected once per process.
pub struct CliContext {
    resolver: ConfigResolver,
    transport: Arc<dyn Transport>,
    credentials: CredentialStore,
    input: Box<dyn InputSource>,
    cwd: PathBuf,
    color: bool,
}

impl CliContext {
    pub fn new(resolver: ConfigResolver, transport: Arc<dyn Transport>) -> Self {
        Self {
            resolver,
            transport,
            credentials: CredentialStore::new(),
            input: Box::new(TerminalInput),
            cwd: PathBuf::from("."),
            color: false,
        }
    }

    /// Context over the real environment, config file, terminal, and network.
    pub fn from_process(config_path: Option<PathBuf>) -> Result<Self> {
        let resolver = ConfigResolver::from_process(config_path)?;
        let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new()?);
        let cwd = std::env::current_dir()?;
        Ok(Self::new(resolver, transport)
            .with_cwd(cwd)
            .with_color(std::io::stdout().is_terminal()))
    }

    pub fn with_input(mut self, input: Box<dyn InputSource>) -> Self {
        self.input = input;
        self
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = cwd.into();
        self
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn resolver(&self) -> &ConfigResolver {
        &self.resolver
    }

    /// Run one command. Errors are rendered, never returned.
    pub fn execute(&self, command: &Commands, global: &GlobalArgs) -> CommandOutput {
        tracing::debug!(command = command.name(), "executing command");
        match self.execute_inner(command, global) {
            Ok(rendered) => CommandOutput {
                stdout: rendered.stdout,
                stderr: String::new(),
                exit_code: if rendered.ok { 0 } else { 1 },
            },
            Err(e) => {
                tracing::debug!(command = command.name(), error = %e, "command failed");
                self.render_error(command, global.json, &e)
            }
        }
    }

    fn render_error(&self, command: &Commands, json: bool, err: &TetherError) -> CommandOutput {
        render_error(command, json, err, self.color)
    }

    fn execute_inner(&self, command: &Commands, global: &GlobalArgs) -> Result<Rendered> {
        let json = global.json;
        let color = self.color;

        match command {
            Commands::Init => {
                let wizard = InitWizard::new(
                    self.input.as_ref(),
                    self.resolver.env(),
                    self.resolver.store(),
                    self.credentials,
                    self.cwd.clone(),
                );
                let outcome = wizard.run()?;
                Ok(Rendered::ok(if json {
                    to_pretty_json(&format::init_outcome_json(&outcome))
                } else {
                    format::format_init_outcome(&outcome, color)
                }))
            }
            Commands::Verify => {
                let config = self.resolve(global);
                let credential_id = config.require_credential_id()?;
                let key_path = config.require_key_path()?;
                tracing::debug!(credential_id, key_path, api_url = %config.api_url, "verify configuration");

                let protocol = self.protocol(&config);
                let outcome = self.block_on(protocol.verify(credential_id, key_path))??;
                let verified = outcome.is_verified();
                let result = outcome.into_result();
                let stdout = if json {
                    to_pretty_json(&result)
                } else {
                    format::format_verify_result(&result, color)
                };
                Ok(Rendered {
                    stdout,
                    ok: verified,
                })
            }
            Commands::Status => {
                let config = self.resolve(global);
                let report = StatusReport {
                    key_exists: !config.key_path.is_empty() && Path::new(&config.key_path).is_file(),
                    credential_id: config.credential_id,
                    key_path: config.key_path,
                    api_url: config.api_url,
                    api_key_configured: !config.api_key.is_empty(),
                    config_path: self.resolver.store().path().display().to_string(),
                };
                Ok(Rendered::ok(if json {
                    to_pretty_json(&format::status_report_json(&report))
                } else {
                    format::format_status_report(&report, color)
                }))
            }
            Commands::Challenge => {
                let config = self.resolve(global);
                let credential_id = config.require_credential_id()?;
                let protocol = self.protocol(&config);
                let requested =
                    self.block_on(protocol.request_challenge(Idle::new(credential_id)))??;
                Ok(Rendered::ok(if json {
                    to_pretty_json(&serde_json::json!({ "code": requested.code() }))
                } else {
                    requested.code().to_string()
                }))
            }
            Commands::Sign { challenge } => {
                let config = self.resolve(global);
                let key_path = config.require_key_path()?;
                tracing::debug!(key_path, "signing challenge");
                let signed = self
                    .protocol(&config)
                    .sign(ChallengeRequested::external(challenge.as_str()), key_path)?;
                Ok(Rendered::ok(if json {
                    to_pretty_json(&serde_json::json!({
                        "challenge": signed.code(),
                        "proof": signed.proof().as_str(),
                    }))
                } else {
                    signed.into_proof().into_string()
                }))
            }
            Commands::Check { code } => {
                let config = self.resolve(global);
                let poller = StatusPoller::new(self.api(&config));
                let status = self.block_on(poller.fetch(code))??;
                Ok(Rendered::ok(if json {
                    to_pretty_json(&status.raw)
                } else {
                    format::format_challenge_status(&status, code, color)
                }))
            }
            Commands::Agent { command } => {
                let config = self.resolve(global);
                let api_key = config.require_api_key()?;
                let registry = AgentRegistry::new(self.api(&config), api_key);
                match command {
                    AgentCommands::Create { name, description } => {
                        let created = self.block_on(registry.create(name, description))??;
                        Ok(Rendered::ok(if json {
                            to_pretty_json(&created)
                        } else {
                            format::format_created_agent(&created, color)
                        }))
                    }
                    AgentCommands::List => {
                        let agents = self.block_on(registry.list())??;
                        Ok(Rendered::ok(if json {
                            to_pretty_json(&agents)
                        } else {
                            format::format_agent_list(&agents, color)
                        }))
                    }
                    AgentCommands::Delete { id } => {
                        self.block_on(registry.delete(id))??;
                        Ok(Rendered::ok(if json {
                            to_pretty_json(&serde_json::json!({ "deleted": true, "id": id }))
                        } else {
                            format::format_agent_deleted(id, color)
                        }))
                    }
                }
            }
        }
    }

    fn resolve(&self, global: &GlobalArgs) -> EffectiveConfig {
        self.resolver.resolve(&global.overrides())
    }

    fn api(&self, config: &EffectiveConfig) -> ApiClient {
        ApiClient::new(&config.api_url, Arc::clone(&self.transport))
    }

    fn protocol(&self, config: &EffectiveConfig) -> ProtocolClient {
        ProtocolClient::new(self.api(config), self.credentials)
    }

    /// Drive one command's future on a fresh current-thread runtime.
    fn block_on<F: Future>(&self, future: F) -> Result<F::Output> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| TetherError::Config(format!("Failed to create runtime: {}", e)))?;
        Ok(rt.block_on(future))
    }
}

/// Render a failed command: a JSON body on stdout with `--json`, otherwise an
/// `Error:` line on stderr. Always exit code 1.
pub fn render_error(command: &Commands, json: bool, err: &TetherError, color: bool) -> CommandOutput {
    let message = err.to_string();
    if json {
        let body = if matches!(command, Commands::Verify) {
            serde_json::json!({ "verified": false, "error": message })
        } else {
            serde_json::json!({ "error": message })
        };
        CommandOutput {
            stdout: to_pretty_json(&body),
            stderr: String::new(),
            exit_code: 1,
        }
    } else {
        CommandOutput {
            stdout: String::new(),
            stderr: format::format_error(&message, color),
            exit_code: 1,
        }
    }
}

fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}
