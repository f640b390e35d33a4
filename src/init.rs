//! Interactive first-time setup.

use crate::config::sources::environment::{ENV_CREDENTIAL_ID, ENV_PRIVATE_KEY_PATH};
use crate::config::{ConfigStore, EnvSnapshot};
use crate::credential::{CredentialStore, KeyPaths};
use crate::error::{Result, TetherError};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

/// Where the wizard gets its answers.
pub trait InputSource {
    /// Free-text answer. May be empty.
    fn text(&self, prompt: &str) -> Result<String>;

    /// Secret answer, not echoed. May be empty.
    fn secret(&self, prompt: &str) -> Result<String>;

    fn confirm(&self, prompt: &str, default: bool) -> Result<bool>;

    /// Informational line shown during setup.
    fn note(&self, message: &str);
}

/// Prompts on the controlling terminal.
#[derive(Debug, Default)]
pub struct TerminalInput;

impl InputSource for TerminalInput {
    fn text(&self, prompt: &str) -> Result<String> {
        dialoguer::Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
            .map(|s| s.trim().to_string())
            .map_err(|e| TetherError::Input(e.to_string()))
    }

    fn secret(&self, prompt: &str) -> Result<String> {
        dialoguer::Password::new()
            .with_prompt(prompt)
            .allow_empty_password(true)
            .interact()
            .map(|s| s.trim().to_string())
            .map_err(|e| TetherError::Input(e.to_string()))
    }

    fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(default)
            .interact()
            .map_err(|e| TetherError::Input(e.to_string()))
    }

    fn note(&self, message: &str) {
        eprintln!("{message}");
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedAnswer {
    Text(String),
    Confirm(bool),
}

/// Replays canned answers in order. Running out is an input error.
#[derive(Debug, Default)]
pub struct ScriptedInput {
    answers: Mutex<VecDeque<ScriptedAnswer>>,
    notes: Mutex<Vec<String>>,
}

impl ScriptedInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(self, answer: impl Into<String>) -> Self {
        self.answers
            .lock()
            .push_back(ScriptedAnswer::Text(answer.into()));
        self
    }

    pub fn with_confirm(self, answer: bool) -> Self {
        self.answers.lock().push_back(ScriptedAnswer::Confirm(answer));
        self
    }

    pub fn notes(&self) -> Vec<String> {
        self.notes.lock().clone()
    }

    pub fn remaining(&self) -> usize {
        self.answers.lock().len()
    }

    fn next(&self, prompt: &str) -> Result<ScriptedAnswer> {
        self.answers
            .lock()
            .pop_front()
            .ok_or_else(|| TetherError::Input(format!("no scripted answer for \"{prompt}\"")))
    }
}

impl InputSource for ScriptedInput {
    fn text(&self, prompt: &str) -> Result<String> {
        match self.next(prompt)? {
            ScriptedAnswer::Text(s) => Ok(s.trim().to_string()),
            other => Err(TetherError::Input(format!(
                "expected text for \"{prompt}\", got {other:?}"
            ))),
        }
    }

    fn secret(&self, prompt: &str) -> Result<String> {
        InputSource::text(self, prompt)
    }

    fn confirm(&self, prompt: &str, _default: bool) -> Result<bool> {
        match self.next(prompt)? {
            ScriptedAnswer::Confirm(b) => Ok(b),
            other => Err(TetherError::Input(format!(
                "expected yes/no for \"{prompt}\", got {other:?}"
            ))),
        }
    }

    fn note(&self, message: &str) {
        self.notes.lock().push(message.to_string());
    }
}

/// What setup wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitOutcome {
    pub config_path: PathBuf,
    pub credential_id: String,
    pub key_path: PathBuf,
    /// Set when a new keypair was generated.
    pub generated: Option<KeyPaths>,
    pub key_exists: bool,
    pub api_key_updated: bool,
}

pub struct InitWizard<'a> {
    input: &'a dyn InputSource,
    env: &'a EnvSnapshot,
    store: &'a dyn ConfigStore,
    credentials: CredentialStore,
    cwd: PathBuf,
}

impl<'a> InitWizard<'a> {
    pub fn new(
        input: &'a dyn InputSource,
        env: &'a EnvSnapshot,
        store: &'a dyn ConfigStore,
        credentials: CredentialStore,
        cwd: impl Into<PathBuf>,
    ) -> Self {
        Self {
            input,
            env,
            store,
            credentials,
            cwd: cwd.into(),
        }
    }

    pub fn run(&self) -> Result<InitOutcome> {
        let credential_id = match self.env.get(ENV_CREDENTIAL_ID) {
            Some(id) => {
                self.input
                    .note(&format!("Using credential ID from {ENV_CREDENTIAL_ID}"));
                id.to_string()
            }
            None => self.input.text("Credential ID")?,
        };
        if credential_id.is_empty() {
            return Err(TetherError::Config("Credential ID is required.".to_string()));
        }

        let mut generated = None;
        let raw_key_path = match self.env.get(ENV_PRIVATE_KEY_PATH) {
            Some(path) => {
                self.input
                    .note(&format!("Using private key path from {ENV_PRIVATE_KEY_PATH}"));
                PathBuf::from(path)
            }
            None if self.input.confirm("Generate a new RSA keypair?", false)? => {
                let paths = self.credentials.generate(&self.cwd)?;
                self.input.note(&format!(
                    "Generated keypair:\n  private: {}\n  public:  {}\nUpload the public key to tether.name to bind it to your credential.",
                    paths.private_key.display(),
                    paths.public_key.display()
                ));
                let private = paths.private_key.clone();
                generated = Some(paths);
                private
            }
            None => {
                let answer = self.input.text("Path to private key")?;
                if answer.is_empty() {
                    return Err(TetherError::Config(
                        "Private key path is required.".to_string(),
                    ));
                }
                PathBuf::from(answer)
            }
        };

        let key_path = absolutize(&self.cwd, &raw_key_path);
        let key_exists = key_path.is_file();
        if !key_exists {
            self.input.note(&format!(
                "Warning: private key not found at {}",
                key_path.display()
            ));
        }

        let api_key = self
            .input
            .secret("API key for agent management (optional, blank keeps current)")?;

        let mut file = self.store.load();
        file.credential_id = Some(credential_id.clone());
        file.key_path = Some(key_path.to_string_lossy().into_owned());
        let api_key_updated = !api_key.is_empty();
        if api_key_updated {
            file.api_key = Some(api_key);
        }
        self.store.save(&file)?;
        tracing::info!(path = %self.store.path().display(), "configuration saved");

        Ok(InitOutcome {
            config_path: self.store.path().to_path_buf(),
            credential_id,
            key_path,
            generated,
            key_exists,
            api_key_updated,
        })
    }
}

fn absolutize(cwd: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}
