//! Error types for the tether client.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures while loading, generating, or using a signing credential.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// No key file at the configured path.
    #[error("private key not found at {}", .0.display())]
    KeyNotFound(PathBuf),

    /// The key file exists but is not a supported key format.
    #[error("failed to parse private key at {}: {reason}", .path.display())]
    KeyParse { path: PathBuf, reason: String },

    /// Reading or writing key material failed.
    #[error("key file I/O failed for {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The random source could not produce a key.
    #[error("failed to generate key: {0}")]
    Generation(String),

    /// Encoding a freshly generated key failed.
    #[error("failed to encode key: {0}")]
    Encoding(String),
}

/// Top-level error for every tether operation.
#[derive(Debug, Error)]
pub enum TetherError {
    /// A configuration field required by the command is unset.
    #[error("No {field} configured. {hint}")]
    ConfigIncomplete {
        field: &'static str,
        hint: &'static str,
    },

    /// Signing was requested but no private key path is configured.
    #[error(
        "No private key path configured. Run \"tether init\" or set TETHER_PRIVATE_KEY_PATH."
    )]
    CredentialMissing,

    #[error(transparent)]
    Credential(#[from] CredentialError),

    /// The request never produced an HTTP response.
    #[error("network error: {0}")]
    Network(String),

    /// The service answered with a non-2xx status.
    #[error("API returned {status}: {body}")]
    Service { status: u16, body: String },

    /// A management operation was attempted without an API key.
    #[error("No API key configured. Set TETHER_API_KEY or pass --api-key.")]
    Unauthorized,

    /// A 2xx response whose body could not be decoded.
    #[error("invalid response from API: {0}")]
    InvalidResponse(String),

    /// Persisting configuration failed or setup was aborted.
    #[error("{0}")]
    Config(String),

    /// An interactive prompt failed.
    #[error("failed to read input: {0}")]
    Input(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl TetherError {
    /// Missing credential id, with the hint shown by every command that needs one.
    pub fn missing_credential_id() -> Self {
        TetherError::ConfigIncomplete {
            field: "credential ID",
            hint: "Run \"tether init\" or set TETHER_CREDENTIAL_ID.",
        }
    }

    /// HTTP status for service errors, `None` for everything else.
    pub fn status(&self) -> Option<u16> {
        match self {
            TetherError::Service { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, TetherError>;
