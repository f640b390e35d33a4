//! Tether: identity verification for AI agents
//!
//! Client for the tether.name challenge-response service. A credential is an
//! RSA keypair bound to a service-assigned id; proving identity means
//! requesting a challenge, signing it locally, and submitting the proof.

pub mod agents;
pub mod api;
pub mod cli;
pub mod config;
pub mod credential;
pub mod display;
pub mod error;
pub mod fs_secure;
pub mod init;
pub mod logging;
pub mod protocol;
pub mod status;

pub use error::{CredentialError, Result, TetherError};
