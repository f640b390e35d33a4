//! Request and response shapes for the verification service.
//!
//! Only the fields the workflow depends on are modelled. Decoding is lenient:
//! timestamps may arrive as epoch milliseconds or ISO-8601 strings, and
//! challenge identifiers as `code` or `challenge`.

use crate::display;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A service timestamp in whichever form it was sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    EpochMillis(f64),
    Iso(String),
}

impl Timestamp {
    /// Millisecond UTC rendering; unparseable strings are shown as sent.
    pub fn display(&self) -> Option<String> {
        match self {
            Timestamp::EpochMillis(ms) => display::format_epoch_ms(Some(*ms)),
            Timestamp::Iso(raw) if raw.is_empty() => None,
            Timestamp::Iso(raw) => Some(display::normalize_iso(raw).unwrap_or_else(|| raw.clone())),
        }
    }
}

// ---------------------------------------------------------------------------
// Challenge / verify
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeRequest<'a> {
    pub credential_id: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChallengeResponse {
    #[serde(alias = "challenge")]
    pub code: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofSubmission<'a> {
    pub challenge: &'a str,
    pub proof: &'a str,
    pub credential_id: &'a str,
}

/// Verify endpoint response as sent on the wire.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResponse {
    #[serde(default)]
    pub verified: Option<bool>,
    /// Older name for `verified`.
    #[serde(default)]
    pub valid: Option<bool>,
    #[serde(default)]
    pub agent_name: Option<String>,
    #[serde(default)]
    pub verify_url: Option<String>,
    #[serde(default)]
    pub registered_since: Option<Timestamp>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

pub const DEFAULT_VERIFICATION_ERROR: &str = "verification failed";

/// Outcome of one verify run.
///
/// `verified == false` always carries a non-empty `error`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    pub verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verify_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registered_since: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl VerificationResponse {
    /// True when either flag says so.
    pub fn is_verified(&self) -> bool {
        self.verified.unwrap_or(false) || self.valid.unwrap_or(false)
    }
}

impl From<VerificationResponse> for VerificationResult {
    fn from(resp: VerificationResponse) -> Self {
        let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        if resp.is_verified() {
            return Self {
                verified: true,
                agent_name: non_empty(resp.agent_name),
                verify_url: non_empty(resp.verify_url),
                registered_since: resp.registered_since,
                error: None,
            };
        }
        let error = non_empty(resp.error)
            .or_else(|| non_empty(resp.message))
            .unwrap_or_else(|| DEFAULT_VERIFICATION_ERROR.to_string());
        Self {
            verified: false,
            agent_name: None,
            verify_url: None,
            registered_since: None,
            error: Some(error),
        }
    }
}

// ---------------------------------------------------------------------------
// Challenge status
// ---------------------------------------------------------------------------

/// Lifecycle of a challenge as reported by the service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum ChallengeState {
    Pending,
    Verified,
    Failed,
    /// A status this client does not know about yet.
    Other(String),
}

impl From<String> for ChallengeState {
    fn from(raw: String) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "pending" => ChallengeState::Pending,
            "verified" => ChallengeState::Verified,
            "failed" => ChallengeState::Failed,
            _ => ChallengeState::Other(raw),
        }
    }
}

impl fmt::Display for ChallengeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChallengeState::Pending => f.write_str("pending"),
            ChallengeState::Verified => f.write_str("verified"),
            ChallengeState::Failed => f.write_str("failed"),
            ChallengeState::Other(raw) => f.write_str(raw),
        }
    }
}

/// Result of an out-of-band status lookup.
///
/// Accepts both observed response shapes; the untouched payload is kept in `raw`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeStatus {
    #[serde(default, alias = "challenge")]
    pub code: Option<String>,
    #[serde(default)]
    pub status: Option<ChallengeState>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
    #[serde(default)]
    pub verified_at: Option<Timestamp>,
    #[serde(default)]
    pub agent_name: Option<String>,
    #[serde(skip)]
    pub raw: serde_json::Value,
}

impl ChallengeStatus {
    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        let mut status: ChallengeStatus = serde_json::from_value(value.clone())?;
        status.raw = value;
        Ok(status)
    }
}

// ---------------------------------------------------------------------------
// Agents
// ---------------------------------------------------------------------------

/// A registered agent as returned by list. Never carries the registration token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: String,
    pub agent_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_verified_at: Option<Timestamp>,
}

/// Creation response: the agent plus its one-time registration token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedAgent {
    #[serde(flatten)]
    pub agent: Agent,
    pub registration_token: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAgentRequest<'a> {
    pub agent_name: &'a str,
    pub description: &'a str,
}

/// List endpoint: bare array or `{ "agents": [...] }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AgentList {
    Bare(Vec<Agent>),
    Wrapped { agents: Vec<Agent> },
}

impl AgentList {
    pub fn into_vec(self) -> Vec<Agent> {
        match self {
            AgentList::Bare(agents) | AgentList::Wrapped { agents } => agents,
        }
    }
}
