//! Challenge-response verification.
//!
//! The workflow is a typestate machine: each state is its own type and each edge
//! consumes the previous state, so steps cannot be skipped or reordered.
//!
//! ```text
//! Idle -> ChallengeRequested -> Signed -> ProofSubmitted -> Verified | Failed
//! ```
//!
//! Partial commands run prefixes of the same graph: `challenge` stops after the
//! first edge, `sign` enters at [`ChallengeRequested::external`].

use crate::api::types::{
    ChallengeRequest, ChallengeResponse, ProofSubmission, VerificationResponse, VerificationResult,
};
use crate::api::ApiClient;
use crate::credential::{CredentialStore, Proof};
use crate::error::{Result, TetherError};
use std::fmt;
use std::path::Path;

const PROOF_PREVIEW_CHARS: usize = 32;

/// Names of the workflow states, for traces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyState {
    Idle,
    ChallengeRequested,
    Signed,
    ProofSubmitted,
    Verified,
    Failed,
}

impl fmt::Display for VerifyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VerifyState::Idle => "idle",
            VerifyState::ChallengeRequested => "challenge_requested",
            VerifyState::Signed => "signed",
            VerifyState::ProofSubmitted => "proof_submitted",
            VerifyState::Verified => "verified",
            VerifyState::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct Idle {
    credential_id: String,
}

impl Idle {
    pub fn new(credential_id: impl Into<String>) -> Self {
        Self {
            credential_id: credential_id.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChallengeRequested {
    credential_id: Option<String>,
    code: String,
}

impl ChallengeRequested {
    /// A challenge obtained out of band. Can be signed but not submitted.
    pub fn external(code: impl Into<String>) -> Self {
        Self {
            credential_id: None,
            code: code.into(),
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }
}

#[derive(Debug, Clone)]
pub struct Signed {
    credential_id: Option<String>,
    code: String,
    proof: Proof,
}

impl Signed {
    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn proof(&self) -> &Proof {
        &self.proof
    }

    pub fn into_proof(self) -> Proof {
        self.proof
    }
}

#[derive(Debug, Clone)]
pub struct ProofSubmitted {
    response: VerificationResponse,
}

/// Terminal state of a verify run.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Verified(VerificationResult),
    Failed(VerificationResult),
}

impl Outcome {
    pub fn result(&self) -> &VerificationResult {
        match self {
            Outcome::Verified(r) | Outcome::Failed(r) => r,
        }
    }

    pub fn into_result(self) -> VerificationResult {
        match self {
            Outcome::Verified(r) | Outcome::Failed(r) => r,
        }
    }

    pub fn is_verified(&self) -> bool {
        matches!(self, Outcome::Verified(_))
    }
}

/// Drives the verification workflow against the service.
#[derive(Clone)]
pub struct ProtocolClient {
    api: ApiClient,
    credentials: CredentialStore,
}

impl ProtocolClient {
    pub fn new(api: ApiClient, credentials: CredentialStore) -> Self {
        Self { api, credentials }
    }

    /// `POST /challenge`.
    pub async fn request_challenge(&self, state: Idle) -> Result<ChallengeRequested> {
        let body = ChallengeRequest {
            credential_id: &state.credential_id,
        };
        let resp: ChallengeResponse = self.api.post_json("/challenge", &body, None).await?;
        if resp.code.is_empty() {
            return Err(TetherError::InvalidResponse(
                "challenge response did not include a code".to_string(),
            ));
        }
        tracing::debug!(state = %VerifyState::ChallengeRequested, code = %resp.code, "challenge issued");
        Ok(ChallengeRequested {
            credential_id: Some(state.credential_id),
            code: resp.code,
        })
    }

    /// Sign the challenge code with the key at `key_path`. No network.
    pub fn sign(&self, state: ChallengeRequested, key_path: &str) -> Result<Signed> {
        if key_path.is_empty() {
            return Err(TetherError::CredentialMissing);
        }
        let proof = {
            let handle = self.credentials.load(Path::new(key_path))?;
            self.credentials.sign(&handle, state.code.as_bytes())
        };
        tracing::debug!(
            state = %VerifyState::Signed,
            proof = %proof.preview(PROOF_PREVIEW_CHARS),
            "challenge signed"
        );
        Ok(Signed {
            credential_id: state.credential_id,
            code: state.code,
            proof,
        })
    }

    /// `POST /challenge/verify`.
    pub async fn submit_proof(&self, state: Signed) -> Result<ProofSubmitted> {
        let credential_id = state
            .credential_id
            .as_deref()
            .ok_or_else(TetherError::missing_credential_id)?;
        let body = ProofSubmission {
            challenge: &state.code,
            proof: state.proof.as_str(),
            credential_id,
        };
        let response: VerificationResponse =
            self.api.post_json("/challenge/verify", &body, None).await?;
        tracing::debug!(state = %VerifyState::ProofSubmitted, "proof submitted");
        Ok(ProofSubmitted { response })
    }

    /// Read the terminal outcome from the verify response.
    pub fn conclude(&self, state: ProofSubmitted) -> Outcome {
        let result = VerificationResult::from(state.response);
        if result.verified {
            tracing::debug!(state = %VerifyState::Verified, agent = ?result.agent_name, "verification succeeded");
            Outcome::Verified(result)
        } else {
            tracing::debug!(state = %VerifyState::Failed, error = ?result.error, "verification failed");
            Outcome::Failed(result)
        }
    }

    /// Full run: request, sign, submit, conclude.
    pub async fn verify(&self, credential_id: &str, key_path: &str) -> Result<Outcome> {
        if credential_id.is_empty() {
            return Err(TetherError::missing_credential_id());
        }
        if key_path.is_empty() {
            return Err(TetherError::CredentialMissing);
        }
        tracing::debug!(state = %VerifyState::Idle, "starting verification");
        let requested = self.request_challenge(Idle::new(credential_id)).await?;
        let signed = self.sign(requested, key_path)?;
        let submitted = self.submit_proof(signed).await?;
        Ok(self.conclude(submitted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ScriptedTransport;
    use crate::error::CredentialError;
    use serde_json::json;
    use std::sync::Arc;

    fn client(transport: Arc<ScriptedTransport>) -> ProtocolClient {
        ProtocolClient::new(
            ApiClient::new("https://api.example.com", transport),
            CredentialStore::new(),
        )
    }

    fn keypair() -> (tempfile::TempDir, String) {
        let dir = tempfile::tempdir().unwrap();
        let paths = CredentialStore::new().generate(dir.path()).unwrap();
        let path = paths.private_key.to_string_lossy().into_owned();
        (dir, path)
    }

    #[tokio::test]
    async fn full_run_walks_every_edge() {
        let (_dir, key_path) = keypair();
        let transport = Arc::new(
            ScriptedTransport::new()
                .respond_json(200, json!({"code": "abc-123"}))
                .respond_json(
                    200,
                    json!({"verified": true, "agentName": "TestBot", "verifyUrl": "https://tether.name/v/1"}),
                ),
        );
        let outcome = client(transport.clone())
            .verify("cred-1", &key_path)
            .await
            .unwrap();

        assert!(outcome.is_verified());
        assert_eq!(outcome.result().agent_name.as_deref(), Some("TestBot"));

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].url, "https://api.example.com/challenge");
        assert_eq!(requests[0].body, Some(json!({"credentialId": "cred-1"})));
        assert_eq!(requests[1].url, "https://api.example.com/challenge/verify");
        let submitted = requests[1].body.as_ref().unwrap();
        assert_eq!(submitted["challenge"], "abc-123");
        assert_eq!(submitted["credentialId"], "cred-1");
        assert!(!submitted["proof"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn rejected_proof_is_failed_outcome_with_error() {
        let (_dir, key_path) = keypair();
        let transport = Arc::new(
            ScriptedTransport::new()
                .respond_json(200, json!({"challenge": "abc"}))
                .respond_json(200, json!({"valid": false})),
        );
        let outcome = client(transport).verify("cred-1", &key_path).await.unwrap();
        assert!(!outcome.is_verified());
        assert_eq!(outcome.result().error.as_deref(), Some("verification failed"));
    }

    #[tokio::test]
    async fn missing_key_path_fails_before_network() {
        let transport = Arc::new(ScriptedTransport::new());
        let err = client(transport.clone()).verify("cred-1", "").await.unwrap_err();
        assert!(matches!(err, TetherError::CredentialMissing));
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn service_error_on_challenge_stops_the_run() {
        let (_dir, key_path) = keypair();
        let transport = Arc::new(ScriptedTransport::new().respond(401, "unknown credential"));
        let err = client(transport.clone())
            .verify("cred-1", &key_path)
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(401));
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn unreadable_key_never_submits() {
        let transport = Arc::new(ScriptedTransport::new().respond_json(200, json!({"code": "c"})));
        let err = client(transport.clone())
            .verify("cred-1", "/definitely/not/here.pem")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TetherError::Credential(CredentialError::KeyNotFound(_))
        ));
        assert_eq!(transport.request_count(), 1);
    }

    #[test]
    fn external_challenge_signs_offline() {
        let (_dir, key_path) = keypair();
        let transport = Arc::new(ScriptedTransport::new());
        let signed = client(transport.clone())
            .sign(ChallengeRequested::external("abc"), &key_path)
            .unwrap();
        assert_eq!(signed.code(), "abc");
        assert_eq!(
            signed.proof().decode().unwrap().len(),
            crate::credential::RSA_KEY_BITS / 8
        );
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn external_challenge_cannot_be_submitted() {
        let (_dir, key_path) = keypair();
        let transport = Arc::new(ScriptedTransport::new());
        let proto = client(transport.clone());
        let signed = proto
            .sign(ChallengeRequested::external("abc"), &key_path)
            .unwrap();
        let err = proto.submit_proof(signed).await.unwrap_err();
        assert!(matches!(err, TetherError::ConfigIncomplete { .. }));
        assert_eq!(transport.request_count(), 0);
    }

    #[test]
    fn state_names_render_for_traces() {
        assert_eq!(VerifyState::ChallengeRequested.to_string(), "challenge_requested");
        assert_eq!(VerifyState::Failed.to_string(), "failed");
    }
}
