//! One-shot challenge status lookup.

use crate::api::types::ChallengeStatus;
use crate::api::{encode_path_segment, ApiClient};
use crate::error::{Result, TetherError};

#[derive(Clone)]
pub struct StatusPoller {
    api: ApiClient,
}

impl StatusPoller {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// `GET /challenge/{code}`, single attempt.
    pub async fn fetch(&self, code: &str) -> Result<ChallengeStatus> {
        let path = format!("/challenge/{}", encode_path_segment(code));
        let raw: serde_json::Value = self.api.get_json(&path, None).await?;
        ChallengeStatus::from_value(raw)
            .map_err(|e| TetherError::InvalidResponse(format!("unexpected challenge status: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::ChallengeState;
    use crate::api::ScriptedTransport;
    use serde_json::json;
    use std::sync::Arc;

    fn poller(transport: Arc<ScriptedTransport>) -> StatusPoller {
        StatusPoller::new(ApiClient::new("https://api.example.com", transport))
    }

    #[tokio::test]
    async fn code_is_encoded_exactly_once() {
        let transport = Arc::new(
            ScriptedTransport::new().respond_json(200, json!({"code": "a/b c", "status": "pending"})),
        );
        poller(transport.clone()).fetch("a/b c").await.unwrap();
        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, "https://api.example.com/challenge/a%2Fb%20c");
    }

    #[tokio::test]
    async fn both_schemas_decode() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .respond_json(200, json!({"challenge": "x", "status": "verified", "createdAt": 0}))
                .respond_json(
                    200,
                    json!({"code": "y", "status": "failed", "createdAt": "2026-01-15T00:00:00Z"}),
                ),
        );
        let p = poller(transport);
        let legacy = p.fetch("x").await.unwrap();
        assert_eq!(legacy.code.as_deref(), Some("x"));
        assert_eq!(legacy.status, Some(ChallengeState::Verified));

        let current = p.fetch("y").await.unwrap();
        assert_eq!(current.status, Some(ChallengeState::Failed));
        assert_eq!(
            current.created_at.and_then(|t| t.display()).as_deref(),
            Some("2026-01-15T00:00:00.000Z")
        );
    }

    #[tokio::test]
    async fn unknown_code_is_service_error() {
        let transport = Arc::new(ScriptedTransport::new().respond(404, "challenge not found"));
        let err = poller(transport).fetch("nope").await.unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.to_string(), "API returned 404: challenge not found");
    }

    #[tokio::test]
    async fn transport_failure_is_network_error() {
        let transport = Arc::new(ScriptedTransport::new().fail("connection refused"));
        let err = poller(transport).fetch("abc").await.unwrap_err();
        assert!(matches!(err, TetherError::Network(ref m) if m == "connection refused"));
    }

    #[tokio::test]
    async fn body_without_status_still_renders() {
        let transport = Arc::new(
            ScriptedTransport::new().respond_json(200, json!({"challenge": "abc", "createdAt": 0})),
        );
        let status = poller(transport).fetch("abc").await.unwrap();
        assert_eq!(status.code.as_deref(), Some("abc"));
        assert_eq!(status.status, None);
        assert!(status.created_at.is_some());
    }

    #[tokio::test]
    async fn non_object_body_is_invalid_response() {
        let transport = Arc::new(ScriptedTransport::new().respond_json(200, json!("ok")));
        let err = poller(transport).fetch("abc").await.unwrap_err();
        assert!(matches!(err, TetherError::InvalidResponse(_)));
    }
}
