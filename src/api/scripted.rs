//! In-memory transport that replays queued replies and records every request.

use super::transport::{ApiRequest, ApiResponse, Transport};
use crate::error::{Result, TetherError};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;

#[derive(Debug, Clone)]
enum Reply {
    Response(ApiResponse),
    NetworkFailure(String),
}

/// Offline [`Transport`]: replies are consumed in order, one per request.
///
/// A request with nothing queued fails as a network error.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, status: u16, body: impl Into<String>) -> Self {
        self.push_response(status, body);
        self
    }

    pub fn respond_json(self, status: u16, body: serde_json::Value) -> Self {
        self.respond(status, body.to_string())
    }

    pub fn fail(self, message: impl Into<String>) -> Self {
        self.replies
            .lock()
            .push_back(Reply::NetworkFailure(message.into()));
        self
    }

    pub fn push_response(&self, status: u16, body: impl Into<String>) {
        self.replies.lock().push_back(Reply::Response(ApiResponse {
            status,
            body: body.into(),
        }));
    }

    /// Every request sent so far, oldest first.
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let label = format!("{} {}", request.method, request.url);
        self.requests.lock().push(request);
        match self.replies.lock().pop_front() {
            Some(Reply::Response(resp)) => Ok(resp),
            Some(Reply::NetworkFailure(message)) => Err(TetherError::Network(message)),
            None => Err(TetherError::Network(format!(
                "no scripted response for {label}"
            ))),
        }
    }
}
