//! Thin JSON client over a [`Transport`].

use super::transport::{ApiRequest, ApiResponse, Method, Transport};
use crate::error::{Result, TetherError};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

/// Characters `encodeURIComponent` leaves alone: alphanumerics and `-_.!~*'()`.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encode one path segment. `a/b c` becomes `a%2Fb%20c`.
pub fn encode_path_segment(segment: &str) -> String {
    utf8_percent_encode(segment, PATH_SEGMENT).to_string()
}

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    transport: Arc<dyn Transport>,
}

impl ApiClient {
    pub fn new(base_url: &str, transport: Arc<dyn Transport>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Join `path` (already encoded, leading `/`) onto the base URL.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str, bearer: Option<&str>) -> Result<T> {
        let resp = self.execute(Method::Get, path, bearer, None).await?;
        Self::parse_response(&resp)
    }

    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        bearer: Option<&str>,
    ) -> Result<T> {
        let body = serde_json::to_value(body)
            .map_err(|e| TetherError::InvalidResponse(format!("failed to encode request: {e}")))?;
        let resp = self.execute(Method::Post, path, bearer, Some(body)).await?;
        Self::parse_response(&resp)
    }

    pub async fn delete(&self, path: &str, bearer: Option<&str>) -> Result<()> {
        self.execute(Method::Delete, path, bearer, None).await?;
        Ok(())
    }

    /// Send once; non-2xx becomes [`TetherError::Service`].
    async fn execute(
        &self,
        method: Method,
        path: &str,
        bearer: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> Result<ApiResponse> {
        let url = self.url(path);
        tracing::debug!("{} {}", method, url);
        let resp = self
            .transport
            .send(ApiRequest {
                method,
                url,
                bearer: bearer.map(str::to_string),
                body,
            })
            .await?;
        tracing::debug!(status = resp.status, "response received");

        if !resp.is_success() {
            let body = if resp.body.trim().is_empty() {
                reqwest::StatusCode::from_u16(resp.status)
                    .ok()
                    .and_then(|s| s.canonical_reason())
                    .unwrap_or_default()
                    .to_string()
            } else {
                resp.body.clone()
            };
            return Err(TetherError::Service {
                status: resp.status,
                body,
            });
        }
        Ok(resp)
    }

    fn parse_response<T: DeserializeOwned>(resp: &ApiResponse) -> Result<T> {
        serde_json::from_str(&resp.body)
            .map_err(|e| TetherError::InvalidResponse(format!("failed to parse response: {e}")))
    }
}
