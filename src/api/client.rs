//! HTTP client for the condominium platform backend.
//!
//! All endpoints answer with a `{success, ...}` envelope. The client decodes
//! that envelope at the boundary: `success: true` yields the typed payload,
//! `success: false` yields the server message, and anything else (non-2xx
//! status, malformed body) is a transport failure.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::auth::TokenProvider;
use super::error::{ApiError, ApiResult};

/// Authenticated HTTP client for the platform backend.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn TokenProvider>,
}

impl ApiClient {
    /// Create a new client.
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the backend (e.g., "https://api.example.com")
    /// * `timeout` - Per-request timeout
    /// * `tokens` - Source of the session bearer token
    pub fn new(base_url: String, timeout: Duration, tokens: Arc<dyn TokenProvider>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        // Ensure base_url doesn't have trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();

        Self {
            http,
            base_url,
            tokens,
        }
    }

    /// Get the base URL of the backend.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issue a GET request and decode the success envelope into `T`.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let token = self.session_token()?;
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "GET");
        let response = self.http.get(&url).bearer_auth(token).send().await?;
        Self::decode_envelope(response).await
    }

    /// Issue a POST request with a JSON body and decode the success envelope.
    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let token = self.session_token()?;
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "POST");
        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;
        Self::decode_envelope(response).await
    }

    /// Issue a POST request without a body and decode the success envelope.
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let token = self.session_token()?;
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "POST");
        let response = self.http.post(&url).bearer_auth(token).send().await?;
        Self::decode_envelope(response).await
    }

    /// Pre-flight token check. Fails without touching the network when no
    /// session is established.
    fn session_token(&self) -> ApiResult<String> {
        self.tokens.bearer_token().ok_or(ApiError::AuthMissing)
    }

    async fn decode_envelope<T: DeserializeOwned>(response: reqwest::Response) -> ApiResult<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Transport(format!(
                "HTTP {}: {}",
                status.as_u16(),
                body
            )));
        }

        let value: Value = response
            .json()
            .await
            .map_err(|e| ApiError::Transport(format!("malformed response body: {}", e)))?;

        match value.get("success").and_then(Value::as_bool) {
            Some(true) => serde_json::from_value(value)
                .map_err(|e| ApiError::Transport(format!("unexpected response shape: {}", e))),
            Some(false) => {
                let message = value
                    .get("error")
                    .and_then(Value::as_str)
                    .unwrap_or("unspecified error")
                    .to_string();
                Err(ApiError::Rejected(message))
            }
            None => Err(ApiError::Transport(
                "response is missing the success flag".to_string(),
            )),
        }
    }
}
