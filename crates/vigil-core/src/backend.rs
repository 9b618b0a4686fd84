//! HTTP client for the remote prediction backend
//!
//! The backend is an opaque POST-and-relay collaborator: Vigil forwards
//! validated payloads and hands the response back to the caller. Errors
//! keep the two failure modes distinct so the HTTP layer can translate
//! them faithfully: an upstream error response carries the upstream's own
//! status and body; a transport failure means the upstream was never
//! reached at all.

use std::time::Duration;

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Environment variable naming the prediction backend base URL
pub const BACKEND_URL_ENV: &str = "VIGIL_BACKEND_URL";

/// Request timeout for backend calls
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Error, Debug)]
pub enum BackendError {
    /// The backend answered with an error status; relay it as-is
    #[error("Backend returned {status}: {body}")]
    Upstream { status: u16, body: String },

    /// The backend could not be reached at all
    #[error("Backend request failed: {0}")]
    Unreachable(String),
}

/// Client for the prediction backend
pub struct BackendClient {
    base_url: String,
    client: reqwest::Client,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Create a client from VIGIL_BACKEND_URL, or None when unset
    pub fn from_env() -> Option<Self> {
        std::env::var(BACKEND_URL_ENV)
            .ok()
            .filter(|url| !url.trim().is_empty())
            .map(Self::new)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn post_cashflow(&self, payload: &Value) -> Result<Value, BackendError> {
        self.post("/predictions/cashflow", payload).await
    }

    pub async fn post_inventory(&self, payload: &Value) -> Result<Value, BackendError> {
        self.post("/predictions/inventory", payload).await
    }

    pub async fn post_anomalies(&self, payload: &Value) -> Result<Value, BackendError> {
        self.post("/predictions/anomalies", payload).await
    }

    async fn post(&self, path: &str, payload: &Value) -> Result<Value, BackendError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "Forwarding payload to prediction backend");

        let response = self
            .client
            .post(&url)
            .json(payload)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| BackendError::Unreachable(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BackendError::Unreachable(e.to_string()))?;

        if status.as_u16() >= 400 {
            return Err(BackendError::Upstream {
                status: status.as_u16(),
                body: if body.is_empty() {
                    "No response body".to_string()
                } else {
                    body
                },
            });
        }

        // Non-JSON success bodies are wrapped rather than rejected
        Ok(serde_json::from_str(&body)
            .unwrap_or_else(|_| serde_json::json!({ "raw": body })))
    }
}
