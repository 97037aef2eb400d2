//! OpenAI-compatible completion backend over HTTP.

use super::{CompletionBackend, CompletionRequest, CompletionResponse};
use crate::error::{Result, StafettError};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Default timeout for completion requests (5 minutes).
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Completion backend speaking the OpenAI chat-completions wire protocol.
///
/// Works against any OpenAI-compatible endpoint; the base URL and API key
/// are explicit constructor parameters.
pub struct OpenAIBackend {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OpenAIBackend {
    /// Create a backend with the default request timeout.
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        Self::with_timeout(base_url, api_key, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a backend with a custom request timeout.
    pub fn with_timeout(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        Url::parse(base_url)
            .map_err(|e| StafettError::Config(format!("Invalid completion base URL: {e}")))?;

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(StafettError::Http)?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl CompletionBackend for OpenAIBackend {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        debug!(model = %request.model, messages = request.messages.len(), "Sending completion request");

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(StafettError::Completion(extract_error_message(&body, status)));
        }

        let raw: Value = serde_json::from_str(&body)?;
        let mut parsed: CompletionResponse = serde_json::from_value(raw.clone())?;
        parsed.raw = Some(raw);
        Ok(parsed)
    }
}

/// Pull the provider's error message out of an error body, falling back to
/// a generic status-based message.
fn extract_error_message(body: &str, status: StatusCode) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .as_ref()
        .and_then(|v| v.get("error"))
        .and_then(|e| e.get("message"))
        .and_then(|m| m.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| format!("Completion request failed with status {status}"))
}
