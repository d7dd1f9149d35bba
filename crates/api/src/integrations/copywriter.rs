//! HTTP client for the optional description-generation endpoint.
//!
//! The endpoint receives `{"prompt", "max_chars", "locale"}` and answers
//! `{"text": "..."}`.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::CopywriterConfig;

/// Generation is slower than a lookup; still bounded well below the
/// request timeout.
const GENERATION_TIMEOUT: Duration = Duration::from_secs(20);

/// Errors from the copywriter HTTP layer.
#[derive(Debug, thiserror::Error)]
pub enum CopywriterError {
    #[error("Copywriter is not configured")]
    NotConfigured,

    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service returned a non-2xx status code.
    #[error("Copywriter API error ({status}): {body}")]
    ApiError { status: u16, body: String },

    #[error("Copywriter returned empty text")]
    Empty,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    prompt: &'a str,
    max_chars: usize,
    locale: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    text: String,
}

pub struct CopywriterClient {
    client: reqwest::Client,
    config: Option<CopywriterConfig>,
}

impl CopywriterClient {
    pub fn new(config: Option<CopywriterConfig>) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_some()
    }

    /// Ask the endpoint for text. Never retried.
    pub async fn generate(
        &self,
        prompt: &str,
        max_chars: usize,
        locale: &str,
    ) -> Result<String, CopywriterError> {
        let config = self.config.as_ref().ok_or(CopywriterError::NotConfigured)?;

        let mut request = self
            .client
            .post(&config.url)
            .timeout(GENERATION_TIMEOUT)
            .json(&GenerateRequest {
                prompt,
                max_chars,
                locale,
            });
        if let Some(key) = &config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CopywriterError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        let body: GenerateResponse = response.json().await?;
        let text = body.text.trim();
        if text.is_empty() {
            return Err(CopywriterError::Empty);
        }
        Ok(text.to_string())
    }
}
