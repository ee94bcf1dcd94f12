//! OpenAI-compatible chat completion provider (`/v1/chat/completions`).
//!
//! One request per call: `[system, user]` messages, fixed model, fixed
//! temperature and `max_tokens` ceiling, bounded by the client timeout. The
//! first choice's content is returned unprocessed. All wire types are private
//! to this module.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, trace};

use crate::config::OpenAiConfig;
use crate::llm::ProviderError;

/// Adapter for any HTTP endpoint implementing `/v1/chat/completions`.
///
/// Cheap to clone: `reqwest::Client` is an `Arc` internally.
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleProvider {
    client: Client,
    api_base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    api_key: Option<String>,
}

impl OpenAiCompatibleProvider {
    /// `api_key`, when present, is sent as `Authorization: Bearer <key>`.
    pub fn new(config: &OpenAiConfig, api_key: Option<String>) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| ProviderError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_base_url: config.api_base_url.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            api_key,
        })
    }

    pub async fn generate(&self, system: &str, user: &str) -> Result<String, ProviderError> {
        let payload = ChatCompletionRequest {
            model: &self.model,
            messages: [
                Message { role: "system", content: system },
                Message { role: "user", content: user },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        debug!(
            model = %payload.model,
            max_tokens = payload.max_tokens,
            user_len = user.len(),
            "sending LLM request"
        );
        if tracing::enabled!(tracing::Level::TRACE) {
            let json = serde_json::to_string_pretty(&payload)
                .unwrap_or_else(|e| format!("<serialization failed: {e}>"));
            trace!(payload = %json, "full LLM request payload");
        }

        let mut req = self.client.post(&self.api_base_url).json(&payload);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let response = req.send().await.map_err(|e| {
            error!(url = %self.api_base_url, error = %e, timeout = e.is_timeout(), "LLM HTTP request failed (transport)");
            ProviderError::Request(e.to_string())
        })?;

        let response = check_status(response).await?;

        let parsed = response.json::<ChatCompletionResponse>().await.map_err(|e| {
            error!(error = %e, "failed to deserialize LLM response");
            ProviderError::Request(format!("failed to parse response body: {e}"))
        })?;

        debug!(choices = parsed.choices.len(), "received LLM response");

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ProviderError::Request("missing content in response".into()))?;

        trace!(reply = %text, "LLM reply text");
        Ok(text)
    }
}

// ── Private wire types ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [Message<'a>; 2],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

// Error envelope used by OpenAI and compatible APIs.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Pass successful responses through; turn anything else into an error that
/// carries the upstream message.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<failed to read error body>".to_string());

    let message = match serde_json::from_str::<ErrorEnvelope>(&body) {
        Ok(env) => format!("HTTP {status}: {}", env.error.message),
        Err(_) => format!("HTTP {status}: {body}"),
    };

    error!(%status, %message, "LLM request returned HTTP error");
    Err(ProviderError::Request(message))
}
