//! Completion backend: send one prompt, get one answer.
//!
//! The service talks to a single OpenAI-compatible `/chat/completions`
//! endpoint. Model, base URL, and sampling parameters are fixed: low
//! temperature and low nucleus mass bias the model toward deterministic,
//! context-grounded output.
//!
//! Each call is a single attempt. Any failure (transport, non-2xx status,
//! unexpected body) is reported with the backend's own detail and never
//! retried.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::debug;

/// Base URL of the completion API.
pub const DEFAULT_BASE_URL: &str = "https://api.sambanova.ai/v1";

/// Model every question is sent to.
pub const DEFAULT_MODEL: &str = "Llama-4-Maverick-17B-128E-Instruct";

/// Sampling temperature.
pub const TEMPERATURE: f32 = 0.1;

/// Nucleus-sampling probability mass.
pub const TOP_P: f32 = 0.1;

/// A failed completion call. The message is surfaced to the caller.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct BackendError {
    pub message: String,
}

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Generates an answer for a fully built prompt.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Send `prompt` as the sole user message and return the response text
    /// unmodified.
    async fn complete(&self, prompt: &str) -> Result<String, BackendError>;
}

// ── Wire types ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    top_p: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: Vec<ContentPart<'a>>,
}

#[derive(Debug, Serialize)]
struct ContentPart<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

fn build_request(prompt: &str) -> ChatRequest<'_> {
    ChatRequest {
        model: DEFAULT_MODEL,
        messages: vec![ChatMessage {
            role: "user",
            content: vec![ContentPart {
                kind: "text",
                text: prompt,
            }],
        }],
        temperature: TEMPERATURE,
        top_p: TOP_P,
    }
}

fn parse_response(body: &str) -> Result<String, BackendError> {
    let parsed: ChatResponse = serde_json::from_str(body)
        .map_err(|e| BackendError::new(format!("unexpected response body: {e}")))?;
    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| BackendError::new("response contained no message content"))
}

/// [`CompletionBackend`] for an OpenAI-compatible chat completions API.
#[derive(Debug, Clone)]
pub struct ChatCompletionsBackend {
    client: Client,
    api_key: String,
    base_url: String,
}

impl ChatCompletionsBackend {
    /// Client for [`DEFAULT_BASE_URL`] with a per-request timeout.
    pub fn new(api_key: impl Into<String>, timeout_secs: u64) -> Result<Self, BackendError> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL, timeout_secs)
    }

    pub(crate) fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| BackendError::new(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl CompletionBackend for ChatCompletionsBackend {
    async fn complete(&self, prompt: &str) -> Result<String, BackendError> {
        let start = Instant::now();
        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&build_request(prompt))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    BackendError::new(format!("request timed out: {e}"))
                } else {
                    BackendError::new(e.to_string())
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BackendError::new(format!("failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(BackendError::new(format!("HTTP {status}: {body}")));
        }

        let answer = parse_response(&body)?;
        debug!(
            "Completion: {} prompt chars → {} answer chars in {:?}",
            prompt.len(),
            answer.len(),
            start.elapsed()
        );
        Ok(answer)
    }
}
