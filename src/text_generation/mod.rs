//! Text generation collaborator
//!
//! The AI-insight probe asks a `TextGenerator` for a short written review
//! of a page. `ChatCompletionGenerator` talks to any OpenAI-compatible
//! chat-completions endpoint.

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

pub const API_KEY_ENV: &str = "SITESCAN_AI_API_KEY";
pub const ENDPOINT_ENV: &str = "SITESCAN_AI_ENDPOINT";
pub const MODEL_ENV: &str = "SITESCAN_AI_MODEL";

const SYSTEM_PROMPT: &str = "You are a website quality reviewer. Answer with a two-sentence \
summary followed by at most five recommendations, one per line, each starting with '- '.";

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("Text generation is not configured")]
    NotConfigured,

    #[error("Text generation request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Text generation service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Text generation service returned no text")]
    EmptyResponse,

    #[error("Text generation timed out after {0:?}")]
    Timeout(Duration),
}

/// `generate(prompt) -> text`. Callers must have a non-generated fallback.
pub trait TextGenerator: Send + Sync {
    fn generate<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String, GenerationError>>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ChatCompletionGenerator {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl ChatCompletionGenerator {
    #[must_use]
    pub fn new(
        client: reqwest::Client,
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    /// Generator configured from `SITESCAN_AI_*` variables, or `None` when
    /// no API key is set.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty())?;
        let endpoint = std::env::var(ENDPOINT_ENV).unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
        let model = std::env::var(MODEL_ENV).unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Some(Self::new(reqwest::Client::new(), endpoint, api_key, model))
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

impl TextGenerator for ChatCompletionGenerator {
    fn generate<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String, GenerationError>> {
        Box::pin(async move {
            let request = ChatRequest {
                model: &self.model,
                messages: [
                    ChatMessage {
                        role: "system",
                        content: SYSTEM_PROMPT,
                    },
                    ChatMessage {
                        role: "user",
                        content: prompt,
                    },
                ],
                temperature: 0.3,
            };

            debug!(target: "sitescan::text_generation", "Requesting completion from {}", self.endpoint);

            let response = self
                .client
                .post(&self.endpoint)
                .bearer_auth(&self.api_key)
                .json(&request)
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(GenerationError::Status {
                    status: status.as_u16(),
                    body: body.chars().take(500).collect(),
                });
            }

            let parsed: ChatResponse = response.json().await?;
            parsed
                .choices
                .into_iter()
                .find_map(|choice| choice.message.content)
                .map(|text| text.trim().to_string())
                .filter(|text| !text.is_empty())
                .ok_or(GenerationError::EmptyResponse)
        })
    }
}
