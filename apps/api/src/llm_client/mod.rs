/// LLM Client — the single point of entry for all Messages API calls.
///
/// ARCHITECTURAL RULE: No other module may call the inference endpoint directly.
/// All LLM interactions MUST go through the `InferenceClient` trait.
///
/// One network round trip per call. No retry, no backoff, no client-side timeout:
/// a failure is surfaced to the caller immediately.
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::errors::AppError;

#[cfg(test)]
pub mod fake;
pub mod prompts;

const ANTHROPIC_VERSION: &str = "2023-06-01";
/// The model used for every call (critique, extraction, detection).
/// Hardcoded to prevent accidental drift between pipelines.
pub const MODEL: &str = "claude-sonnet-4-20250514";
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {}", .message.as_deref().unwrap_or("<no message>"))]
    Api { status: u16, message: Option<String> },

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("LLM returned empty content")]
    EmptyContent,
}

impl LlmError {
    /// Converts at the pipeline boundary. The remote-supplied message wins;
    /// `fallback` is used when the endpoint failed without one.
    pub fn into_app_error(self, fallback: &str) -> AppError {
        match self {
            LlmError::Http(e) => AppError::Remote(format!("{fallback} ({e})")),
            LlmError::Api {
                message: Some(message),
                ..
            } => AppError::Remote(message),
            LlmError::Api { message: None, .. } => AppError::Remote(fallback.to_string()),
            LlmError::Malformed(_) | LlmError::EmptyContent => AppError::Schema(self.to_string()),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Request payload
// ────────────────────────────────────────────────────────────────────────────

/// Message content is either a plain string or an ordered list of typed blocks.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text { text: String },
    Document { source: DocumentSource },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentSource {
    #[serde(rename = "type")]
    pub source_type: &'static str,
    pub media_type: &'static str,
    pub data: String,
}

impl DocumentSource {
    /// A base64-encoded PDF source. `data` must already be base64.
    pub fn pdf_base64(data: String) -> Self {
        Self {
            source_type: "base64",
            media_type: PDF_MEDIA_TYPE,
            data,
        }
    }
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        ContentBlock::Text { text: text.into() }
    }
}

/// A single inference call: model, output budget, and the user message content.
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceRequest {
    pub model: &'static str,
    pub max_tokens: u32,
    pub content: MessageContent,
}

impl InferenceRequest {
    pub fn new(max_tokens: u32, content: MessageContent) -> Self {
        Self {
            model: MODEL,
            max_tokens,
            content,
        }
    }
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: [AnthropicMessage<'a>; 1],
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a MessageContent,
}

// ────────────────────────────────────────────────────────────────────────────
// Response payload
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    #[serde(default)]
    content: Option<Vec<ResponseBlock>>,
    #[serde(default)]
    usage: Option<Usage>,
    #[serde(default)]
    error: Option<AnthropicErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ResponseBlock {
    #[serde(rename = "type", default)]
    block_type: Option<String>,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    #[serde(default)]
    message: Option<String>,
}

impl AnthropicResponse {
    /// Text of the first text block. Proxies may omit `type`, so an untyped block counts.
    fn text(&self) -> Option<&str> {
        self.content
            .as_deref()?
            .iter()
            .filter(|b| b.block_type.as_deref().map_or(true, |t| t == "text"))
            .find_map(|b| b.text.as_deref())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// Seam between the pipelines and the remote model.
/// `AppState` carries it as `Arc<dyn InferenceClient>`; tests swap in a scripted fake.
#[async_trait]
pub trait InferenceClient: Send + Sync {
    /// Performs exactly one round trip and returns the first text block.
    async fn send(&self, request: InferenceRequest) -> Result<String, LlmError>;
}

/// HTTP implementation over the Messages API.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    api_url: String,
}

impl LlmClient {
    pub fn new(api_key: String, api_url: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            api_url,
        }
    }
}

#[async_trait]
impl InferenceClient for LlmClient {
    async fn send(&self, request: InferenceRequest) -> Result<String, LlmError> {
        let body = AnthropicRequest {
            model: request.model,
            max_tokens: request.max_tokens,
            messages: [AnthropicMessage {
                role: "user",
                content: &request.content,
            }],
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let raw = response.text().await?;
        let parsed = serde_json::from_str::<AnthropicResponse>(&raw).ok();

        // An error object wins over the status code: proxies answer 200 with `{error}`.
        if let Some(error) = parsed.as_ref().and_then(|p| p.error.as_ref()) {
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: error.message.clone().filter(|m| !m.trim().is_empty()),
            });
        }

        if !status.is_success() {
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: None,
            });
        }

        let parsed = parsed
            .ok_or_else(|| LlmError::Malformed("response body is not a JSON object".to_string()))?;

        if let Some(usage) = &parsed.usage {
            debug!(
                "LLM call succeeded: input_tokens={}, output_tokens={}",
                usage.input_tokens, usage.output_tokens
            );
        }

        parsed
            .text()
            .map(str::to_string)
            .ok_or(LlmError::EmptyContent)
    }
}

/// Removes ```json / ``` fence markers the model may add despite instructions.
pub fn strip_json_fences(text: &str) -> String {
    text.replace("```json", "")
        .replace("```JSON", "")
        .replace("```", "")
        .trim()
        .to_string()
}
