//! OpenAI chat-completions backend.
//!
//! Connects to OpenAI's hosted API. The model identifier and decoding mode
//! are fixed at construction: completions run at temperature zero so repeated
//! queries favor reproducible, lowest-variance answers.

use async_trait::async_trait;
use reqwest::{Client, Response, header};
use std::time::Duration;

use crate::backend::ChatModel;
use crate::error::{LlmError, Result};
use crate::types::{Message, Role};

/// Default OpenAI API base URL.
const DEFAULT_OPENAI_BASE: &str = "https://api.openai.com/v1";

/// Model used for hosted completions.
const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";

/// Default timeout for hosted requests.
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Decoding temperature. Pinned to zero for reproducible completions.
const COMPLETION_TEMPERATURE: f32 = 0.0;

/// Environment variable holding the OpenAI credential.
pub const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration for the OpenAI backend.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// API key for authentication.
    pub api_key: String,

    /// Base URL for the API.
    pub base_url: String,

    /// Model identifier.
    pub model: String,

    /// Request timeout.
    pub timeout: Duration,
}

impl OpenAiConfig {
    /// Create a new config with the given API key and default model.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_OPENAI_BASE.to_string(),
            model: DEFAULT_OPENAI_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Create config from the environment.
    ///
    /// The credential is read at call time, never cached, so a key exported
    /// mid-session is picked up on the next resolution. An empty value counts
    /// as absent, same as the search keys.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(OPENAI_API_KEY_VAR)
            .ok()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                LlmError::Config(format!("{} environment variable not set", OPENAI_API_KEY_VAR))
            })?;
        Ok(Self::new(api_key))
    }

    /// Set a custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the model identifier.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// OpenAI Backend
// ─────────────────────────────────────────────────────────────────────────────

/// OpenAI chat-completions backend.
pub struct OpenAiBackend {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiBackend {
    /// Create a new OpenAI backend with the given configuration.
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Build the chat completions endpoint URL.
    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }

    /// Add authentication headers to a request.
    fn add_headers(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header(header::CONTENT_TYPE, "application/json")
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", self.config.api_key),
            )
    }

    /// Convert a message sequence to the wire format.
    fn to_wire_request(&self, messages: &[Message]) -> WireChatRequest {
        let messages = messages
            .iter()
            .map(|m| WireMessage {
                role: match m.role {
                    Role::System => "system",
                    Role::User => "user",
                    Role::Assistant => "assistant",
                }
                .to_string(),
                content: m.content.clone(),
            })
            .collect();

        WireChatRequest {
            model: self.config.model.clone(),
            messages,
            temperature: COMPLETION_TEMPERATURE,
        }
    }

    /// Handle a completions response.
    async fn handle_response(response: Response) -> Result<String> {
        if !response.status().is_success() {
            return Err(Self::handle_error_response(response).await);
        }

        let body = response.text().await?;
        let parsed: WireChatResponse = serde_json::from_str(&body)?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::Backend("response contained no choices".to_string()))?;

        choice
            .message
            .content
            .ok_or_else(|| LlmError::Backend("response message had no content".to_string()))
    }

    /// Handle an error response.
    async fn handle_error_response(response: Response) -> LlmError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if let Ok(error) = serde_json::from_str::<WireErrorResponse>(&body) {
            LlmError::Backend(format!("HTTP {}: {}", status, error.error.message))
        } else {
            LlmError::Backend(format!("HTTP {}: {}", status, body))
        }
    }
}

#[async_trait]
impl ChatModel for OpenAiBackend {
    async fn complete(&self, messages: &[Message]) -> Result<String> {
        let wire_request = self.to_wire_request(messages);

        tracing::debug!(
            model = %wire_request.model,
            messages = wire_request.messages.len(),
            "Sending OpenAI completion request"
        );

        let response = self
            .add_headers(self.client.post(self.completions_url()))
            .json(&wire_request)
            .send()
            .await?;

        Self::handle_response(response).await
    }

    fn name(&self) -> &str {
        "openai"
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire Types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, serde::Serialize)]
struct WireChatRequest {
    model: String,
    messages: Vec<WireMessage>,
    temperature: f32,
}

#[derive(Debug, serde::Serialize)]
struct WireMessage {
    role: String,
    content: String,
}

#[derive(Debug, serde::Deserialize)]
struct WireChatResponse {
    choices: Vec<WireChoice>,
}

#[derive(Debug, serde::Deserialize)]
struct WireChoice {
    message: WireResponseMessage,
}

#[derive(Debug, serde::Deserialize)]
struct WireResponseMessage {
    content: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
struct WireErrorResponse {
    error: WireErrorBody,
}

#[derive(Debug, serde::Deserialize)]
struct WireErrorBody {
    message: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
