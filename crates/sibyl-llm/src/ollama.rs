//! Ollama local-server backend.
//!
//! Talks to a self-hosted Ollama instance. Two wire shapes are supported,
//! tried in a fixed fallback order when the backend is constructed: the chat
//! API (`/api/chat`, message array) and the older generate API
//! (`/api/generate`, single flattened prompt). Liveness is checked separately
//! with a bounded-timeout probe against `/api/tags` so a stopped server is
//! reported as unreachable rather than surfacing as a request failure
//! mid-conversation.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::backend::ChatModel;
use crate::error::{LlmError, Result};
use crate::types::{Message, Role, flatten_messages};

/// Default Ollama server address.
pub const DEFAULT_OLLAMA_BASE: &str = "http://localhost:11434";

/// Model served locally.
const DEFAULT_OLLAMA_MODEL: &str = "gemma3:4b";

/// Default timeout for local requests. Local inference on edge hardware is
/// slow, so this is far longer than the hosted-backend timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 600;

/// Timeout for the liveness probe.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Attempts made while waiting for a freshly started server.
pub const STARTUP_ATTEMPTS: u32 = 10;

/// Delay between startup attempts.
pub const STARTUP_INTERVAL: Duration = Duration::from_secs(1);

// ─────────────────────────────────────────────────────────────────────────────
// API Flavor
// ─────────────────────────────────────────────────────────────────────────────

/// Wire shape spoken by the local client.
///
/// Older Ollama releases only expose the generate endpoint; newer ones add
/// the chat endpoint. Construction walks [`ApiFlavor::FALLBACK_ORDER`] and
/// binds the first shape that yields a working client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiFlavor {
    /// `/api/chat` with a role-tagged message array.
    Chat,
    /// `/api/generate` with a single flattened prompt.
    Generate,
}

impl ApiFlavor {
    /// Client shapes in the order they are tried. First success wins.
    pub const FALLBACK_ORDER: [ApiFlavor; 2] = [ApiFlavor::Chat, ApiFlavor::Generate];
}

impl std::fmt::Display for ApiFlavor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiFlavor::Chat => write!(f, "chat"),
            ApiFlavor::Generate => write!(f, "generate"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration for the Ollama backend.
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    /// Server base URL.
    pub base_url: String,

    /// Model identifier.
    pub model: String,

    /// Request timeout.
    pub timeout: Duration,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OLLAMA_BASE.to_string(),
            model: DEFAULT_OLLAMA_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl OllamaConfig {
    /// Set a custom server base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the model identifier.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Ollama Backend
// ─────────────────────────────────────────────────────────────────────────────

/// Local Ollama backend bound to one wire shape.
pub struct OllamaBackend {
    client: Client,
    config: OllamaConfig,
    flavor: ApiFlavor,
}

impl OllamaBackend {
    /// Create a backend speaking the given wire shape.
    pub fn with_flavor(config: OllamaConfig, flavor: ApiFlavor) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config,
            flavor,
        })
    }

    /// Walk the fallback order and return the first shape that constructs.
    ///
    /// Returns `None` when no usable client shape exists.
    pub fn first_supported(config: &OllamaConfig) -> Option<Self> {
        Self::first_supported_in(config, &ApiFlavor::FALLBACK_ORDER)
    }

    /// Walk an explicit shape list in order, first success wins.
    pub fn first_supported_in(config: &OllamaConfig, flavors: &[ApiFlavor]) -> Option<Self> {
        for &flavor in flavors {
            match Self::with_flavor(config.clone(), flavor) {
                Ok(backend) => return Some(backend),
                Err(e) => {
                    tracing::debug!(%flavor, error = %e, "Client shape unusable, trying next");
                }
            }
        }
        None
    }

    /// The wire shape this backend is bound to.
    pub fn flavor(&self) -> ApiFlavor {
        self.flavor
    }

    async fn complete_chat(&self, messages: &[Message]) -> Result<String> {
        let request = ChatWireRequest {
            model: self.config.model.clone(),
            messages: messages
                .iter()
                .map(|m| ChatWireMessage {
                    role: match m.role {
                        Role::System => "system",
                        Role::User => "user",
                        Role::Assistant => "assistant",
                    }
                    .to_string(),
                    content: m.content.clone(),
                })
                .collect(),
            stream: false,
        };

        let url = format!("{}/api/chat", self.config.base_url);
        let response = self.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Backend(format!("HTTP {}: {}", status, body)));
        }

        let parsed: ChatWireResponse = serde_json::from_str(&response.text().await?)?;
        Ok(parsed.message.content)
    }

    async fn complete_generate(&self, messages: &[Message]) -> Result<String> {
        let request = GenerateWireRequest {
            model: self.config.model.clone(),
            prompt: flatten_messages(messages),
            stream: false,
        };

        let url = format!("{}/api/generate", self.config.base_url);
        let response = self.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Backend(format!("HTTP {}: {}", status, body)));
        }

        let parsed: GenerateWireResponse = serde_json::from_str(&response.text().await?)?;
        Ok(parsed.response)
    }
}

#[async_trait]
impl ChatModel for OllamaBackend {
    async fn complete(&self, messages: &[Message]) -> Result<String> {
        tracing::debug!(
            model = %self.config.model,
            flavor = %self.flavor,
            messages = messages.len(),
            "Sending Ollama completion request"
        );

        match self.flavor {
            ApiFlavor::Chat => self.complete_chat(messages).await,
            ApiFlavor::Generate => self.complete_generate(messages).await,
        }
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Liveness
// ─────────────────────────────────────────────────────────────────────────────

/// Probe the local server for liveness.
///
/// Bounded-timeout GET against `/api/tags`; any error, timeout, or non-2xx
/// status counts as unreachable. Never caches: a server that comes up between
/// calls is seen on the next probe.
pub async fn probe_server(base_url: &str, timeout: Duration) -> bool {
    let url = format!("{}/api/tags", base_url);
    let request = Client::new().get(&url).timeout(timeout);

    match request.send().await {
        Ok(response) => response.status().is_success(),
        Err(e) => {
            tracing::debug!(%url, error = %e, "Liveness probe failed");
            false
        }
    }
}

/// Poll the local server until it answers the liveness probe or attempts run
/// out. Returns whether the server became reachable.
pub async fn wait_for_server(base_url: &str, attempts: u32, interval: Duration) -> bool {
    for attempt in 1..=attempts {
        if probe_server(base_url, PROBE_TIMEOUT).await {
            tracing::info!(attempt, "Ollama server is up");
            return true;
        }
        if attempt < attempts {
            tokio::time::sleep(interval).await;
        }
    }
    false
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire Types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, serde::Serialize)]
struct ChatWireRequest {
    model: String,
    messages: Vec<ChatWireMessage>,
    stream: bool,
}

#[derive(Debug, serde::Serialize)]
struct ChatWireMessage {
    role: String,
    content: String,
}

#[derive(Debug, serde::Deserialize)]
struct ChatWireResponse {
    message: ChatWireResponseMessage,
}

#[derive(Debug, serde::Deserialize)]
struct ChatWireResponseMessage {
    content: String,
}

#[derive(Debug, serde::Serialize)]
struct GenerateWireRequest {
    model: String,
    prompt: String,
    stream: bool,
}

#[derive(Debug, serde::Deserialize)]
struct GenerateWireResponse {
    response: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_order_is_chat_then_generate() {
        assert_eq!(
            ApiFlavor::FALLBACK_ORDER,
            [ApiFlavor::Chat, ApiFlavor::Generate]
        );
    }

    #[test]
    fn test_first_supported_binds_primary_shape() {
        let backend = OllamaBackend::first_supported(&OllamaConfig::default()).unwrap();
        assert_eq!(backend.flavor(), ApiFlavor::Chat);
    }

    #[test]
    fn test_first_supported_in_empty_list() {
        let backend = OllamaBackend::first_supported_in(&OllamaConfig::default(), &[]);
        assert!(backend.is_none());
    }

    #[test]
    fn test_first_supported_in_secondary_only() {
        let backend =
            OllamaBackend::first_supported_in(&OllamaConfig::default(), &[ApiFlavor::Generate])
                .unwrap();
        assert_eq!(backend.flavor(), ApiFlavor::Generate);
    }

    #[test]
    fn test_chat_response_parsing() {
        let body = r#"{"model":"gemma3:4b","message":{"role":"assistant","content":"42"},"done":true}"#;
        let parsed: ChatWireResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.message.content, "42");
    }

    #[test]
    fn test_generate_response_parsing() {
        let body = r#"{"model":"gemma3:4b","response":"42","done":true}"#;
        let parsed: GenerateWireResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.response, "42");
    }

    #[tokio::test]
    async fn test_probe_unreachable_server() {
        // Nothing listens on this port; the probe must report false, not error.
        let reachable = probe_server("http://127.0.0.1:9", Duration::from_millis(200)).await;
        assert!(!reachable);
    }

    #[tokio::test]
    async fn test_probe_unreachable_twice_in_a_row() {
        let first = probe_server("http://127.0.0.1:9", Duration::from_millis(200)).await;
        let second = probe_server("http://127.0.0.1:9", Duration::from_millis(200)).await;
        assert!(!first);
        assert!(!second);
    }

    #[tokio::test]
    async fn test_wait_for_server_gives_up() {
        let up = wait_for_server("http://127.0.0.1:9", 2, Duration::from_millis(10)).await;
        assert!(!up);
    }
}
