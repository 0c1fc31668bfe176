//! Provider resolution.
//!
//! Turns a [`ProviderId`] into a ready-to-invoke [`SharedModel`], or a
//! [`ResolveError`] naming exactly which prerequisite is missing. Resolution
//! reads credentials and probes liveness at call time and caches nothing, so
//! it can be re-run every query: a key exported or a server started
//! mid-session is picked up on the next turn.

use async_trait::async_trait;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::backend::SharedModel;
use crate::ollama::{self, OllamaBackend, OllamaConfig, PROBE_TIMEOUT};
use crate::openai::{OPENAI_API_KEY_VAR, OpenAiBackend, OpenAiConfig};

// ─────────────────────────────────────────────────────────────────────────────
// Provider Identity
// ─────────────────────────────────────────────────────────────────────────────

/// Identifier of a configured model provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderId {
    /// Hosted OpenAI API.
    #[default]
    OpenAi,
    /// Self-hosted Ollama server.
    Ollama,
}

impl ProviderId {
    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenAi => "openai",
            ProviderId::Ollama => "ollama",
        }
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "openai" => Ok(ProviderId::OpenAi),
            "ollama" => Ok(ProviderId::Ollama),
            other => Err(format!(
                "unknown provider '{}' (expected 'openai' or 'ollama')",
                other
            )),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Resolution Errors
// ─────────────────────────────────────────────────────────────────────────────

/// Why a provider could not be resolved into a model capability.
#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    /// Required credential absent from the environment.
    #[error("missing credential: {0} is not set")]
    MissingCredential(&'static str),

    /// No usable local client shape.
    #[error("client unsupported: no usable local client shape")]
    ClientUnsupported,

    /// Local server did not answer the liveness probe.
    #[error("server unreachable at {url}")]
    ServerUnreachable {
        /// Probed base URL.
        url: String,
    },

    /// Capability could not be built from otherwise-valid configuration.
    #[error("construction failed: {0}")]
    Construction(String),
}

impl ResolveError {
    /// Chat-facing text for this failure.
    ///
    /// Rendered into the conversation in place of an answer, so it reads as
    /// guidance rather than a stack trace.
    pub fn user_message(&self) -> String {
        match self {
            ResolveError::MissingCredential(var) => format!(
                "OpenAI API key not found. Set the {} environment variable and try again.",
                var
            ),
            ResolveError::ServerUnreachable { .. } => {
                "Ollama server is not running. Start it with `sibyl start` and try again."
                    .to_string()
            }
            ResolveError::ClientUnsupported | ResolveError::Construction(_) => {
                "Setup failed. Please check your model configuration.".to_string()
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Model Provider
// ─────────────────────────────────────────────────────────────────────────────

/// Resolves provider identifiers into model capabilities.
///
/// The orchestrator depends on this trait rather than on concrete backends so
/// tests can substitute scripted resolutions.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Resolve `id` into a model capability, or report why that is not
    /// currently possible.
    async fn resolve(&self, id: ProviderId) -> std::result::Result<SharedModel, ResolveError>;
}

/// Production resolver backed by the environment and the local server.
#[derive(Debug, Clone)]
pub struct EnvProvider {
    local: OllamaConfig,
    probe_timeout: Duration,
}

impl Default for EnvProvider {
    fn default() -> Self {
        Self {
            local: OllamaConfig::default(),
            probe_timeout: PROBE_TIMEOUT,
        }
    }
}

impl EnvProvider {
    /// Create a resolver with default local-server settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the local-server configuration.
    pub fn with_local_config(mut self, config: OllamaConfig) -> Self {
        self.local = config;
        self
    }

    /// Override the liveness-probe timeout.
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    fn resolve_openai(&self) -> std::result::Result<SharedModel, ResolveError> {
        // from_env applies the absent/empty credential rule; any Err from it
        // means the key, not construction.
        let config = OpenAiConfig::from_env()
            .map_err(|_| ResolveError::MissingCredential(OPENAI_API_KEY_VAR))?;

        let backend =
            OpenAiBackend::new(config).map_err(|e| ResolveError::Construction(e.to_string()))?;

        Ok(Arc::new(backend))
    }

    async fn resolve_ollama(&self) -> std::result::Result<SharedModel, ResolveError> {
        // Shape check comes first: a missing client is a different failure
        // than a stopped server and gets different guidance.
        let backend =
            OllamaBackend::first_supported(&self.local).ok_or(ResolveError::ClientUnsupported)?;

        if !ollama::probe_server(&self.local.base_url, self.probe_timeout).await {
            return Err(ResolveError::ServerUnreachable {
                url: self.local.base_url.clone(),
            });
        }

        Ok(Arc::new(backend))
    }
}

#[async_trait]
impl ModelProvider for EnvProvider {
    async fn resolve(&self, id: ProviderId) -> std::result::Result<SharedModel, ResolveError> {
        tracing::debug!(provider = %id, "Resolving model provider");

        let result = match id {
            ProviderId::OpenAi => self.resolve_openai(),
            ProviderId::Ollama => self.resolve_ollama().await,
        };

        if let Err(ref e) = result {
            tracing::warn!(provider = %id, error = %e, "Provider resolution failed");
        }
        result
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_provider_id_from_str() {
        assert_eq!("openai".parse::<ProviderId>().unwrap(), ProviderId::OpenAi);
        assert_eq!("OLLAMA".parse::<ProviderId>().unwrap(), ProviderId::Ollama);
        assert!("gemini".parse::<ProviderId>().is_err());
    }

    #[test]
    fn test_provider_id_display_round_trips() {
        for id in [ProviderId::OpenAi, ProviderId::Ollama] {
            assert_eq!(id.to_string().parse::<ProviderId>().unwrap(), id);
        }
    }

    #[test]
    fn test_user_messages() {
        let missing = ResolveError::MissingCredential(OPENAI_API_KEY_VAR);
        assert!(missing.user_message().contains("OPENAI_API_KEY"));

        let unreachable = ResolveError::ServerUnreachable {
            url: "http://localhost:11434".to_string(),
        };
        assert!(unreachable.user_message().contains("not running"));

        let construction = ResolveError::Construction("boom".to_string());
        assert!(construction.user_message().contains("Setup failed"));
    }

    #[tokio::test]
    #[serial]
    async fn test_resolve_openai_missing_credential() {
        // SAFETY: Tests run single-threaded with --test-threads=1 or serially
        unsafe { std::env::remove_var(OPENAI_API_KEY_VAR) };

        let provider = EnvProvider::new();
        let result = provider.resolve(ProviderId::OpenAi).await;

        assert!(matches!(result, Err(ResolveError::MissingCredential(_))));
    }

    #[tokio::test]
    #[serial]
    async fn test_resolve_openai_empty_credential() {
        // SAFETY: Tests run single-threaded with --test-threads=1 or serially
        unsafe { std::env::set_var(OPENAI_API_KEY_VAR, "") };

        let provider = EnvProvider::new();
        let result = provider.resolve(ProviderId::OpenAi).await;

        assert!(matches!(result, Err(ResolveError::MissingCredential(_))));

        unsafe { std::env::remove_var(OPENAI_API_KEY_VAR) };
    }

    #[tokio::test]
    #[serial]
    async fn test_resolve_openai_with_credential() {
        // SAFETY: Tests run single-threaded with --test-threads=1 or serially
        unsafe { std::env::set_var(OPENAI_API_KEY_VAR, "sk-test") };

        let provider = EnvProvider::new();
        let result = provider.resolve(ProviderId::OpenAi).await;

        assert!(result.is_ok());
        assert_eq!(result.unwrap().name(), "openai");

        unsafe { std::env::remove_var(OPENAI_API_KEY_VAR) };
    }

    #[tokio::test]
    async fn test_resolve_ollama_unreachable_twice() {
        // Nothing listens on port 9; both resolutions must fail the same way.
        let provider = EnvProvider::new()
            .with_local_config(OllamaConfig::default().with_base_url("http://127.0.0.1:9"))
            .with_probe_timeout(Duration::from_millis(200));

        for _ in 0..2 {
            let result = provider.resolve(ProviderId::Ollama).await;
            assert!(matches!(
                result,
                Err(ResolveError::ServerUnreachable { .. })
            ));
        }
    }
}
