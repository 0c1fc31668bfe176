//! Search capability resolution and the Google search tool.
//!
//! Whether search is available is decided fresh on every query from two
//! facts: the session's toggle and the presence of the paired Google
//! credentials in the environment. Neither is cached; flipping the toggle or
//! exporting keys mid-session takes effect on the next turn. Unavailable
//! search is a normal mode, not an error.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{AgentError, Result};
use crate::tool::{SharedTool, Tool};

/// Environment variable holding the Google API key.
pub const GOOGLE_API_KEY_VAR: &str = "GOOGLE_API_KEY";

/// Environment variable holding the programmable search engine id.
pub const GOOGLE_CSE_ID_VAR: &str = "GOOGLE_CSE_ID";

/// Custom Search JSON API endpoint.
const SEARCH_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";

/// Results requested per search.
const DEFAULT_RESULT_LIMIT: usize = 5;

/// Timeout for search requests.
const SEARCH_TIMEOUT: Duration = Duration::from_secs(30);

// ─────────────────────────────────────────────────────────────────────────────
// Credentials
// ─────────────────────────────────────────────────────────────────────────────

/// The paired Google credentials. Both values are required together; one
/// without the other is the same as neither.
#[derive(Clone, PartialEq, Eq)]
pub struct SearchKeys {
    /// API key.
    pub api_key: String,
    /// Programmable search engine id.
    pub cse_id: String,
}

impl SearchKeys {
    /// Create keys from explicit values.
    pub fn new(api_key: impl Into<String>, cse_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            cse_id: cse_id.into(),
        }
    }

    /// Read both credentials from the environment, live.
    ///
    /// Empty values count as absent.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var(GOOGLE_API_KEY_VAR)
            .ok()
            .filter(|v| !v.is_empty())?;
        let cse_id = std::env::var(GOOGLE_CSE_ID_VAR)
            .ok()
            .filter(|v| !v.is_empty())?;
        Some(Self { api_key, cse_id })
    }
}

impl std::fmt::Debug for SearchKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Secrets stay out of logs.
        f.debug_struct("SearchKeys")
            .field("api_key", &"<redacted>")
            .field("cse_id", &"<redacted>")
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Search Config and Mode
// ─────────────────────────────────────────────────────────────────────────────

/// Search availability facts for one query.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Session-scoped user toggle.
    pub enabled: bool,
    keys: Option<SearchKeys>,
}

impl SearchConfig {
    /// Build a config from explicit parts.
    pub fn new(enabled: bool, keys: Option<SearchKeys>) -> Self {
        Self { enabled, keys }
    }

    /// Snapshot current availability: the given toggle plus a live read of
    /// the environment credentials.
    pub fn detect(enabled: bool) -> Self {
        Self::new(enabled, SearchKeys::from_env())
    }

    /// Whether both credentials are present.
    pub fn keys_present(&self) -> bool {
        self.keys.is_some()
    }

    /// Effective availability: toggle on AND credentials present.
    pub fn effective(&self) -> bool {
        self.enabled && self.keys.is_some()
    }

    /// Take the credentials out of the config.
    pub fn into_keys(self) -> Option<SearchKeys> {
        self.keys
    }
}

/// How a query will be executed.
///
/// Derived from [`SearchConfig`] at invocation time and never stored, so the
/// toggle and the actual behavior cannot drift apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentMode {
    /// Single model call, no tool access.
    DirectCompletion,
    /// Reasoning loop with the search tool.
    ToolAugmented,
}

impl AgentMode {
    /// Pure selection function.
    pub fn select(config: &SearchConfig) -> AgentMode {
        if config.effective() {
            AgentMode::ToolAugmented
        } else {
            AgentMode::DirectCompletion
        }
    }
}

impl std::fmt::Display for AgentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentMode::DirectCompletion => write!(f, "direct"),
            AgentMode::ToolAugmented => write!(f, "tool-augmented"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Google Search Tool
// ─────────────────────────────────────────────────────────────────────────────

/// Web search backed by the Google Custom Search JSON API.
#[derive(Debug, Clone)]
pub struct GoogleSearchTool {
    client: Client,
    keys: SearchKeys,
    result_limit: usize,
}

impl GoogleSearchTool {
    /// Create a search tool bound to the given credentials.
    pub fn new(keys: SearchKeys) -> Result<Self> {
        let client = Client::builder()
            .timeout(SEARCH_TIMEOUT)
            .build()
            .map_err(|e| AgentError::tool(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            keys,
            result_limit: DEFAULT_RESULT_LIMIT,
        })
    }
}

#[async_trait]
impl Tool for GoogleSearchTool {
    fn name(&self) -> &str {
        "google_search"
    }

    fn description(&self) -> &str {
        "Search Google for recent results and up-to-date information on a topic."
    }

    async fn run(&self, input: &str) -> Result<String> {
        tracing::debug!(query = %input, "Running Google search");

        let limit = self.result_limit.to_string();
        let response = self
            .client
            .get(SEARCH_ENDPOINT)
            .query(&[
                ("key", self.keys.api_key.as_str()),
                ("cx", self.keys.cse_id.as_str()),
                ("q", input),
                ("num", limit.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AgentError::tool(format!("search request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AgentError::tool(format!(
                "search returned HTTP {}",
                response.status()
            )));
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| AgentError::tool(format!("failed to parse search response: {}", e)))?;

        Ok(format_results(&parsed.items))
    }
}

/// Render search items as an observation the model can cite from.
fn format_results(items: &[SearchItem]) -> String {
    if items.is_empty() {
        return "No good search results were found.".to_string();
    }

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            format!(
                "{}. {}\n{}\nSource: {}",
                i + 1,
                item.title,
                item.snippet,
                item.link
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Search Provider
// ─────────────────────────────────────────────────────────────────────────────

/// Resolves the search capability for a turn.
///
/// The orchestrator depends on this trait so tests can substitute fixed
/// resolutions without touching the environment.
pub trait SearchProvider: Send + Sync {
    /// Return the search tool if it should be exposed this turn.
    fn resolve(&self, enabled: bool) -> Option<SharedTool>;
}

/// Production resolver backed by the environment.
#[derive(Debug, Clone, Default)]
pub struct EnvSearch;

impl SearchProvider for EnvSearch {
    fn resolve(&self, enabled: bool) -> Option<SharedTool> {
        let config = SearchConfig::detect(enabled);
        match AgentMode::select(&config) {
            AgentMode::DirectCompletion => None,
            AgentMode::ToolAugmented => {
                let keys = config.into_keys()?;
                match GoogleSearchTool::new(keys) {
                    Ok(tool) => Some(Arc::new(tool)),
                    Err(e) => {
                        tracing::warn!(error = %e, "Search tool construction failed, continuing without search");
                        None
                    }
                }
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
