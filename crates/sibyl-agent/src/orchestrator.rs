//! Query orchestration.
//!
//! One `respond` call drives the whole state machine for a query:
//!
//! ```text
//!   Start ──► resolve model ──► resolve search ──► ToolLoop ──► answer
//!                  │                   │
//!                  │                   └────────► Direct ─────► answer
//!                  ▼
//!               Failed (provider precondition)
//! ```
//!
//! Model resolution is a hard precondition: if the provider cannot produce a
//! usable model, the query fails before anything else runs. Search resolution
//! can only widen or narrow the mode, never fail the query. Every fault comes
//! back as an [`AgentError`] value; nothing escapes to panic the caller.
//!
//! The orchestrator holds no per-session state. Sessions own their transcript
//! and the caller appends turns, so independent sessions can share one
//! orchestrator concurrently.

use std::sync::Arc;

use sibyl_llm::{EnvProvider, Message, ModelProvider, SharedModel};

use crate::error::Result;
use crate::prompt;
use crate::react::{ReactConfig, ReactLoop};
use crate::search::{EnvSearch, SearchProvider};
use crate::session::SessionState;
use crate::tool::ToolSet;

/// Drives queries through mode selection to an answer or a failure.
pub struct Orchestrator {
    models: Arc<dyn ModelProvider>,
    search: Arc<dyn SearchProvider>,
    react: ReactConfig,
}

impl Orchestrator {
    /// Production orchestrator backed by the environment.
    pub fn new() -> Self {
        Self::with_providers(Arc::new(EnvProvider::default()), Arc::new(EnvSearch))
    }

    /// Orchestrator with injected resolution seams.
    pub fn with_providers(models: Arc<dyn ModelProvider>, search: Arc<dyn SearchProvider>) -> Self {
        Self {
            models,
            search,
            react: ReactConfig::default(),
        }
    }

    /// Override the reasoning-loop configuration.
    pub fn with_react_config(mut self, config: ReactConfig) -> Self {
        self.react = config;
        self
    }

    /// Answer one query for the given session.
    ///
    /// The transcript is read for context but never written; the caller
    /// appends both turns once it has shown the result.
    pub async fn respond(&self, session: &SessionState, query: &str) -> Result<String> {
        let provider = session.provider();
        let model = match self.models.resolve(provider).await {
            Ok(model) => model,
            Err(e) => {
                tracing::warn!(session = %session.id(), provider = %provider, error = %e, "Model resolution failed");
                return Err(e.into());
            }
        };

        let window = session.window();

        match self.search.resolve(session.search_enabled()) {
            Some(tool) => {
                tracing::debug!(session = %session.id(), provider = %provider, mode = "tool-augmented", "Dispatching query");
                let agent = ReactLoop::with_config(model, ToolSet::single(tool), self.react);
                agent.run(query, &window).await
            }
            None => {
                tracing::debug!(session = %session.id(), provider = %provider, mode = "direct", "Dispatching query");
                self.direct(model, &window, query).await
            }
        }
    }

    async fn direct(&self, model: SharedModel, window: &[Message], query: &str) -> Result<String> {
        let messages = prompt::direct_messages(window, query);
        let answer = model.complete(&messages).await?;
        tracing::debug!(chars = answer.len(), "Direct completion finished");
        Ok(answer)
    }
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
