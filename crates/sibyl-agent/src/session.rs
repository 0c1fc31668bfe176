//! Per-session conversation state.
//!
//! A session owns everything that outlives a single query: the provider
//! choice, the search toggle, and the transcript. The orchestrator reads
//! from it and stays stateless; callers append turns after each exchange.

use sibyl_llm::{Message, ProviderId};
use sibyl_memory::{DEFAULT_WINDOW_PAIRS, SharedTranscript, Turn};
use uuid::Uuid;

/// State for one conversation.
#[derive(Debug, Clone)]
pub struct SessionState {
    id: String,
    provider: ProviderId,
    search_enabled: bool,
    transcript: SharedTranscript,
    window_pairs: usize,
}

impl SessionState {
    /// Start a fresh session with an empty transcript.
    ///
    /// Search starts enabled; whether it is actually used still depends on
    /// the credentials present when a query runs.
    pub fn new(provider: ProviderId) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            provider,
            search_enabled: true,
            transcript: SharedTranscript::new(),
            window_pairs: DEFAULT_WINDOW_PAIRS,
        }
    }

    /// Override how many exchange pairs the context window keeps.
    pub fn with_window_pairs(mut self, pairs: usize) -> Self {
        self.window_pairs = pairs;
        self
    }

    /// How many exchange pairs the context window keeps.
    pub fn window_pairs(&self) -> usize {
        self.window_pairs
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn provider(&self) -> ProviderId {
        self.provider
    }

    pub fn set_provider(&mut self, provider: ProviderId) {
        self.provider = provider;
    }

    pub fn search_enabled(&self) -> bool {
        self.search_enabled
    }

    pub fn set_search_enabled(&mut self, enabled: bool) {
        self.search_enabled = enabled;
    }

    /// Recompute the context window from the transcript.
    pub fn window(&self) -> Vec<Message> {
        self.transcript.window(self.window_pairs)
    }

    /// Append a user turn.
    pub fn push_user(&self, content: impl Into<String>) {
        self.transcript.append(Turn::user(content));
    }

    /// Append an assistant turn.
    pub fn push_assistant(&self, content: impl Into<String>) {
        self.transcript.append(Turn::assistant(content));
    }

    /// Wipe the transcript, keeping provider and toggle.
    pub fn clear(&self) {
        self.transcript.clear();
    }

    /// Number of turns recorded so far.
    pub fn turn_count(&self) -> usize {
        self.transcript.len()
    }

    /// Full copy of the transcript, oldest first.
    pub fn snapshot(&self) -> Vec<Turn> {
        self.transcript.snapshot()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
