//! Conversation transcript: the append-only turn log and its windowed view.
//!
//! The transcript serves two consumers with different needs. The UI replays
//! the whole log in order; the model sees only a bounded window of recent
//! exchange pairs, role-tagged for consumption. The window is a projection
//! recomputed from the log on every turn, never stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sibyl_llm::Message;

/// Recent exchange pairs included in the model window by default.
pub const DEFAULT_WINDOW_PAIRS: usize = 5;

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    /// The person asking.
    User,
    /// The assistant's reply (answers and rendered failures alike).
    Assistant,
}

/// One exchange unit in the conversation log. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    /// Who spoke.
    pub speaker: Speaker,
    /// What was said.
    pub content: String,
    /// When the turn was recorded.
    pub at: DateTime<Utc>,
}

impl Turn {
    /// Create a user turn stamped now.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            content: content.into(),
            at: Utc::now(),
        }
    }

    /// Create an assistant turn stamped now.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Assistant,
            content: content.into(),
            at: Utc::now(),
        }
    }
}

/// Append-only conversation log.
///
/// Insertion order is significant and turns are never edited once appended.
/// Growth is unbounded within a session; the log empties only through an
/// explicit [`clear`](Transcript::clear).
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    /// Create an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn to the end of the log.
    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// Remove every turn.
    pub fn clear(&mut self) {
        self.turns.clear();
    }

    /// Number of turns in the log.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Whether the log holds no turns.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// All turns in insertion order, for UI replay.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// The most recent `pairs` exchange pairs as role-tagged messages.
    ///
    /// Pairing is positional: turn `i` with `i+1`. A trailing turn without a
    /// partner (a question still awaiting its answer) stays out of the window
    /// until its pair exists, so the result always holds an even number of
    /// messages, at most `2 * pairs`.
    pub fn window(&self, pairs: usize) -> Vec<Message> {
        let paired_len = self.turns.len() - (self.turns.len() % 2);
        let start = paired_len.saturating_sub(pairs.saturating_mul(2));

        self.turns[start..paired_len]
            .iter()
            .map(|turn| match turn.speaker {
                Speaker::User => Message::user(turn.content.clone()),
                Speaker::Assistant => Message::assistant(turn.content.clone()),
            })
            .collect()
    }
}
