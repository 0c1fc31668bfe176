//! Clone-able transcript handle for concurrent use.

use parking_lot::Mutex;
use sibyl_llm::Message;
use std::sync::Arc;

use crate::transcript::{Transcript, Turn};

/// Shared handle to a session's transcript.
///
/// All access goes through a single mutex, so mutation is serialized against
/// window reads: a reader observes the log before or after a `clear`, never a
/// partially emptied one. Clones refer to the same underlying log.
#[derive(Debug, Clone, Default)]
pub struct SharedTranscript {
    inner: Arc<Mutex<Transcript>>,
}

impl SharedTranscript {
    /// Create a handle to a new empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn.
    pub fn append(&self, turn: Turn) {
        self.inner.lock().append(turn);
    }

    /// Empty the log.
    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    /// Windowed model view, see [`Transcript::window`].
    pub fn window(&self, pairs: usize) -> Vec<Message> {
        self.inner.lock().window(pairs)
    }

    /// Number of turns.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Whether the log holds no turns.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Copy of the full log, for UI replay.
    pub fn snapshot(&self) -> Vec<Turn> {
        self.inner.lock().turns().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_one_log() {
        let transcript = SharedTranscript::new();
        let other = transcript.clone();

        transcript.append(Turn::user("hello"));
        assert_eq!(other.len(), 1);

        other.clear();
        assert!(transcript.is_empty());
    }

    #[test]
    fn test_clear_never_yields_partial_window() {
        let transcript = SharedTranscript::new();
        for i in 0..20 {
            transcript.append(Turn::user(format!("q{}", i)));
            transcript.append(Turn::assistant(format!("a{}", i)));
        }

        let reader = transcript.clone();
        let handle = std::thread::spawn(move || {
            for _ in 0..100 {
                let window = reader.window(5);
                // Either the pre-clear window or nothing at all.
                assert!(window.len() == 10 || window.is_empty());
            }
        });

        transcript.clear();
        handle.join().unwrap();
    }

    #[test]
    fn test_snapshot_preserves_order() {
        let transcript = SharedTranscript::new();
        transcript.append(Turn::user("first"));
        transcript.append(Turn::assistant("second"));

        let turns = transcript.snapshot();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].content, "first");
        assert_eq!(turns[1].content, "second");
    }
}
