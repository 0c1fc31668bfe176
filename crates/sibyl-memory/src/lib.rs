//! Bounded conversation memory for Sibyl.
//!
//! One session owns one [`Transcript`]: an append-only log of user and
//! assistant turns. The UI replays the log verbatim; the model consumes a
//! bounded [`window`](Transcript::window) of the most recent exchange pairs.
//! [`SharedTranscript`] wraps the log for concurrent access with atomic
//! clears.

pub mod shared;
pub mod transcript;

pub use shared::SharedTranscript;
pub use transcript::{DEFAULT_WINDOW_PAIRS, Speaker, Transcript, Turn};
