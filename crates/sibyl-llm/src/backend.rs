//! Chat-model backend trait and the mock implementation used in tests.
//!
//! This module defines the abstraction layer the agent core talks to. Every
//! provider (OpenAI, Ollama) implements [`ChatModel`]; callers hold a
//! [`SharedModel`] and never know which provider is behind it.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::{LlmError, Result};
use crate::types::Message;

// ─────────────────────────────────────────────────────────────────────────────
// Chat Model Trait
// ─────────────────────────────────────────────────────────────────────────────

/// Trait for chat-model providers.
///
/// The contract is deliberately minimal: a message sequence goes in, the
/// completion text comes out. Request shaping (model identifier, decoding
/// parameters, wire format) is fixed per backend at construction time so
/// completions stay reproducible across calls.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Produce a completion for the given message sequence.
    async fn complete(&self, messages: &[Message]) -> Result<String>;

    /// Get the name of this backend.
    fn name(&self) -> &str;
}

/// A model capability that can be shared across threads.
pub type SharedModel = Arc<dyn ChatModel>;

// ─────────────────────────────────────────────────────────────────────────────
// Mock Model
// ─────────────────────────────────────────────────────────────────────────────

/// A mock model for testing purposes.
///
/// Returns pre-configured completions in order and records every request,
/// useful for deterministic testing of the orchestrator and reasoning loop.
#[derive(Debug)]
pub struct MockModel {
    name: String,
    responses: std::sync::Mutex<Vec<String>>,
    request_log: std::sync::Mutex<Vec<Vec<Message>>>,
}

impl MockModel {
    /// Create a new mock model with the given completions.
    ///
    /// Completions are returned in order. If more requests are made than
    /// completions available, an error is returned.
    pub fn new(responses: Vec<String>) -> Self {
        Self {
            name: "mock".to_string(),
            responses: std::sync::Mutex::new(responses),
            request_log: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Create a mock model with a single text completion.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self::new(vec![text.into()])
    }

    /// Get all message sequences that were sent to this model.
    pub fn requests(&self) -> Vec<Vec<Message>> {
        self.request_log.lock().unwrap().clone()
    }

    /// Get the number of requests made.
    pub fn request_count(&self) -> usize {
        self.request_log.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatModel for MockModel {
    async fn complete(&self, messages: &[Message]) -> Result<String> {
        self.request_log.lock().unwrap().push(messages.to_vec());

        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            return Err(LlmError::Backend(
                "MockModel: no more responses available".to_string(),
            ));
        }
        Ok(responses.remove(0))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_model_single_response() {
        let model = MockModel::with_text("Hello!");

        let reply = model.complete(&[Message::user("Hi")]).await.unwrap();

        assert_eq!(reply, "Hello!");
        assert_eq!(model.request_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_model_multiple_responses() {
        let model = MockModel::new(vec!["First".to_string(), "Second".to_string()]);

        let r1 = model.complete(&[Message::user("1")]).await.unwrap();
        let r2 = model.complete(&[Message::user("2")]).await.unwrap();

        assert_eq!(r1, "First");
        assert_eq!(r2, "Second");
        assert_eq!(model.request_count(), 2);
    }

    #[tokio::test]
    async fn test_mock_model_exhausted() {
        let model = MockModel::new(vec![]);

        let result = model.complete(&[Message::user("Hi")]).await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_mock_model_records_requests() {
        let model = MockModel::with_text("ok");

        let messages = vec![Message::system("sys"), Message::user("question")];
        model.complete(&messages).await.unwrap();

        let requests = model.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0], messages);
    }
}
