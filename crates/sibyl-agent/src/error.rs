//! Error types for the agent crate.

use thiserror::Error;

use sibyl_llm::{LlmError, ResolveError};

/// Result type alias using the agent error type.
pub type Result<T> = std::result::Result<T, AgentError>;

/// Error type for orchestration and reasoning-loop operations.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Provider resolution failed; the query never reached a model.
    #[error(transparent)]
    Provider(#[from] ResolveError),

    /// A model invocation faulted.
    #[error("model invocation failed: {0}")]
    Model(#[from] LlmError),

    /// A tool invocation faulted. Recovered inside the reasoning loop as an
    /// observation; never reaches the orchestrator boundary on its own.
    #[error("tool error: {0}")]
    Tool(String),

    /// The reasoning loop hit its step ceiling without a final answer.
    #[error("no final answer after {steps} reasoning steps")]
    Exhausted {
        /// Steps performed before giving up.
        steps: u32,
    },
}

impl AgentError {
    /// Create a tool error.
    pub fn tool(message: impl Into<String>) -> Self {
        Self::Tool(message.into())
    }

    /// Chat-facing text: what the user reads in place of an answer.
    ///
    /// Provider failures carry their own guidance; everything else renders
    /// behind a generic prefix so internal detail never leaks as-is.
    pub fn user_message(&self) -> String {
        match self {
            AgentError::Provider(e) => e.user_message(),
            other => format!("An error occurred: {}", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_errors_keep_their_guidance() {
        let err = AgentError::from(ResolveError::ServerUnreachable {
            url: "http://localhost:11434".to_string(),
        });
        assert!(err.user_message().contains("Ollama server is not running"));
    }

    #[test]
    fn test_other_errors_render_generic_prefix() {
        let err = AgentError::Exhausted { steps: 15 };
        let message = err.user_message();
        assert!(message.starts_with("An error occurred:"));
        assert!(message.contains("no final answer"));
    }

    #[test]
    fn test_llm_error_converts() {
        let err: AgentError = LlmError::Backend("503".to_string()).into();
        assert!(matches!(err, AgentError::Model(_)));
    }
}
