//! Chat-model client abstraction for Sibyl.
//!
//! This crate provides a unified interface for the model backends the
//! assistant can answer with: the hosted OpenAI API and a self-hosted Ollama
//! server.
//!
//! # Architecture
//!
//! The core abstraction is the [`ChatModel`] trait which both providers
//! implement, plus [`ModelProvider`] resolution that turns a configured
//! provider identifier into a live capability per request.
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │  ModelProvider::resolve(ProviderId)  │
//! │  - credential / shape / liveness     │
//! └──────────────────────────────────────┘
//!                   │
//!          ┌────────┴────────┐
//!          ▼                 ▼
//!     ┌─────────┐      ┌─────────┐
//!     │ OpenAI  │      │ Ollama  │
//!     └─────────┘      └─────────┘
//! ```

pub mod backend;
pub mod error;
pub mod types;

// Provider implementations
pub mod ollama;
pub mod openai;
pub mod provider;

pub use backend::{ChatModel, MockModel, SharedModel};
pub use error::{LlmError, Result};
pub use types::{Message, Role, flatten_messages};

pub use ollama::{
    ApiFlavor, DEFAULT_OLLAMA_BASE, OllamaBackend, OllamaConfig, PROBE_TIMEOUT, STARTUP_ATTEMPTS,
    STARTUP_INTERVAL, probe_server, wait_for_server,
};
pub use openai::{OPENAI_API_KEY_VAR, OpenAiBackend, OpenAiConfig};
pub use provider::{EnvProvider, ModelProvider, ProviderId, ResolveError};
