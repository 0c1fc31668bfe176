//! Agent core for Sibyl.
//!
//! This crate decides how each research query is answered and carries it
//! through to an answer or a caught failure: mode selection, the bounded
//! ReAct reasoning loop, the search tool, and per-session state.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Orchestrator                                               │
//! │  - Resolves the model (hard precondition)                   │
//! │  - Resolves search → picks Direct or ToolLoop               │
//! │  - Converts every fault into an AgentError value            │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!              ┌───────────────┼───────────────┐
//!              ▼               ▼               ▼
//!       ┌───────────┐   ┌───────────┐   ┌───────────┐
//!       │ ChatModel │   │ ReactLoop │   │ Session   │
//!       │(sibyl-llm)│   │ + ToolSet │   │ State     │
//!       └───────────┘   └───────────┘   └───────────┘
//! ```
//!
//! # Core Components
//!
//! - [`Orchestrator`]: the per-query state machine
//! - [`ReactLoop`]: bounded think → act → observe cycle
//! - [`SessionState`]: provider choice, search toggle, transcript
//! - [`AgentError`]: tagged failure with a chat-facing rendering

pub mod error;
pub mod orchestrator;
pub mod prompt;
pub mod react;
pub mod search;
pub mod session;
pub mod tool;

// Re-export core types
pub use error::{AgentError, Result};
pub use orchestrator::Orchestrator;
pub use session::SessionState;

// Re-export tool types
pub use tool::{SharedTool, Tool, ToolSet};

// Re-export search capability types
pub use search::{
    AgentMode, EnvSearch, GOOGLE_API_KEY_VAR, GOOGLE_CSE_ID_VAR, GoogleSearchTool, SearchConfig,
    SearchKeys, SearchProvider,
};

// Re-export reasoning loop types
pub use react::{
    DEFAULT_MAX_STEPS, ParseFault, ParsedStep, ReactConfig, ReactLoop, Scratchpad, parse_step,
};

// Re-export prompt assembly
pub use prompt::{DIRECT_SYSTEM_PROMPT, ReactPrompt, direct_messages};
