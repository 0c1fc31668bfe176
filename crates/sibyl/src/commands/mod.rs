//! CLI command handlers.

pub mod ask;
pub mod chat;
pub mod repl;
pub mod start;
pub mod status;

use anyhow::Result;
use std::str::FromStr;

use sibyl_llm::ProviderId;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Output as JSON for scripting.
    pub json_output: bool,
    /// Verbose output enabled.
    pub verbose: bool,
}

/// Parse an optional `--provider` value, defaulting to OpenAI.
pub fn parse_provider(value: Option<&str>) -> Result<ProviderId> {
    match value {
        Some(s) => ProviderId::from_str(s).map_err(|e| anyhow::anyhow!(e)),
        None => Ok(ProviderId::default()),
    }
}
