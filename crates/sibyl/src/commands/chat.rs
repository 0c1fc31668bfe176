//! Chat command - interactive REPL mode.

use anyhow::Result;
use clap::Args;

use super::repl::Repl;
use super::{Context, parse_provider};

/// Arguments for the chat command.
#[derive(Args, Debug, Default)]
pub struct ChatArgs {
    /// Model provider to use (openai or ollama)
    #[arg(short, long)]
    pub provider: Option<String>,

    /// Start with web search turned off
    #[arg(long)]
    pub no_search: bool,

    /// Context window size in exchange pairs
    #[arg(long, value_name = "PAIRS")]
    pub window: Option<usize>,

    /// Reasoning-loop step ceiling
    #[arg(long, value_name = "N")]
    pub max_steps: Option<u32>,
}

/// Run the chat command (REPL).
pub async fn run(args: ChatArgs, ctx: &Context) -> Result<()> {
    let provider = parse_provider(args.provider.as_deref())?;

    let mut repl = Repl::new(
        provider,
        !args.no_search,
        args.window,
        args.max_steps,
        ctx.verbose,
    )?;
    repl.run().await
}
