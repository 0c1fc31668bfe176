//! Ask command - one-shot question to the assistant.

use anyhow::Result;
use clap::Args;
use console::Style;

use sibyl_agent::{Orchestrator, ReactConfig, SessionState};

use super::{Context, parse_provider};

/// Arguments for the ask command.
#[derive(Args, Debug)]
pub struct AskArgs {
    /// The question to ask
    #[arg(required = true)]
    pub question: String,

    /// Model provider to use (openai or ollama)
    #[arg(short, long)]
    pub provider: Option<String>,

    /// Answer without web search
    #[arg(long)]
    pub no_search: bool,

    /// Reasoning-loop step ceiling
    #[arg(long, value_name = "N")]
    pub max_steps: Option<u32>,
}

/// Run the ask command.
pub async fn run(args: AskArgs, ctx: &Context) -> Result<()> {
    let provider = parse_provider(args.provider.as_deref())?;

    if ctx.verbose {
        let dim = Style::new().dim();
        println!("{}", dim.apply_to(format!("Provider: {}", provider)));
        println!();
    }

    let mut session = SessionState::new(provider);
    session.set_search_enabled(!args.no_search);

    let mut orchestrator = Orchestrator::new();
    if let Some(steps) = args.max_steps {
        orchestrator = orchestrator.with_react_config(ReactConfig { max_steps: steps });
    }

    match orchestrator.respond(&session, &args.question).await {
        Ok(answer) => {
            println!("{}", answer);
            Ok(())
        }
        Err(e) => Err(anyhow::anyhow!(e.user_message())),
    }
}
