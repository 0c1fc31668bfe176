//! Sibyl - Conversational Quantum Research Assistant
//!
//! Main entry point for the Sibyl CLI.

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

use commands::{ask, chat, start, status};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// Sibyl - Conversational Quantum Research Assistant
#[derive(Parser)]
#[command(name = "sibyl")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Enter interactive chat mode (REPL)
    Chat(chat::ChatArgs),

    /// Ask a one-shot question
    Ask(ask::AskArgs),

    /// Show provider and search readiness
    Status(status::StatusArgs),

    /// Start the local Ollama server
    Start(start::StartArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before anything reads credentials.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize tracing — console (human-readable) + rotating JSON file
    let filter = if cli.verbose {
        "sibyl=debug,sibyl_agent=debug,sibyl_llm=debug,sibyl_memory=debug,info"
    } else {
        "sibyl=info,sibyl_agent=info,sibyl_llm=info,warn"
    };

    let log_dir = dirs::data_dir()
        .map(|d| d.join("sibyl").join("logs"))
        .unwrap_or_else(|| std::path::PathBuf::from("logs"));
    let file_appender = tracing_appender::rolling::daily(&log_dir, "sibyl.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    use tracing_subscriber::prelude::*;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_filter(tracing_subscriber::EnvFilter::new(filter)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(tracing_subscriber::EnvFilter::new(
                    "sibyl=trace,sibyl_agent=trace,sibyl_llm=trace,sibyl_memory=trace,info",
                )),
        )
        .init();

    // Create context for commands
    let ctx = commands::Context {
        json_output: cli.json,
        verbose: cli.verbose,
    };

    // No subcommand drops straight into chat
    let command = cli
        .command
        .unwrap_or_else(|| Commands::Chat(chat::ChatArgs::default()));

    // Dispatch to command handlers
    match command {
        Commands::Chat(args) => chat::run(args, &ctx).await,
        Commands::Ask(args) => ask::run(args, &ctx).await,
        Commands::Status(args) => status::run(args, &ctx).await,
        Commands::Start(args) => start::run(args, &ctx).await,
    }
}
