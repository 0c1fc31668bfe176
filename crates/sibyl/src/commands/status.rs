//! Status command - reports provider and search readiness.

use anyhow::Result;
use clap::Args;
use console::Style;
use serde::Serialize;

use sibyl_agent::{GOOGLE_API_KEY_VAR, GOOGLE_CSE_ID_VAR, SearchKeys};
use sibyl_llm::{DEFAULT_OLLAMA_BASE, OPENAI_API_KEY_VAR, PROBE_TIMEOUT, probe_server};

use super::Context;

/// Arguments for the status command.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Ollama server URL to probe
    #[arg(long, default_value = DEFAULT_OLLAMA_BASE)]
    pub url: String,
}

/// Machine-readable status report.
#[derive(Debug, Serialize)]
struct StatusOutput {
    openai_key_present: bool,
    ollama_running: bool,
    ollama_url: String,
    search_keys_present: bool,
}

/// Run the status command.
pub async fn run(args: StatusArgs, ctx: &Context) -> Result<()> {
    // Presence checks only. Key values are never read into the report.
    let openai_key_present = std::env::var(OPENAI_API_KEY_VAR).is_ok_and(|v| !v.is_empty());
    let search_keys_present = SearchKeys::from_env().is_some();
    let ollama_running = probe_server(&args.url, PROBE_TIMEOUT).await;

    let output = StatusOutput {
        openai_key_present,
        ollama_running,
        ollama_url: args.url.clone(),
        search_keys_present,
    };

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    print_human(&output);
    Ok(())
}

fn print_human(output: &StatusOutput) {
    let bold = Style::new().bold();
    let dim = Style::new().dim();
    let green = Style::new().green();
    let red = Style::new().red();

    println!();
    println!("{}", bold.apply_to("Sibyl Status"));
    println!("{}", dim.apply_to("─".repeat(40)));

    if output.openai_key_present {
        println!("  OpenAI:  {} key present", green.apply_to("●"));
    } else {
        println!("  OpenAI:  {} key missing", red.apply_to("●"));
        println!(
            "           {}",
            dim.apply_to(format!("Set {} to enable the OpenAI provider", OPENAI_API_KEY_VAR))
        );
    }

    if output.ollama_running {
        println!(
            "  Ollama:  {} running at {}",
            green.apply_to("●"),
            output.ollama_url
        );
    } else {
        println!(
            "  Ollama:  {} not running at {}",
            red.apply_to("●"),
            output.ollama_url
        );
        println!(
            "           {}",
            dim.apply_to("Start the server with: sibyl start")
        );
    }

    if output.search_keys_present {
        println!("  Search:  {} Google keys present", green.apply_to("●"));
    } else {
        println!("  Search:  {} Google keys missing", red.apply_to("●"));
        println!(
            "           {}",
            dim.apply_to(format!(
                "Set {} and {} to enable web search",
                GOOGLE_API_KEY_VAR, GOOGLE_CSE_ID_VAR
            ))
        );
    }

    println!();
}
