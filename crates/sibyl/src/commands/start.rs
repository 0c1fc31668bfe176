//! Start command - launches a local Ollama server.

use std::process::Stdio;

use anyhow::{Context as _, Result, bail};
use clap::Args;
use console::Style;

use sibyl_llm::{
    DEFAULT_OLLAMA_BASE, PROBE_TIMEOUT, STARTUP_ATTEMPTS, STARTUP_INTERVAL, probe_server,
    wait_for_server,
};

use super::Context;

/// Arguments for the start command.
#[derive(Args, Debug)]
pub struct StartArgs {
    /// Ollama server URL to wait on
    #[arg(long, default_value = DEFAULT_OLLAMA_BASE)]
    pub url: String,
}

/// Run the start command.
pub async fn run(args: StartArgs, _ctx: &Context) -> Result<()> {
    let green = Style::new().green();
    let dim = Style::new().dim();

    if probe_server(&args.url, PROBE_TIMEOUT).await {
        println!(
            "{} Ollama server is already running at {}",
            green.apply_to("●"),
            args.url
        );
        return Ok(());
    }

    println!("{}", dim.apply_to("Launching `ollama serve`..."));

    // The child is left to outlive this process. Output is discarded so the
    // server does not share the terminal with the chat.
    let _child = spawn_server().context("failed to launch `ollama serve` (is Ollama installed?)")?;
    tracing::info!(url = %args.url, "spawned `ollama serve`");

    if wait_for_server(&args.url, STARTUP_ATTEMPTS, STARTUP_INTERVAL).await {
        println!(
            "{} Ollama server is running at {}",
            green.apply_to("●"),
            args.url
        );
        Ok(())
    } else {
        tracing::warn!(
            url = %args.url,
            attempts = STARTUP_ATTEMPTS,
            "server never answered the liveness probe"
        );
        bail!(
            "Ollama server did not respond at {} after {} attempts",
            args.url,
            STARTUP_ATTEMPTS
        );
    }
}

#[cfg(not(windows))]
fn spawn_server() -> std::io::Result<tokio::process::Child> {
    tokio::process::Command::new("ollama")
        .arg("serve")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
}

#[cfg(windows)]
fn spawn_server() -> std::io::Result<tokio::process::Child> {
    // Resolving `ollama` on Windows needs the shell to consult PATHEXT.
    tokio::process::Command::new("cmd")
        .args(["/C", "ollama", "serve"])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
}
