//! REPL (Read-Eval-Print Loop) implementation for interactive chat.

use anyhow::Result;
use console::{Style, Term, style};
use indicatif::{ProgressBar, ProgressStyle};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{Config, Editor};
use std::str::FromStr;
use std::time::Duration;

use sibyl_agent::{Orchestrator, ReactConfig, SearchConfig, SessionState};
use sibyl_llm::ProviderId;
use sibyl_memory::Speaker;

/// REPL state and configuration.
pub struct Repl {
    orchestrator: Orchestrator,
    session: SessionState,
    editor: Editor<(), DefaultHistory>,
    term: Term,
    verbose: bool,
}

impl Repl {
    /// Create a new REPL instance.
    pub fn new(
        provider: ProviderId,
        search_enabled: bool,
        window_pairs: Option<usize>,
        max_steps: Option<u32>,
        verbose: bool,
    ) -> Result<Self> {
        let config = Config::builder()
            .history_ignore_space(true)
            .auto_add_history(true)
            .build();

        let editor = Editor::with_config(config)?;

        let mut session = SessionState::new(provider);
        if let Some(pairs) = window_pairs {
            session = session.with_window_pairs(pairs);
        }
        session.set_search_enabled(search_enabled);

        let mut orchestrator = Orchestrator::new();
        if let Some(steps) = max_steps {
            orchestrator = orchestrator.with_react_config(ReactConfig { max_steps: steps });
        }

        Ok(Self {
            orchestrator,
            session,
            editor,
            term: Term::stdout(),
            verbose,
        })
    }

    /// Run the REPL loop.
    pub async fn run(&mut self) -> Result<()> {
        tracing::info!(
            session_id = %self.session.id(),
            provider = %self.session.provider(),
            "chat session started"
        );
        self.print_welcome();

        loop {
            let prompt = self.format_prompt();

            match self.editor.readline(&prompt) {
                Ok(line) => {
                    let line = line.trim();

                    if line.is_empty() {
                        continue;
                    }

                    // Handle slash commands
                    if line.starts_with('/') {
                        match self.handle_slash_command(line) {
                            Ok(ControlFlow::Continue) => continue,
                            Ok(ControlFlow::Exit) => break,
                            Err(e) => {
                                self.print_error(&format!("Command error: {}", e));
                                continue;
                            }
                        }
                    }

                    // Send as a research query
                    self.send_message(line).await;
                }
                Err(ReadlineError::Interrupted) => {
                    // Ctrl+C - cancel current input but don't exit
                    println!();
                    self.print_dim("(Interrupted - type /quit to exit)");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    // Ctrl+D - exit
                    println!();
                    break;
                }
                Err(e) => {
                    self.print_error(&format!("Input error: {}", e));
                    break;
                }
            }
        }

        self.print_dim("Goodbye!");
        Ok(())
    }

    /// Run one exchange and print the result.
    ///
    /// Failures arrive as values with a chat-facing rendering, so they land
    /// in the transcript like any other reply.
    async fn send_message(&mut self, message: &str) {
        self.session.push_user(message);

        let spinner = self.start_spinner();
        let result = self.orchestrator.respond(&self.session, message).await;
        spinner.finish_and_clear();

        match result {
            Ok(answer) => {
                self.session.push_assistant(&answer);
                println!("{}", answer);
            }
            Err(e) => {
                let text = e.user_message();
                self.session.push_assistant(&text);
                let red = Style::new().red();
                println!("{}", red.apply_to(&text));
            }
        }
        println!();
    }

    fn start_spinner(&self) -> ProgressBar {
        let message = if SearchConfig::detect(self.session.search_enabled()).effective() {
            "Searching the web and generating response..."
        } else {
            "Generating response from existing knowledge..."
        };

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap(),
        );
        spinner.set_message(message);
        spinner.enable_steady_tick(Duration::from_millis(80));
        spinner
    }

    /// Handle a slash command.
    fn handle_slash_command(&mut self, input: &str) -> Result<ControlFlow> {
        let parts: Vec<&str> = input[1..].split_whitespace().collect();
        let cmd = parts.first().copied().unwrap_or("");
        let args = &parts[1..];

        match cmd {
            "quit" | "q" | "exit" => {
                return Ok(ControlFlow::Exit);
            }
            "help" | "h" | "?" => {
                self.print_help();
            }
            "clear" | "cls" => {
                self.session.clear();
                self.term.clear_screen()?;
                self.print_dim("Conversation cleared");
            }
            "search" => match args.first().copied() {
                Some("on") => {
                    self.session.set_search_enabled(true);
                    self.print_search_state();
                }
                Some("off") => {
                    self.session.set_search_enabled(false);
                    self.print_search_state();
                }
                _ => {
                    self.print_search_state();
                    self.print_dim("Use /search on or /search off to change it");
                }
            },
            "provider" => match args.first().copied() {
                Some(name) => match ProviderId::from_str(name) {
                    Ok(provider) => {
                        self.session.set_provider(provider);
                        self.print_dim(&format!("Switched to {}", provider));
                    }
                    Err(e) => self.print_error(&e),
                },
                None => {
                    println!("Current provider: {}", self.session.provider());
                }
            },
            "status" => {
                self.print_status();
            }
            "history" => {
                self.print_history();
            }
            "new" => {
                let provider = self.session.provider();
                let search_enabled = self.session.search_enabled();
                let pairs = self.session.window_pairs();
                self.session = SessionState::new(provider).with_window_pairs(pairs);
                self.session.set_search_enabled(search_enabled);
                tracing::info!(session_id = %self.session.id(), "started new session");
                self.print_dim("Started new session");
            }
            "" => {
                self.print_dim("Type /help for available commands");
            }
            _ => {
                self.print_error(&format!("Unknown command: /{}", cmd));
                self.print_dim("Type /help for available commands");
            }
        }

        Ok(ControlFlow::Continue)
    }

    fn print_welcome(&self) {
        let dim = Style::new().dim();
        println!();
        println!("{}", style("Sibyl Research Chat").bold().cyan());
        println!("{}", dim.apply_to("─".repeat(40)));
        println!(
            "{}",
            dim.apply_to("Ask a research question and press Enter.")
        );
        println!(
            "{}",
            dim.apply_to("Use /help for commands, Ctrl+D to exit.")
        );
        println!();
    }

    fn print_help(&self) {
        let dim = Style::new().dim();
        println!();
        println!("{}", style("Available Commands").bold());
        println!("{}", dim.apply_to("─".repeat(40)));
        println!("  {}  - Exit the REPL", style("/quit, /q").cyan());
        println!("  {}  - Show this help", style("/help, /h, /?").cyan());
        println!(
            "  {}  - Clear the conversation and screen",
            style("/clear").cyan()
        );
        println!(
            "  {}  - Toggle web search",
            style("/search on|off").cyan()
        );
        println!(
            "  {}  - Switch model provider",
            style("/provider openai|ollama").cyan()
        );
        println!("  {}  - Show session status", style("/status").cyan());
        println!("  {}  - Replay the conversation", style("/history").cyan());
        println!("  {}  - Start a new session", style("/new").cyan());
        println!();
        println!("{}", dim.apply_to("Keyboard shortcuts:"));
        println!("  {} - Interrupt current input", dim.apply_to("Ctrl+C"));
        println!("  {} - Exit the REPL", dim.apply_to("Ctrl+D"));
        println!();
    }

    fn print_search_state(&self) {
        let config = SearchConfig::detect(self.session.search_enabled());
        if config.effective() {
            let green = Style::new().green();
            println!("Search: {}", green.apply_to("● enabled"));
        } else if config.enabled {
            let yellow = Style::new().yellow();
            println!(
                "Search: {} (Google keys not set, queries run without search)",
                yellow.apply_to("● enabled")
            );
        } else {
            let dim = Style::new().dim();
            println!("Search: {}", dim.apply_to("● disabled"));
        }
    }

    /// Replay the full transcript, oldest first.
    fn print_history(&self) {
        let turns = self.session.snapshot();
        if turns.is_empty() {
            self.print_dim("No conversation yet");
            return;
        }

        println!();
        for turn in turns {
            match turn.speaker {
                Speaker::User => {
                    println!("{} {}", style("you:").cyan().bold(), turn.content);
                }
                Speaker::Assistant => {
                    println!("{} {}", style("sibyl:").green().bold(), turn.content);
                }
            }
            println!();
        }
    }

    fn print_status(&self) {
        let dim = Style::new().dim();
        println!();
        println!("  {} {}", dim.apply_to("Session:"), self.session.id());
        println!(
            "  {} {}",
            dim.apply_to("Provider:"),
            self.session.provider()
        );
        print!("  ");
        self.print_search_state();
        println!(
            "  {} {}",
            dim.apply_to("Turns:"),
            self.session.turn_count()
        );
        if self.verbose {
            println!(
                "  {} {}",
                dim.apply_to("Window:"),
                self.session.window().len()
            );
        }
        println!();
    }

    fn format_prompt(&self) -> String {
        format!("{} ", style("sibyl>").cyan().bold())
    }

    fn print_dim(&self, msg: &str) {
        let dim = Style::new().dim();
        println!("{}", dim.apply_to(msg));
    }

    fn print_error(&self, msg: &str) {
        let red = Style::new().red();
        println!("{} {}", red.apply_to("Error:"), msg);
    }
}

/// Control flow for the REPL.
pub enum ControlFlow {
    Continue,
    Exit,
}
