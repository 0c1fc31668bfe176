//! Prompt assembly for both answer modes.
//!
//! Direct mode sends a fixed system instruction plus the conversation window
//! and the query as an ordered message sequence. Tool mode renders a single
//! ReAct prompt string: persona, tool roster, the step-by-step output format,
//! the conversation window, the question, and the scratch trace so far.
//! Sections are joined with double newlines.

use sibyl_llm::{Message, Role};

use crate::tool::ToolSet;

/// System instruction for direct completions, where no search tool is
/// exposed.
pub const DIRECT_SYSTEM_PROMPT: &str = "You are a quantum research assistant with mathematics expertise. \
You do NOT have access to Google Search, so use only your built-in knowledge to answer questions. \
Provide detailed and accurate information to the user.";

/// Opening section of the tool-mode prompt.
const REACT_PERSONA: &str = "You are a quantum research assistant with mathematics expertise. \
Your goal is to help users find information and answer their questions.\n\
You have access to Google Search. Use it to find the most up-to-date information.";

/// Closing instruction before the question.
const REACT_BEGIN: &str = "Begin! Provide detailed and accurate information to the user, \
and cite your sources when possible.";

/// Assemble the message sequence for a direct completion.
///
/// Order is fixed: system instruction, then the conversation window oldest
/// first, then the current query.
pub fn direct_messages(window: &[Message], query: &str) -> Vec<Message> {
    let mut messages = Vec::with_capacity(window.len() + 2);
    messages.push(Message::system(DIRECT_SYSTEM_PROMPT));
    messages.extend_from_slice(window);
    messages.push(Message::user(query));
    messages
}

/// One reasoning-loop prompt.
#[derive(Debug, Clone)]
pub struct ReactPrompt<'a> {
    tools: &'a ToolSet,
    window: &'a [Message],
    question: &'a str,
    scratchpad: &'a str,
}

impl<'a> ReactPrompt<'a> {
    pub fn new(
        tools: &'a ToolSet,
        window: &'a [Message],
        question: &'a str,
        scratchpad: &'a str,
    ) -> Self {
        Self {
            tools,
            window,
            question,
            scratchpad,
        }
    }

    /// Render the full prompt string.
    pub fn render(&self) -> String {
        let mut sections: Vec<String> = Vec::new();

        sections.push(REACT_PERSONA.to_string());
        sections.push(self.build_tools_section());
        sections.push(self.build_format_section());
        sections.push(REACT_BEGIN.to_string());

        if let Some(history) = self.build_history_section() {
            sections.push(history);
        }

        sections.push(format!("Question: {}\n{}", self.question, self.scratchpad));

        sections.join("\n\n")
    }

    fn build_tools_section(&self) -> String {
        format!(
            "You have access to the following tools:\n{}",
            self.tools.roster()
        )
    }

    fn build_format_section(&self) -> String {
        format!(
            "Use the following format:\n\
             Question: the input question you must answer\n\
             Thought: you should always think about what to do\n\
             Action: the action to take, should be one of [{}]\n\
             Action Input: the input to the action\n\
             Observation: the result of the action\n\
             ... (this Thought/Action/Action Input/Observation can repeat N times)\n\
             Thought: I now know the final answer\n\
             Final Answer: the final answer to the original input question",
            self.tools.name_list()
        )
    }

    fn build_history_section(&self) -> Option<String> {
        if self.window.is_empty() {
            return None;
        }

        let mut lines = vec!["Previous conversation:".to_string()];
        for message in self.window {
            let speaker = match message.role {
                Role::System => "System",
                Role::User => "User",
                Role::Assistant => "Assistant",
            };
            lines.push(format!("{}: {}", speaker, message.content));
        }
        Some(lines.join("\n"))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
