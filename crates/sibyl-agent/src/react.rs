//! Bounded ReAct reasoning loop.
//!
//! Each step renders the prompt (instructions, tool roster, conversation
//! window, question, scratch trace), invokes the model once, and parses the
//! output against the `Thought:` / `Action:` / `Action Input:` /
//! `Final Answer:` grammar. A final answer ends the loop. A tool request runs
//! the tool and feeds the result back as an observation. Output that parses
//! as neither, or that names an unknown tool, feeds a corrective observation
//! back instead; the model routinely recovers on the next step. The step
//! ceiling turns a runaway loop into an error rather than an infinite
//! conversation.
//!
//! The scratch trace lives and dies inside one `run` call. Conversation
//! history only enters through the rendered window.

use sibyl_llm::{Message, SharedModel};

use crate::error::{AgentError, Result};
use crate::prompt::ReactPrompt;
use crate::tool::ToolSet;

/// Default step ceiling.
pub const DEFAULT_MAX_STEPS: u32 = 15;

/// Marker that ends the loop.
const FINAL_ANSWER_MARKER: &str = "Final Answer:";

/// Marker naming the tool to run.
const ACTION_MARKER: &str = "Action:";

/// Marker carrying the tool input.
const ACTION_INPUT_MARKER: &str = "Action Input:";

// ─────────────────────────────────────────────────────────────────────────────
// Parsing
// ─────────────────────────────────────────────────────────────────────────────

/// One parsed model output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedStep {
    /// The model answered; the loop is done.
    FinalAnswer(String),
    /// The model wants a tool run.
    Act { tool: String, input: String },
}

/// Output that fits neither shape.
///
/// Faults are recoverable: each carries a corrective observation that is fed
/// back to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseFault {
    /// No `Action:` and no `Final Answer:`.
    MissingAction,
    /// `Action:` without a following `Action Input:`.
    MissingInput,
}

impl ParseFault {
    /// The observation text fed back to the model.
    pub fn observation(&self) -> &'static str {
        match self {
            ParseFault::MissingAction => "Invalid Format: Missing 'Action:' after 'Thought:'",
            ParseFault::MissingInput => "Invalid Format: Missing 'Action Input:' after 'Action:'",
        }
    }
}

/// Parse one model output.
///
/// `Final Answer:` wins when both it and an action appear; the answer is
/// everything after the last marker. Otherwise `Action:` / `Action Input:`
/// are extracted with hallucinated `Observation:` tails stripped and wrapping
/// quotes trimmed.
pub fn parse_step(text: &str) -> std::result::Result<ParsedStep, ParseFault> {
    if let Some(idx) = text.rfind(FINAL_ANSWER_MARKER) {
        let answer = text[idx + FINAL_ANSWER_MARKER.len()..].trim().to_string();
        return Ok(ParsedStep::FinalAnswer(answer));
    }

    let action_idx = text.find(ACTION_MARKER).ok_or(ParseFault::MissingAction)?;
    let after_action = &text[action_idx + ACTION_MARKER.len()..];

    let input_idx = after_action
        .find(ACTION_INPUT_MARKER)
        .ok_or(ParseFault::MissingInput)?;

    let tool = after_action[..input_idx]
        .lines()
        .next()
        .unwrap_or("")
        .trim()
        .trim_matches('"')
        .to_string();
    if tool.is_empty() {
        return Err(ParseFault::MissingAction);
    }

    let mut input = &after_action[input_idx + ACTION_INPUT_MARKER.len()..];
    // Models sometimes hallucinate the observation they expect.
    if let Some(obs_idx) = input.find("\nObservation") {
        input = &input[..obs_idx];
    }
    let input = strip_wrapping_quotes(input.trim()).to_string();

    Ok(ParsedStep::Act { tool, input })
}

fn strip_wrapping_quotes(s: &str) -> &str {
    if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
        &s[1..s.len() - 1]
    } else {
        s
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Scratch Trace
// ─────────────────────────────────────────────────────────────────────────────

/// The think/act/observe trace for one query.
///
/// Created fresh per `run` call and discarded with it. Renders as the raw
/// model text followed by its observation, step by step, ending with a
/// `Thought:` invite for the next completion.
#[derive(Debug, Default)]
pub struct Scratchpad {
    steps: Vec<TraceStep>,
}

#[derive(Debug)]
struct TraceStep {
    model_text: String,
    observation: String,
}

impl Scratchpad {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one completed step.
    pub fn record(&mut self, model_text: impl Into<String>, observation: impl Into<String>) {
        self.steps.push(TraceStep {
            model_text: model_text.into().trim().to_string(),
            observation: observation.into(),
        });
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn render(&self) -> String {
        let mut out = String::from("Thought: ");
        for step in &self.steps {
            out.push_str(&step.model_text);
            out.push_str("\nObservation: ");
            out.push_str(&step.observation);
            out.push_str("\nThought: ");
        }
        out
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Loop
// ─────────────────────────────────────────────────────────────────────────────

/// Loop configuration.
#[derive(Debug, Clone, Copy)]
pub struct ReactConfig {
    /// Maximum think/act/observe steps before giving up.
    pub max_steps: u32,
}

impl Default for ReactConfig {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

/// Drives the think → act → observe cycle for one query.
pub struct ReactLoop {
    model: SharedModel,
    tools: ToolSet,
    config: ReactConfig,
}

impl ReactLoop {
    pub fn new(model: SharedModel, tools: ToolSet) -> Self {
        Self::with_config(model, tools, ReactConfig::default())
    }

    pub fn with_config(model: SharedModel, tools: ToolSet, config: ReactConfig) -> Self {
        Self {
            model,
            tools,
            config,
        }
    }

    /// Run the loop to a final answer.
    ///
    /// Model faults abort the loop; tool faults and malformed output are fed
    /// back as observations and the loop continues. Reaching the step ceiling
    /// without a final answer is [`AgentError::Exhausted`].
    pub async fn run(&self, question: &str, window: &[Message]) -> Result<String> {
        let mut scratchpad = Scratchpad::new();

        for step in 1..=self.config.max_steps {
            let rendered =
                ReactPrompt::new(&self.tools, window, question, &scratchpad.render()).render();
            let output = self.model.complete(&[Message::user(rendered)]).await?;

            match parse_step(&output) {
                Ok(ParsedStep::FinalAnswer(answer)) => {
                    tracing::debug!(step, "Reasoning loop produced final answer");
                    return Ok(answer);
                }
                Ok(ParsedStep::Act { tool, input }) => {
                    let observation = self.observe(&tool, &input, step).await;
                    scratchpad.record(output, observation);
                }
                Err(fault) => {
                    tracing::debug!(step, ?fault, "Model output did not parse");
                    scratchpad.record(output, fault.observation());
                }
            }
        }

        tracing::warn!(
            max_steps = self.config.max_steps,
            "Reasoning loop exhausted without final answer"
        );
        Err(AgentError::Exhausted {
            steps: self.config.max_steps,
        })
    }

    /// Run the requested tool and turn the outcome into an observation.
    async fn observe(&self, tool: &str, input: &str, step: u32) -> String {
        let Some(resolved) = self.tools.get(tool) else {
            tracing::debug!(step, tool = %tool, "Unknown tool requested");
            return format!(
                "{} is not a valid tool, try one of [{}].",
                tool,
                self.tools.name_list()
            );
        };

        tracing::debug!(step, tool = %tool, "Running tool");
        match resolved.run(input).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(step, tool = %tool, error = %e, "Tool invocation failed");
                format!("Error: {}", e)
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::MockTool;
    use sibyl_llm::MockModel;
    use std::sync::Arc;

    fn search_toolset(tool: Arc<MockTool>) -> ToolSet {
        ToolSet::single(tool)
    }

    fn mock_search() -> Arc<MockTool> {
        Arc::new(MockTool::new("google_search").with_response("search results"))
    }

    // ── parse_step ──

    #[test]
    fn test_parse_final_answer() {
        let parsed = parse_step("Thought: I know this.\nFinal Answer: 42").unwrap();
        assert_eq!(parsed, ParsedStep::FinalAnswer("42".to_string()));
    }

    #[test]
    fn test_parse_action_and_input() {
        let parsed =
            parse_step("Thought: search it\nAction: google_search\nAction Input: qubit decoherence")
                .unwrap();
        assert_eq!(
            parsed,
            ParsedStep::Act {
                tool: "google_search".to_string(),
                input: "qubit decoherence".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_strips_quotes_and_hallucinated_observation() {
        let parsed = parse_step(
            "Action: google_search\nAction Input: \"qubit\"\nObservation: I imagine results here",
        )
        .unwrap();
        assert_eq!(
            parsed,
            ParsedStep::Act {
                tool: "google_search".to_string(),
                input: "qubit".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_final_answer_wins_over_action() {
        let parsed = parse_step(
            "Thought: done\nAction: google_search\nAction Input: x\nFinal Answer: the end",
        )
        .unwrap();
        assert_eq!(parsed, ParsedStep::FinalAnswer("the end".to_string()));
    }

    #[test]
    fn test_parse_takes_text_after_last_final_answer() {
        let parsed =
            parse_step("Final Answer: not this\nThought: wait\nFinal Answer: this one").unwrap();
        assert_eq!(parsed, ParsedStep::FinalAnswer("this one".to_string()));
    }

    #[test]
    fn test_parse_missing_action() {
        assert_eq!(
            parse_step("I will just ramble without any markers."),
            Err(ParseFault::MissingAction)
        );
    }

    #[test]
    fn test_parse_missing_input() {
        assert_eq!(
            parse_step("Thought: hm\nAction: google_search"),
            Err(ParseFault::MissingInput)
        );
    }

    // ── Scratchpad ──

    #[test]
    fn test_scratchpad_render() {
        let mut pad = Scratchpad::new();
        assert_eq!(pad.render(), "Thought: ");

        pad.record("I should search.\nAction: google_search\nAction Input: x", "results");
        assert_eq!(
            pad.render(),
            "Thought: I should search.\nAction: google_search\nAction Input: x\nObservation: results\nThought: "
        );
        assert_eq!(pad.len(), 1);
    }

    // ── ReactLoop ──

    #[tokio::test]
    async fn test_immediate_final_answer() {
        let model = Arc::new(MockModel::with_text("Thought: easy.\nFinal Answer: 42"));
        let tool = mock_search();
        let agent = ReactLoop::new(model.clone(), search_toolset(tool.clone()));

        let answer = agent.run("what is six times seven?", &[]).await.unwrap();
        assert_eq!(answer, "42");
        assert_eq!(model.request_count(), 1);
        assert_eq!(tool.call_count(), 0);
    }

    #[tokio::test]
    async fn test_tool_step_then_final_answer() {
        let model = Arc::new(MockModel::new(vec![
            "Thought: I should search.\nAction: google_search\nAction Input: \"qubit\"".to_string(),
            "Thought: I now know the final answer\nFinal Answer: answer from search".to_string(),
        ]));
        let tool = mock_search();
        let agent = ReactLoop::new(model.clone(), search_toolset(tool.clone()));

        let answer = agent.run("what is a qubit?", &[]).await.unwrap();
        assert_eq!(answer, "answer from search");
        assert_eq!(tool.calls(), vec!["qubit".to_string()]);

        // The second prompt carries the observation from the first step.
        let requests = model.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests[1][0].content.contains("Observation: search results"));
    }

    #[tokio::test]
    async fn test_unknown_tool_feedback() {
        let model = Arc::new(MockModel::new(vec![
            "Thought: hm\nAction: wikipedia\nAction Input: qubit".to_string(),
            "Final Answer: recovered".to_string(),
        ]));
        let agent = ReactLoop::new(model.clone(), search_toolset(mock_search()));

        let answer = agent.run("q", &[]).await.unwrap();
        assert_eq!(answer, "recovered");
        assert!(model.requests()[1][0]
            .content
            .contains("wikipedia is not a valid tool, try one of [google_search]."));
    }

    #[tokio::test]
    async fn test_malformed_output_feedback() {
        let model = Arc::new(MockModel::new(vec![
            "I ramble with no structure at all.".to_string(),
            "Final Answer: recovered".to_string(),
        ]));
        let agent = ReactLoop::new(model.clone(), search_toolset(mock_search()));

        let answer = agent.run("q", &[]).await.unwrap();
        assert_eq!(answer, "recovered");
        assert!(model.requests()[1][0]
            .content
            .contains("Invalid Format: Missing 'Action:' after 'Thought:'"));
    }

    #[tokio::test]
    async fn test_missing_input_feedback() {
        let model = Arc::new(MockModel::new(vec![
            "Thought: t\nAction: google_search".to_string(),
            "Final Answer: done".to_string(),
        ]));
        let agent = ReactLoop::new(model.clone(), search_toolset(mock_search()));

        agent.run("q", &[]).await.unwrap();
        assert!(model.requests()[1][0]
            .content
            .contains("Invalid Format: Missing 'Action Input:' after 'Action:'"));
    }

    #[tokio::test]
    async fn test_tool_failure_becomes_observation() {
        let model = Arc::new(MockModel::new(vec![
            "Thought: search\nAction: google_search\nAction Input: qubit".to_string(),
            "Final Answer: from my own knowledge".to_string(),
        ]));
        let tool = Arc::new(MockTool::new("google_search").with_failure("rate limited"));
        let agent = ReactLoop::new(model.clone(), search_toolset(tool));

        let answer = agent.run("q", &[]).await.unwrap();
        assert_eq!(answer, "from my own knowledge");
        let second = &model.requests()[1][0].content;
        assert!(second.contains("Error:"));
        assert!(second.contains("rate limited"));
    }

    #[tokio::test]
    async fn test_step_ceiling() {
        let model = Arc::new(MockModel::new(vec![
            "no markers".to_string(),
            "still no markers".to_string(),
            "nope".to_string(),
        ]));
        let agent = ReactLoop::with_config(
            model.clone(),
            search_toolset(mock_search()),
            ReactConfig { max_steps: 3 },
        );

        let err = agent.run("q", &[]).await.unwrap_err();
        assert!(matches!(err, AgentError::Exhausted { steps: 3 }));
        assert_eq!(model.request_count(), 3);
        assert!(err.to_string().contains("no final answer after 3 reasoning steps"));
    }

    #[tokio::test]
    async fn test_model_fault_aborts_loop() {
        // Empty response queue makes the mock fail on first use.
        let model = Arc::new(MockModel::new(vec![]));
        let agent = ReactLoop::new(model, search_toolset(mock_search()));

        let err = agent.run("q", &[]).await.unwrap_err();
        assert!(matches!(err, AgentError::Model(_)));
    }

    #[tokio::test]
    async fn test_window_rendered_into_prompt() {
        let model = Arc::new(MockModel::with_text("Final Answer: ok"));
        let agent = ReactLoop::new(model.clone(), search_toolset(mock_search()));
        let window = vec![
            Message::user("earlier question"),
            Message::assistant("earlier answer"),
        ];

        agent.run("q", &window).await.unwrap();
        let prompt = &model.requests()[0][0].content;
        assert!(prompt.contains("Previous conversation:"));
        assert!(prompt.contains("User: earlier question"));
    }
}
