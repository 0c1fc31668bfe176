//! Tool boundary for the reasoning loop.
//!
//! Tools here are deliberately narrow: a name, a one-line description, and a
//! text-in/text-out [`run`](Tool::run). The reasoning loop's grammar carries
//! tool input as a raw string, so there is no parameter schema to declare.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::Result;

// ─────────────────────────────────────────────────────────────────────────────
// Tool Trait
// ─────────────────────────────────────────────────────────────────────────────

/// A named capability the reasoning loop may invoke.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name the model uses to request this tool.
    fn name(&self) -> &str;

    /// One-line description shown in the prompt's tool roster.
    fn description(&self) -> &str;

    /// Run the tool against a raw input string.
    async fn run(&self, input: &str) -> Result<String>;
}

/// A tool that can be shared across threads.
pub type SharedTool = Arc<dyn Tool>;

// ─────────────────────────────────────────────────────────────────────────────
// Tool Set
// ─────────────────────────────────────────────────────────────────────────────

/// The tools exposed to one reasoning-loop run.
///
/// Registration order is preserved so the prompt roster and name list render
/// deterministically.
#[derive(Clone, Default)]
pub struct ToolSet {
    tools: Vec<SharedTool>,
}

impl ToolSet {
    /// Create an empty tool set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a set holding a single tool.
    pub fn single(tool: SharedTool) -> Self {
        Self { tools: vec![tool] }
    }

    /// Add a tool to the set.
    pub fn register(&mut self, tool: SharedTool) {
        self.tools.push(tool);
    }

    /// Look up a tool by its exact name.
    pub fn get(&self, name: &str) -> Option<&SharedTool> {
        self.tools.iter().find(|t| t.name() == name)
    }

    /// Names of all registered tools, in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the set holds no tools.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Roster block for the prompt, one `name: description` line per tool.
    pub fn roster(&self) -> String {
        self.tools
            .iter()
            .map(|t| format!("{}: {}", t.name(), t.description()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Comma-joined tool names for the prompt's action constraint.
    pub fn name_list(&self) -> String {
        self.names().join(", ")
    }
}

impl std::fmt::Debug for ToolSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolSet")
            .field("tools", &self.names())
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Mock Tool (test only)
// ─────────────────────────────────────────────────────────────────────────────

/// A mock tool for testing the reasoning loop.
#[cfg(test)]
pub(crate) struct MockTool {
    name: String,
    description: String,
    response: std::sync::Mutex<Option<std::result::Result<String, String>>>,
    calls: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
impl MockTool {
    /// Create a new mock tool returning a default response.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: "A mock tool for testing".to_string(),
            response: std::sync::Mutex::new(None),
            calls: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Set the description shown in prompt rosters.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the response to return.
    pub fn with_response(self, response: impl Into<String>) -> Self {
        *self.response.lock().unwrap() = Some(Ok(response.into()));
        self
    }

    /// Make every invocation fault with the given message.
    pub fn with_failure(self, message: impl Into<String>) -> Self {
        *self.response.lock().unwrap() = Some(Err(message.into()));
        self
    }

    /// Get the inputs this tool was invoked with.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Get the number of invocations.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[cfg(test)]
#[async_trait]
impl Tool for MockTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn run(&self, input: &str) -> Result<String> {
        self.calls.lock().unwrap().push(input.to_string());

        match self.response.lock().unwrap().clone() {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(crate::error::AgentError::tool(message)),
            None => Ok("mock result".to_string()),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_set_lookup() {
        let mut tools = ToolSet::new();
        tools.register(Arc::new(MockTool::new("alpha")));
        tools.register(Arc::new(MockTool::new("beta")));

        assert!(tools.get("alpha").is_some());
        assert!(tools.get("beta").is_some());
        assert!(tools.get("gamma").is_none());
        assert_eq!(tools.len(), 2);
    }

    #[test]
    fn test_lookup_is_exact_match() {
        let tools = ToolSet::single(Arc::new(MockTool::new("google_search")));

        assert!(tools.get("google_search").is_some());
        assert!(tools.get("Google_Search").is_none());
        assert!(tools.get("google_search ").is_none());
    }

    #[test]
    fn test_roster_and_name_list_order() {
        let mut tools = ToolSet::new();
        tools.register(Arc::new(MockTool::new("first")));
        tools.register(Arc::new(MockTool::new("second")));

        assert_eq!(tools.name_list(), "first, second");
        let roster = tools.roster();
        assert!(roster.starts_with("first: "));
        assert!(roster.contains("\nsecond: "));
    }

    #[tokio::test]
    async fn test_mock_tool_records_calls() {
        let tool = MockTool::new("echo").with_response("out");

        let result = tool.run("in").await.unwrap();

        assert_eq!(result, "out");
        assert_eq!(tool.calls(), vec!["in".to_string()]);
    }

    #[tokio::test]
    async fn test_mock_tool_failure() {
        let tool = MockTool::new("broken").with_failure("backend down");

        let result = tool.run("query").await;

        assert!(result.is_err());
        assert_eq!(tool.call_count(), 1);
    }
}
