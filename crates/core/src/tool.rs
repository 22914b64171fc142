//! Tool trait: the abstraction over research capabilities.
//!
//! Each tool wraps one USAspending query (award search, recipient lookup,
//! competition analysis, ...). Tools are registered in the [`ToolRegistry`],
//! which is the single place where internal success/failure is rendered into
//! the text payload the protocol host hands back to the agent.

use crate::error::ToolError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

/// A request to execute a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique call ID assigned by the host
    pub id: String,

    /// Name of the tool to execute
    pub name: String,

    /// Arguments as a JSON value
    pub arguments: serde_json::Value,
}

/// The result of a tool execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// The call ID this result is for
    pub call_id: String,

    /// Whether the tool executed successfully
    pub success: bool,

    /// The output content (JSON document on success, a message on failure)
    pub output: String,

    /// Optional structured data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl ToolResult {
    /// Build a success result from a JSON payload. A payload that cannot be
    /// rendered becomes an error result rather than an empty success.
    pub fn from_payload(payload: serde_json::Value) -> Self {
        match serde_json::to_string_pretty(&payload) {
            Ok(output) => Self {
                call_id: String::new(),
                success: true,
                output,
                data: Some(payload),
            },
            Err(e) => {
                warn!(error = %e, "Failed to render tool payload");
                Self::error(format!("Error: Failed to render tool output: {e}"))
            }
        }
    }

    /// Build an error result carrying a single human-readable message.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            call_id: String::new(),
            success: false,
            output: message.into(),
            data: None,
        }
    }

    fn with_call_id(mut self, call_id: &str) -> Self {
        self.call_id = call_id.to_string();
        self
    }
}

/// Description of a tool as advertised to the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON Schema for the parameters
    pub parameters: serde_json::Value,
}

/// The core Tool trait.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "search_awards").
    fn name(&self) -> &str;

    /// A description of what this tool does (sent to the host).
    fn description(&self) -> &str;

    /// JSON Schema describing this tool's parameters.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Execute the tool with the given arguments.
    async fn execute(
        &self,
        arguments: serde_json::Value,
    ) -> std::result::Result<ToolResult, ToolError>;

    /// Convert this tool into a ToolDefinition for the host.
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// A registry of available tools.
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool. Replaces any existing tool with the same name.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let name = tool.name().to_string();
        self.tools.insert(name, tool);
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    /// Get all tool definitions, sorted by name.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut defs: Vec<_> = self.tools.values().map(|t| t.to_definition()).collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    /// Execute a tool call, keeping success and failure apart.
    pub async fn execute(&self, call: &ToolCall) -> std::result::Result<ToolResult, ToolError> {
        let tool = self
            .tools
            .get(&call.name)
            .ok_or_else(|| ToolError::NotFound(call.name.clone()))?;
        tool.execute(call.arguments.clone()).await
    }

    /// Execute a tool call and render the outcome for the host.
    ///
    /// This never fails: every error becomes an error payload whose output is
    /// a single message string.
    pub async fn invoke(&self, call: &ToolCall) -> ToolResult {
        match self.execute(call).await {
            Ok(result) => result.with_call_id(&call.id),
            Err(e) => {
                warn!(tool = %call.name, error = %e, "Tool execution failed");
                ToolResult::error(format!("Error: {e}")).with_call_id(&call.id)
            }
        }
    }

    /// List all registered tool names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
