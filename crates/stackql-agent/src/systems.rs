mod stackql;

pub use stackql::{split_lines, StackQlCommand, StackQlSystem};

use async_trait::async_trait;
use tracing::warn;

use crate::errors::{AgentError, AgentResult};
use crate::models::tool::{Tool, ToolCall};

/// Core trait that defines a system that can be operated by an AI agent
#[async_trait]
pub trait System: Send + Sync {
    /// Get the name of the system
    fn name(&self) -> &str;

    /// Get the system description
    fn description(&self) -> &str;

    /// Get available tools
    fn tools(&self) -> &[Tool];

    /// Call a tool with the given parameters
    async fn call(&self, tool_call: ToolCall) -> AgentResult<String>;

    /// Call a tool and always come back with text the model can read.
    ///
    /// An unknown tool yields `Unknown tool: <name>` and any other failure yields
    /// `Error executing <name>: <error>`.
    async fn execute(&self, tool_call: ToolCall) -> String {
        let name = tool_call.name.clone();
        match self.call(tool_call).await {
            Ok(text) => text,
            Err(err) => {
                warn!(tool = %name, error = %err, "tool call failed");
                failure_text(&name, &err)
            }
        }
    }
}

/// The tool result the model sees when a call could not be completed
pub fn failure_text(tool_name: &str, err: &AgentError) -> String {
    match err {
        AgentError::ToolNotFound(_) => format!("Unknown tool: {}", tool_name),
        _ => format!("Error executing {}: {}", tool_name, err.detail()),
    }
}
