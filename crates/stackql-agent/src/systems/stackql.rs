use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use super::System;
use crate::errors::{AgentError, AgentResult};
use crate::mcp::{tool_text, McpClient, RemoteTool};
use crate::models::tool::{Tool, ToolCall, ToolParameter};

/// A validated invocation of one of the StackQL tools
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "name", content = "arguments", rename_all = "snake_case")]
pub enum StackQlCommand {
    Greet {
        name: String,
    },
    ListProviders {},
    ListServices {
        provider: String,
    },
    ListResources {
        provider: String,
        service: String,
    },
    ListMethods {
        provider: String,
        service: String,
        resource: String,
    },
    QueryStackql {
        sql: String,
    },
}

impl StackQlCommand {
    /// The method name the MCP server knows this command by
    pub fn remote_method(&self) -> &'static str {
        match self {
            StackQlCommand::Greet { .. } => "greet",
            StackQlCommand::ListProviders {} => "list_providers",
            StackQlCommand::ListServices { .. } => "list_services",
            StackQlCommand::ListResources { .. } => "list_resources",
            StackQlCommand::ListMethods { .. } => "list_methods",
            StackQlCommand::QueryStackql { .. } => "query_v2",
        }
    }

    pub fn remote_arguments(&self) -> Value {
        match self {
            StackQlCommand::Greet { name } => json!({ "name": name }),
            StackQlCommand::ListProviders {} => json!({}),
            StackQlCommand::ListServices { provider } => json!({ "provider": provider }),
            StackQlCommand::ListResources { provider, service } => {
                json!({ "provider": provider, "service": service })
            }
            StackQlCommand::ListMethods {
                provider,
                service,
                resource,
            } => json!({ "provider": provider, "service": service, "resource": resource }),
            StackQlCommand::QueryStackql { sql } => json!({ "sql": sql }),
        }
    }

    /// List commands answer with one entry per line
    pub fn is_listing(&self) -> bool {
        matches!(
            self,
            StackQlCommand::ListProviders {}
                | StackQlCommand::ListServices { .. }
                | StackQlCommand::ListResources { .. }
                | StackQlCommand::ListMethods { .. }
        )
    }
}

/// Split a listing into trimmed, non-empty lines
pub fn split_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

/// The StackQL tool catalog, dispatched to a StackQL MCP server
#[derive(Debug, Clone)]
pub struct StackQlSystem {
    client: McpClient,
    tools: Vec<Tool>,
}

impl StackQlSystem {
    pub fn new(client: McpClient) -> Self {
        let greet_tool = Tool::new(
            "greet",
            "Test the StackQL MCP connection with a simple greeting",
            vec![ToolParameter::string("name", "The name to greet")],
        );

        let list_providers_tool = Tool::new(
            "list_providers",
            "List all available StackQL cloud providers (e.g., google, aws, azure, github, okta, etc.)",
            vec![],
        );

        let list_services_tool = Tool::new(
            "list_services",
            "List services available in a specific cloud provider",
            vec![ToolParameter::string(
                "provider",
                "The provider name (e.g., 'google', 'aws', 'azure')",
            )],
        );

        let list_resources_tool = Tool::new(
            "list_resources",
            "List resources available in a provider's service",
            vec![
                ToolParameter::string("provider", "The provider name"),
                ToolParameter::string("service", "The service name"),
            ],
        );

        let list_methods_tool = Tool::new(
            "list_methods",
            "List methods available for a specific resource",
            vec![
                ToolParameter::string("provider", "The provider name"),
                ToolParameter::string("service", "The service name"),
                ToolParameter::string("resource", "The resource name"),
            ],
        );

        let query_tool = Tool::new(
            "query_stackql",
            "Execute a StackQL query to retrieve information about cloud resources. \
             Use SQL-like syntax to query cloud infrastructure across multiple providers.",
            vec![ToolParameter::string(
                "sql",
                "The StackQL query to execute (e.g., 'SELECT * FROM google.compute.instances WHERE project = \"myproject\"')",
            )],
        );

        Self {
            client,
            tools: vec![
                greet_tool,
                list_providers_tool,
                list_services_tool,
                list_resources_tool,
                list_methods_tool,
                query_tool,
            ],
        }
    }

    /// Check the tool call against the catalog and turn it into a command
    pub fn parse(&self, tool_call: &ToolCall) -> AgentResult<StackQlCommand> {
        let tool = self
            .tools
            .iter()
            .find(|tool| tool.name == tool_call.name)
            .ok_or_else(|| AgentError::ToolNotFound(tool_call.name.clone()))?;

        let arguments = match &tool_call.arguments {
            Value::Null => json!({}),
            Value::Object(_) => tool_call.arguments.clone(),
            other => {
                return Err(AgentError::InvalidParameters(format!(
                    "arguments must be an object, got {}",
                    other
                )))
            }
        };

        let missing = tool.missing_required(&arguments);
        if !missing.is_empty() {
            return Err(AgentError::InvalidParameters(format!(
                "missing required parameter(s): {}",
                missing.join(", ")
            )));
        }
        let mistyped = tool.mistyped(&arguments);
        if !mistyped.is_empty() {
            return Err(AgentError::InvalidParameters(format!(
                "parameter(s) must be strings: {}",
                mistyped.join(", ")
            )));
        }

        serde_json::from_value(json!({ "name": tool.name, "arguments": arguments }))
            .map_err(|e| AgentError::InvalidParameters(e.to_string()))
    }

    /// Run a command against the server and normalize its reply to text
    pub async fn run(&self, command: &StackQlCommand) -> AgentResult<String> {
        let method = command.remote_method();
        debug!(method, "dispatching StackQL command");

        let result = self
            .client
            .call_tool(method, command.remote_arguments())
            .await?;
        let text = tool_text(&result);

        if command.is_listing() {
            let lines = split_lines(&text);
            info!(method, entries = lines.len(), "listing returned");
            Ok(lines.join("\n"))
        } else {
            Ok(text)
        }
    }

    pub async fn greet(&self, name: &str) -> AgentResult<String> {
        self.run(&StackQlCommand::Greet {
            name: name.to_string(),
        })
        .await
    }

    /// Tools advertised by the server itself, which may differ from the local catalog
    pub async fn remote_tools(&self) -> AgentResult<Vec<RemoteTool>> {
        Ok(self.client.list_tools().await?)
    }
}

#[async_trait]
impl System for StackQlSystem {
    fn name(&self) -> &str {
        "StackQlSystem"
    }

    fn description(&self) -> &str {
        "Query cloud infrastructure across providers through the StackQL MCP server"
    }

    fn tools(&self) -> &[Tool] {
        &self.tools
    }

    async fn call(&self, tool_call: ToolCall) -> AgentResult<String> {
        let command = self.parse(&tool_call)?;
        self.run(&command).await
    }
}
