use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::Mutex;

use stackql_agent::errors::{AgentError, AgentResult};
use stackql_agent::models::message::Turn;
use stackql_agent::models::tool::{Tool, ToolCall, ToolParameter};
use stackql_agent::providers::base::{ModelReply, Provider, Usage};
use stackql_agent::systems::System;

/// A mock provider that returns pre-configured replies and records what it was sent
#[derive(Clone)]
pub struct MockProvider {
    responses: Arc<Mutex<Vec<ModelReply>>>,
    transcripts: Arc<Mutex<Vec<Vec<Turn>>>>,
}

impl MockProvider {
    pub fn new(responses: Vec<ModelReply>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            transcripts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn transcripts(&self) -> Vec<Vec<Turn>> {
        self.transcripts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(&self, transcript: &[Turn], _tools: &[Tool]) -> Result<(ModelReply, Usage)> {
        self.transcripts.lock().unwrap().push(transcript.to_vec());
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok((ModelReply::default(), Usage::default()))
        } else {
            Ok((responses.remove(0), Usage::default()))
        }
    }
}

/// Answers `list_providers` with a fixed list, and nothing else
pub struct ProvidersOnlySystem {
    tools: Vec<Tool>,
}

impl ProvidersOnlySystem {
    pub fn new() -> Self {
        Self {
            tools: vec![
                Tool::new("list_providers", "List all available StackQL providers", vec![]),
                Tool::new(
                    "list_services",
                    "List services for a provider",
                    vec![ToolParameter::string("provider", "The provider name")],
                ),
            ],
        }
    }
}

#[async_trait]
impl System for ProvidersOnlySystem {
    fn name(&self) -> &str {
        "ProvidersOnlySystem"
    }

    fn description(&self) -> &str {
        "Knows the provider list"
    }

    fn tools(&self) -> &[Tool] {
        &self.tools
    }

    async fn call(&self, tool_call: ToolCall) -> AgentResult<String> {
        match tool_call.name.as_str() {
            "list_providers" => Ok("google\naws\nazure".to_string()),
            other => Err(AgentError::ExecutionError(format!("{} is offline", other))),
        }
    }
}
