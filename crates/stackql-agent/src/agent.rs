use std::collections::HashSet;

use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::errors::{AgentError, AgentResult, LoopOutcome};
use crate::models::message::{ToolRequest, Transcript, Turn};
use crate::models::tool::Tool;
use crate::providers::base::Provider;
use crate::systems::{failure_text, System};

/// The prompt that frames a StackQL session
pub const DEFAULT_SYSTEM_PROMPT: &str = include_str!("prompts/system.md");

/// Model round-trips allowed within a single user turn
pub const DEFAULT_MAX_ITERATIONS: usize = 10;

pub const ITERATION_LIMIT_MESSAGE: &str =
    "I apologize, but I reached the maximum number of iterations while processing your request.";

pub const EMPTY_RESPONSE_MESSAGE: &str = "I apologize, but I couldn't generate a response.";

/// Agent integrates a foundational LLM with the system it needs to pilot.
///
/// Each agent owns exactly one conversation. Independent sessions are independent agents,
/// which can share a provider configuration and an MCP client but never a transcript.
pub struct Agent {
    provider: Box<dyn Provider>,
    system: Box<dyn System>,
    transcript: Transcript,
    max_iterations: usize,
}

impl Agent {
    pub fn new(provider: Box<dyn Provider>, system: Box<dyn System>) -> Self {
        Self {
            provider,
            system,
            transcript: Transcript::new(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// The tools offered to the model on every query
    pub fn tools(&self) -> &[Tool] {
        self.system.tools()
    }

    pub fn history(&self) -> &[Turn] {
        self.transcript.turns()
    }

    /// Forget the whole conversation, system prompt included
    pub fn reset(&mut self) {
        self.transcript.clear();
    }

    /// Answer a user message, always with text.
    ///
    /// `system_prompt` is only used when this is the first user message of the session.
    pub async fn send(&mut self, user_text: &str, system_prompt: Option<&str>) -> String {
        match self.run(user_text, system_prompt).await {
            LoopOutcome::Answer(text) => text,
            LoopOutcome::IterationLimitReached => ITERATION_LIMIT_MESSAGE.to_string(),
            LoopOutcome::ModelFailure(message) => format!("Error: {}", message),
        }
    }

    /// Drive one user turn to completion and report how it ended
    pub async fn run(&mut self, user_text: &str, system_prompt: Option<&str>) -> LoopOutcome {
        match self.run_turn(user_text, system_prompt).await {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(error = %err, "conversation turn aborted");
                LoopOutcome::ModelFailure(err.to_string())
            }
        }
    }

    async fn run_turn(
        &mut self,
        user_text: &str,
        system_prompt: Option<&str>,
    ) -> AgentResult<LoopOutcome> {
        if self.transcript.user_turn_count() == 0 {
            if let Some(prompt) = system_prompt {
                self.transcript.push(Turn::system(prompt))?;
            }
        }
        self.transcript.push(Turn::user(user_text))?;
        info!(
            user_turn = self.transcript.user_turn_count(),
            "processing user message"
        );

        for iteration in 1..=self.max_iterations {
            debug!(iteration, turns = self.transcript.len(), "querying model");

            let (reply, usage) = match self
                .provider
                .complete(self.transcript.turns(), self.system.tools())
                .await
            {
                Ok(response) => response,
                Err(err) => {
                    warn!(iteration, error = %err, "model query failed");
                    return Ok(LoopOutcome::ModelFailure(err.to_string()));
                }
            };
            debug!(iteration, total_tokens = ?usage.total_tokens, "model replied");

            if !reply.has_tool_requests() {
                let text = reply
                    .text
                    .filter(|text| !text.is_empty())
                    .unwrap_or_else(|| EMPTY_RESPONSE_MESSAGE.to_string());
                self.transcript.push(Turn::assistant(text.clone()))?;
                return Ok(LoopOutcome::Answer(text));
            }

            check_unique_ids(&reply.requests)?;
            let results = self.dispatch(&reply.requests).await;

            self.transcript.push(Turn::assistant_with_requests(
                reply.text.unwrap_or_default(),
                reply.requests,
            ))?;
            for result in results {
                self.transcript.push(result)?;
            }
        }

        warn!(
            max_iterations = self.max_iterations,
            "model kept requesting tools, giving up"
        );
        Ok(LoopOutcome::IterationLimitReached)
    }

    /// Run every requested tool concurrently, returning results in request order
    async fn dispatch(&self, requests: &[ToolRequest]) -> Vec<Turn> {
        let futures = requests.iter().map(|request| async move {
            let text = match &request.tool_call {
                Ok(call) => {
                    debug!(id = %request.id, tool = %call.name, "dispatching tool call");
                    self.system.execute(call.clone()).await
                }
                Err(err) => {
                    warn!(id = %request.id, error = %err, "model sent an unusable tool call");
                    failure_text(&request.name, err)
                }
            };
            Turn::tool_result(request.id.clone(), request.name.clone(), text)
        });

        join_all(futures).await
    }
}

fn check_unique_ids(requests: &[ToolRequest]) -> AgentResult<()> {
    let mut seen = HashSet::new();
    for request in requests {
        if !seen.insert(request.id.as_str()) {
            return Err(AgentError::InvalidTranscript(format!(
                "model reused tool call id '{}'",
                request.id
            )));
        }
    }
    Ok(())
}
