use std::collections::HashSet;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::role::Role;
use super::tool::ToolCall;
use crate::errors::{AgentError, AgentResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// A tool invocation issued by the model. The call itself may have failed to parse,
/// in which case the error travels with the request so it can be answered as text.
pub struct ToolRequest {
    pub id: String,
    pub name: String,
    pub tool_call: AgentResult<ToolCall>,
}

impl ToolRequest {
    pub fn new<S: Into<String>>(id: S, tool_call: AgentResult<ToolCall>) -> Self {
        let name = match &tool_call {
            Ok(call) => call.name.clone(),
            Err(_) => String::new(),
        };
        Self {
            id: id.into(),
            name,
            tool_call,
        }
    }

    /// A request whose arguments could not be turned into a ToolCall
    pub fn failed<I: Into<String>, N: Into<String>>(id: I, name: N, error: AgentError) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            tool_call: Err(error),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
/// One entry of the conversation transcript
pub enum Turn {
    System {
        content: String,
        created: i64,
    },
    User {
        content: String,
        created: i64,
    },
    Assistant {
        content: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_requests: Vec<ToolRequest>,
        created: i64,
    },
    #[serde(rename = "tool")]
    ToolResult {
        tool_call_id: String,
        name: String,
        content: String,
        created: i64,
    },
}

impl Turn {
    pub fn system<S: Into<String>>(text: S) -> Self {
        Turn::System {
            content: text.into(),
            created: Utc::now().timestamp(),
        }
    }

    pub fn user<S: Into<String>>(text: S) -> Self {
        Turn::User {
            content: text.into(),
            created: Utc::now().timestamp(),
        }
    }

    pub fn assistant<S: Into<String>>(text: S) -> Self {
        Self::assistant_with_requests(text, Vec::new())
    }

    pub fn assistant_with_requests<S: Into<String>>(text: S, requests: Vec<ToolRequest>) -> Self {
        Turn::Assistant {
            content: text.into(),
            tool_requests: requests,
            created: Utc::now().timestamp(),
        }
    }

    pub fn tool_result<I, N, S>(id: I, name: N, text: S) -> Self
    where
        I: Into<String>,
        N: Into<String>,
        S: Into<String>,
    {
        Turn::ToolResult {
            tool_call_id: id.into(),
            name: name.into(),
            content: text.into(),
            created: Utc::now().timestamp(),
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Turn::System { .. } => Role::System,
            Turn::User { .. } => Role::User,
            Turn::Assistant { .. } => Role::Assistant,
            Turn::ToolResult { .. } => Role::Tool,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Turn::System { content, .. }
            | Turn::User { content, .. }
            | Turn::Assistant { content, .. }
            | Turn::ToolResult { content, .. } => content,
        }
    }

    /// Tool requests carried by an assistant turn, empty for every other turn
    pub fn tool_requests(&self) -> &[ToolRequest] {
        match self {
            Turn::Assistant { tool_requests, .. } => tool_requests,
            _ => &[],
        }
    }
}

/// The ordered, append-only record of one conversation.
///
/// Appending checks the ordering rules: a system turn can only open the transcript,
/// every tool result must answer a pending request of the latest assistant turn, and
/// no other turn may be added while requests are still unanswered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: Turn) -> AgentResult<()> {
        let pending = self.pending_request_ids();
        match &turn {
            Turn::ToolResult { tool_call_id, .. } => {
                if !pending.contains(&tool_call_id.as_str()) {
                    return Err(AgentError::InvalidTranscript(format!(
                        "tool result '{}' does not answer a pending tool request",
                        tool_call_id
                    )));
                }
            }
            _ if !pending.is_empty() => {
                return Err(AgentError::InvalidTranscript(format!(
                    "{} turn appended while tool requests are unanswered: {}",
                    turn.role(),
                    pending.join(", ")
                )));
            }
            Turn::System { .. } if !self.turns.is_empty() => {
                return Err(AgentError::InvalidTranscript(
                    "a system turn can only be the first turn".to_string(),
                ));
            }
            _ => {}
        }

        self.turns.push(turn);
        Ok(())
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn user_turn_count(&self) -> usize {
        self.turns
            .iter()
            .filter(|turn| matches!(turn, Turn::User { .. }))
            .count()
    }

    /// Ids requested by the latest assistant turn that have no tool result yet
    pub fn pending_request_ids(&self) -> Vec<&str> {
        let Some(position) = self
            .turns
            .iter()
            .rposition(|turn| matches!(turn, Turn::Assistant { .. }))
        else {
            return Vec::new();
        };

        let answered: HashSet<&str> = self.turns[position + 1..]
            .iter()
            .filter_map(|turn| match turn {
                Turn::ToolResult { tool_call_id, .. } => Some(tool_call_id.as_str()),
                _ => None,
            })
            .collect();

        self.turns[position]
            .tool_requests()
            .iter()
            .map(|request| request.id.as_str())
            .filter(|id| !answered.contains(id))
            .collect()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }
}
