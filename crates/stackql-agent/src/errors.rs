use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::mcp::TransportError;

#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Deserialize, Serialize)]
pub enum AgentError {
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Tool execution failed: {0}")]
    ExecutionError(String),

    #[error("Invalid transcript: {0}")]
    InvalidTranscript(String),
}

pub type AgentResult<T> = Result<T, AgentError>;

/// How a single user turn ended.
#[derive(Debug, Clone, PartialEq)]
pub enum LoopOutcome {
    /// The model produced a final answer.
    Answer(String),
    /// The model kept requesting tools until the iteration cap was hit.
    IterationLimitReached,
    /// The language model itself could not be queried.
    ModelFailure(String),
}

impl AgentError {
    /// The message carried by the error, without the variant prefix
    pub fn detail(&self) -> &str {
        match self {
            AgentError::ToolNotFound(msg)
            | AgentError::InvalidParameters(msg)
            | AgentError::ExecutionError(msg)
            | AgentError::InvalidTranscript(msg) => msg,
        }
    }
}

impl From<TransportError> for AgentError {
    fn from(err: TransportError) -> Self {
        AgentError::ExecutionError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_becomes_execution_error() {
        let err: AgentError = TransportError::RemoteError {
            message: "bad sql".to_string(),
        }
        .into();
        assert_eq!(err, AgentError::ExecutionError("MCP Error: bad sql".into()));
        assert_eq!(err.detail(), "MCP Error: bad sql");
        assert_eq!(err.to_string(), "Tool execution failed: MCP Error: bad sql");
    }
}
