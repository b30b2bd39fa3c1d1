use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::message::{ToolRequest, Turn};
use crate::models::tool::Tool;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: Option<i32>,
    pub output_tokens: Option<i32>,
    pub total_tokens: Option<i32>,
}

impl Usage {
    pub fn new(
        input_tokens: Option<i32>,
        output_tokens: Option<i32>,
        total_tokens: Option<i32>,
    ) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens,
        }
    }
}

/// What the model said back: prose, tool requests, or both
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelReply {
    pub text: Option<String>,
    pub requests: Vec<ToolRequest>,
}

impl ModelReply {
    pub fn text<S: Into<String>>(text: S) -> Self {
        Self {
            text: Some(text.into()),
            requests: Vec::new(),
        }
    }

    pub fn tool_requests(requests: Vec<ToolRequest>) -> Self {
        Self {
            text: None,
            requests,
        }
    }

    pub fn has_tool_requests(&self) -> bool {
        !self.requests.is_empty()
    }
}

/// Base trait for language model providers
#[async_trait]
pub trait Provider: Send + Sync {
    /// Generate the next reply for the transcript, with the tools the model may pick from
    async fn complete(&self, transcript: &[Turn], tools: &[Tool]) -> Result<(ModelReply, Usage)>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tool::ToolCall;
    use serde_json::json;

    #[test]
    fn test_usage_creation() {
        let usage = Usage::new(Some(10), Some(20), Some(30));
        assert_eq!(usage.input_tokens, Some(10));
        assert_eq!(usage.output_tokens, Some(20));
        assert_eq!(usage.total_tokens, Some(30));
        assert_eq!(Usage::default().total_tokens, None);
    }

    #[test]
    fn test_usage_serialization() -> Result<()> {
        let usage = Usage::new(Some(10), Some(20), Some(30));
        let serialized = serde_json::to_string(&usage)?;
        let deserialized: Usage = serde_json::from_str(&serialized)?;
        assert_eq!(usage, deserialized);

        let json_value: serde_json::Value = serde_json::from_str(&serialized)?;
        assert_eq!(json_value["input_tokens"], json!(10));
        assert_eq!(json_value["output_tokens"], json!(20));
        assert_eq!(json_value["total_tokens"], json!(30));

        Ok(())
    }

    #[test]
    fn test_model_reply() {
        let reply = ModelReply::text("hi");
        assert_eq!(reply.text.as_deref(), Some("hi"));
        assert!(!reply.has_tool_requests());

        let reply = ModelReply::tool_requests(vec![ToolRequest::new(
            "call_1",
            Ok(ToolCall::new("list_providers", json!({}))),
        )]);
        assert!(reply.text.is_none());
        assert!(reply.has_tool_requests());
    }
}
