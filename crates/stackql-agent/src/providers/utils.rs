use anyhow::{anyhow, Result};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{json, Value};

use super::base::{ModelReply, Usage};
use crate::errors::AgentError;
use crate::models::message::{ToolRequest, Turn};
use crate::models::tool::{Tool, ToolCall};

lazy_static! {
    static ref INVALID_NAME_CHARS: Regex = Regex::new(r"[^a-zA-Z0-9_-]").unwrap();
    static ref VALID_NAME: Regex = Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap();
}

/// Convert the transcript to OpenAI's chat message specification
pub fn turns_to_openai_spec(turns: &[Turn]) -> Vec<Value> {
    turns
        .iter()
        .map(|turn| match turn {
            Turn::System { content, .. } | Turn::User { content, .. } => json!({
                "role": turn.role(),
                "content": content,
            }),
            Turn::Assistant {
                content,
                tool_requests,
                ..
            } => {
                if tool_requests.is_empty() {
                    return json!({"role": "assistant", "content": content});
                }

                // Requests that failed to parse are still sent back, so the tool turn that
                // carries their error text has a call to answer
                let tool_calls: Vec<Value> = tool_requests
                    .iter()
                    .map(|request| {
                        let arguments = match &request.tool_call {
                            Ok(call) => call.arguments.to_string(),
                            Err(_) => "{}".to_string(),
                        };
                        json!({
                            "id": request.id,
                            "type": "function",
                            "function": {
                                "name": sanitize_function_name(&request.name),
                                "arguments": arguments,
                            }
                        })
                    })
                    .collect();

                let content = if content.is_empty() {
                    Value::Null
                } else {
                    json!(content)
                };
                json!({
                    "role": "assistant",
                    "content": content,
                    "tool_calls": tool_calls,
                })
            }
            Turn::ToolResult {
                tool_call_id,
                name,
                content,
                ..
            } => json!({
                "role": "tool",
                "tool_call_id": tool_call_id,
                "name": sanitize_function_name(name),
                "content": content,
            }),
        })
        .collect()
}

/// Convert internal Tool format to OpenAI's API tool specification
pub fn tools_to_openai_spec(tools: &[Tool]) -> Result<Vec<Value>> {
    let mut tool_names = std::collections::HashSet::new();
    let mut result = Vec::new();

    for tool in tools {
        if !tool_names.insert(&tool.name) {
            return Err(anyhow!("Duplicate tool name: {}", tool.name));
        }

        result.push(json!({
            "type": "function",
            "function": {
                "name": tool.name,
                "description": tool.description,
                "parameters": tool.input_schema(),
            }
        }));
    }

    Ok(result)
}

/// Convert OpenAI's API response to a model reply
pub fn openai_response_to_reply(response: &Value) -> Result<ModelReply> {
    let original = response
        .get("choices")
        .and_then(|choices| choices.get(0))
        .and_then(|choice| choice.get("message"))
        .ok_or_else(|| anyhow!("OpenAI response contained no message"))?;

    let text = original
        .get("content")
        .and_then(Value::as_str)
        .map(String::from);

    let mut requests = Vec::new();
    if let Some(tool_calls) = original.get("tool_calls").and_then(Value::as_array) {
        for tool_call in tool_calls {
            let id = tool_call["id"].as_str().unwrap_or_default().to_string();
            let function_name = tool_call["function"]["name"]
                .as_str()
                .unwrap_or_default()
                .to_string();
            let arguments = tool_call["function"]["arguments"]
                .as_str()
                .unwrap_or_default();

            if !is_valid_function_name(&function_name) {
                let error = AgentError::ToolNotFound(format!(
                    "The provided function name '{}' had invalid characters, it must match this regex [a-zA-Z0-9_-]+",
                    function_name
                ));
                requests.push(ToolRequest::failed(id, function_name, error));
                continue;
            }

            // some models send an empty string for a call without arguments
            let parsed = if arguments.trim().is_empty() {
                Ok(json!({}))
            } else {
                serde_json::from_str::<Value>(arguments)
            };
            match parsed {
                Ok(params) => {
                    requests.push(ToolRequest::new(
                        id,
                        Ok(ToolCall::new(function_name, params)),
                    ));
                }
                Err(e) => {
                    let error = AgentError::InvalidParameters(format!(
                        "Could not interpret tool use parameters for id {}: {}",
                        id, e
                    ));
                    requests.push(ToolRequest::failed(id, function_name, error));
                }
            }
        }
    }

    Ok(ModelReply { text, requests })
}

/// Token counts reported by the endpoint, if it reports any
pub fn openai_usage(response: &Value) -> Usage {
    let Some(usage) = response.get("usage") else {
        return Usage::default();
    };

    let input_tokens = usage
        .get("prompt_tokens")
        .and_then(|v| v.as_i64())
        .map(|v| v as i32);

    let output_tokens = usage
        .get("completion_tokens")
        .and_then(|v| v.as_i64())
        .map(|v| v as i32);

    let total_tokens = usage
        .get("total_tokens")
        .and_then(|v| v.as_i64())
        .map(|v| v as i32)
        .or_else(|| match (input_tokens, output_tokens) {
            (Some(input), Some(output)) => Some(input + output),
            _ => None,
        });

    Usage::new(input_tokens, output_tokens, total_tokens)
}

fn sanitize_function_name(name: &str) -> String {
    INVALID_NAME_CHARS.replace_all(name, "_").to_string()
}

fn is_valid_function_name(name: &str) -> bool {
    VALID_NAME.is_match(name)
}

#[derive(Debug, thiserror::Error)]
#[error("Context length exceeded. Message: {0}")]
pub struct ContextLengthExceededError(String);

pub fn check_openai_context_length_error(error: &Value) -> Option<ContextLengthExceededError> {
    let code = error.get("code")?.as_str()?;
    if code == "context_length_exceeded" || code == "string_above_max_length" {
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("Unknown error")
            .to_string();
        Some(ContextLengthExceededError(message))
    } else {
        None
    }
}
