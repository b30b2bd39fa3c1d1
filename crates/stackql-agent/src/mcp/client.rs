use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::error::{preview, TransportError, TransportResult};
use super::types::{error_message, JsonRpcRequest, JsonRpcResponse};

pub const DEFAULT_MCP_URL: &str = "http://127.0.0.1:9912";
pub const TOOL_TIMEOUT: Duration = Duration::from_secs(30);
pub const LIST_TIMEOUT: Duration = Duration::from_secs(10);

/// A tool as advertised by the server's `tools/list`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteTool {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, rename = "inputSchema")]
    pub input_schema: Value,
}

/// Json-rpc transport to the StackQL MCP server.
///
/// Holds no per-call state, so one instance can serve a whole process. Every call is a
/// single attempt; retrying is left to whoever reads the error.
#[derive(Debug, Clone)]
pub struct McpClient {
    client: Client,
    base_url: String,
    tool_timeout: Duration,
    list_timeout: Duration,
}

impl McpClient {
    pub fn new<S: Into<String>>(base_url: S) -> TransportResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| TransportError::Request(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            tool_timeout: TOOL_TIMEOUT,
            list_timeout: LIST_TIMEOUT,
        })
    }

    pub fn with_timeouts(mut self, tool_timeout: Duration, list_timeout: Duration) -> Self {
        self.tool_timeout = tool_timeout;
        self.list_timeout = list_timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send one json-rpc request and return its `result`, or an empty object when absent
    pub async fn call(
        &self,
        method: &str,
        params: Option<Value>,
        timeout: Duration,
    ) -> TransportResult<Value> {
        let url = format!("{}/", self.base_url);
        let request = JsonRpcRequest::new(method, params);
        debug!(method, endpoint = %self.base_url, "sending json-rpc request");

        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .timeout(timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.classify(e, timeout))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.classify(e, timeout))?;

        if !status.is_success() {
            warn!(method, status = status.as_u16(), "MCP server returned an error status");
            return Err(TransportError::Http {
                status: status.as_u16(),
                body: preview(&body),
            });
        }

        let parsed: JsonRpcResponse = serde_json::from_str(&body).map_err(|e| {
            warn!(method, error = %e, "MCP server returned an unparseable body");
            TransportError::ProtocolError {
                body: preview(&body),
            }
        })?;

        if let Some(error) = parsed.error {
            let message = error_message(&error);
            warn!(method, %message, "MCP server returned a json-rpc error");
            return Err(TransportError::RemoteError { message });
        }

        Ok(parsed.result.unwrap_or_else(|| json!({})))
    }

    /// Invoke a remote tool through `tools/call`
    pub async fn call_tool(&self, name: &str, arguments: Value) -> TransportResult<Value> {
        let arguments = match arguments {
            Value::Null => json!({}),
            other => other,
        };
        let params = json!({
            "name": name,
            "arguments": arguments,
        });
        self.call("tools/call", Some(params), self.tool_timeout)
            .await
    }

    /// Enumerate the tools the server advertises through `tools/list`
    pub async fn list_tools(&self) -> TransportResult<Vec<RemoteTool>> {
        let result = self.call("tools/list", None, self.list_timeout).await?;
        match result.get("tools") {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(tools) => serde_json::from_value(tools.clone()).map_err(|_| {
                TransportError::ProtocolError {
                    body: preview(&tools.to_string()),
                }
            }),
        }
    }

    fn classify(&self, error: reqwest::Error, timeout: Duration) -> TransportError {
        let classified = if error.is_timeout() {
            TransportError::Timeout {
                endpoint: self.base_url.clone(),
                after: timeout,
            }
        } else if error.is_connect() {
            TransportError::ConnectionFailure {
                endpoint: self.base_url.clone(),
            }
        } else {
            TransportError::Request(error.to_string())
        };
        warn!(error = %classified, "MCP request failed");
        classified
    }
}

/// The text payload of a tool call result, found at `content[0].text`
pub fn tool_text(result: &Value) -> String {
    result
        .get("content")
        .and_then(|content| content.get(0))
        .and_then(|item| item.get("text"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
