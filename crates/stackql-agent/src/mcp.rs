//! A minimal client for the StackQL MCP server, which speaks json-rpc over plain http posts.
mod client;
mod error;
mod types;

pub use client::{tool_text, McpClient, RemoteTool, DEFAULT_MCP_URL, LIST_TIMEOUT, TOOL_TIMEOUT};
pub use error::{TransportError, TransportResult};
