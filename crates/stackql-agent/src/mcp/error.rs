use std::time::Duration;

use thiserror::Error;

/// Number of characters of a raw response body kept in error messages
pub const BODY_PREVIEW_CHARS: usize = 200;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    #[error("Cannot connect to StackQL MCP server at {endpoint}. Is the server running?")]
    ConnectionFailure { endpoint: String },

    #[error("Request to StackQL MCP server at {endpoint} timed out after {after:?}")]
    Timeout { endpoint: String, after: Duration },

    #[error("HTTP Error {status} from MCP server: {body}")]
    Http { status: u16, body: String },

    #[error("MCP server returned invalid JSON. Response: {body}")]
    ProtocolError { body: String },

    #[error("MCP Error: {message}")]
    RemoteError { message: String },

    #[error("Failed to call MCP server: {0}")]
    Request(String),
}

pub type TransportResult<T> = Result<T, TransportError>;

/// Cut a response body down to a bounded prefix for diagnostics
pub(crate) fn preview(body: &str) -> String {
    body.chars().take(BODY_PREVIEW_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_is_bounded() {
        let body = "x".repeat(1000);
        assert_eq!(preview(&body).len(), BODY_PREVIEW_CHARS);
        assert_eq!(preview("short"), "short");
    }

    #[test]
    fn test_preview_respects_char_boundaries() {
        let body = "é".repeat(300);
        assert_eq!(preview(&body).chars().count(), BODY_PREVIEW_CHARS);
    }

    #[test]
    fn test_connection_failure_names_endpoint() {
        let err = TransportError::ConnectionFailure {
            endpoint: "http://127.0.0.1:9912".to_string(),
        };
        assert!(err.to_string().contains("http://127.0.0.1:9912"));
    }
}
