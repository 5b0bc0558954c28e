/*
[INPUT]:  Error sources (validation, HTTP, API envelope, socket transport, decoding)
[OUTPUT]: Structured error type shared by the REST and socket layers
[POS]:    Error handling layer - unified error types for entire crate
[UPDATE]: When adding new error sources or improving error messages
*/

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Main error type for the STEX adapter
#[derive(Error, Debug)]
pub enum StexError {
    /// A required parameter is missing or inconsistent; nothing was sent
    #[error("Invalid parameters: {0}")]
    Validation(String),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error envelope (`{success, msg}`)
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Private endpoint or channel used without usable credentials
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Inbound socket event payload did not match the expected record
    #[error("Failed to decode `{event}` payload: {source}")]
    Decode {
        event: String,
        #[source]
        source: serde_json::Error,
    },

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    /// WebSocket transport error (dial, send, close)
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// Socket operation attempted without a live connection
    #[error("WebSocket not connected")]
    NotConnected,

    /// Malformed or unexpected frame, or an error signalled by the server
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Operation timed out
    #[error("Timeout after {duration}s")]
    Timeout { duration: u64 },
}

/// Error envelope returned by the REST API on 4xx/5xx
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub success: bool,
    #[serde(default, rename = "msg")]
    pub message: String,
}

impl StexError {
    /// Check if the error originated in the transport (dial, send, HTTP I/O)
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            StexError::Http(_)
                | StexError::WebSocket(_)
                | StexError::NotConnected
                | StexError::Timeout { .. }
        )
    }

    /// Check if the error is a decoded remote API error
    pub fn is_api_error(&self) -> bool {
        matches!(self, StexError::Api { .. })
    }

    /// Check if error indicates authentication failure
    pub fn is_auth_error(&self) -> bool {
        match self {
            StexError::Authentication { .. } => true,
            StexError::Api { status, .. } => *status == 401 || *status == 403,
            _ => false,
        }
    }

    /// Create an API error from status code and message
    pub fn api_error(status: StatusCode, message: impl Into<String>) -> Self {
        StexError::Api {
            status: status.as_u16(),
            message: message.into(),
        }
    }

    /// Create a validation error for a parameter that was never set
    pub fn missing(param: &str) -> Self {
        StexError::Validation(format!("{param} is required"))
    }
}

/// Result type alias for STEX operations
pub type Result<T> = std::result::Result<T, StexError>;
