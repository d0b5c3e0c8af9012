//! Error types and response failure normalization

use http::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Result type for this crate
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for API operations
#[derive(Debug, Error)]
pub enum Error {
    /// Normalized failure from the transport, network fault or API error alike
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The task factory does not know this tool
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Status of a normalized transport failure, if this is one
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Transport(e) => Some(e.status),
            _ => None,
        }
    }

    /// Whether this is the tool-not-recognized condition
    pub fn is_tool_not_found(&self) -> bool {
        matches!(self, Error::ToolNotFound(_))
    }
}

/// A failed exchange, normalized to one shape.
///
/// Network faults and non-2xx responses both end up here; callers tell them
/// apart only by the fields. `status` is `0` when no response was received
/// and the lower layer had no status to report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (status: {status})")]
pub struct TransportError {
    /// HTTP status, or `0` for faults with no response
    pub status: u16,
    /// Server supplied `error.message`, or the transport's description
    pub message: String,
    /// Server supplied `error.code`, when the body carried one
    pub code: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    code: Option<serde_json::Value>,
}

impl TransportError {
    /// Build from a fault where no response arrived
    pub fn network(status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            status: status.unwrap_or(0),
            message: message.into(),
            code: None,
        }
    }

    /// Build from a non-2xx response and its raw body
    pub fn from_response(status: StatusCode, body: &[u8]) -> Self {
        let fallback = || {
            status
                .canonical_reason()
                .map(str::to_string)
                .unwrap_or_else(|| status.as_str().to_string())
        };

        let (message, code) = match serde_json::from_slice::<ErrorEnvelope>(body) {
            Ok(ErrorEnvelope { error }) => {
                let code = error.code.map(|code| match code {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                });
                (error.message.unwrap_or_else(fallback), code)
            }
            Err(_) => (fallback(), None),
        };

        Self {
            status: status.as_u16(),
            message,
            code,
        }
    }
}
