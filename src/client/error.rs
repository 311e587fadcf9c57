//! Rendering API error types.

use std::fmt;
use std::time::Duration;

use serde_json::Value;

/// Errors produced by the HTTP work processor.
#[derive(Debug, Clone)]
pub enum ApiError {
    /// The configured origin/path/key do not form a usable URL.
    InvalidEndpoint(String),

    /// The API answered with a non-2xx status.
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body as JSON, or the raw text as a JSON string.
        payload: Value,
    },

    /// A 2xx body that does not match the expected response shape.
    Decode {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        payload: String,
        /// Deserializer message.
        message: String,
    },

    /// The request did not complete within the configured timeout.
    Timeout(Duration),

    /// Connection or request-building failure.
    Transport(String),
}

impl ApiError {
    /// Build a status error from a raw response body.
    pub fn from_status(status: u16, body: &str) -> Self {
        let payload = serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()));
        ApiError::Status { status, payload }
    }

    /// HTTP status code, when a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } | ApiError::Decode { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Response payload of a status error.
    pub fn payload(&self) -> Option<&Value> {
        match self {
            ApiError::Status { payload, .. } => Some(payload),
            _ => None,
        }
    }

    /// Check if the API reported a 5xx status.
    pub fn is_server_error(&self) -> bool {
        matches!(self, ApiError::Status { status, .. } if (500..600).contains(status))
    }

    /// Check if this is a timeout error.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ApiError::Timeout(_))
    }

    /// JSON form used by the batch runner output.
    pub fn to_json(&self) -> Value {
        let payload = match self {
            ApiError::Status { payload, .. } => payload.clone(),
            ApiError::Decode { payload, .. } => Value::String(payload.clone()),
            _ => Value::Null,
        };
        serde_json::json!({
            "status": self.status(),
            "payload": payload,
            "message": self.to_string(),
        })
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::InvalidEndpoint(msg) => write!(f, "invalid endpoint: {}", msg),
            ApiError::Status { status, payload } => {
                write!(f, "remote returned status {}: {}", status, payload)
            }
            ApiError::Decode {
                status, message, ..
            } => {
                write!(
                    f,
                    "failed to decode response (status {}): {}",
                    status, message
                )
            }
            ApiError::Timeout(duration) => {
                write!(f, "request timeout after {}ms", duration.as_millis())
            }
            ApiError::Transport(msg) => write!(f, "transport error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}
