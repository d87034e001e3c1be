//! Failure taxonomy for storefront API requests.

use serde_json::Value;
use thiserror::Error;

/// Why a request did not produce a usable response.
///
/// `Clone` so a single refresh outcome can be handed to every caller
/// waiting on it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RequestError {
    /// No response reached the client (connect failure, timeout, reset).
    #[error("Network error: {message}")]
    Network { message: String },

    /// The server answered with a non-2xx status.
    #[error("Server error ({status}): {}", .message.as_deref().unwrap_or("no message"))]
    Server {
        status: u16,
        /// Machine-readable `message` field of the error payload, if any.
        message: Option<String>,
        payload: Value,
    },

    /// A 2xx response whose body did not have the expected shape.
    #[error("Invalid response: {message}")]
    Decode { message: String },
}

impl RequestError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Builds a server error, pulling `message` out of the payload.
    pub fn server(status: u16, payload: Value) -> Self {
        let message = payload
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string);
        Self::Server {
            status,
            message,
            payload,
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. })
    }

    /// True when a response was received (server or decode failure).
    pub fn has_response(&self) -> bool {
        !self.is_network()
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Server { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// True for a server error whose message equals the expiry sentinel.
    pub fn is_auth_expired(&self, sentinel: &str) -> bool {
        self.server_message() == Some(sentinel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_server_error_extracts_message() {
        let err = RequestError::server(
            401,
            json!({ "success": false, "message": "userTokenExpired" }),
        );
        assert_eq!(err.status(), Some(401));
        assert!(err.is_auth_expired("userTokenExpired"));
        assert!(err.has_response());
        assert_eq!(err.to_string(), "Server error (401): userTokenExpired");
    }

    #[test]
    fn test_non_object_payload() {
        let err = RequestError::server(502, json!("Bad Gateway"));
        assert_eq!(err.server_message(), None);
        assert!(!err.is_auth_expired("userTokenExpired"));
        assert_eq!(err.to_string(), "Server error (502): no message");
    }

    #[test]
    fn test_network_error_is_never_expiry() {
        let err = RequestError::network("userTokenExpired");
        assert!(!err.is_auth_expired("userTokenExpired"));
        assert!(!err.has_response());
    }
}
