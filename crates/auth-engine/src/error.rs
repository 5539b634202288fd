//! Authentication and API error types.

use client_storage::StorageError;
use thiserror::Error;

/// Outcome of a failed call through the [`AuthenticatedExecutor`](crate::AuthenticatedExecutor).
#[derive(Error, Debug)]
pub enum ApiError {
    /// Renewal failed, or the server still answered 401 after renewal.
    /// The stored session has been cleared.
    #[error("Session expired")]
    SessionExpired,

    /// The server answered with a non-success status other than a recovered 401.
    #[error("Request failed with status {status}: {message}")]
    Operation { status: u16, message: String },

    /// No response was received.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Success status, but the body could not be decoded.
    #[error("Could not decode response: {0}")]
    Decode(String),

    /// Request body could not be encoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading the session store failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ApiError {
    pub fn is_session_expired(&self) -> bool {
        matches!(self, ApiError::SessionExpired)
    }

    /// HTTP status of an operation failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Operation { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Message suitable for showing to the user after `action` failed,
    /// e.g. `action = "load posts"`.
    pub fn user_message(&self, action: &str) -> String {
        match self {
            ApiError::SessionExpired => "Session expired. Please log in again.".to_string(),
            ApiError::Operation { message, .. } if !message.is_empty() => {
                format!("Failed to {}: {}", action, message)
            }
            _ => format!("Failed to {}. Please try again.", action),
        }
    }
}

/// Result type alias using ApiError.
pub type ApiResult<T> = Result<T, ApiError>;

/// Authentication error type.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Required input was blank; nothing was sent.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Login or registration was refused by the server.
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// Invalid state transition in the session FSM
    #[error("Invalid session state transition: {0}")]
    InvalidStateTransition(String),

    /// API call failed
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// URL parse error
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AuthError {
    /// Returns true if the failure came from the network rather than the server or user.
    pub fn is_transient(&self) -> bool {
        matches!(self, AuthError::Api(ApiError::Transport(_)))
    }
}

/// Result type alias using AuthError.
pub type AuthResult<T> = Result<T, AuthError>;

/// Name of the first field whose value is empty or whitespace.
pub fn first_blank<'a>(fields: &[(&'a str, &str)]) -> Option<&'a str> {
    fields
        .iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_blank_finds_whitespace_field() {
        let fields = [("title", "Hello"), ("content", "   ")];
        assert_eq!(first_blank(&fields), Some("content"));
    }

    #[test]
    fn test_first_blank_none_when_all_present() {
        assert_eq!(first_blank(&[("username", "ana"), ("password", "pw")]), None);
    }

    #[test]
    fn test_user_message_session_expired() {
        assert_eq!(
            ApiError::SessionExpired.user_message("load posts"),
            "Session expired. Please log in again."
        );
    }

    #[test]
    fn test_user_message_includes_server_message() {
        let err = ApiError::Operation {
            status: 404,
            message: "Post not found".to_string(),
        };
        assert_eq!(err.user_message("delete post"), "Failed to delete post: Post not found");
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn test_user_message_generic_for_transport() {
        let err = ApiError::Transport("connection refused".to_string());
        assert_eq!(err.user_message("load posts"), "Failed to load posts. Please try again.");
    }

    #[test]
    fn test_is_transient_transport() {
        assert!(AuthError::Api(ApiError::Transport("reset".to_string())).is_transient());
        assert!(!AuthError::InvalidCredentials("bad password".to_string()).is_transient());
        assert!(!AuthError::Api(ApiError::SessionExpired).is_transient());
    }
}
