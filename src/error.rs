//! Custom error types and handling
//!
//! This module defines the client's error taxonomy. Validation errors are
//! raised locally before any I/O; transport and business errors come back
//! from the remote API; malformed payloads are server drift.

use crate::constants::{messages, participation_markers};

/// Client-wide error type
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClientError {
    // Local input errors
    #[error("{0}")]
    Validation(String),

    // Network errors
    #[error("Transport error: {0}")]
    Transport(String),

    /// The server rejected a well-formed request. `message` is the server's
    /// text verbatim so callers can show it unchanged.
    #[error("{message}")]
    BusinessRule {
        status: Option<u16>,
        message: String,
    },

    #[error("{0}")]
    Unauthorized(String),

    // Response shape errors
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    // Device-local errors
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl ClientError {
    /// Build a business error from an optional server message, falling back to
    /// an operation-specific generic text.
    pub fn business(status: Option<u16>, message: Option<String>, fallback: &str) -> Self {
        Self::BusinessRule {
            status,
            message: message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| fallback.to_string()),
        }
    }

    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Transport(_) => "TRANSPORT_ERROR",
            Self::BusinessRule { .. } => "BUSINESS_RULE",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::MalformedPayload(_) => "MALFORMED_PAYLOAD",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Text safe to show to a user. Raw transport and storage details are
    /// replaced by `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Validation(msg) => msg.clone(),
            Self::BusinessRule { message, .. } => message.clone(),
            Self::Unauthorized(msg) if !msg.is_empty() => msg.clone(),
            Self::Unauthorized(_) => messages::SESSION_EXPIRED.to_string(),
            Self::Transport(_) => messages::CONNECTION.to_string(),
            _ => fallback.to_string(),
        }
    }

    /// Whether a retry could succeed
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Transport(_))
    }

    /// The server says the user already participates in the campaign.
    ///
    /// This matches on the server's wording, so it breaks silently if the
    /// backend rephrases the message.
    pub fn is_already_participating(&self) -> bool {
        self.server_message_contains(participation_markers::ALREADY)
            && !self.is_not_participating()
    }

    /// The server says the user is not a participant of the campaign.
    pub fn is_not_participating(&self) -> bool {
        self.server_message_contains(participation_markers::NOT_JOINED)
    }

    fn server_message_contains(&self, needles: &[&str]) -> bool {
        match self {
            Self::BusinessRule { message, .. } => {
                let lower = message.to_lowercase();
                needles.iter().any(|needle| lower.contains(needle))
            }
            _ => false,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Transport("request timed out".to_string())
        } else if err.is_decode() {
            ClientError::MalformedPayload(err.to_string())
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::Storage(err.to_string())
    }
}

impl From<validator::ValidationErrors> for ClientError {
    fn from(err: validator::ValidationErrors) -> Self {
        // Prefer the human message attached to the first failing rule
        let message = err
            .field_errors()
            .values()
            .flat_map(|errors| errors.iter())
            .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
            .unwrap_or_else(|| err.to_string());
        ClientError::Validation(message)
    }
}

/// Result type alias using ClientError
pub type ClientResult<T> = Result<T, ClientError>;
