//! Response envelope shared by every API endpoint

use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// `{ success, data?, message? }`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope<T = serde_json::Value> {
    #[serde(default)]
    pub success: bool,
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiEnvelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }
}

/// A decoded HTTP response
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub envelope: ApiEnvelope,
}

impl ApiResponse {
    pub fn new(status: u16, envelope: ApiEnvelope) -> Self {
        Self { status, envelope }
    }

    /// Only `success: true` counts, whatever the HTTP status says
    pub fn is_success(&self) -> bool {
        self.envelope.success
    }

    /// Payload of a successful response. A failed envelope becomes a business
    /// error carrying the server's message, or `fallback` when it sent none.
    pub fn into_data(self, fallback: &str) -> Result<Option<serde_json::Value>, ClientError> {
        if self.envelope.success {
            Ok(self.envelope.data.filter(|data| !data.is_null()))
        } else if self.status == 401 {
            Err(ClientError::Unauthorized(
                self.envelope
                    .message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| fallback.to_string()),
            ))
        } else {
            Err(ClientError::business(
                Some(self.status),
                self.envelope.message,
                fallback,
            ))
        }
    }

    /// Like [`ApiResponse::into_data`], but an empty payload is malformed
    pub fn into_required_data(self, fallback: &str) -> Result<serde_json::Value, ClientError> {
        self.into_data(fallback)?
            .ok_or_else(|| ClientError::MalformedPayload("response without data".to_string()))
    }
}

/// Payload of `/auth/login` and `/auth/register`
#[derive(Debug, Clone, Deserialize)]
pub struct AuthPayload {
    pub token: String,
    pub user: serde_json::Value,
}
