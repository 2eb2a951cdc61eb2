//! Error types for the todo API client.
//!
//! # Design
//! Callers branch on the variant, never on the message. `NotFound` gets its
//! own variant because "the todo does not exist" is the case callers most
//! often distinguish; every other non-2xx status lands in `Http` with the
//! status and the raw payload kept for diagnostics.

use serde_json::Value;
use thiserror::Error;

/// Message used when a failed response carries no `detail` field.
pub const DEFAULT_ERROR_MESSAGE: &str = "An error occurred";

/// Errors produced while building requests, executing them, or parsing
/// responses.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    /// The server returned 404.
    #[error("{message}")]
    NotFound {
        message: String,
        payload: Option<Value>,
    },

    /// The server returned a non-2xx status other than 404.
    #[error("{message}")]
    Http {
        status: u16,
        message: String,
        payload: Option<Value>,
    },

    /// No response arrived (connection refused, DNS failure, ...).
    #[error("{message}")]
    Transport { message: String, cause: String },

    /// Rejected on the client before any request was issued.
    #[error("{0}")]
    Validation(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),
}

impl ApiError {
    /// HTTP status of the failed response, if one arrived.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::NotFound { .. } => Some(404),
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Raw response payload of the failed response, if any.
    pub fn payload(&self) -> Option<&Value> {
        match self {
            ApiError::NotFound { payload, .. } | ApiError::Http { payload, .. } => {
                payload.as_ref()
            }
            _ => None,
        }
    }

    /// Message meant for the user. Codec faults have none: they describe a
    /// client/server schema mismatch, not something the user can act on.
    pub fn user_message(&self) -> Option<&str> {
        match self {
            ApiError::NotFound { message, .. }
            | ApiError::Http { message, .. }
            | ApiError::Transport { message, .. }
            | ApiError::Validation(message) => Some(message),
            ApiError::DeserializationError(_) | ApiError::SerializationError(_) => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }

    /// Build the error for a non-2xx response. The message is the body's
    /// `detail` string when present, else `fallback`.
    pub fn from_response(status: u16, body: &str, fallback: &str) -> Self {
        let payload = if body.trim().is_empty() {
            None
        } else {
            Some(serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string())))
        };
        let message = payload
            .as_ref()
            .and_then(|p| p.get("detail"))
            .and_then(Value::as_str)
            .unwrap_or(fallback)
            .to_string();

        if status == 404 {
            ApiError::NotFound { message, payload }
        } else {
            ApiError::Http {
                status,
                message,
                payload,
            }
        }
    }
}
