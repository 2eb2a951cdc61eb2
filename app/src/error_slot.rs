//! Inline error message shown above the list.

use todo_core::ApiError;
use tracing::error;

/// Holds the last request error. Cleared on success, set on failure; the
/// last error wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorSlot {
    error: Option<String>,
}

impl ErrorSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Record `err`. Errors that carry a user-facing message show it;
    /// anything else shows `default_message`.
    pub fn handle_api_error(&mut self, err: &ApiError, default_message: &str) {
        error!(error = ?err, "{default_message}");
        self.error = Some(err.user_message().unwrap_or(default_message).to_string());
    }

    pub fn clear(&mut self) {
        self.error = None;
    }
}
