//! Error types for the chat orchestrator.

use relay_core::error::RelayError;

/// Errors surfaced by the chat orchestrator.
///
/// Provider failures are absent on purpose: they are absorbed into a
/// fallback assistant reply and never reach the caller.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("message cannot be empty")]
    EmptyMessage,
    #[error("message exceeds maximum length of {0} characters")]
    MessageTooLong(usize),
    #[error("storage error: {0}")]
    Storage(String),
}

impl ChatError {
    /// True for caller mistakes (HTTP 400), false for server faults.
    pub fn is_invalid_request(&self) -> bool {
        matches!(self, ChatError::EmptyMessage | ChatError::MessageTooLong(_))
    }
}

impl From<RelayError> for ChatError {
    fn from(err: RelayError) -> Self {
        ChatError::Storage(err.to_string())
    }
}
