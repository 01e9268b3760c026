//! The message store contract.

use async_trait::async_trait;

use relay_core::error::Result;
use relay_core::types::{Message, NewMessage};

/// Append-only transcript log, queryable by session.
///
/// Implementations must assign ids from a single sequence shared by all
/// sessions: strictly increasing, never reused, even under concurrent
/// appends.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Persist a message, assigning its id and timestamp.
    async fn append(&self, message: NewMessage) -> Result<Message>;

    /// All messages of `session_id` in insertion order.
    ///
    /// Unknown sessions yield an empty vec, not an error.
    async fn list_by_session(&self, session_id: &str) -> Result<Vec<Message>>;

    /// Total number of messages across all sessions.
    async fn len(&self) -> Result<usize>;

    async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }
}
