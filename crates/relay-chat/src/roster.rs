//! Client-side session roster.
//!
//! The chat UI keeps a small list of named conversations and remembers which
//! one is open. The server never sees this list; it only receives the
//! selected id as `sessionId`. Kept here so every client shares one set of
//! rules: at most [`MAX_SESSIONS`], sequential default names, newest first.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use relay_core::text;

/// Hard cap on sessions a client may hold.
pub const MAX_SESSIONS: usize = 10;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RosterError {
    #[error("{}", text::SESSION_LIMIT_REACHED)]
    LimitReached,
    #[error("session not found: {0}")]
    NotFound(String),
}

/// One named conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    pub id: String,
    pub name: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds.
    pub updated_at: i64,
}

impl ChatSession {
    fn numbered(n: usize) -> Self {
        let now = Utc::now().timestamp_millis();
        Self {
            id: Uuid::new_v4().simple().to_string(),
            name: format!("{} {}", text::SESSION_NAME_PREFIX, n),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Ordered list of sessions (newest first) plus the current selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRoster {
    sessions: Vec<ChatSession>,
    current_session_id: Option<String>,
}

impl SessionRoster {
    /// A roster holding one session, `新会话 1`, which is current.
    pub fn new() -> Self {
        let initial = ChatSession::numbered(1);
        Self {
            current_session_id: Some(initial.id.clone()),
            sessions: vec![initial],
        }
    }

    /// Restore a persisted roster, starting fresh if it cannot be parsed.
    pub fn restore(json: &str) -> Self {
        match serde_json::from_str(json) {
            Ok(roster) => roster,
            Err(e) => {
                warn!(error = %e, "Failed to parse stored sessions, starting fresh");
                Self::new()
            }
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn sessions(&self) -> &[ChatSession] {
        &self.sessions
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn current_id(&self) -> Option<&str> {
        self.current_session_id.as_deref()
    }

    pub fn current(&self) -> Option<&ChatSession> {
        let id = self.current_session_id.as_deref()?;
        self.sessions.iter().find(|s| s.id == id)
    }

    /// Add a session at the front. Does not change the selection.
    pub fn create(&mut self) -> Result<ChatSession, RosterError> {
        if self.sessions.len() >= MAX_SESSIONS {
            return Err(RosterError::LimitReached);
        }
        let session = ChatSession::numbered(self.sessions.len() + 1);
        self.sessions.insert(0, session.clone());
        Ok(session)
    }

    pub fn select(&mut self, id: &str) -> Result<(), RosterError> {
        if !self.sessions.iter().any(|s| s.id == id) {
            return Err(RosterError::NotFound(id.to_string()));
        }
        self.current_session_id = Some(id.to_string());
        Ok(())
    }

    pub fn rename(&mut self, id: &str, name: impl Into<String>) -> Result<(), RosterError> {
        let session = self
            .sessions
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| RosterError::NotFound(id.to_string()))?;
        session.name = name.into();
        session.updated_at = Utc::now().timestamp_millis();
        Ok(())
    }

    /// Remove a session. Deleting the current one selects the newest
    /// remaining session, or nothing if none remain.
    ///
    /// Returns whether anything was removed.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.sessions.len();
        self.sessions.retain(|s| s.id != id);
        let removed = self.sessions.len() != before;

        if self.current_session_id.as_deref() == Some(id) {
            self.current_session_id = self.sessions.first().map(|s| s.id.clone());
        }
        removed
    }
}

impl Default for SessionRoster {
    fn default() -> Self {
        Self::new()
    }
}
