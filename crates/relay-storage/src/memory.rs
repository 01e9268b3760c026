//! In-memory message store.
//!
//! A `Vec` log plus a `session_id -> positions` index, both behind one
//! `Mutex` so id assignment and insertion are a single critical section.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

use relay_core::error::{RelayError, Result};
use relay_core::types::{Message, NewMessage};

use crate::store::MessageStore;

#[derive(Default)]
struct Inner {
    log: Vec<Message>,
    by_session: HashMap<String, Vec<usize>>,
    next_id: u64,
}

/// Thread-safe in-memory transcript store.
///
/// Nothing is evicted; the store lives as long as the process.
pub struct InMemoryMessageStore {
    inner: Mutex<Inner>,
}

impl InMemoryMessageStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                next_id: 1,
                ..Inner::default()
            }),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|e| RelayError::Storage(format!("message store lock poisoned: {}", e)))
    }
}

impl Default for InMemoryMessageStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn append(&self, message: NewMessage) -> Result<Message> {
        let mut inner = self.lock()?;

        let id = inner.next_id;
        inner.next_id += 1;

        let stored = Message {
            id,
            session_id: message.session_id,
            role: message.role,
            content: message.content,
            timestamp: Utc::now(),
        };

        let position = inner.log.len();
        inner
            .by_session
            .entry(stored.session_id.clone())
            .or_default()
            .push(position);
        inner.log.push(stored.clone());

        debug!(
            id,
            session_id = %stored.session_id,
            role = %stored.role,
            "Message appended"
        );
        Ok(stored)
    }

    async fn list_by_session(&self, session_id: &str) -> Result<Vec<Message>> {
        let inner = self.lock()?;
        let messages = inner
            .by_session
            .get(session_id)
            .map(|positions| {
                positions
                    .iter()
                    .map(|&pos| inner.log[pos].clone())
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        Ok(messages)
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.lock()?.log.len())
    }
}
