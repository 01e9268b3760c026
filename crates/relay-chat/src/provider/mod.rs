//! Completion providers: turn a transcript into a single reply.
//!
//! Every backend implements [`CompletionProvider`]. The orchestrator only
//! sees the trait; which backend runs is decided once at startup by
//! [`build_provider`].

mod anthropic;
mod factory;
mod hosted;
mod masking;
mod mock;
mod openai;
mod pattern;

use async_trait::async_trait;
use serde::Serialize;

use relay_core::types::{Message, Role};

pub use anthropic::AnthropicProvider;
pub use factory::build_provider;
pub use hosted::{HostedSettings, DEFAULT_TIMEOUT};
pub use masking::{ApologyTexts, MaskingProvider};
pub use mock::MockProvider;
pub use openai::OpenAiCompatibleProvider;
pub use pattern::{PatternProvider, ReplyCategory};

/// One transcript turn as handed to a provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProviderMessage {
    pub role: Role,
    pub content: String,
}

impl ProviderMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

impl From<&Message> for ProviderMessage {
    fn from(msg: &Message) -> Self {
        Self::new(msg.role, msg.content.clone())
    }
}

/// Classified provider failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// HTTP 429 from the backend.
    #[error("provider rate limit exceeded")]
    RateLimited,
    /// HTTP 401 from the backend.
    #[error("provider rejected the API key")]
    Unauthorized,
    /// Any other failure: transport, timeout, 5xx, undecodable body.
    #[error("provider unavailable: {0}")]
    Unavailable(String),
    /// The latest user message was blank.
    #[error("latest message is empty")]
    EmptyInput,
}

impl ProviderError {
    /// Classify a non-success HTTP status.
    pub fn from_status(status: u16, detail: impl AsRef<str>) -> Self {
        match status {
            429 => ProviderError::RateLimited,
            401 => ProviderError::Unauthorized,
            other => ProviderError::Unavailable(format!("HTTP {}: {}", other, detail.as_ref())),
        }
    }

    /// Short machine-readable tag, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::RateLimited => "rate_limited",
            ProviderError::Unauthorized => "unauthorized",
            ProviderError::Unavailable(_) => "unavailable",
            ProviderError::EmptyInput => "empty_input",
        }
    }
}

/// A backend that maps a transcript to one reply string.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Human-readable backend name for logs and health output.
    fn name(&self) -> &str;

    /// Produce the assistant reply for `history` (oldest first).
    async fn complete(&self, history: &[ProviderMessage]) -> Result<String, ProviderError>;
}

/// Content of the most recent user turn, if any.
pub(crate) fn latest_user_message(history: &[ProviderMessage]) -> Option<&str> {
    history
        .iter()
        .rev()
        .find(|m| m.role == Role::User)
        .map(|m| m.content.as_str())
}
