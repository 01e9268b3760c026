//! Deterministic mock provider for tests and offline development.

use async_trait::async_trait;
use rand::seq::IndexedRandom;

use super::{CompletionProvider, ProviderError, ProviderMessage};

/// Conversational filler replies used when no fixed reply is configured.
pub const CANNED_REPLIES: [&str; 10] = [
    "你好！我很高兴和你聊天。",
    "这是一个很有趣的话题，能详细说说吗？",
    "我明白你的意思了，让我想想...",
    "确实如此，我也是这么认为的。",
    "这个问题很有深度，值得好好探讨。",
    "我觉得这个想法很有创意！",
    "说得对，继续说下去吧。",
    "这让我想起了一个类似的情况...",
    "有意思的观点，能举个例子吗？",
    "我完全理解你的感受。",
];

#[derive(Debug, Clone)]
enum Replies {
    Fixed(String),
    Canned,
}

/// Provider that never fails and ignores the transcript.
#[derive(Debug, Clone)]
pub struct MockProvider {
    replies: Replies,
}

impl MockProvider {
    /// Always answer with `reply`.
    pub fn fixed(reply: impl Into<String>) -> Self {
        Self {
            replies: Replies::Fixed(reply.into()),
        }
    }

    /// Answer with a random entry of [`CANNED_REPLIES`].
    pub fn canned() -> Self {
        Self {
            replies: Replies::Canned,
        }
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::canned()
    }
}

#[async_trait]
impl CompletionProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, _history: &[ProviderMessage]) -> Result<String, ProviderError> {
        let reply = match &self.replies {
            Replies::Fixed(text) => text.clone(),
            Replies::Canned => CANNED_REPLIES
                .choose(&mut rand::rng())
                .copied()
                .unwrap_or(CANNED_REPLIES[0])
                .to_string(),
        };
        Ok(reply)
    }
}
