//! Heuristic mock provider.
//!
//! Classifies the latest user message with a few content rules and answers
//! from the matching reply bucket. Rules are checked in declaration order;
//! the first hit wins.

use async_trait::async_trait;
use rand::seq::IndexedRandom;

use super::{latest_user_message, CompletionProvider, ProviderError, ProviderMessage};

const GREETING_TOKENS: [&str; 2] = ["你好", "hello"];
const QUESTION_TOKENS: [char; 2] = ['?', '？'];
const TASK_TOKENS: [&str; 3] = ["帮我", "请", "能否"];

/// Messages shorter than this many characters ask for more detail.
const SHORT_MESSAGE_CHARS: usize = 10;

/// Characters of the input echoed back in question/default replies.
const ECHO_PREFIX_CHARS: usize = 10;

/// Reply bucket chosen for a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyCategory {
    Greeting,
    Question,
    ShortMessage,
    Task,
    Default,
}

impl ReplyCategory {
    /// Pick the bucket for `message`.
    pub fn classify(message: &str) -> Self {
        if GREETING_TOKENS.iter().any(|t| message.contains(t)) {
            ReplyCategory::Greeting
        } else if message.contains(QUESTION_TOKENS) {
            ReplyCategory::Question
        } else if message.chars().count() < SHORT_MESSAGE_CHARS {
            ReplyCategory::ShortMessage
        } else if TASK_TOKENS.iter().any(|t| message.contains(t)) {
            ReplyCategory::Task
        } else {
            ReplyCategory::Default
        }
    }

    pub fn replies(&self) -> &'static [&'static str] {
        match self {
            ReplyCategory::Greeting => &[
                "你好！很高兴和你交谈。",
                "你好！有什么我可以帮你的吗？",
                "你好！让我们开始对话吧。",
            ],
            ReplyCategory::Question => &[
                "这是一个很好的问题。",
                "让我想想...",
                "关于这个问题，我的看法是...",
            ],
            ReplyCategory::ShortMessage => &[
                "能详细说明一下吗？",
                "请告诉我更多信息。",
                "可以具体描述一下吗？",
            ],
            ReplyCategory::Task => &[
                "好的，我来帮你处理这个任务。",
                "我明白你的需求了。",
                "让我来协助你完成这个。",
            ],
            ReplyCategory::Default => &[
                "我明白你的意思了。",
                "这确实是个有趣的话题。",
                "让我们继续探讨这个问题。",
            ],
        }
    }

    /// Whether replies in this bucket quote the start of the input.
    pub fn echoes_input(&self) -> bool {
        matches!(self, ReplyCategory::Question | ReplyCategory::Default)
    }
}

/// Mock provider with content-dependent replies.
#[derive(Debug, Clone, Default)]
pub struct PatternProvider;

impl PatternProvider {
    pub fn new() -> Self {
        Self
    }

    /// Build the reply for a single message. Fails on blank input.
    pub fn reply_for(&self, message: &str) -> Result<String, ProviderError> {
        if message.trim().is_empty() {
            return Err(ProviderError::EmptyInput);
        }

        let category = ReplyCategory::classify(message);
        let base = category
            .replies()
            .choose(&mut rand::rng())
            .copied()
            .unwrap_or_default();

        if category.echoes_input() {
            let prefix: String = message.chars().take(ECHO_PREFIX_CHARS).collect();
            Ok(format!("{}关于\"{}...\"，", base, prefix))
        } else {
            Ok(base.to_string())
        }
    }
}

#[async_trait]
impl CompletionProvider for PatternProvider {
    fn name(&self) -> &str {
        "pattern"
    }

    async fn complete(&self, history: &[ProviderMessage]) -> Result<String, ProviderError> {
        let latest = latest_user_message(history).ok_or(ProviderError::EmptyInput)?;
        self.reply_for(latest)
    }
}
