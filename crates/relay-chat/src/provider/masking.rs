//! Provider decorator that answers failures with an apology instead of an error.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use super::{CompletionProvider, ProviderError, ProviderMessage};

/// Per-class apology texts shown to the user in place of a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApologyTexts {
    pub rate_limited: String,
    pub unauthorized: String,
    pub unavailable: String,
}

impl ApologyTexts {
    pub fn deepseek() -> Self {
        Self {
            rate_limited: "抱歉，API 使用配额已超限。请检查您的 DeepSeek 账户设置。".to_string(),
            unauthorized: "抱歉，API 密钥无效。请提供有效的 API 密钥。".to_string(),
            unavailable: "抱歉，AI 服务暂时出现问题。请稍后再试。".to_string(),
        }
    }

    pub fn anthropic() -> Self {
        Self {
            rate_limited: "Sorry, Claude API rate limit exceeded. Please check your Anthropic account settings.".to_string(),
            unauthorized: "Sorry, invalid Claude API key. Please provide a valid API key.".to_string(),
            unavailable: "Sorry, the AI service is temporarily unavailable. Please try again later.".to_string(),
        }
    }

    /// The text for `err`. Blank input counts as unavailable.
    pub fn for_error(&self, err: &ProviderError) -> &str {
        match err {
            ProviderError::RateLimited => &self.rate_limited,
            ProviderError::Unauthorized => &self.unauthorized,
            ProviderError::Unavailable(_) | ProviderError::EmptyInput => &self.unavailable,
        }
    }
}

/// Wraps a provider so that every failure becomes a successful apology reply.
pub struct MaskingProvider {
    inner: Arc<dyn CompletionProvider>,
    texts: ApologyTexts,
}

impl MaskingProvider {
    pub fn new(inner: Arc<dyn CompletionProvider>, texts: ApologyTexts) -> Self {
        Self { inner, texts }
    }
}

#[async_trait]
impl CompletionProvider for MaskingProvider {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn complete(&self, history: &[ProviderMessage]) -> Result<String, ProviderError> {
        match self.inner.complete(history).await {
            Ok(reply) => Ok(reply),
            Err(err) => {
                warn!(
                    provider = self.inner.name(),
                    kind = err.kind(),
                    error = %err,
                    "Provider call failed, replying with apology"
                );
                Ok(self.texts.for_error(&err).to_string())
            }
        }
    }
}
