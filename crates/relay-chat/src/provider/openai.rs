//! OpenAI-compatible `/chat/completions` adapter (DeepSeek, OpenAI, ...).

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};

use relay_core::error::RelayError;
use relay_core::text;

use super::hosted::{self, HostedSettings};
use super::{CompletionProvider, ProviderError, ProviderMessage};

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

/// Adapter for any backend speaking the OpenAI chat completions dialect.
pub struct OpenAiCompatibleProvider {
    name: String,
    client: reqwest::Client,
    settings: HostedSettings,
}

impl OpenAiCompatibleProvider {
    pub fn new(
        name: impl Into<String>,
        api_key: &str,
        settings: HostedSettings,
    ) -> Result<Self, RelayError> {
        let name = name.into();
        hosted::require_api_key(api_key, &name)?;
        let auth = hosted::header_value(&format!("Bearer {}", api_key), "authorization")?;
        let client = hosted::build_client(vec![(AUTHORIZATION, auth)], settings.timeout)?;
        Ok(Self {
            name,
            client,
            settings,
        })
    }

    /// DeepSeek preset: `deepseek-chat`, Chinese system preamble.
    pub fn deepseek(api_key: &str) -> Result<Self, RelayError> {
        Self::new("deepseek", api_key, HostedSettings::deepseek())
    }

    pub fn settings(&self) -> &HostedSettings {
        &self.settings
    }

    fn request<'a>(&'a self, history: &'a [ProviderMessage]) -> ChatCompletionRequest<'a> {
        let preamble = self
            .settings
            .system_prompt
            .as_deref()
            .map(|content| WireMessage {
                role: "system",
                content,
            });

        let messages = preamble
            .into_iter()
            .chain(history.iter().map(|m| WireMessage {
                role: m.role.as_str(),
                content: &m.content,
            }))
            .collect();

        ChatCompletionRequest {
            model: &self.settings.model,
            messages,
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        }
    }
}

#[async_trait]
impl CompletionProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, history: &[ProviderMessage]) -> Result<String, ProviderError> {
        let url = self.settings.endpoint("chat/completions");
        let body = self.request(history);
        let response: ChatCompletionResponse =
            hosted::post_json(&self.client, &url, &body).await?;

        let reply = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content);
        Ok(hosted::reply_or_fallback(reply, text::NO_ANSWER))
    }
}
