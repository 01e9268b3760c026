//! Anthropic messages API adapter.

use async_trait::async_trait;
use reqwest::header::HeaderName;
use serde::{Deserialize, Serialize};

use relay_core::error::RelayError;
use relay_core::text;

use super::hosted::{self, HostedSettings};
use super::{CompletionProvider, ProviderError, ProviderMessage};

const API_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct InputMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    messages: Vec<InputMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

pub struct AnthropicProvider {
    client: reqwest::Client,
    settings: HostedSettings,
}

impl AnthropicProvider {
    pub fn new(api_key: &str, settings: HostedSettings) -> Result<Self, RelayError> {
        hosted::require_api_key(api_key, "anthropic")?;
        let headers = vec![
            (
                HeaderName::from_static("x-api-key"),
                hosted::header_value(api_key, "x-api-key")?,
            ),
            (
                HeaderName::from_static("anthropic-version"),
                hosted::header_value(API_VERSION, "anthropic-version")?,
            ),
        ];
        let client = hosted::build_client(headers, settings.timeout)?;
        Ok(Self { client, settings })
    }

    pub fn with_defaults(api_key: &str) -> Result<Self, RelayError> {
        Self::new(api_key, HostedSettings::anthropic())
    }

    pub fn settings(&self) -> &HostedSettings {
        &self.settings
    }
}

#[async_trait]
impl CompletionProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn complete(&self, history: &[ProviderMessage]) -> Result<String, ProviderError> {
        let url = self.settings.endpoint("messages");
        let body = MessagesRequest {
            model: &self.settings.model,
            messages: history
                .iter()
                .map(|m| InputMessage {
                    role: m.role.as_str(),
                    content: &m.content,
                })
                .collect(),
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
            system: self.settings.system_prompt.as_deref(),
        };

        let response: MessagesResponse = hosted::post_json(&self.client, &url, &body).await?;

        // Only the first block counts; a non-text first block means no answer.
        let reply = match response.content.into_iter().next() {
            Some(ContentBlock::Text { text }) => Some(text),
            _ => None,
        };
        Ok(hosted::reply_or_fallback(reply, text::NO_ANSWER_EN))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::super::hosted::fake_backend;
    use super::*;

    fn provider_for(base_url: &str) -> AnthropicProvider {
        let mut settings = HostedSettings::anthropic();
        settings.base_url = base_url.to_string();
        AnthropicProvider::new("anthropic-key", settings).unwrap()
    }

    #[tokio::test]
    async fn test_successful_response_and_request_shape() {
        let backend = fake_backend::spawn(
            "/messages",
            200,
            json!({
                "id": "msg_1",
                "type": "message",
                "role": "assistant",
                "content": [{ "type": "text", "text": "Hello from Claude" }]
            }),
            Duration::ZERO,
        )
        .await;
        let provider = provider_for(&backend.base_url);

        let reply = provider
            .complete(&[
                ProviderMessage::user("hi"),
                ProviderMessage::assistant("hello"),
                ProviderMessage::user("tell me a joke"),
            ])
            .await
            .unwrap();
        assert_eq!(reply, "Hello from Claude");

        let seen = backend.requests();
        let req = &seen[0];
        assert_eq!(req.headers.get("x-api-key").unwrap(), "anthropic-key");
        assert_eq!(req.headers.get("anthropic-version").unwrap(), API_VERSION);
        assert_eq!(req.body["model"], "claude-3-sonnet-20240229");
        assert_eq!(req.body["max_tokens"], 1000);
        assert!(req.body.get("system").is_none());
        let messages = req.body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0]["role"], "user");
        assert_eq!(messages[1]["role"], "assistant");
        assert_eq!(messages[2]["content"], "tell me a joke");
    }

    #[tokio::test]
    async fn test_system_prompt_is_top_level_field() {
        let backend = fake_backend::spawn(
            "/messages",
            200,
            json!({ "content": [{ "type": "text", "text": "ok" }] }),
            Duration::ZERO,
        )
        .await;
        let mut settings = HostedSettings::anthropic();
        settings.base_url = backend.base_url.clone();
        settings.system_prompt = Some("be brief".to_string());
        let provider = AnthropicProvider::new("k", settings).unwrap();

        provider.complete(&[ProviderMessage::user("x")]).await.unwrap();
        let body = &backend.requests()[0].body;
        assert_eq!(body["system"], "be brief");
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_non_text_first_block_falls_back() {
        let backend = fake_backend::spawn(
            "/messages",
            200,
            json!({ "content": [{ "type": "tool_use", "id": "t1", "name": "x", "input": {} }] }),
            Duration::ZERO,
        )
        .await;
        let provider = provider_for(&backend.base_url);
        let reply = provider.complete(&[ProviderMessage::user("x")]).await.unwrap();
        assert_eq!(reply, "Sorry, I cannot answer right now.");
    }

    #[tokio::test]
    async fn test_empty_content_falls_back() {
        let backend =
            fake_backend::spawn("/messages", 200, json!({ "content": [] }), Duration::ZERO).await;
        let provider = provider_for(&backend.base_url);
        let reply = provider.complete(&[ProviderMessage::user("x")]).await.unwrap();
        assert_eq!(reply, "Sorry, I cannot answer right now.");
    }

    #[tokio::test]
    async fn test_error_statuses_are_classified() {
        for (status, expected) in [
            (401u16, Some(ProviderError::Unauthorized)),
            (429, Some(ProviderError::RateLimited)),
            (529, None),
        ] {
            let backend = fake_backend::spawn(
                "/messages",
                status,
                json!({ "type": "error" }),
                Duration::ZERO,
            )
            .await;
            let provider = provider_for(&backend.base_url);
            let err = provider
                .complete(&[ProviderMessage::user("x")])
                .await
                .unwrap_err();
            match expected {
                Some(e) => assert_eq!(err, e),
                None => assert!(matches!(err, ProviderError::Unavailable(_))),
            }
        }
    }

    #[test]
    fn test_missing_key_is_config_error() {
        assert!(matches!(
            AnthropicProvider::with_defaults(""),
            Err(RelayError::Config(_))
        ));
    }
}
