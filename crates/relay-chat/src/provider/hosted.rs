//! Shared plumbing for providers backed by a hosted HTTP API.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Serialize;

use relay_core::error::{RelayError, Result};
use relay_core::text;

use super::ProviderError;

/// Default upper bound on one backend round trip.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Request shaping for a hosted completion API.
#[derive(Debug, Clone, PartialEq)]
pub struct HostedSettings {
    /// API root, without a trailing endpoint path.
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Preamble sent ahead of the transcript, if the backend accepts one.
    pub system_prompt: Option<String>,
    pub timeout: Duration,
}

impl HostedSettings {
    /// DeepSeek chat, answering in Chinese.
    pub fn deepseek() -> Self {
        Self {
            base_url: "https://api.deepseek.com/v1".to_string(),
            model: "deepseek-chat".to_string(),
            temperature: 0.7,
            max_tokens: 1000,
            system_prompt: Some(text::ASSISTANT_PREAMBLE.to_string()),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Anthropic messages API.
    pub fn anthropic() -> Self {
        Self {
            base_url: "https://api.anthropic.com/v1".to_string(),
            model: "claude-3-sonnet-20240229".to_string(),
            temperature: 0.7,
            max_tokens: 1000,
            system_prompt: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// OpenAI chat completions.
    pub fn openai() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            max_tokens: 1000,
            system_prompt: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// `{base_url}/{path}` with exactly one slash between them.
    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Reject blank credentials before any request is made.
pub(crate) fn require_api_key(api_key: &str, provider: &str) -> Result<()> {
    if api_key.trim().is_empty() {
        return Err(RelayError::Config(format!(
            "{} provider requires a non-empty API key",
            provider
        )));
    }
    Ok(())
}

/// Build a header value, mapping invalid bytes to a config error.
pub(crate) fn header_value(value: &str, what: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| RelayError::Config(format!("invalid {} header value: {}", what, e)))
}

/// Build a reqwest client carrying `headers` on every request.
pub(crate) fn build_client(
    headers: Vec<(HeaderName, HeaderValue)>,
    timeout: Duration,
) -> Result<reqwest::Client> {
    let mut map = HeaderMap::new();
    map.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    for (name, value) in headers {
        map.insert(name, value);
    }

    reqwest::Client::builder()
        .default_headers(map)
        .timeout(timeout)
        .pool_max_idle_per_host(8)
        .build()
        .map_err(|e| RelayError::Config(format!("failed to build HTTP client: {}", e)))
}

/// POST `body` as JSON and decode a JSON reply, classifying every failure.
pub(crate) async fn post_json<B, R>(
    client: &reqwest::Client,
    url: &str,
    body: &B,
) -> std::result::Result<R, ProviderError>
where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
{
    let response = client
        .post(url)
        .json(body)
        .send()
        .await
        .map_err(classify_transport)?;

    let status = response.status();
    if !status.is_success() {
        let detail = response.text().await.unwrap_or_default();
        return Err(ProviderError::from_status(status.as_u16(), detail));
    }

    response
        .json::<R>()
        .await
        .map_err(|e| ProviderError::Unavailable(format!("undecodable response body: {}", e)))
}

fn classify_transport(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Unavailable("request timed out".to_string())
    } else {
        ProviderError::Unavailable(format!("network error: {}", err))
    }
}

/// The reply text, or the backend's `no_answer` text when it sent none.
pub(crate) fn reply_or_fallback(text: Option<String>, no_answer: &str) -> String {
    match text {
        Some(t) if !t.trim().is_empty() => t,
        _ => no_answer.to_string(),
    }
}
