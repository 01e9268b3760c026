//! Startup-time provider selection.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use relay_core::config::{ProviderConfig, ProviderKind};
use relay_core::error::RelayError;

use super::{
    AnthropicProvider, ApologyTexts, CompletionProvider, HostedSettings, MaskingProvider,
    MockProvider, OpenAiCompatibleProvider, PatternProvider,
};

/// Build the provider selected by `config`.
///
/// Hosted kinds fail here, not per request, when their API key is missing.
/// `timeout` bounds each hosted round trip.
pub fn build_provider(
    config: &ProviderConfig,
    timeout: Duration,
) -> Result<Arc<dyn CompletionProvider>, RelayError> {
    let provider: Arc<dyn CompletionProvider> = match config.kind {
        ProviderKind::Mock => match &config.fixed_reply {
            Some(reply) => Arc::new(MockProvider::fixed(reply.clone())),
            None => Arc::new(MockProvider::canned()),
        },
        ProviderKind::Pattern => Arc::new(PatternProvider::new()),
        ProviderKind::Deepseek => Arc::new(OpenAiCompatibleProvider::new(
            "deepseek",
            api_key(config)?,
            hosted_settings(HostedSettings::deepseek(), config, timeout),
        )?),
        ProviderKind::OpenaiCompatible => Arc::new(OpenAiCompatibleProvider::new(
            "openai_compatible",
            api_key(config)?,
            hosted_settings(HostedSettings::openai(), config, timeout),
        )?),
        ProviderKind::Anthropic => Arc::new(AnthropicProvider::new(
            api_key(config)?,
            hosted_settings(HostedSettings::anthropic(), config, timeout),
        )?),
    };

    let provider = if config.mask_errors {
        let texts = match config.kind {
            ProviderKind::Anthropic => ApologyTexts::anthropic(),
            _ => ApologyTexts::deepseek(),
        };
        Arc::new(MaskingProvider::new(provider, texts)) as Arc<dyn CompletionProvider>
    } else {
        provider
    };

    info!(
        provider = provider.name(),
        mask_errors = config.mask_errors,
        "Completion provider ready"
    );
    Ok(provider)
}

fn api_key(config: &ProviderConfig) -> Result<&str, RelayError> {
    match config.api_key.as_deref().map(str::trim) {
        Some(key) if !key.is_empty() => Ok(key),
        _ => Err(RelayError::Config(format!(
            "{} is not set; the {:?} provider cannot start without an API key",
            config.kind.api_key_env().unwrap_or("api_key"),
            config.kind
        ))),
    }
}

/// Overlay configured values on a preset.
fn hosted_settings(
    mut preset: HostedSettings,
    config: &ProviderConfig,
    timeout: Duration,
) -> HostedSettings {
    if let Some(base_url) = &config.base_url {
        preset.base_url = base_url.clone();
    }
    if let Some(model) = &config.model {
        preset.model = model.clone();
    }
    if let Some(prompt) = &config.system_prompt {
        preset.system_prompt = if prompt.trim().is_empty() {
            None
        } else {
            Some(prompt.clone())
        };
    }
    preset.temperature = config.temperature;
    preset.max_tokens = config.max_tokens;
    preset.timeout = timeout;
    preset
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{ProviderError, ProviderMessage};

    fn config(kind: ProviderKind) -> ProviderConfig {
        ProviderConfig {
            kind,
            ..ProviderConfig::default()
        }
    }

    /// The build error; providers are not `Debug`, so no `unwrap_err`.
    fn build_error(cfg: &ProviderConfig) -> RelayError {
        match build_provider(cfg, Duration::from_secs(1)) {
            Ok(provider) => panic!("expected an error, built {}", provider.name()),
            Err(err) => err,
        }
    }

    #[tokio::test]
    async fn test_mock_fixed_reply() {
        let mut cfg = config(ProviderKind::Mock);
        cfg.fixed_reply = Some("AI response".to_string());
        let provider = build_provider(&cfg, Duration::from_secs(1)).unwrap();
        assert_eq!(provider.name(), "mock");
        assert_eq!(provider.complete(&[]).await.unwrap(), "AI response");
    }

    #[tokio::test]
    async fn test_pattern_kind() {
        let provider =
            build_provider(&config(ProviderKind::Pattern), Duration::from_secs(1)).unwrap();
        assert_eq!(provider.name(), "pattern");
        assert_eq!(
            provider.complete(&[ProviderMessage::user(" ")]).await,
            Err(ProviderError::EmptyInput)
        );
    }

    #[test]
    fn test_hosted_kinds_require_api_key() {
        for kind in [
            ProviderKind::Deepseek,
            ProviderKind::Anthropic,
            ProviderKind::OpenaiCompatible,
        ] {
            let err = build_error(&config(kind));
            assert!(matches!(err, RelayError::Config(_)), "{:?}", kind);
        }

        let mut cfg = config(ProviderKind::Deepseek);
        cfg.api_key = Some("   ".to_string());
        let err = build_error(&cfg);
        assert!(err.to_string().contains("DEEPSEEK_API_KEY"));
    }

    #[test]
    fn test_hosted_kinds_build_with_key() {
        for (kind, name) in [
            (ProviderKind::Deepseek, "deepseek"),
            (ProviderKind::Anthropic, "anthropic"),
            (ProviderKind::OpenaiCompatible, "openai_compatible"),
        ] {
            let mut cfg = config(kind);
            cfg.api_key = Some("sk-test".to_string());
            let provider = build_provider(&cfg, Duration::from_secs(1)).unwrap();
            assert_eq!(provider.name(), name);
        }
    }

    #[test]
    fn test_hosted_settings_overlay() {
        let mut cfg = config(ProviderKind::Deepseek);
        cfg.base_url = Some("http://localhost:1234/v1".to_string());
        cfg.model = Some("deepseek-reasoner".to_string());
        cfg.system_prompt = Some(String::new());
        cfg.temperature = 0.1;
        cfg.max_tokens = 256;

        let settings =
            hosted_settings(HostedSettings::deepseek(), &cfg, Duration::from_secs(5));
        assert_eq!(settings.base_url, "http://localhost:1234/v1");
        assert_eq!(settings.model, "deepseek-reasoner");
        assert!(settings.system_prompt.is_none());
        assert_eq!(settings.temperature, 0.1);
        assert_eq!(settings.max_tokens, 256);
        assert_eq!(settings.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_overlay_keeps_preset_when_unset() {
        let cfg = config(ProviderKind::Deepseek);
        let settings =
            hosted_settings(HostedSettings::deepseek(), &cfg, Duration::from_secs(30));
        assert_eq!(settings.model, "deepseek-chat");
        assert!(settings.system_prompt.is_some());
    }

    #[tokio::test]
    async fn test_mask_errors_wraps_provider() {
        let mut cfg = config(ProviderKind::Pattern);
        cfg.mask_errors = true;
        let provider = build_provider(&cfg, Duration::from_secs(1)).unwrap();
        let reply = provider
            .complete(&[ProviderMessage::user("")])
            .await
            .unwrap();
        assert_eq!(reply, ApologyTexts::deepseek().unavailable);
    }
}
