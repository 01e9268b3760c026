use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{RelayError, Result};
use crate::text;

/// Top-level configuration for the relay.
///
/// Loaded from `relay.toml` in the working directory by default. Every
/// section falls back to its defaults, so a partial file is valid.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelayConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
}

impl RelayConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: RelayConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Reject values the relay cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.chat.max_message_chars == 0 {
            return Err(RelayError::Config(
                "chat.max_message_chars must be greater than 0".to_string(),
            ));
        }
        if self.chat.fallback_reply.trim().is_empty() {
            return Err(RelayError::Config(
                "chat.fallback_reply must not be empty".to_string(),
            ));
        }
        if self.session.default_session_id.trim().is_empty() {
            return Err(RelayError::Config(
                "session.default_session_id must not be empty".to_string(),
            ));
        }
        if self.session.cookie_name.trim().is_empty() {
            return Err(RelayError::Config(
                "session.cookie_name must not be empty".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.provider.temperature) {
            return Err(RelayError::Config(format!(
                "provider.temperature must be within 0.0..=2.0, got {}",
                self.provider.temperature
            )));
        }
        if self.provider.max_tokens == 0 {
            return Err(RelayError::Config(
                "provider.max_tokens must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// General process settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Address the API server binds to.
    pub host: String,
    /// API server port.
    pub port: u16,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            log_level: "info".to_string(),
        }
    }
}

/// HTTP server middleware settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Origins allowed by CORS. Empty means same-origin only.
    pub cors_origins: Vec<String>,
    /// Maximum request body size in bytes.
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            cors_origins: vec![
                "http://localhost:5173".to_string(),
                "http://127.0.0.1:5173".to_string(),
            ],
            body_limit_bytes: 64 * 1024,
        }
    }
}

/// Chat orchestration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Maximum message length in characters (after trimming).
    pub max_message_chars: usize,
    /// Assistant reply stored when the provider call fails.
    pub fallback_reply: String,
    /// Upper bound on a single provider call, in seconds.
    pub provider_timeout_secs: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_message_chars: 2000,
            fallback_reply: text::FALLBACK_REPLY.to_string(),
            provider_timeout_secs: 30,
        }
    }
}

/// Session identity settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Session used when the caller supplies no identity at all.
    pub default_session_id: String,
    /// Name of the cookie carrying a server-assigned session token.
    pub cookie_name: String,
    /// Assign a fresh session cookie to callers that have none.
    pub issue_cookie: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_session_id: "default".to_string(),
            cookie_name: "relay.sid".to_string(),
            issue_cookie: false,
        }
    }
}

/// Which completion backend the relay talks to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Canned replies, never fails.
    #[default]
    Mock,
    /// Canned replies chosen by simple content rules.
    Pattern,
    /// DeepSeek chat completions.
    Deepseek,
    /// Anthropic messages API.
    Anthropic,
    /// Any OpenAI-compatible `/chat/completions` endpoint.
    OpenaiCompatible,
}

impl ProviderKind {
    /// Environment variable consulted for the API key. `None` for backends
    /// that run without one.
    pub fn api_key_env(&self) -> Option<&'static str> {
        match self {
            ProviderKind::Deepseek => Some("DEEPSEEK_API_KEY"),
            ProviderKind::Anthropic => Some("ANTHROPIC_API_KEY"),
            ProviderKind::OpenaiCompatible => Some("OPENAI_API_KEY"),
            ProviderKind::Mock | ProviderKind::Pattern => None,
        }
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "mock" => Ok(ProviderKind::Mock),
            "pattern" => Ok(ProviderKind::Pattern),
            "deepseek" => Ok(ProviderKind::Deepseek),
            "anthropic" | "claude" => Ok(ProviderKind::Anthropic),
            "openai_compatible" | "openai" => Ok(ProviderKind::OpenaiCompatible),
            other => Err(RelayError::Config(format!(
                "Unknown provider '{}'. Must be one of: mock, pattern, deepseek, anthropic, openai_compatible",
                other
            ))),
        }
    }
}

/// Completion provider settings.
///
/// `base_url` and `model` left empty fall back to the per-provider presets.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    /// API key for hosted providers. The provider's env var wins when set.
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
    /// System preamble for hosted providers; `None` uses the preset.
    pub system_prompt: Option<String>,
    /// Fixed reply for the mock provider; `None` picks from canned replies.
    pub fixed_reply: Option<String>,
    /// Turn provider failures into per-backend apology replies inside the
    /// provider instead of the orchestrator's single fallback reply.
    pub mask_errors: bool,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::Mock,
            api_key: None,
            base_url: None,
            model: None,
            temperature: 0.7,
            max_tokens: 1000,
            system_prompt: None,
            fixed_reply: None,
            mask_errors: false,
        }
    }
}
