//! CLI argument definitions for the relay binary.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use std::path::PathBuf;

use clap::Parser;

use relay_core::config::{ProviderKind, RelayConfig};
use relay_core::error::Result;

/// Relay: a session-scoped chat relay in front of a language-model backend.
#[derive(Parser, Debug, Default)]
#[command(name = "relay", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Address to bind.
    #[arg(long = "host")]
    pub host: Option<String>,

    /// API server port.
    #[arg(short = 'p', long = "port")]
    pub port: Option<u16>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// Completion provider (mock, pattern, deepseek, anthropic, openai_compatible).
    #[arg(long = "provider")]
    pub provider: Option<String>,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > RELAY_CONFIG env var > `relay.toml` in the
    /// working directory.
    pub fn resolve_config_path(&self, env: impl Fn(&str) -> Option<String>) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Some(p) = env("RELAY_CONFIG") {
            return PathBuf::from(p);
        }
        PathBuf::from("relay.toml")
    }

    /// Layer env vars and flags over a loaded config.
    ///
    /// The provider API key comes from the provider's env var when set,
    /// otherwise from the file.
    pub fn apply_overrides(
        &self,
        config: &mut RelayConfig,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<()> {
        if let Some(port) = env("RELAY_PORT").and_then(|v| v.trim().parse::<u16>().ok()) {
            config.general.port = port;
        }
        if let Some(kind) = env("RELAY_PROVIDER") {
            config.provider.kind = kind.parse::<ProviderKind>()?;
        }

        if let Some(ref host) = self.host {
            config.general.host = host.clone();
        }
        if let Some(port) = self.port {
            config.general.port = port;
        }
        if let Some(ref level) = self.log_level {
            config.general.log_level = level.clone();
        }
        if let Some(ref kind) = self.provider {
            config.provider.kind = kind.parse::<ProviderKind>()?;
        }

        if let Some(key) = config
            .provider
            .kind
            .api_key_env()
            .and_then(&env)
            .filter(|key| !key.trim().is_empty())
        {
            config.provider.api_key = Some(key);
        }
        Ok(())
    }
}
