//! Relay application binary - composition root.
//!
//! 1. Parse CLI flags and load configuration from TOML
//! 2. Apply env and flag overrides, then validate
//! 3. Build the completion provider selected by config
//! 4. Start the axum REST API server over an in-memory transcript store

mod cli;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info};

use relay_api::routes;
use relay_api::state::AppState;
use relay_chat::provider::DEFAULT_TIMEOUT;
use relay_chat::build_provider;
use relay_core::config::RelayConfig;
use relay_storage::InMemoryMessageStore;

use cli::CliArgs;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();
    let env = |key: &str| std::env::var(key).ok();

    let config_file = args.resolve_config_path(env);
    let mut config = if config_file.exists() {
        RelayConfig::load(&config_file)?
    } else {
        RelayConfig::default()
    };
    args.apply_overrides(&mut config, env)?;

    relay_core::logging::init(&config.general.log_level);
    info!("Starting Relay v{}", env!("CARGO_PKG_VERSION"));
    info!(
        path = %config_file.display(),
        found = config_file.exists(),
        provider = ?config.provider.kind,
        "Configuration resolved"
    );

    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration");
        return Err(e.into());
    }

    let timeout = match config.chat.provider_timeout_secs {
        0 => DEFAULT_TIMEOUT,
        secs => Duration::from_secs(secs),
    };
    let provider = match build_provider(&config.provider, timeout) {
        Ok(provider) => provider,
        Err(e) => {
            error!(error = %e, "Failed to initialise completion provider");
            return Err(e.into());
        }
    };

    let store = Arc::new(InMemoryMessageStore::new());
    info!("In-memory message store ready");

    let state = AppState::new(config.clone(), store, provider);
    routes::start_server(&config, state).await?;

    Ok(())
}
