//! Application state shared across all route handlers.

use std::sync::Arc;
use std::time::Instant;

use relay_chat::{ChatOrchestrator, CompletionProvider, SessionResolver};
use relay_core::config::RelayConfig;
use relay_storage::MessageStore;

/// Shared application state.
///
/// All fields use `Arc` for cheap cloning across handler tasks.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration, fixed at startup.
    pub config: Arc<RelayConfig>,
    /// Transcript store, also read directly by the health check.
    pub store: Arc<dyn MessageStore>,
    pub orchestrator: Arc<ChatOrchestrator>,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        config: RelayConfig,
        store: Arc<dyn MessageStore>,
        provider: Arc<dyn CompletionProvider>,
    ) -> Self {
        let resolver = SessionResolver::new(config.session.default_session_id.clone());
        let orchestrator = ChatOrchestrator::new(store.clone(), provider, config.chat.clone())
            .with_resolver(resolver);
        Self {
            config: Arc::new(config),
            store,
            orchestrator: Arc::new(orchestrator),
            start_time: Instant::now(),
        }
    }
}
