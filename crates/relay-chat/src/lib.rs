//! Conversational core of the relay.
//!
//! Provides the completion provider layer (mock, pattern-based, and hosted
//! backends), session identity resolution, the client-side session roster,
//! and the chat orchestrator that ties them to the message store.

pub mod error;
pub mod orchestrator;
pub mod provider;
pub mod roster;
pub mod session;

pub use error::ChatError;
pub use orchestrator::{ChatExchange, ChatOrchestrator};
pub use provider::{build_provider, CompletionProvider, ProviderError, ProviderMessage};
pub use roster::{ChatSession, RosterError, SessionRoster, MAX_SESSIONS};
pub use session::{SessionHint, SessionResolver};
