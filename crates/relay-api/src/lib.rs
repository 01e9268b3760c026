//! Relay API crate: axum HTTP server and route handlers.
//!
//! Exposes the chat endpoints consumed by the web client plus a health
//! check, and reads the session cookie that ties cookie-only callers to
//! their transcript.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod session;
pub mod state;

pub use error::ApiError;
pub use routes::{create_router, start_server};
pub use state::AppState;
