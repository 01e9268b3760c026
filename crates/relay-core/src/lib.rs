pub mod config;
pub mod error;
pub mod logging;
pub mod text;
pub mod types;

pub use config::RelayConfig;
pub use error::{RelayError, Result};
pub use types::*;
