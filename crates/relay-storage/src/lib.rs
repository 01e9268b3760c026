//! Relay storage crate - transcript persistence behind the `MessageStore` trait.
//!
//! Ships an in-memory, append-only store keyed by session. The trait is the
//! seam where a durable back end would plug in.

pub mod memory;
pub mod store;

pub use memory::InMemoryMessageStore;
pub use store::MessageStore;
