//! Provider handlers.

pub mod nebius;

pub use nebius::{chunk_events, format_messages, NebiusHandler, NEBIUS_BASE_URL};
