//! Conversion from conversation turns to Chat Completions messages.
//!
//! Two conventions are supported:
//! - [`convert_to_openai_messages`]: one wire message per turn, tool calls
//!   and tool results mapped to their dedicated wire shapes.
//! - [`convert_to_r1_format`]: text-only turns with consecutive same-role
//!   turns merged, as required by DeepSeek-R1 style models.

pub mod openai_format;
pub mod r1_format;

pub use openai_format::convert_to_openai_messages;
pub use r1_format::convert_to_r1_format;
