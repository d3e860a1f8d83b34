//! Wire-level API clients.

pub mod openai;
