//! # nebius - Streaming chat adapter for Nebius AI Studio
//!
//! Sends a system prompt and a conversation to the Nebius AI Studio
//! OpenAI-compatible endpoint and yields the response as a stream of typed
//! events.
//!
//! ## Architecture
//!
//! 1. **[`NebiusHandler`]** picks the message convention for the configured
//!    model, builds its client once, and maps wire chunks to events.
//! 2. **[`ChatCompletions`]** is the transport seam; [`OpenAiCompatibleClient`]
//!    implements it over reqwest and SSE.
//! 3. **[`with_retry`](retry::with_retry)** wraps a whole streaming call with a
//!    [`RetryPolicy`]. Handlers never retry on their own.
//!
//! ### Core Types
//!
//! - **`Message` / `Part`**: provider-neutral conversation turns
//! - **`ApiStreamChunk`**: `Text`, `Reasoning` or `Usage` events
//! - **`ApiModel` / `ModelInfo`**: resolved model id and its metadata
//! - **`NebiusOptions` / `TransportOptions`**: credentials, model and HTTP settings
//!
//! ## Example
//! ```no_run
//! use futures::StreamExt;
//! use nebius::{ApiStreamChunk, Message, NebiusHandler, NebiusOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let handler = NebiusHandler::new(NebiusOptions::from_env());
//!     let messages = vec![Message::user("Hello!")];
//!
//!     let mut stream = handler.create_message("You are a helpful assistant.", &messages);
//!     while let Some(event) = stream.next().await {
//!         match event? {
//!             ApiStreamChunk::Text { text } => print!("{text}"),
//!             ApiStreamChunk::Reasoning { .. } => {}
//!             ApiStreamChunk::Usage { input_tokens, output_tokens } => {
//!                 println!("\n[{input_tokens} in / {output_tokens} out]");
//!             }
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod client;
pub mod http;
pub mod model;
pub mod models;
pub mod options;
pub mod providers;
pub mod retry;
pub mod sse;
pub mod stream;
pub mod transform;

pub use api::openai::OpenAiCompatibleClient;
pub use client::{ApiHandler, ChatCompletions, ClientError};
pub use model::{Message, Part, Role};
pub use models::{ApiModel, ModelInfo};
pub use options::{NebiusOptions, TransportOptions};
pub use providers::NebiusHandler;
pub use retry::{with_retry, RetryPolicy, Retrying};
pub use stream::{ApiStream, ApiStreamChunk};
