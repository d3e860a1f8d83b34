//! Core handler traits and error types.

use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use futures::Stream;
use reqwest::StatusCode;
use thiserror::Error;

use crate::api::openai::{ChatCompletionChunk, ChatCompletionRequest};
use crate::model::Message;
use crate::models::ApiModel;
use crate::stream::ApiStream;

/// Errors that can occur during client operations.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("API error ({status}): {message}")]
    Status {
        status: StatusCode,
        message: String,
        /// Server-provided `Retry-After` hint, if any.
        retry_after: Option<Duration>,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    ClientInit(String),
}

impl ClientError {
    /// Whether the server rejected the request with 429 Too Many Requests.
    pub fn is_rate_limit(&self) -> bool {
        match self {
            ClientError::Status { status, .. } => *status == StatusCode::TOO_MANY_REQUESTS,
            ClientError::Http(e) => e.status() == Some(StatusCode::TOO_MANY_REQUESTS),
            _ => false,
        }
    }

    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            ClientError::Status { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}

/// Stream of raw wire chunks returned by a [`ChatCompletions`] client.
pub type ChatCompletionStream =
    Pin<Box<dyn Stream<Item = Result<ChatCompletionChunk, ClientError>> + Send>>;

/// Transport seam: an OpenAI-compatible chat completions client.
///
/// Implementations own connection management and streaming decoding.
#[async_trait]
pub trait ChatCompletions: Send + Sync {
    /// Issue one streaming chat completion request.
    async fn create_stream(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionStream, ClientError>;
}

/// A provider handler turning a prompt and a conversation into response events.
pub trait ApiHandler: Send + Sync {
    /// Start a streaming completion.
    ///
    /// The returned stream is lazy: nothing is sent until it is polled.
    fn create_message<'a>(&'a self, system_prompt: &'a str, messages: &'a [Message]) -> ApiStream<'a>;

    /// Resolve the model used by this handler.
    fn get_model(&self) -> ApiModel;
}
