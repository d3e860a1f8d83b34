//! Output events produced by a handler.

use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

use crate::client::ClientError;

/// One incremental event of a streamed response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ApiStreamChunk {
    /// Incremental response text.
    Text { text: String },

    /// Incremental "thinking" text from reasoning models.
    Reasoning { reasoning: String },

    /// Token accounting reported by the provider.
    Usage {
        #[serde(rename = "inputTokens")]
        input_tokens: u64,
        #[serde(rename = "outputTokens")]
        output_tokens: u64,
    },
}

/// Lazy, single-pass sequence of response events.
pub type ApiStream<'a> = BoxStream<'a, Result<ApiStreamChunk, ClientError>>;
