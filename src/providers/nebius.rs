//! Nebius AI Studio handler.
//!
//! Nebius serves open-weight models behind an OpenAI-compatible Chat
//! Completions endpoint. The handler picks the message convention for the
//! configured model, issues one streaming request and maps each wire chunk to
//! [`ApiStreamChunk`] events.

use async_stream::stream;
use futures::StreamExt;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::api::openai::{ChatCompletionChunk, ChatCompletionRequest, ChatMessage, OpenAiCompatibleClient};
use crate::client::{ApiHandler, ChatCompletionStream, ChatCompletions, ClientError};
use crate::model::Message;
use crate::models::{nebius_default_model, nebius_model, ApiModel};
use crate::options::{NebiusOptions, TransportOptions};
use crate::stream::{ApiStream, ApiStreamChunk};
use crate::transform::{convert_to_openai_messages, convert_to_r1_format};

pub const NEBIUS_BASE_URL: &str = "https://api.studio.nebius.ai/v1";

/// Model ids containing this marker take the single-role folding format.
const R1_MARKER: &str = "DeepSeek-R1";

/// Builds a client from `(base_url, api_key, transport)`.
pub type Connector<C> =
    dyn Fn(&str, &str, &TransportOptions) -> Result<C, ClientError> + Send + Sync;

/// Streaming handler for Nebius AI Studio.
///
/// The client is built on first use and reused for the handler's lifetime.
/// Concurrent first calls still build it only once.
///
/// # Example
/// ```no_run
/// use futures::StreamExt;
/// use nebius::model::Message;
/// use nebius::options::NebiusOptions;
/// use nebius::providers::NebiusHandler;
/// use nebius::stream::ApiStreamChunk;
///
/// # async fn run() -> Result<(), nebius::ClientError> {
/// let handler = NebiusHandler::new(
///     NebiusOptions::new()
///         .with_api_key("key")
///         .with_model("deepseek-ai/DeepSeek-R1"),
/// );
///
/// let messages = vec![Message::user("Why is the sky blue?")];
/// let mut stream = handler.create_message("You are terse.", &messages);
/// while let Some(event) = stream.next().await {
///     if let ApiStreamChunk::Text { text } = event? {
///         print!("{text}");
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub struct NebiusHandler<C = OpenAiCompatibleClient> {
    options: NebiusOptions,
    connector: Box<Connector<C>>,
    client: OnceCell<C>,
}

impl NebiusHandler<OpenAiCompatibleClient> {
    /// Create a handler backed by the reqwest client.
    pub fn new(options: NebiusOptions) -> Self {
        Self::with_connector(options, |base_url, api_key, transport| {
            OpenAiCompatibleClient::new(base_url, api_key, transport.clone())
        })
    }
}

impl<C: ChatCompletions> NebiusHandler<C> {
    /// Create a handler with a custom client constructor.
    pub fn with_connector<F>(options: NebiusOptions, connector: F) -> Self
    where
        F: Fn(&str, &str, &TransportOptions) -> Result<C, ClientError> + Send + Sync + 'static,
    {
        Self {
            options,
            connector: Box::new(connector),
            client: OnceCell::new(),
        }
    }

    pub fn options(&self) -> &NebiusOptions {
        &self.options
    }

    /// Return the client, building it on first use.
    ///
    /// Fails with [`ClientError::Config`] when the API key is missing or blank and
    /// with [`ClientError::ClientInit`] when construction fails. A failed
    /// attempt leaves the slot empty.
    pub async fn ensure_client(&self) -> Result<&C, ClientError> {
        self.client
            .get_or_try_init(|| async {
                let api_key = self
                    .options
                    .api_key
                    .as_deref()
                    .filter(|key| !key.trim().is_empty())
                    .ok_or_else(|| ClientError::Config("Nebius API key is required".to_string()))?;

                let base_url = self.options.base_url.as_deref().unwrap_or(NEBIUS_BASE_URL);

                let client = (self.connector)(base_url, api_key, &self.options.transport)
                    .map_err(|e| ClientError::ClientInit(format!("Error creating Nebius client: {e}")))?;

                info!(base_url, "Nebius client created");
                Ok::<C, ClientError>(client)
            })
            .await
    }

    /// Resolve the configured model, falling back to the default entry for
    /// absent or unknown ids.
    pub fn get_model(&self) -> ApiModel {
        self.options
            .api_model_id
            .as_deref()
            .and_then(nebius_model)
            .unwrap_or_else(nebius_default_model)
    }

    /// Stream a completion for `system_prompt` followed by `messages`.
    ///
    /// Nothing happens until the stream is polled. Configuration errors are
    /// the first and only item; transport errors end the stream after the
    /// events already produced.
    pub fn create_message<'a>(
        &'a self,
        system_prompt: &'a str,
        messages: &'a [Message],
    ) -> ApiStream<'a> {
        Box::pin(stream! {
            let mut chunks = match self.open_stream(system_prompt, messages).await {
                Ok(chunks) => chunks,
                Err(e) => {
                    yield Err(e);
                    return;
                }
            };

            while let Some(chunk) = chunks.next().await {
                match chunk {
                    Ok(chunk) => {
                        for event in chunk_events(&chunk) {
                            yield Ok(event);
                        }
                    }
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                }
            }
        })
    }

    async fn open_stream(
        &self,
        system_prompt: &str,
        messages: &[Message],
    ) -> Result<ChatCompletionStream, ClientError> {
        let client = self.ensure_client().await?;
        let model = self.get_model();

        let chat_messages = format_messages(model.id, system_prompt, messages);
        debug!(model = model.id, messages = chat_messages.len(), "starting Nebius stream");

        let request = ChatCompletionRequest::streaming(model.id, chat_messages).with_temperature(0.0);
        client.create_stream(request).await
    }
}

impl<C: ChatCompletions> ApiHandler for NebiusHandler<C> {
    fn create_message<'a>(&'a self, system_prompt: &'a str, messages: &'a [Message]) -> ApiStream<'a> {
        NebiusHandler::create_message(self, system_prompt, messages)
    }

    fn get_model(&self) -> ApiModel {
        NebiusHandler::get_model(self)
    }
}

/// Build the outgoing message list for `model_id`.
///
/// R1 models get the system prompt folded into a leading user turn; every
/// other model gets a system message followed by the converted history.
pub fn format_messages(model_id: &str, system_prompt: &str, messages: &[Message]) -> Vec<ChatMessage> {
    if model_id.contains(R1_MARKER) {
        let mut turns = Vec::with_capacity(messages.len() + 1);
        turns.push(Message::user(system_prompt));
        turns.extend_from_slice(messages);
        convert_to_r1_format(&turns)
    } else {
        let mut out = vec![ChatMessage::system(system_prompt)];
        out.extend(convert_to_openai_messages(messages));
        out
    }
}

/// Map one wire chunk to zero or more events.
///
/// Text, reasoning and usage are checked independently, in that order.
/// Empty text and reasoning deltas produce nothing; missing token counts
/// become 0.
pub fn chunk_events(chunk: &ChatCompletionChunk) -> Vec<ApiStreamChunk> {
    let mut events = Vec::new();

    if let Some(delta) = chunk.delta() {
        if let Some(text) = delta.content.as_ref().filter(|s| !s.is_empty()) {
            events.push(ApiStreamChunk::Text { text: text.clone() });
        }

        if let Some(reasoning) = delta.reasoning_content.as_ref().filter(|s| !s.is_empty()) {
            events.push(ApiStreamChunk::Reasoning {
                reasoning: reasoning.clone(),
            });
        }
    }

    if let Some(usage) = &chunk.usage {
        events.push(ApiStreamChunk::Usage {
            input_tokens: usage.prompt_tokens.unwrap_or(0),
            output_tokens: usage.completion_tokens.unwrap_or(0),
        });
    }

    events
}
