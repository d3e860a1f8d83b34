//! OpenAI-compatible Chat Completions client.
//!
//! Nebius AI Studio speaks the OpenAI Chat Completions dialect. This module
//! holds the wire types and a reqwest-backed [`ChatCompletions`] client.
//! See: <https://platform.openai.com/docs/api-reference/chat>

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::client::{ChatCompletionStream, ChatCompletions, ClientError};
use crate::http::{add_extra_headers, build_http_client, retry_after, RequestBuilderExt, ResponseExt};
use crate::options::TransportOptions;
use crate::sse::SseResponseExt;

/// Generic client for OpenAI-compatible Chat Completions APIs.
///
/// Holds one `reqwest::Client`, so connections are pooled across requests.
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    transport_options: TransportOptions,
}

impl OpenAiCompatibleClient {
    /// Create a new client.
    ///
    /// Fails if the API key is blank or the HTTP client cannot be built.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        transport_options: TransportOptions,
    ) -> Result<Self, ClientError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ClientError::Config("API key is required".to_string()));
        }

        let base_url = base_url.into().trim_end_matches('/').to_string();
        let http = build_http_client(&transport_options)?;

        Ok(Self {
            http,
            api_key,
            base_url,
            transport_options,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Decode the SSE body into wire chunks.
    fn process_stream(response: reqwest::Response) -> ChatCompletionStream {
        let stream = response.sse().map(|result| {
            result.and_then(|line| {
                let payload: Value = serde_json::from_str(&line)?;
                match payload.get("error").filter(|e| !e.is_null()) {
                    Some(error) => Err(ClientError::ProviderError(error_message(error))),
                    None => Ok(serde_json::from_value::<ChatCompletionChunk>(payload)?),
                }
            })
        });

        Box::pin(stream)
    }

    /// Handle error responses.
    fn handle_error_response(
        status: reqwest::StatusCode,
        headers: &reqwest::header::HeaderMap,
        body: &str,
    ) -> ClientError {
        let message = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|v| v.get("error").filter(|e| !e.is_null()).map(error_message))
            .unwrap_or_else(|| body.to_string());

        ClientError::Status {
            status,
            message,
            retry_after: retry_after(headers),
        }
    }
}

#[async_trait]
impl ChatCompletions for OpenAiCompatibleClient {
    async fn create_stream(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionStream, ClientError> {
        let url = format!("{}/chat/completions", self.base_url);

        let mut req = self
            .http
            .post(&url)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(CONTENT_TYPE, "application/json");

        req = add_extra_headers(req, &self.transport_options);

        let response = req.json_logged(&request).send().await?;
        let status = response.status();

        if !status.is_success() {
            let headers = response.headers().clone();
            let body = response.text_logged().await.unwrap_or_default();
            return Err(Self::handle_error_response(status, &headers, &body));
        }

        Ok(Self::process_stream(response))
    }
}

// --- Chat Completions API Types ---

/// One outgoing message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum ChatMessage {
    System {
        content: String,
    },
    User {
        content: ChatContent,
    },
    Assistant {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<ChatContent>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ChatToolCall>,
    },
    Tool {
        tool_call_id: String,
        content: String,
    },
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        ChatMessage::System {
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        ChatMessage::User {
            content: ChatContent::Text(content.into()),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        ChatMessage::Assistant {
            content: Some(ChatContent::Text(content.into())),
            tool_calls: Vec::new(),
        }
    }
}

/// Message content: either a plain string or a list of parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChatContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

impl ContentPart {
    /// An image part carrying a base64 data URL.
    pub fn image(mime_type: &str, data: &str) -> Self {
        ContentPart::ImageUrl {
            image_url: ImageUrl {
                url: format!("data:{mime_type};base64,{data}"),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageUrl {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatToolCall {
    pub id: String,
    #[serde(rename = "type")]
    pub tool_type: String,
    pub function: ChatFunctionCall,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatFunctionCall {
    pub name: String,
    /// JSON-encoded arguments.
    pub arguments: String,
}

#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: Option<f32>,
    pub stream: Option<bool>,
    pub stream_options: Option<StreamOptions>,
}

impl ChatCompletionRequest {
    /// A streaming request that asks for usage accounting in the stream.
    pub fn streaming(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature: None,
            stream: Some(true),
            stream_options: Some(StreamOptions {
                include_usage: true,
            }),
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StreamOptions {
    pub include_usage: bool,
}

/// Render an `error` value from a response body or stream payload.
///
/// `{"message", "type"}` objects become `"type: message"`; strings are used
/// as is; anything else is printed as JSON.
fn error_message(error: &Value) -> String {
    match error {
        Value::String(s) => s.clone(),
        Value::Object(map) => match map.get("message").and_then(Value::as_str) {
            Some(message) => match map.get("type").and_then(Value::as_str) {
                Some(error_type) => format!("{error_type}: {message}"),
                None => message.to_string(),
            },
            None => error.to_string(),
        },
        other => other.to_string(),
    }
}

// --- Streaming Types ---

/// One streamed chunk of a chat completion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatCompletionChunk {
    pub choices: Vec<ChunkChoice>,
    pub usage: Option<ChunkUsage>,
}

impl ChatCompletionChunk {
    /// The delta of the first choice, if any.
    pub fn delta(&self) -> Option<&ChunkDelta> {
        self.choices.first().and_then(|c| c.delta.as_ref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkChoice {
    pub delta: Option<ChunkDelta>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkDelta {
    pub content: Option<String>,
    /// Reasoning text emitted by DeepSeek-R1 style models.
    pub reasoning_content: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkUsage {
    #[serde(deserialize_with = "token_count")]
    pub prompt_tokens: Option<u64>,
    #[serde(deserialize_with = "token_count")]
    pub completion_tokens: Option<u64>,
}

/// Accept any JSON number as a token count. Floats are truncated and
/// negative values clamp to 0.
fn token_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let number = Option::<serde_json::Number>::deserialize(deserializer)?;
    Ok(number.map(|n| {
        n.as_u64()
            .unwrap_or_else(|| n.as_f64().map_or(0, |f| f.max(0.0) as u64))
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_body_shape() {
        let request = ChatCompletionRequest::streaming("gpt-4", vec![ChatMessage::system("be brief")])
            .with_temperature(0.0);
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(body["model"], "gpt-4");
        assert_eq!(body["messages"], json!([{"role": "system", "content": "be brief"}]));
        assert_eq!(body["temperature"].as_f64(), Some(0.0));
        assert_eq!(body["stream"], true);
        assert_eq!(body["stream_options"], json!({"include_usage": true}));
    }

    #[test]
    fn test_assistant_without_tool_calls_omits_field() {
        let body = serde_json::to_value(ChatMessage::assistant("ok")).unwrap();
        assert_eq!(body, json!({"role": "assistant", "content": "ok"}));
    }

    #[test]
    fn test_chunk_decoding_tolerates_missing_fields() {
        let chunk: ChatCompletionChunk = serde_json::from_value(json!({
            "id": "chatcmpl-1",
            "choices": [],
            "usage": {"prompt_tokens": 3}
        }))
        .unwrap();
        assert!(chunk.delta().is_none());
        assert_eq!(chunk.usage.unwrap().completion_tokens, None);

        let chunk: ChatCompletionChunk = serde_json::from_value(json!({
            "choices": [{"index": 0, "delta": {"reasoning_content": "hmm"}, "finish_reason": null}],
            "usage": null
        }))
        .unwrap();
        assert_eq!(chunk.delta().unwrap().reasoning_content.as_deref(), Some("hmm"));
        assert!(chunk.usage.is_none());
    }

    #[test]
    fn test_error_message_shapes() {
        assert_eq!(
            error_message(&json!({"message": "overloaded", "type": "server_error"})),
            "server_error: overloaded"
        );
        assert_eq!(error_message(&json!({"message": "x", "type": 500})), "x");
        assert_eq!(error_message(&json!("model overloaded")), "model overloaded");
        assert_eq!(error_message(&json!({"code": 502})), r#"{"code":502}"#);
    }

    #[test]
    fn test_usage_accepts_any_number() {
        let usage: ChunkUsage = serde_json::from_value(json!({
            "prompt_tokens": 5_000_000_000u64,
            "completion_tokens": 10.0
        }))
        .unwrap();
        assert_eq!(usage.prompt_tokens, Some(5_000_000_000));
        assert_eq!(usage.completion_tokens, Some(10));

        let usage: ChunkUsage = serde_json::from_value(json!({"prompt_tokens": null})).unwrap();
        assert_eq!(usage, ChunkUsage::default());
    }

    #[test]
    fn test_blank_api_key_rejected() {
        let result = OpenAiCompatibleClient::new("https://example.com/v1", "  ", TransportOptions::default());
        assert!(matches!(result, Err(ClientError::Config(_))));
    }
}
