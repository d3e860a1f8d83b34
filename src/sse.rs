//! Server-Sent Events (SSE) stream processing utilities.
//!
//! Chat completion endpoints stream their output as SSE:
//! ```text
//! data: {"choices": [...]}
//!
//! : keep-alive
//!
//! data: [DONE]
//! ```
//! Only `data:` fields carry payloads. Comments and the `event`, `id` and
//! `retry` fields are skipped.

use std::pin::Pin;

use bytes::{Bytes, BytesMut};
use futures::stream::{self, Stream, StreamExt};

use crate::client::ClientError;

/// Extension trait for `reqwest::Response` to enable SSE streaming.
///
/// # Example
/// ```ignore
/// use nebius::sse::SseResponseExt;
/// use futures::StreamExt;
///
/// let response = client.post(url).send().await?;
/// let mut stream = response.sse();
/// while let Some(data) = stream.next().await {
///     println!("SSE data: {}", data?);
/// }
/// ```
pub trait SseResponseExt {
    /// Convert the response into a stream of SSE `data` payloads.
    ///
    /// Stops at the `[DONE]` marker or when the body ends.
    fn sse(self) -> impl Stream<Item = Result<String, ClientError>> + Send;
}

impl SseResponseExt for reqwest::Response {
    fn sse(self) -> impl Stream<Item = Result<String, ClientError>> + Send {
        sse_data(self.bytes_stream())
    }
}

struct SseState<S> {
    bytes: Pin<Box<S>>,
    buffer: BytesMut,
    ended: bool,
}

/// Decode a raw byte stream into SSE `data` payloads.
///
/// Lines may be split across network frames, including inside a multi-byte
/// UTF-8 sequence; bytes are buffered until a full line is available.
pub fn sse_data<S, E>(bytes: S) -> impl Stream<Item = Result<String, ClientError>> + Send
where
    S: Stream<Item = Result<Bytes, E>> + Send,
    E: Into<ClientError> + Send,
{
    let state = SseState {
        bytes: Box::pin(bytes),
        buffer: BytesMut::new(),
        ended: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            while let Some(pos) = state.buffer.iter().position(|b| *b == b'\n') {
                let line = state.buffer.split_to(pos + 1);
                match decode_line(&line) {
                    Some(data) if is_done_marker(&data) => return None,
                    Some(data) => return Some((Ok(data), state)),
                    None => continue,
                }
            }

            if state.ended {
                if !state.buffer.is_empty() {
                    let line = state.buffer.split();
                    if let Some(data) = decode_line(&line) {
                        if !is_done_marker(&data) {
                            return Some((Ok(data), state));
                        }
                    }
                }
                return None;
            }

            match state.bytes.next().await {
                Some(Ok(chunk)) => state.buffer.extend_from_slice(&chunk),
                Some(Err(e)) => {
                    // Nothing after a transport error is trustworthy.
                    state.ended = true;
                    state.buffer.clear();
                    return Some((Err(e.into()), state));
                }
                None => state.ended = true,
            }
        }
    })
}

fn decode_line(raw: &[u8]) -> Option<String> {
    let line = String::from_utf8_lossy(raw);
    parse_sse_line(line.trim_end_matches(['\r', '\n'])).map(str::to_string)
}

/// Parse an SSE line to extract the data portion.
///
/// # Example
/// ```
/// use nebius::sse::parse_sse_line;
///
/// assert_eq!(parse_sse_line("data: {\"key\": \"value\"}"), Some("{\"key\": \"value\"}"));
/// assert_eq!(parse_sse_line("data:compact"), Some("compact"));
/// assert_eq!(parse_sse_line(": keep-alive"), None);
/// ```
pub fn parse_sse_line(line: &str) -> Option<&str> {
    let data = line.strip_prefix("data:")?;
    let data = data.trim();
    if data.is_empty() {
        None
    } else {
        Some(data)
    }
}

/// Check if an SSE data payload marks the end of the stream.
pub fn is_done_marker(data: &str) -> bool {
    data == "[DONE]"
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames(parts: &[&'static [u8]]) -> Vec<Result<Bytes, ClientError>> {
        parts.iter().map(|p| Ok(Bytes::from_static(p))).collect()
    }

    async fn collect(parts: &[&'static [u8]]) -> Vec<String> {
        sse_data(stream::iter(frames(parts)))
            .map(|r| r.unwrap())
            .collect()
            .await
    }

    #[test]
    fn test_parse_sse_line() {
        assert_eq!(parse_sse_line("data: hello"), Some("hello"));
        assert_eq!(parse_sse_line("data:   spaces  "), Some("spaces"));
        assert_eq!(parse_sse_line("data:"), None);
        assert_eq!(parse_sse_line("event: message"), None);
        assert_eq!(parse_sse_line(""), None);
    }

    #[test]
    fn test_is_done_marker() {
        assert!(is_done_marker("[DONE]"));
        assert!(!is_done_marker(""));
        assert!(!is_done_marker("{\"key\": \"value\"}"));
    }

    #[tokio::test]
    async fn test_reassembles_split_lines() {
        let out = collect(&[b"data: {\"a\"", b":1}\n\nda", b"ta: {\"b\":2}\n\n"]).await;
        assert_eq!(out, vec!["{\"a\":1}", "{\"b\":2}"]);
    }

    #[tokio::test]
    async fn test_split_utf8_sequence() {
        // "é" is 0xC3 0xA9
        let out = collect(&[b"data: caf\xC3", b"\xA9\n\n"]).await;
        assert_eq!(out, vec!["café"]);
    }

    #[tokio::test]
    async fn test_skips_comments_and_stops_at_done() {
        let out = collect(&[
            b": OPENROUTER PROCESSING\r\n\r\n",
            b"event: message\nid: 7\ndata: one\n\n",
            b"data: [DONE]\n\ndata: ignored\n\n",
        ])
        .await;
        assert_eq!(out, vec!["one"]);
    }

    #[tokio::test]
    async fn test_flushes_unterminated_tail() {
        let out = collect(&[b"data: first\n\ndata: last"]).await;
        assert_eq!(out, vec!["first", "last"]);
    }

    #[tokio::test]
    async fn test_transport_error_ends_stream() {
        let items: Vec<Result<Bytes, ClientError>> = vec![
            Ok(Bytes::from_static(b"data: ok\n\n")),
            Err(ClientError::ProviderError("reset".to_string())),
            Ok(Bytes::from_static(b"data: late\n\n")),
        ];
        let out: Vec<_> = sse_data(stream::iter(items)).collect().await;
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].as_ref().unwrap(), "ok");
        assert!(matches!(out[1], Err(ClientError::ProviderError(_))));
    }
}
