//! Per-role conversion to the OpenAI Chat Completions message format.

use itertools::Itertools;
use serde_json::Value;

use crate::api::openai::{ChatContent, ChatFunctionCall, ChatMessage, ChatToolCall, ContentPart};
use crate::model::{Message, Part};

const IMAGE_PLACEHOLDER: &str = "(see following user message for image)";

/// Convert conversation turns to Chat Completions messages.
///
/// A user turn carrying function responses yields one `tool` message per
/// response, followed by a `user` message with the remaining text and images
/// (omitted when there are none). An assistant turn yields a single message
/// whose text parts are joined with newlines and whose function calls become
/// `tool_calls`.
pub fn convert_to_openai_messages(messages: &[Message]) -> Vec<ChatMessage> {
    let mut out = Vec::with_capacity(messages.len());

    for message in messages {
        match message {
            Message::User(parts) => push_user(&mut out, parts),
            Message::Assistant(parts) => out.push(assistant_message(parts)),
        }
    }

    out
}

fn push_user(out: &mut Vec<ChatMessage>, parts: &[Part]) {
    let mut content = Vec::new();
    let mut tool_images = Vec::new();

    for part in parts {
        match part {
            Part::FunctionResponse { id, response, .. } => {
                out.push(ChatMessage::Tool {
                    tool_call_id: id.clone(),
                    content: tool_result_text(response, &mut tool_images),
                });
            }
            Part::Text { text } => content.push(ContentPart::Text { text: text.clone() }),
            Part::Image { mime_type, data } => content.push(ContentPart::image(mime_type, data)),
            Part::FunctionCall { .. } => {}
        }
    }

    // Images returned by tools can only travel in a user message.
    content.extend(tool_images);

    if content.is_empty() {
        return;
    }

    let content = match content.as_slice() {
        [ContentPart::Text { text }] => ChatContent::Text(text.clone()),
        _ => ChatContent::Parts(content),
    };
    out.push(ChatMessage::User { content });
}

/// Flatten a function response into the text of a `tool` message.
fn tool_result_text(response: &Value, images: &mut Vec<ContentPart>) -> String {
    match response {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match serde_json::from_value::<Part>(item.clone()) {
                Ok(Part::Text { text }) => text,
                Ok(Part::Image { mime_type, data }) => {
                    images.push(ContentPart::image(&mime_type, &data));
                    IMAGE_PLACEHOLDER.to_string()
                }
                _ => item.to_string(),
            })
            .join("\n"),
        other => other.to_string(),
    }
}

fn assistant_message(parts: &[Part]) -> ChatMessage {
    let text = parts
        .iter()
        .filter_map(|part| match part {
            Part::Text { text } => Some(text.as_str()),
            _ => None,
        })
        .join("\n");

    let has_text = parts.iter().any(|p| matches!(p, Part::Text { .. }));

    let tool_calls = parts
        .iter()
        .filter_map(|part| match part {
            Part::FunctionCall { id, name, arguments } => Some(ChatToolCall {
                id: id.clone(),
                tool_type: "function".to_string(),
                function: ChatFunctionCall {
                    name: name.clone(),
                    arguments: arguments.to_string(),
                },
            }),
            _ => None,
        })
        .collect();

    ChatMessage::Assistant {
        content: has_text.then_some(ChatContent::Text(text)),
        tool_calls,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_turns() {
        let out = convert_to_openai_messages(&[Message::user("Hi"), Message::assistant("Hello")]);
        assert_eq!(out, vec![ChatMessage::user("Hi"), ChatMessage::assistant("Hello")]);
    }

    #[test]
    fn test_assistant_tool_call() {
        let out = convert_to_openai_messages(&[Message::Assistant(vec![
            Part::text("Checking."),
            Part::text("One moment."),
            Part::FunctionCall {
                id: "call_1".to_string(),
                name: "weather".to_string(),
                arguments: json!({"city": "Paris"}),
            },
        ])]);

        let body = serde_json::to_value(&out).unwrap();
        assert_eq!(
            body,
            json!([{
                "role": "assistant",
                "content": "Checking.\nOne moment.",
                "tool_calls": [{
                    "id": "call_1",
                    "type": "function",
                    "function": {"name": "weather", "arguments": "{\"city\":\"Paris\"}"}
                }]
            }])
        );
    }

    #[test]
    fn test_assistant_tool_call_only_has_no_content() {
        let out = convert_to_openai_messages(&[Message::Assistant(vec![Part::FunctionCall {
            id: "call_1".to_string(),
            name: "noop".to_string(),
            arguments: json!({}),
        }])]);
        assert!(matches!(&out[0], ChatMessage::Assistant { content: None, tool_calls } if tool_calls.len() == 1));
    }

    #[test]
    fn test_tool_results_precede_user_text() {
        let out = convert_to_openai_messages(&[Message::User(vec![
            Part::text("And now?"),
            Part::FunctionResponse {
                id: "call_1".to_string(),
                name: "weather".to_string(),
                response: json!("sunny"),
                is_error: false,
            },
        ])]);

        assert_eq!(
            out,
            vec![
                ChatMessage::Tool {
                    tool_call_id: "call_1".to_string(),
                    content: "sunny".to_string()
                },
                ChatMessage::user("And now?"),
            ]
        );
    }

    #[test]
    fn test_tool_result_only_emits_no_user_message() {
        let out = convert_to_openai_messages(&[Message::User(vec![Part::FunctionResponse {
            id: "call_1".to_string(),
            name: String::new(),
            response: json!([{"type": "text", "text": "a"}, {"type": "text", "text": "b"}]),
            is_error: false,
        }])]);

        assert_eq!(
            out,
            vec![ChatMessage::Tool {
                tool_call_id: "call_1".to_string(),
                content: "a\nb".to_string()
            }]
        );
    }

    #[test]
    fn test_tool_result_images_move_to_user_message() {
        let out = convert_to_openai_messages(&[Message::User(vec![Part::FunctionResponse {
            id: "call_1".to_string(),
            name: "screenshot".to_string(),
            response: json!([{"type": "image", "mime_type": "image/png", "data": "AAAA"}]),
            is_error: false,
        }])]);

        assert_eq!(out.len(), 2);
        assert!(matches!(&out[0], ChatMessage::Tool { content, .. } if content == IMAGE_PLACEHOLDER));
        assert_eq!(
            out[1],
            ChatMessage::User {
                content: ChatContent::Parts(vec![ContentPart::image("image/png", "AAAA")])
            }
        );
    }

    #[test]
    fn test_user_image_becomes_data_url() {
        let out = convert_to_openai_messages(&[Message::User(vec![
            Part::text("What is this?"),
            Part::Image {
                mime_type: "image/jpeg".to_string(),
                data: "Zm9v".to_string(),
            },
        ])]);

        let body = serde_json::to_value(&out[0]).unwrap();
        assert_eq!(body["content"][1]["image_url"]["url"], "data:image/jpeg;base64,Zm9v");
    }
}
