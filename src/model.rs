//! Provider-neutral conversation types.
//!
//! A conversation is an ordered list of [`Message`] turns, each made of
//! [`Part`]s. The system prompt is passed separately to the handler.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The author of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One content block inside a turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Part {
    /// Plain text.
    Text { text: String },

    /// Base64-encoded image.
    Image { mime_type: String, data: String },

    /// A tool invocation requested by the assistant.
    FunctionCall {
        id: String,
        name: String,
        arguments: Value,
    },

    /// The result of a tool invocation, sent back by the user side.
    ///
    /// `response` is either a JSON string or an array of `text`/`image` parts.
    FunctionResponse {
        id: String,
        #[serde(default)]
        name: String,
        response: Value,
        #[serde(default)]
        is_error: bool,
    },
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text { text: text.into() }
    }
}

/// A single conversation turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", content = "content", rename_all = "lowercase")]
pub enum Message {
    User(Vec<Part>),
    Assistant(Vec<Part>),
}

impl Message {
    /// A user turn holding a single text part.
    pub fn user(text: impl Into<String>) -> Self {
        Message::User(vec![Part::text(text)])
    }

    /// An assistant turn holding a single text part.
    pub fn assistant(text: impl Into<String>) -> Self {
        Message::Assistant(vec![Part::text(text)])
    }

    pub fn role(&self) -> Role {
        match self {
            Message::User(_) => Role::User,
            Message::Assistant(_) => Role::Assistant,
        }
    }

    pub fn parts(&self) -> &[Part] {
        match self {
            Message::User(parts) | Message::Assistant(parts) => parts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_helpers() {
        let msg = Message::user("Hello");
        assert_eq!(msg.role(), Role::User);
        assert_eq!(msg.parts(), &[Part::text("Hello")]);
        assert_eq!(Message::assistant("Hi").role(), Role::Assistant);
    }

    #[test]
    fn test_message_from_json() {
        let msg: Message = serde_json::from_value(json!({
            "role": "assistant",
            "content": [
                {"type": "text", "text": "Let me check."},
                {"type": "function_call", "id": "call_1", "name": "weather", "arguments": {"city": "Paris"}}
            ]
        }))
        .unwrap();

        assert_eq!(msg.role(), Role::Assistant);
        assert_eq!(msg.parts().len(), 2);
        assert!(matches!(&msg.parts()[1], Part::FunctionCall { name, .. } if name == "weather"));
    }
}
