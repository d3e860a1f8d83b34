//! Single-role folding conversion for DeepSeek-R1 style models.
//!
//! These models reject consecutive messages with the same role, so adjacent
//! turns of one role are merged into a single message.

use itertools::Itertools;

use crate::api::openai::{ChatContent, ChatMessage, ContentPart};
use crate::model::{Message, Part, Role};

/// Convert conversation turns, merging consecutive turns of the same role.
///
/// Text parts of a turn are joined with newlines; a turn with images becomes
/// a part list. Merging joins two strings with a newline and otherwise
/// concatenates part lists. Function calls and responses are dropped.
pub fn convert_to_r1_format(messages: &[Message]) -> Vec<ChatMessage> {
    let mut merged: Vec<(Role, ChatContent)> = Vec::new();

    for message in messages {
        let content = fold_parts(message.parts());
        match merged.last_mut() {
            Some((role, last)) if *role == message.role() => merge_content(last, content),
            _ => merged.push((message.role(), content)),
        }
    }

    merged
        .into_iter()
        .map(|(role, content)| match role {
            Role::User => ChatMessage::User { content },
            Role::Assistant => ChatMessage::Assistant {
                content: Some(content),
                tool_calls: Vec::new(),
            },
        })
        .collect()
}

fn fold_parts(parts: &[Part]) -> ChatContent {
    let mut texts = parts.iter().filter_map(|part| match part {
        Part::Text { text } => Some(text.as_str()),
        _ => None,
    });

    let images: Vec<ContentPart> = parts
        .iter()
        .filter_map(|part| match part {
            Part::Image { mime_type, data } => Some(ContentPart::image(mime_type, data)),
            _ => None,
        })
        .collect();

    if images.is_empty() {
        return ChatContent::Text(texts.join("\n"));
    }

    let mut content: Vec<ContentPart> = texts
        .map(|text| ContentPart::Text {
            text: text.to_string(),
        })
        .collect();
    content.extend(images);
    ChatContent::Parts(content)
}

fn merge_content(last: &mut ChatContent, next: ChatContent) {
    match (last, next) {
        (ChatContent::Text(prev), ChatContent::Text(next)) => {
            prev.push('\n');
            prev.push_str(&next);
        }
        (last, next) => {
            let mut parts = into_parts(std::mem::replace(last, ChatContent::Parts(Vec::new())));
            parts.extend(into_parts(next));
            *last = ChatContent::Parts(parts);
        }
    }
}

fn into_parts(content: ChatContent) -> Vec<ContentPart> {
    match content {
        ChatContent::Text(text) => vec![ContentPart::Text { text }],
        ChatContent::Parts(parts) => parts,
    }
}
