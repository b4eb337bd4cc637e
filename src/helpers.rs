// Response Helpers
// Convenience accessors over finished or partial responses.

use crate::openresponses::{ContentPart, Item, Response};
use serde_json::Value;

/// Concatenate the text of every `output_text` part of every message item
///
/// Items are visited in output order and parts in content order. Refusals,
/// reasoning, function calls and plain-string message content contribute
/// nothing; an empty string is returned when nothing matches.
pub fn output_text(response: &Response) -> String {
    response
        .output
        .iter()
        .filter_map(|item| match item {
            Item::Message(message) => Some(message.content.parts()),
            _ => None,
        })
        .flatten()
        .filter_map(|part| match part {
            ContentPart::OutputText { text, .. } => Some(text.as_str()),
            _ => None,
        })
        .collect()
}

/// Alias of [`output_text`]
pub fn get_output_text(response: &Response) -> String {
    output_text(response)
}

/// Same rule as [`output_text`] applied to raw JSON
///
/// Works on partial or unvalidated payloads: any missing or wrongly shaped
/// field simply contributes no text.
pub fn output_text_from_value(response: &Value) -> String {
    let Some(output) = response.get("output").and_then(Value::as_array) else {
        return String::new();
    };
    output
        .iter()
        .filter(|item| item.get("type").and_then(Value::as_str) == Some("message"))
        .filter_map(|item| item.get("content").and_then(Value::as_array))
        .flatten()
        .filter(|part| part.get("type").and_then(Value::as_str) == Some("output_text"))
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openresponses::{
        FunctionCallItem, MessageContent, MessageItem, ReasoningItem, Role, SummaryText, Usage,
    };
    use serde_json::json;

    #[test]
    fn test_concatenates_message_parts() {
        let mut message = MessageItem::assistant("msg_1");
        message.content = MessageContent::Parts(vec![
            ContentPart::output_text("Hello, "),
            ContentPart::refusal("ignored"),
            ContentPart::output_text("world!"),
        ]);
        let mut response = Response::new("gpt-5");
        response.output = vec![
            ReasoningItem {
                summary: vec![SummaryText::new("thinking")],
                ..Default::default()
            }
            .into(),
            message.into(),
        ];
        assert_eq!(output_text(&response), "Hello, world!");
        assert_eq!(get_output_text(&response), "Hello, world!");
        assert_eq!(response.output_text(), "Hello, world!");
    }

    #[test]
    fn test_no_messages_yields_empty() {
        let mut response = Response::new("gpt-5");
        response.output = vec![Item::FunctionCall(FunctionCallItem {
            id: Some("fc_1".to_string()),
            call_id: "call_1".to_string(),
            name: "lookup".to_string(),
            arguments: "{}".to_string(),
            status: None,
        })];
        assert_eq!(output_text(&response), "");
        assert_eq!(output_text(&Response::new("gpt-5")), "");
    }

    #[test]
    fn test_plain_string_content_ignored() {
        let mut response = Response::new("gpt-5");
        response.output = vec![MessageItem::new(Role::Assistant, "not a part").into()];
        assert_eq!(output_text(&response), "");
    }

    #[test]
    fn test_spans_multiple_messages() {
        let response = Response::completed_with_text("gpt-5", "Text content", Usage::new(1, 2));
        assert_eq!(output_text(&response), "Text content");
    }

    #[test]
    fn test_from_value_tolerates_partial_json() {
        let value = json!({
            "output": [
                {"type": "message", "content": [
                    {"type": "output_text", "text": "Hello"},
                    {"type": "output_text"},
                    {"type": "refusal", "refusal": "no"}
                ]},
                {"type": "message", "content": "plain"},
                {"type": "reasoning", "content": [{"type": "output_text", "text": "skip"}]},
                {"type": "message", "content": [{"type": "output_text", "text": ", world!"}]}
            ]
        });
        assert_eq!(output_text_from_value(&value), "Hello, world!");
        assert_eq!(output_text_from_value(&json!({})), "");
        assert_eq!(output_text_from_value(&json!({"output": "nope"})), "");
        assert_eq!(output_text_from_value(&json!(null)), "");
    }
}
