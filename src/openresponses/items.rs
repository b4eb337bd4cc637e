// Items: the units of a response's input and output.

use super::common::{ItemStatus, Role};
use super::content::{ContentPart, ReasoningText, SummaryText};
use crate::config::ValidationConfig;
use crate::errors::ValidationError;
use crate::validate::{text_or_tagged, validate_all, Discriminated, TextOrTagged, Validate};
use serde::{Deserialize, Deserializer, Serialize};

/// Message content can be a string or array of content parts
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

impl<'de> Deserialize<'de> for MessageContent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(
            match text_or_tagged(deserializer, "a string or an array of content parts")? {
                TextOrTagged::Text(text) => MessageContent::Text(text),
                TextOrTagged::Tagged(parts) => MessageContent::Parts(parts),
            },
        )
    }
}

impl MessageContent {
    /// Parts view; a plain string is not a list of parts
    pub fn parts(&self) -> &[ContentPart] {
        match self {
            MessageContent::Text(_) => &[],
            MessageContent::Parts(parts) => parts,
        }
    }

    /// Mutable parts, converting a plain string into one text part first
    pub(crate) fn parts_mut(&mut self, role: Role) -> Option<&mut Vec<ContentPart>> {
        let parts = match std::mem::take(self) {
            MessageContent::Parts(parts) => parts,
            MessageContent::Text(text) if text.is_empty() => Vec::new(),
            MessageContent::Text(text) if role == Role::Assistant => {
                vec![ContentPart::output_text(text)]
            }
            MessageContent::Text(text) => vec![ContentPart::input_text(text)],
        };
        *self = MessageContent::Parts(parts);
        match self {
            MessageContent::Parts(parts) => Some(parts),
            MessageContent::Text(_) => None,
        }
    }
}

impl Default for MessageContent {
    fn default() -> Self {
        MessageContent::Parts(Vec::new())
    }
}

/// A message from a user, system, developer or the assistant
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessageItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ItemStatus>,
    pub content: MessageContent,
}

impl MessageItem {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: None,
            role,
            status: None,
            content: MessageContent::Text(content.into()),
        }
    }

    /// An empty in-progress assistant message, as announced by `output_item.added`
    pub fn assistant(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            role: Role::Assistant,
            status: Some(ItemStatus::InProgress),
            content: MessageContent::default(),
        }
    }
}

impl Validate for MessageItem {
    fn validate(&self, config: &ValidationConfig) -> Result<(), ValidationError> {
        if let MessageContent::Parts(parts) = &self.content {
            for (index, part) in parts.iter().enumerate() {
                let allowed = match self.role {
                    Role::Assistant => part.is_output(),
                    _ => part.is_input(),
                };
                if !allowed {
                    return Err(ValidationError::field(
                        format!("content[{}]", index),
                        format!(
                            "`{}` is not allowed in a {:?} message",
                            part.type_name(),
                            self.role
                        ),
                    ));
                }
            }
            validate_all("content", parts, config)?;
        }
        Ok(())
    }
}

/// Reasoning produced by the model before answering
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ReasoningItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ItemStatus>,
    #[serde(default)]
    pub summary: Vec<SummaryText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<ReasoningText>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encrypted_content: Option<String>,
}

/// A call the model wants the caller to perform
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionCallItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub call_id: String,
    pub name: String,
    /// JSON-encoded arguments, possibly partial while streaming
    pub arguments: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ItemStatus>,
}

impl Validate for FunctionCallItem {
    fn validate(&self, _config: &ValidationConfig) -> Result<(), ValidationError> {
        if self.call_id.is_empty() {
            return Err(ValidationError::field("call_id", "must not be empty"));
        }
        if self.name.is_empty() {
            return Err(ValidationError::field("name", "must not be empty"));
        }
        Ok(())
    }
}

/// Output of a function call can be a string or array of input parts
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum FunctionCallOutputContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

impl<'de> Deserialize<'de> for FunctionCallOutputContent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(
            match text_or_tagged(deserializer, "a string or an array of content parts")? {
                TextOrTagged::Text(text) => FunctionCallOutputContent::Text(text),
                TextOrTagged::Tagged(parts) => FunctionCallOutputContent::Parts(parts),
            },
        )
    }
}

/// The caller's result for an earlier function call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionCallOutputItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub call_id: String,
    pub output: FunctionCallOutputContent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ItemStatus>,
}

impl Validate for FunctionCallOutputItem {
    fn validate(&self, config: &ValidationConfig) -> Result<(), ValidationError> {
        if self.call_id.is_empty() {
            return Err(ValidationError::field("call_id", "must not be empty"));
        }
        if let FunctionCallOutputContent::Parts(parts) = &self.output {
            if let Some(index) = parts.iter().position(|p| !p.is_input()) {
                return Err(ValidationError::field(
                    format!("output[{}]", index),
                    "only input parts are allowed in a function call output",
                ));
            }
            validate_all("output", parts, config)?;
        }
        Ok(())
    }
}

/// Pointer to an item stored by the server
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemReference {
    pub id: String,
}

/// An input or output item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Item {
    Message(MessageItem),
    Reasoning(ReasoningItem),
    FunctionCall(FunctionCallItem),
    FunctionCallOutput(FunctionCallOutputItem),
    ItemReference(ItemReference),
}

impl Item {
    pub fn id(&self) -> Option<&str> {
        match self {
            Item::Message(m) => m.id.as_deref(),
            Item::Reasoning(r) => r.id.as_deref(),
            Item::FunctionCall(f) => f.id.as_deref(),
            Item::FunctionCallOutput(o) => o.id.as_deref(),
            Item::ItemReference(r) => Some(&r.id),
        }
    }

    /// Item status; references carry none
    pub fn status(&self) -> Option<ItemStatus> {
        match self {
            Item::Message(m) => m.status,
            Item::Reasoning(r) => r.status,
            Item::FunctionCall(f) => f.status,
            Item::FunctionCallOutput(o) => o.status,
            Item::ItemReference(_) => None,
        }
    }
}

impl Discriminated for Item {
    const UNION: &'static str = "item";
    const TYPES: &'static [&'static str] = &[
        "message",
        "reasoning",
        "function_call",
        "function_call_output",
        "item_reference",
    ];

    fn type_name(&self) -> &'static str {
        match self {
            Item::Message(_) => "message",
            Item::Reasoning(_) => "reasoning",
            Item::FunctionCall(_) => "function_call",
            Item::FunctionCallOutput(_) => "function_call_output",
            Item::ItemReference(_) => "item_reference",
        }
    }
}

impl Validate for Item {
    fn validate(&self, config: &ValidationConfig) -> Result<(), ValidationError> {
        match self {
            Item::Message(m) => m.validate(config),
            Item::FunctionCall(f) => f.validate(config),
            Item::FunctionCallOutput(o) => o.validate(config),
            Item::ItemReference(r) if r.id.is_empty() => {
                Err(ValidationError::field("id", "must not be empty"))
            }
            Item::Reasoning(_) | Item::ItemReference(_) => Ok(()),
        }
    }
}

impl From<MessageItem> for Item {
    fn from(item: MessageItem) -> Self {
        Item::Message(item)
    }
}

impl From<ReasoningItem> for Item {
    fn from(item: ReasoningItem) -> Self {
        Item::Reasoning(item)
    }
}

impl From<FunctionCallItem> for Item {
    fn from(item: FunctionCallItem) -> Self {
        Item::FunctionCall(item)
    }
}

impl From<FunctionCallOutputItem> for Item {
    fn from(item: FunctionCallOutputItem) -> Self {
        Item::FunctionCallOutput(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::decode_tagged;

    fn strict() -> ValidationConfig {
        ValidationConfig::default()
    }

    #[test]
    fn test_user_message_item() {
        let json = r#"{
            "type": "message",
            "role": "user",
            "content": [{"type": "input_text", "text": "Hello!"}]
        }"#;
        let item: Item = decode_tagged(json, &strict()).unwrap();
        match &item {
            Item::Message(message) => {
                assert_eq!(message.role, Role::User);
                assert_eq!(message.content.parts().len(), 1);
            }
            _ => panic!("Expected Message variant"),
        }
        assert_eq!(item.type_name(), "message");
    }

    #[test]
    fn test_user_message_rejects_output_parts() {
        let json = r#"{
            "type": "message",
            "role": "user",
            "content": [{"type": "output_text", "text": "Hello!"}]
        }"#;
        let err = decode_tagged::<Item>(json, &strict()).unwrap_err();
        assert!(err.to_string().contains("content[0]"));
    }

    #[test]
    fn test_assistant_message_with_refusal() {
        let json = r#"{
            "type": "message",
            "id": "msg_1",
            "role": "assistant",
            "status": "completed",
            "content": [{"type": "refusal", "refusal": "I can't help with that."}]
        }"#;
        let item: Item = decode_tagged(json, &strict()).unwrap();
        assert_eq!(item.id(), Some("msg_1"));
        assert_eq!(item.status(), Some(ItemStatus::Completed));
    }

    #[test]
    fn test_function_call_item() {
        let json = r#"{
            "type": "function_call",
            "call_id": "call_1",
            "name": "get_weather",
            "arguments": "{\"city\":\"Paris\"}"
        }"#;
        let item: Item = decode_tagged(json, &strict()).unwrap();
        match item {
            Item::FunctionCall(call) => assert_eq!(call.name, "get_weather"),
            _ => panic!("Expected FunctionCall variant"),
        }
    }

    #[test]
    fn test_function_call_output_item() {
        let json = r#"{"type": "function_call_output", "call_id": "call_1", "output": "18C"}"#;
        let item: Item = decode_tagged(json, &strict()).unwrap();
        assert_eq!(item.type_name(), "function_call_output");

        let json = r#"{"type": "function_call_output", "call_id": "", "output": "18C"}"#;
        assert!(decode_tagged::<Item>(json, &strict()).is_err());
    }

    #[test]
    fn test_item_reference() {
        let item: Item =
            decode_tagged(r#"{"type": "item_reference", "id": "msg_9"}"#, &strict()).unwrap();
        assert_eq!(item.id(), Some("msg_9"));
        assert_eq!(item.status(), None);
    }

    #[test]
    fn test_reasoning_item_defaults() {
        let item: Item = decode_tagged(r#"{"type": "reasoning", "id": "rs_1"}"#, &strict()).unwrap();
        match item {
            Item::Reasoning(reasoning) => {
                assert!(reasoning.summary.is_empty());
                assert!(reasoning.content.is_none());
            }
            _ => panic!("Expected Reasoning variant"),
        }
    }

    #[test]
    fn test_unknown_item_type() {
        let err = decode_tagged::<Item>(r#"{"type": "web_search_call", "id": "ws_1"}"#, &strict())
            .unwrap_err();
        assert!(err.is_shape_error());
    }

    #[test]
    fn test_unknown_nested_part_type_is_named() {
        let json = r#"{
            "type": "message",
            "role": "user",
            "content": [{"type": "input_text", "text": "Hi"}, {"type": "input_audio", "data": "..."}]
        }"#;
        let err = decode_tagged::<Item>(json, &strict()).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("element 1"));
        assert!(message.contains("unknown content part type `input_audio`"));

        let json = r#"{"type": "function_call_output", "call_id": "c", "output": [{"text": "x"}]}"#;
        let err = decode_tagged::<Item>(json, &strict()).unwrap_err();
        assert!(err.to_string().contains("missing a string `type` field"));
    }

    #[test]
    fn test_content_must_be_string_or_list() {
        let json = r#"{"type": "message", "role": "user", "content": 42}"#;
        let err = decode_tagged::<Item>(json, &strict()).unwrap_err();
        assert!(err.to_string().contains("a string or an array of content parts"));
    }

    #[test]
    fn test_parts_mut_converts_text() {
        let mut content = MessageContent::Text("Hi".to_string());
        content.parts_mut(Role::Assistant).unwrap().push(ContentPart::output_text("!"));
        assert_eq!(
            content,
            MessageContent::Parts(vec![
                ContentPart::output_text("Hi"),
                ContentPart::output_text("!")
            ])
        );
    }
}
