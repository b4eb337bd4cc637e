// Request body for creating a response, and the configuration blocks it shares
// with the response resource.

use super::common::Metadata;
use super::items::Item;
use super::tools::{Tool, ToolChoice};
use crate::config::ValidationConfig;
use crate::errors::ValidationError;
use crate::validate::{
    check_int_range, check_range, text_or_tagged, validate_all, TextOrTagged, Validate,
};
use serde::{Deserialize, Deserializer, Serialize};

/// Input can be a simple string or an array of items
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum Input {
    Text(String),
    Items(Vec<Item>),
}

impl<'de> Deserialize<'de> for Input {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(
            match text_or_tagged(deserializer, "a string or an array of items")? {
                TextOrTagged::Text(text) => Input::Text(text),
                TextOrTagged::Tagged(items) => Input::Items(items),
            },
        )
    }
}

impl Default for Input {
    fn default() -> Self {
        Input::Text(String::new())
    }
}

impl From<&str> for Input {
    fn from(text: &str) -> Self {
        Input::Text(text.to_string())
    }
}

impl From<String> for Input {
    fn from(text: String) -> Self {
        Input::Text(text)
    }
}

impl From<Vec<Item>> for Input {
    fn from(items: Vec<Item>) -> Self {
        Input::Items(items)
    }
}

/// Reasoning effort levels accepted on the wire
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningEffortEnum {
    Low,
    Medium,
    High,
}

/// Reasoning effort levels for models that support reasoning
///
/// Wider than [`ReasoningEffortEnum`]: `none` and `xhigh` have no wire
/// counterpart, so converting them fails.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningEffort {
    None,
    Low,
    Medium,
    High,
    Xhigh,
}

impl ReasoningEffort {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasoningEffort::None => "none",
            ReasoningEffort::Low => "low",
            ReasoningEffort::Medium => "medium",
            ReasoningEffort::High => "high",
            ReasoningEffort::Xhigh => "xhigh",
        }
    }
}

impl TryFrom<ReasoningEffort> for ReasoningEffortEnum {
    type Error = ValidationError;

    fn try_from(effort: ReasoningEffort) -> Result<Self, Self::Error> {
        match effort {
            ReasoningEffort::Low => Ok(ReasoningEffortEnum::Low),
            ReasoningEffort::Medium => Ok(ReasoningEffortEnum::Medium),
            ReasoningEffort::High => Ok(ReasoningEffortEnum::High),
            other => Err(ValidationError::field(
                "reasoning.effort",
                format!("`{}` has no wire-level equivalent", other.as_str()),
            )),
        }
    }
}

impl From<ReasoningEffortEnum> for ReasoningEffort {
    fn from(effort: ReasoningEffortEnum) -> Self {
        match effort {
            ReasoningEffortEnum::Low => ReasoningEffort::Low,
            ReasoningEffortEnum::Medium => ReasoningEffort::Medium,
            ReasoningEffortEnum::High => ReasoningEffort::High,
        }
    }
}

/// How much of the reasoning to summarize
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningSummaryMode {
    Auto,
    Concise,
    Detailed,
}

/// Reasoning configuration for models that support it
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReasoningParam {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effort: Option<ReasoningEffortEnum>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<ReasoningSummaryMode>,
}

/// Output format for text responses
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TextResponseFormat {
    #[default]
    Text,
    JsonObject,
    JsonSchema {
        name: String,
        schema: serde_json::Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        strict: Option<bool>,
    },
}

/// Verbosity hint for text output
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    Low,
    Medium,
    High,
}

/// Text output configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TextField {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<TextResponseFormat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verbosity: Option<Verbosity>,
}

impl TextField {
    /// The requested format, plain text when none was given
    pub fn format(&self) -> TextResponseFormat {
        self.format.clone().unwrap_or_default()
    }
}

impl Validate for TextField {
    fn validate(&self, _config: &ValidationConfig) -> Result<(), ValidationError> {
        if let Some(TextResponseFormat::JsonSchema { name, schema, .. }) = &self.format {
            if name.is_empty() {
                return Err(ValidationError::field("format.name", "must not be empty"));
            }
            if !schema.is_object() {
                return Err(ValidationError::field(
                    "format.schema",
                    "must be a JSON schema object",
                ));
            }
        }
        Ok(())
    }
}

/// Truncation strategy
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Truncation {
    Auto,
    #[default]
    Disabled,
}

/// Processing tier
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ServiceTier {
    Auto,
    #[default]
    Default,
    Flex,
    Priority,
}

/// Streaming options
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct StreamOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_obfuscation: Option<bool>,
}

/// Request body for creating a response
///
/// The container is closed: a field this crate does not know is an error,
/// not something to pass through.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CreateResponseBody {
    pub model: String,
    pub input: Input,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Tool>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<ToolChoice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parallel_tool_calls: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tool_calls: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_logprobs: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<TextField>,
    /// Output format in the older top-level position; `text.format` is preferred
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_format: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<ReasoningParam>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream_options: Option<StreamOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_response_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub truncation: Option<Truncation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_tier: Option<ServiceTier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safety_identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_cache_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

impl CreateResponseBody {
    pub fn new(model: impl Into<String>, input: impl Into<Input>) -> Self {
        Self {
            model: model.into(),
            input: input.into(),
            ..Default::default()
        }
    }

    pub fn with_tools(mut self, tools: Vec<Tool>) -> Self {
        self.tools = Some(tools);
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_reasoning(mut self, reasoning: ReasoningParam) -> Self {
        self.reasoning = Some(reasoning);
        self
    }

    pub fn is_streaming(&self) -> bool {
        self.stream.unwrap_or(false)
    }
}

impl Validate for CreateResponseBody {
    fn validate(&self, config: &ValidationConfig) -> Result<(), ValidationError> {
        if self.model.is_empty() {
            return Err(ValidationError::field("model", "must not be empty"));
        }
        if let Input::Items(items) = &self.input {
            validate_all("input", items, config)?;
        }
        if let Some(tools) = &self.tools {
            validate_all("tools", tools, config)?;
        }
        check_sampling(
            self.temperature,
            self.top_p,
            self.presence_penalty,
            self.frequency_penalty,
            self.top_logprobs,
        )?;
        if self.max_tool_calls == Some(0) {
            return Err(ValidationError::field("max_tool_calls", "must be at least 1"));
        }
        if self.stream_options.is_some() && !self.is_streaming() {
            return Err(ValidationError::field(
                "stream_options",
                "only allowed when `stream` is true",
            ));
        }
        if let Some(text) = &self.text {
            text.validate(config).map_err(|e| e.within("text"))?;
        }
        if let Some(format) = &self.response_format {
            if !format.is_object() {
                return Err(ValidationError::field("response_format", "must be an object"));
            }
        }
        if let Some(metadata) = &self.metadata {
            metadata.validate(config)?;
        }
        Ok(())
    }
}

/// Bounds shared by the request body and the response resource
pub(crate) fn check_sampling(
    temperature: Option<f64>,
    top_p: Option<f64>,
    presence_penalty: Option<f64>,
    frequency_penalty: Option<f64>,
    top_logprobs: Option<i64>,
) -> Result<(), ValidationError> {
    check_range("temperature", temperature, 0.0, 2.0)?;
    check_range("top_p", top_p, 0.0, 1.0)?;
    check_range("presence_penalty", presence_penalty, -2.0, 2.0)?;
    check_range("frequency_penalty", frequency_penalty, -2.0, 2.0)?;
    check_int_range("top_logprobs", top_logprobs, 0, 20)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::decode;
    use serde_json::Value;

    #[test]
    fn test_create_response_body_minimal() {
        let body: CreateResponseBody =
            decode(r#"{"model": "gpt-4", "input": "Hello, world!"}"#).unwrap();
        assert_eq!(body.model, "gpt-4");
        assert_eq!(body.input, Input::Text("Hello, world!".to_string()));
        assert!(!body.is_streaming());
    }

    #[test]
    fn test_create_response_body_roundtrip() {
        let json = r#"{
            "model": "gpt-5",
            "input": [
                {"type": "message", "role": "system", "content": "You are terse."},
                {"type": "message", "role": "user", "content": [{"type": "input_text", "text": "Hi"}]},
                {"type": "function_call_output", "call_id": "call_1", "output": "42"}
            ],
            "instructions": "Answer briefly",
            "tools": [
                {"type": "function", "name": "lookup", "parameters": {"type": "object"}},
                {"type": "mcp", "server_label": "docs", "server_url": "https://docs.example.com/mcp", "require_approval": "never", "x-region": "eu"}
            ],
            "tool_choice": "auto",
            "temperature": 0.5,
            "top_p": 0.9,
            "max_output_tokens": 256,
            "reasoning": {"effort": "medium", "summary": "auto"},
            "text": {"format": {"type": "json_schema", "name": "answer", "schema": {"type": "object"}}},
            "stream": true,
            "stream_options": {"include_obfuscation": false},
            "truncation": "auto",
            "service_tier": "flex",
            "metadata": {"session": "abc"},
            "previous_response_id": "resp_prev"
        }"#;
        let body: CreateResponseBody = decode(json).unwrap();
        let encoded = serde_json::to_value(&body).unwrap();
        let original: Value = serde_json::from_str(json).unwrap();
        assert_eq!(encoded, original);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = decode::<CreateResponseBody>(
            r#"{"model": "gpt-4", "input": "Hi", "prompt_template": {"id": "p_1"}}"#,
        );
        let err = result.unwrap_err();
        assert!(err.to_string().contains("prompt_template"));
    }

    #[test]
    fn test_response_format_accepted() {
        let json = r#"{"model": "gpt-4", "input": "Hi", "response_format": {"type": "json_object"}}"#;
        let body = decode::<CreateResponseBody>(json).unwrap();
        assert_eq!(
            body.response_format,
            Some(serde_json::json!({"type": "json_object"}))
        );
        let json = r#"{"model": "gpt-4", "input": "Hi", "response_format": "json"}"#;
        assert!(decode::<CreateResponseBody>(json).is_err());
    }

    #[test]
    fn test_minimal_payloads_roundtrip() {
        for json in [
            r#"{"model": "m", "input": "x", "text": {"verbosity": "low"}}"#,
            r#"{"model": "m", "input": [{"type": "message", "role": "user", "content": [
                {"type": "input_image", "image_url": "https://example.com/a.png"}
            ]}]}"#,
            r#"{"model": "m", "input": "x", "tools": [
                {"type": "mcp", "server_label": "s", "server_url": "https://s.example.com"}
            ]}"#,
        ] {
            let body: CreateResponseBody = decode(json).unwrap();
            let encoded = serde_json::to_value(&body).unwrap();
            let original: Value = serde_json::from_str(json).unwrap();
            assert_eq!(encoded, original);
        }
    }

    #[test]
    fn test_text_format_defaults_to_text() {
        let body: CreateResponseBody =
            decode(r#"{"model": "m", "input": "x", "text": {"verbosity": "low"}}"#).unwrap();
        assert_eq!(body.text.unwrap().format(), TextResponseFormat::Text);
    }

    #[test]
    fn test_unknown_input_item_is_named() {
        let json = r#"{"model": "m", "input": [{"type": "computer_call", "id": "x"}]}"#;
        let err = decode::<CreateResponseBody>(json).unwrap_err();
        assert!(err.to_string().contains("unknown item type `computer_call`"));
    }

    #[test]
    fn test_missing_model_rejected() {
        assert!(decode::<CreateResponseBody>(r#"{"input": "Hi"}"#).is_err());
        assert!(decode::<CreateResponseBody>(r#"{"model": "", "input": "Hi"}"#).is_err());
    }

    #[test]
    fn test_sampling_bounds() {
        assert!(decode::<CreateResponseBody>(r#"{"model": "m", "input": "x", "temperature": 2.1}"#).is_err());
        assert!(decode::<CreateResponseBody>(r#"{"model": "m", "input": "x", "top_p": 1.5}"#).is_err());
        assert!(decode::<CreateResponseBody>(r#"{"model": "m", "input": "x", "frequency_penalty": -3}"#).is_err());
        assert!(decode::<CreateResponseBody>(r#"{"model": "m", "input": "x", "top_logprobs": 21}"#).is_err());
        assert!(decode::<CreateResponseBody>(r#"{"model": "m", "input": "x", "temperature": 0.0, "top_p": 1.0}"#).is_ok());
    }

    #[test]
    fn test_metadata_limit_in_request() {
        let entries: Vec<String> = (0..17).map(|i| format!("\"k{}\": \"v\"", i)).collect();
        let json = format!(
            r#"{{"model": "m", "input": "x", "metadata": {{{}}}}}"#,
            entries.join(", ")
        );
        match decode::<CreateResponseBody>(&json).unwrap_err() {
            ValidationError::Field { field, .. } => assert_eq!(field, "metadata"),
            other => panic!("Expected field error, got {:?}", other),
        }

        let json = format!(
            r#"{{"model": "m", "input": "x", "metadata": {{{}}}}}"#,
            entries[..16].join(", ")
        );
        let body = decode::<CreateResponseBody>(&json).unwrap();
        assert_eq!(body.metadata.unwrap().len(), 16);
    }

    #[test]
    fn test_closed_enums() {
        assert!(decode::<CreateResponseBody>(r#"{"model": "m", "input": "x", "truncation": "sometimes"}"#).is_err());
        assert!(decode::<CreateResponseBody>(r#"{"model": "m", "input": "x", "service_tier": "scale"}"#).is_err());
        assert!(decode::<CreateResponseBody>(r#"{"model": "m", "input": "x", "reasoning": {"effort": "xhigh"}}"#).is_err());
    }

    #[test]
    fn test_stream_options_require_stream() {
        let result = decode::<CreateResponseBody>(
            r#"{"model": "m", "input": "x", "stream_options": {"include_obfuscation": true}}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_nested_item_error_has_path() {
        let json = r#"{"model": "m", "input": [{"type": "function_call", "call_id": "c", "name": "", "arguments": "{}"}]}"#;
        let err = decode::<CreateResponseBody>(json).unwrap_err();
        assert!(err.to_string().contains("input[0].name"));
    }

    #[test]
    fn test_reasoning_effort_conversion() {
        assert_eq!(
            ReasoningEffortEnum::try_from(ReasoningEffort::High).unwrap(),
            ReasoningEffortEnum::High
        );
        assert!(ReasoningEffortEnum::try_from(ReasoningEffort::Xhigh).is_err());
        assert!(ReasoningEffortEnum::try_from(ReasoningEffort::None).is_err());
        assert_eq!(
            ReasoningEffort::from(ReasoningEffortEnum::Low),
            ReasoningEffort::Low
        );
    }

    #[test]
    fn test_reasoning_effort_values() {
        for (effort, text) in [
            (ReasoningEffort::None, "none"),
            (ReasoningEffort::Low, "low"),
            (ReasoningEffort::Medium, "medium"),
            (ReasoningEffort::High, "high"),
            (ReasoningEffort::Xhigh, "xhigh"),
        ] {
            assert_eq!(serde_json::to_value(effort).unwrap(), text);
            assert_eq!(effort.as_str(), text);
        }
    }

    #[test]
    fn test_builder() {
        let body = CreateResponseBody::new("gpt-4", "Hello!")
            .with_temperature(0.7)
            .with_reasoning(ReasoningParam {
                effort: Some(ReasoningEffortEnum::Low),
                summary: None,
            });
        assert_eq!(body.temperature, Some(0.7));
        assert!(body.validate(&ValidationConfig::default()).is_ok());
    }
}
