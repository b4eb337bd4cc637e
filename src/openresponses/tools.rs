// Tool definitions and tool-choice options.

use crate::config::ValidationConfig;
use crate::errors::ValidationError;
use crate::validate::{Discriminated, Validate};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Maximum length of a function tool name
pub const FUNCTION_NAME_MAX_LEN: usize = 64;

/// A locally defined function the model may call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionTool {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON schema of the arguments object
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,
}

impl FunctionTool {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            parameters: None,
            strict: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_parameters(mut self, parameters: Value) -> Self {
        self.parameters = Some(parameters);
        self
    }
}

impl Validate for FunctionTool {
    fn validate(&self, _config: &ValidationConfig) -> Result<(), ValidationError> {
        let len = self.name.chars().count();
        if len == 0 || len > FUNCTION_NAME_MAX_LEN {
            return Err(ValidationError::field(
                "name",
                format!("must be 1 to {} characters", FUNCTION_NAME_MAX_LEN),
            ));
        }
        if let Some(bad) = self
            .name
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-'))
        {
            return Err(ValidationError::field(
                "name",
                format!("character `{}` is not allowed", bad),
            ));
        }
        if let Some(parameters) = &self.parameters {
            if !parameters.is_object() {
                return Err(ValidationError::field(
                    "parameters",
                    "must be a JSON schema object",
                ));
            }
        }
        Ok(())
    }
}

/// Approval policy for MCP tool execution
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum McpToolApproval {
    #[default]
    Never,
    Always,
}

/// Model Context Protocol tool hosted by a remote server
///
/// Provider extensions are common for MCP, so fields this crate does not
/// know are kept in [`McpTool::extra`] and written back on encode.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct McpTool {
    pub server_label: String,
    pub server_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_tools: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_approval: Option<McpToolApproval>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl McpTool {
    pub fn new(server_label: impl Into<String>, server_url: impl Into<String>) -> Self {
        Self {
            server_label: server_label.into(),
            server_url: server_url.into(),
            allowed_tools: None,
            require_approval: None,
            headers: None,
            extra: BTreeMap::new(),
        }
    }

    /// Effective approval policy; unset means `never`
    pub fn approval(&self) -> McpToolApproval {
        self.require_approval.unwrap_or_default()
    }
}

impl Validate for McpTool {
    fn validate(&self, _config: &ValidationConfig) -> Result<(), ValidationError> {
        if self.server_label.is_empty() {
            return Err(ValidationError::field("server_label", "must not be empty"));
        }
        if self.server_url.is_empty() {
            return Err(ValidationError::field("server_url", "must not be empty"));
        }
        if let Some(tools) = &self.allowed_tools {
            if tools.iter().any(String::is_empty) {
                return Err(ValidationError::field(
                    "allowed_tools",
                    "tool names must not be empty",
                ));
            }
        }
        Ok(())
    }
}

/// Search context size for the web search tool
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SearchContextSize {
    Low,
    Medium,
    High,
}

/// Tool definition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Tool {
    Function(FunctionTool),
    Mcp(McpTool),
    WebSearch {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        search_context_size: Option<SearchContextSize>,
    },
    FileSearch {
        vector_store_ids: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_num_results: Option<u32>,
    },
    CodeInterpreter {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        container: Option<Value>,
    },
}

impl Discriminated for Tool {
    const UNION: &'static str = "tool";
    const TYPES: &'static [&'static str] = &[
        "function",
        "mcp",
        "web_search",
        "file_search",
        "code_interpreter",
    ];

    fn type_name(&self) -> &'static str {
        match self {
            Tool::Function(_) => "function",
            Tool::Mcp(_) => "mcp",
            Tool::WebSearch { .. } => "web_search",
            Tool::FileSearch { .. } => "file_search",
            Tool::CodeInterpreter { .. } => "code_interpreter",
        }
    }
}

impl Validate for Tool {
    fn validate(&self, config: &ValidationConfig) -> Result<(), ValidationError> {
        match self {
            Tool::Function(function) => function.validate(config),
            Tool::Mcp(mcp) => mcp.validate(config),
            Tool::FileSearch {
                vector_store_ids,
                max_num_results,
            } => {
                if vector_store_ids.is_empty() {
                    return Err(ValidationError::field(
                        "vector_store_ids",
                        "at least one vector store is required",
                    ));
                }
                match max_num_results {
                    Some(n) if *n == 0 || *n > 50 => Err(ValidationError::field(
                        "max_num_results",
                        format!("{} is outside [1, 50]", n),
                    )),
                    _ => Ok(()),
                }
            }
            Tool::WebSearch { .. } | Tool::CodeInterpreter { .. } => Ok(()),
        }
    }
}

impl From<FunctionTool> for Tool {
    fn from(tool: FunctionTool) -> Self {
        Tool::Function(tool)
    }
}

impl From<McpTool> for Tool {
    fn from(tool: McpTool) -> Self {
        Tool::Mcp(tool)
    }
}

/// Tool usage mode
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ToolChoiceMode {
    None,
    Auto,
    Required,
}

/// Force a specific tool
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SpecificToolChoice {
    Function {
        name: String,
    },
    Mcp {
        server_label: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
}

/// Tool choice option
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ToolChoice {
    Mode(ToolChoiceMode),
    Specific(SpecificToolChoice),
}

impl Default for ToolChoice {
    fn default() -> Self {
        ToolChoice::Mode(ToolChoiceMode::Auto)
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
    fn test_tool_function_parsing() {
        let json = r#"{
            "type": "function",
            "name": "get_weather",
            "description": "Get the current weather",
            "parameters": {"type": "object", "properties": {}}
        }"#;
        let tool: Tool = decode_tagged(json, &strict()).unwrap();
        match tool {
            Tool::Function(function) => assert_eq!(function.name, "get_weather"),
            _ => panic!("Expected function tool"),
        }
    }

    #[test]
    fn test_function_name_rules() {
        let tool = FunctionTool::new("get weather");
        assert!(tool.validate(&strict()).is_err());
        let tool = FunctionTool::new("x".repeat(65));
        assert!(tool.validate(&strict()).is_err());
        let tool = FunctionTool::new("get_weather-v2");
        assert!(tool.validate(&strict()).is_ok());
    }

    #[test]
    fn test_function_parameters_must_be_object() {
        let tool = FunctionTool::new("f").with_parameters(serde_json::json!("string"));
        let err = tool.validate(&strict()).unwrap_err();
        assert!(err.to_string().contains("parameters"));
    }

    #[test]
    fn test_mcp_tool_defaults() {
        let json = r#"{"type": "mcp", "server_label": "test", "server_url": "https://example.com"}"#;
        let tool: Tool = decode_tagged(json, &strict()).unwrap();
        match tool {
            Tool::Mcp(mcp) => {
                assert_eq!(mcp.require_approval, None);
                assert_eq!(mcp.approval(), McpToolApproval::Never);
                assert!(mcp.extra.is_empty());
            }
            _ => panic!("Expected MCP tool"),
        }
        let encoded = serde_json::to_value(decode_tagged::<Tool>(json, &strict()).unwrap()).unwrap();
        assert!(encoded.get("require_approval").is_none());
    }

    #[test]
    fn test_mcp_tool_preserves_extra_fields() {
        let json = r#"{
            "type": "mcp",
            "server_label": "deepwiki",
            "server_url": "https://mcp.deepwiki.com/mcp",
            "allowed_tools": ["ask_question"],
            "require_approval": "always",
            "headers": {"Authorization": "Bearer token123"},
            "connector_id": "conn_42"
        }"#;
        let tool: Tool = decode_tagged(json, &strict()).unwrap();
        match &tool {
            Tool::Mcp(mcp) => {
                assert_eq!(mcp.extra.get("connector_id"), Some(&serde_json::json!("conn_42")));
                assert_eq!(mcp.approval(), McpToolApproval::Always);
            }
            _ => panic!("Expected MCP tool"),
        }
        let encoded = serde_json::to_value(&tool).unwrap();
        let original: Value = serde_json::from_str(json).unwrap();
        assert_eq!(encoded, original);
    }

    #[test]
    fn test_mcp_approval_closed_set() {
        let json = r#"{"type": "mcp", "server_label": "s", "server_url": "u", "require_approval": "sometimes"}"#;
        assert!(decode_tagged::<Tool>(json, &strict()).is_err());
    }

    #[test]
    fn test_file_search_requires_store() {
        let json = r#"{"type": "file_search", "vector_store_ids": []}"#;
        assert!(decode_tagged::<Tool>(json, &strict()).is_err());
    }

    #[test]
    fn test_unknown_tool_type() {
        let err = decode_tagged::<Tool>(r#"{"type": "computer_use"}"#, &strict()).unwrap_err();
        assert!(err.is_shape_error());
    }

    #[test]
    fn test_tool_choice_parsing() {
        let mode: ToolChoice = serde_json::from_str(r#""required""#).unwrap();
        assert_eq!(mode, ToolChoice::Mode(ToolChoiceMode::Required));

        let specific: ToolChoice =
            serde_json::from_str(r#"{"type": "function", "name": "get_weather"}"#).unwrap();
        assert_eq!(
            specific,
            ToolChoice::Specific(SpecificToolChoice::Function {
                name: "get_weather".to_string()
            })
        );

        assert!(serde_json::from_str::<ToolChoice>(r#""sometimes""#).is_err());
    }
}
