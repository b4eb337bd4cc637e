// Response resource returned by the API and carried by lifecycle events.

use super::common::{ItemStatus, Metadata};
use super::content::ContentPart;
use super::items::{Item, MessageContent, MessageItem};
use super::request::{check_sampling, ReasoningParam, ServiceTier, TextField, Truncation};
use super::tools::{Tool, ToolChoice};
use crate::config::ValidationConfig;
use crate::errors::ValidationError;
use crate::validate::{validate_all, Validate};
use serde::{Deserialize, Serialize};

/// Response status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    Queued,
    #[default]
    InProgress,
    Completed,
    Failed,
    Incomplete,
}

impl ResponseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseStatus::Queued => "queued",
            ResponseStatus::InProgress => "in_progress",
            ResponseStatus::Completed => "completed",
            ResponseStatus::Failed => "failed",
            ResponseStatus::Incomplete => "incomplete",
        }
    }

    /// No transition leaves a terminal status
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ResponseStatus::Completed | ResponseStatus::Failed | ResponseStatus::Incomplete
        )
    }
}

/// `object` literal of a response
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResponseObjectType {
    #[default]
    Response,
}

/// Error information in a failed response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResponseError {
    pub code: String,
    pub message: String,
}

impl ResponseError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn server_error() -> Self {
        Self::new(
            "server_error",
            "The server had an error processing your request.",
        )
    }

    pub fn rate_limit() -> Self {
        Self::new(
            "rate_limit_exceeded",
            "Rate limit exceeded. Please retry after some time.",
        )
    }
}

/// Why a response stopped early
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IncompleteDetails {
    pub reason: String,
}

/// Input token details
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct InputTokensDetails {
    pub cached_tokens: u64,
}

/// Output token details
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutputTokensDetails {
    pub reasoning_tokens: u64,
}

/// Token usage statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_tokens_details: Option<InputTokensDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_tokens_details: Option<OutputTokensDetails>,
}

impl Usage {
    pub fn new(input_tokens: u64, output_tokens: u64) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens: input_tokens.saturating_add(output_tokens),
            input_tokens_details: None,
            output_tokens_details: None,
        }
    }
}

impl Validate for Usage {
    fn validate(&self, _config: &ValidationConfig) -> Result<(), ValidationError> {
        let sum = self
            .input_tokens
            .checked_add(self.output_tokens)
            .ok_or_else(|| {
                ValidationError::field("total_tokens", "input_tokens + output_tokens overflows")
            })?;
        if self.total_tokens != sum {
            return Err(ValidationError::field(
                "total_tokens",
                format!(
                    "{} is not input_tokens + output_tokens ({})",
                    self.total_tokens, sum
                ),
            ));
        }
        if let Some(details) = &self.input_tokens_details {
            if details.cached_tokens > self.input_tokens {
                return Err(ValidationError::field(
                    "input_tokens_details.cached_tokens",
                    "exceeds input_tokens",
                ));
            }
        }
        if let Some(details) = &self.output_tokens_details {
            if details.reasoning_tokens > self.output_tokens {
                return Err(ValidationError::field(
                    "output_tokens_details.reasoning_tokens",
                    "exceeds output_tokens",
                ));
            }
        }
        Ok(())
    }
}

/// Complete response resource
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Response {
    pub id: String,
    pub object: ResponseObjectType,
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<i64>,
    pub status: ResponseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incomplete_details: Option<IncompleteDetails>,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_response_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    pub output: Vec<Item>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ResponseError>,
    #[serde(default)]
    pub tools: Vec<Tool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<ToolChoice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub truncation: Option<Truncation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parallel_tool_calls: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<TextField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_logprobs: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<ReasoningParam>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tool_calls: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_tier: Option<ServiceTier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safety_identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_cache_key: Option<String>,
}

impl Response {
    /// A fresh in-progress response with a generated `resp_` id
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            id: format!("resp_{}", uuid::Uuid::new_v4().simple()),
            created_at: chrono::Utc::now().timestamp(),
            model: model.into(),
            ..Default::default()
        }
    }

    /// A completed response holding a single assistant message
    pub fn completed_with_text(
        model: impl Into<String>,
        content: impl Into<String>,
        usage: Usage,
    ) -> Self {
        let mut message = MessageItem::assistant(format!("msg_{}", uuid::Uuid::new_v4().simple()));
        message.status = Some(ItemStatus::Completed);
        message.content = MessageContent::Parts(vec![ContentPart::output_text(content)]);

        let mut response = Self::new(model);
        response.status = ResponseStatus::Completed;
        response.completed_at = Some(response.created_at);
        response.output = vec![Item::Message(message)];
        response.usage = Some(usage);
        response
    }

    /// Concatenated text of every `output_text` part of every message item
    pub fn output_text(&self) -> String {
        crate::helpers::output_text(self)
    }

    /// Check that `status` agrees with `usage`, `error` and `incomplete_details`
    pub fn check_status(&self) -> Result<(), ValidationError> {
        let fail = |reason: &str| -> Result<(), ValidationError> {
            Err(ValidationError::field(
                "status",
                format!("`{}` {}", self.status.as_str(), reason),
            ))
        };
        match self.status {
            ResponseStatus::Completed if self.usage.is_none() => fail("requires `usage`"),
            ResponseStatus::Completed if self.error.is_some() => fail("forbids `error`"),
            ResponseStatus::Failed if self.error.is_none() => fail("requires `error`"),
            ResponseStatus::Incomplete if self.incomplete_details.is_none() => {
                fail("requires `incomplete_details`")
            }
            _ => Ok(()),
        }
    }
}

impl Validate for Response {
    fn validate(&self, config: &ValidationConfig) -> Result<(), ValidationError> {
        if self.id.is_empty() {
            return Err(ValidationError::field("id", "must not be empty"));
        }
        if let Some(completed_at) = self.completed_at {
            if completed_at < self.created_at {
                return Err(ValidationError::field(
                    "completed_at",
                    "is earlier than created_at",
                ));
            }
        }
        if config.response_status {
            self.check_status()?;
        }
        validate_all("output", &self.output, config)?;
        validate_all("tools", &self.tools, config)?;
        check_sampling(
            self.temperature,
            self.top_p,
            self.presence_penalty,
            self.frequency_penalty,
            self.top_logprobs,
        )?;
        if let Some(usage) = &self.usage {
            usage.validate(config).map_err(|e| e.within("usage"))?;
        }
        if let Some(text) = &self.text {
            text.validate(config).map_err(|e| e.within("text"))?;
        }
        if let Some(metadata) = &self.metadata {
            metadata.validate(config)?;
        }
        Ok(())
    }
}
