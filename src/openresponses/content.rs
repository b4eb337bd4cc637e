// Content parts carried by message items, plus the text blocks of reasoning items.

use crate::config::ValidationConfig;
use crate::errors::ValidationError;
use crate::validate::{Discriminated, Validate};
use serde::{Deserialize, Serialize};

/// Image detail level
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ImageDetail {
    Low,
    High,
    #[default]
    Auto,
}

/// A piece of a message item's content
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    /// Text supplied by the user, system or developer
    InputText { text: String },
    /// Image referenced by URL (including data URLs) or uploaded file id
    InputImage {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        image_url: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        file_id: Option<String>,
        /// Absent means [`ImageDetail::Auto`]
        #[serde(default, skip_serializing_if = "Option::is_none")]
        detail: Option<ImageDetail>,
    },
    /// File referenced by id, URL or inline base64 data
    InputFile {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        file_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        file_url: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        file_data: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        filename: Option<String>,
    },
    /// Text produced by the model
    OutputText {
        text: String,
        #[serde(default)]
        annotations: Vec<Annotation>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        logprobs: Option<Vec<serde_json::Value>>,
    },
    /// The model declined to answer
    Refusal { refusal: String },
    /// Raw reasoning text produced by the model
    ReasoningText { text: String },
}

impl ContentPart {
    pub fn input_text(text: impl Into<String>) -> Self {
        ContentPart::InputText { text: text.into() }
    }

    pub fn output_text(text: impl Into<String>) -> Self {
        ContentPart::OutputText {
            text: text.into(),
            annotations: Vec::new(),
            logprobs: None,
        }
    }

    pub fn refusal(refusal: impl Into<String>) -> Self {
        ContentPart::Refusal {
            refusal: refusal.into(),
        }
    }

    /// Parts a user, system or developer message may carry
    pub fn is_input(&self) -> bool {
        matches!(
            self,
            ContentPart::InputText { .. }
                | ContentPart::InputImage { .. }
                | ContentPart::InputFile { .. }
        )
    }

    /// Parts an assistant message may carry
    pub fn is_output(&self) -> bool {
        matches!(
            self,
            ContentPart::OutputText { .. } | ContentPart::Refusal { .. }
        )
    }

    /// The accumulated text of a textual part
    pub fn text(&self) -> Option<&str> {
        match self {
            ContentPart::InputText { text }
            | ContentPart::OutputText { text, .. }
            | ContentPart::ReasoningText { text } => Some(text),
            ContentPart::Refusal { refusal } => Some(refusal),
            _ => None,
        }
    }

    /// Mutable access used when appending streamed deltas
    pub(crate) fn text_mut(&mut self) -> Option<&mut String> {
        match self {
            ContentPart::InputText { text }
            | ContentPart::OutputText { text, .. }
            | ContentPart::ReasoningText { text } => Some(text),
            ContentPart::Refusal { refusal } => Some(refusal),
            _ => None,
        }
    }
}

impl Discriminated for ContentPart {
    const UNION: &'static str = "content part";
    const TYPES: &'static [&'static str] = &[
        "input_text",
        "input_image",
        "input_file",
        "output_text",
        "refusal",
        "reasoning_text",
    ];

    fn type_name(&self) -> &'static str {
        match self {
            ContentPart::InputText { .. } => "input_text",
            ContentPart::InputImage { .. } => "input_image",
            ContentPart::InputFile { .. } => "input_file",
            ContentPart::OutputText { .. } => "output_text",
            ContentPart::Refusal { .. } => "refusal",
            ContentPart::ReasoningText { .. } => "reasoning_text",
        }
    }
}

impl Validate for ContentPart {
    fn validate(&self, _config: &ValidationConfig) -> Result<(), ValidationError> {
        match self {
            ContentPart::InputImage {
                image_url: None,
                file_id: None,
                ..
            } => Err(ValidationError::field(
                "input_image",
                "one of `image_url` or `file_id` is required",
            )),
            ContentPart::InputFile {
                file_id: None,
                file_url: None,
                file_data: None,
                ..
            } => Err(ValidationError::field(
                "input_file",
                "one of `file_id`, `file_url` or `file_data` is required",
            )),
            ContentPart::OutputText {
                text, annotations, ..
            } => {
                let len = text.chars().count() as u64;
                for (index, annotation) in annotations.iter().enumerate() {
                    annotation
                        .check_span(len)
                        .map_err(|e| e.within(format!("annotations[{}]", index)))?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

/// Citation attached to a span of output text
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Annotation {
    UrlCitation {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        start_index: u64,
        end_index: u64,
    },
    FileCitation {
        file_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        filename: Option<String>,
        index: u64,
    },
}

impl Annotation {
    fn check_span(&self, text_len: u64) -> Result<(), ValidationError> {
        if let Annotation::UrlCitation {
            start_index,
            end_index,
            ..
        } = self
        {
            if start_index > end_index {
                return Err(ValidationError::field(
                    "start_index",
                    format!("{} is after end_index {}", start_index, end_index),
                ));
            }
            if *end_index > text_len {
                return Err(ValidationError::field(
                    "end_index",
                    format!("{} is past the end of the text ({})", end_index, text_len),
                ));
            }
        }
        Ok(())
    }
}

/// `type` literal of [`SummaryText`]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SummaryTextType {
    #[default]
    SummaryText,
}

/// One block of a reasoning item's summary
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SummaryText {
    #[serde(rename = "type")]
    pub kind: SummaryTextType,
    pub text: String,
}

impl SummaryText {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            kind: SummaryTextType::SummaryText,
            text: text.into(),
        }
    }
}

/// `type` literal of [`ReasoningText`]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReasoningTextType {
    #[default]
    ReasoningText,
}

/// One block of a reasoning item's raw content
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReasoningText {
    #[serde(rename = "type")]
    pub kind: ReasoningTextType,
    pub text: String,
}

impl ReasoningText {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            kind: ReasoningTextType::ReasoningText,
            text: text.into(),
        }
    }
}
