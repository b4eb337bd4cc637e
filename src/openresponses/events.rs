// Streaming Types
// One event per Server-Sent-Events message, discriminated by its `type` field.

use super::common::ItemStatus;
use super::content::{Annotation, ContentPart, SummaryText};
use super::items::Item;
use super::response::{Response, ResponseStatus};
use crate::config::ValidationConfig;
use crate::errors::ValidationError;
use crate::validate::{Discriminated, Validate};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Event types for streaming responses
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum StreamEventType {
    // Lifecycle events
    #[serde(rename = "response.created")]
    ResponseCreated,
    #[serde(rename = "response.queued")]
    ResponseQueued,
    #[serde(rename = "response.in_progress")]
    ResponseInProgress,
    #[serde(rename = "response.completed")]
    ResponseCompleted,
    #[serde(rename = "response.failed")]
    ResponseFailed,
    #[serde(rename = "response.incomplete")]
    ResponseIncomplete,

    // Output item events
    #[serde(rename = "response.output_item.added")]
    OutputItemAdded,
    #[serde(rename = "response.output_item.done")]
    OutputItemDone,

    // Content events
    #[serde(rename = "response.content_part.added")]
    ContentPartAdded,
    #[serde(rename = "response.content_part.done")]
    ContentPartDone,

    // Delta events
    #[serde(rename = "response.output_text.delta")]
    OutputTextDelta,
    #[serde(rename = "response.output_text.done")]
    OutputTextDone,
    #[serde(rename = "response.output_text.annotation.added")]
    OutputTextAnnotationAdded,
    #[serde(rename = "response.refusal.delta")]
    RefusalDelta,
    #[serde(rename = "response.refusal.done")]
    RefusalDone,

    // Function call events
    #[serde(rename = "response.function_call_arguments.delta")]
    FunctionCallArgumentsDelta,
    #[serde(rename = "response.function_call_arguments.done")]
    FunctionCallArgumentsDone,

    // Reasoning events
    #[serde(rename = "response.reasoning.delta")]
    ReasoningDelta,
    #[serde(rename = "response.reasoning.done")]
    ReasoningDone,
    #[serde(rename = "response.reasoning_summary_part.added")]
    ReasoningSummaryPartAdded,
    #[serde(rename = "response.reasoning_summary_part.done")]
    ReasoningSummaryPartDone,
    #[serde(rename = "response.reasoning_summary_text.delta")]
    ReasoningSummaryTextDelta,
    #[serde(rename = "response.reasoning_summary_text.done")]
    ReasoningSummaryTextDone,

    // Error event
    #[serde(rename = "error")]
    Error,
}

impl StreamEventType {
    pub const ALL: [StreamEventType; 24] = [
        StreamEventType::ResponseCreated,
        StreamEventType::ResponseQueued,
        StreamEventType::ResponseInProgress,
        StreamEventType::ResponseCompleted,
        StreamEventType::ResponseFailed,
        StreamEventType::ResponseIncomplete,
        StreamEventType::OutputItemAdded,
        StreamEventType::OutputItemDone,
        StreamEventType::ContentPartAdded,
        StreamEventType::ContentPartDone,
        StreamEventType::OutputTextDelta,
        StreamEventType::OutputTextDone,
        StreamEventType::OutputTextAnnotationAdded,
        StreamEventType::RefusalDelta,
        StreamEventType::RefusalDone,
        StreamEventType::FunctionCallArgumentsDelta,
        StreamEventType::FunctionCallArgumentsDone,
        StreamEventType::ReasoningDelta,
        StreamEventType::ReasoningDone,
        StreamEventType::ReasoningSummaryPartAdded,
        StreamEventType::ReasoningSummaryPartDone,
        StreamEventType::ReasoningSummaryTextDelta,
        StreamEventType::ReasoningSummaryTextDone,
        StreamEventType::Error,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StreamEventType::ResponseCreated => "response.created",
            StreamEventType::ResponseQueued => "response.queued",
            StreamEventType::ResponseInProgress => "response.in_progress",
            StreamEventType::ResponseCompleted => "response.completed",
            StreamEventType::ResponseFailed => "response.failed",
            StreamEventType::ResponseIncomplete => "response.incomplete",
            StreamEventType::OutputItemAdded => "response.output_item.added",
            StreamEventType::OutputItemDone => "response.output_item.done",
            StreamEventType::ContentPartAdded => "response.content_part.added",
            StreamEventType::ContentPartDone => "response.content_part.done",
            StreamEventType::OutputTextDelta => "response.output_text.delta",
            StreamEventType::OutputTextDone => "response.output_text.done",
            StreamEventType::OutputTextAnnotationAdded => "response.output_text.annotation.added",
            StreamEventType::RefusalDelta => "response.refusal.delta",
            StreamEventType::RefusalDone => "response.refusal.done",
            StreamEventType::FunctionCallArgumentsDelta => "response.function_call_arguments.delta",
            StreamEventType::FunctionCallArgumentsDone => "response.function_call_arguments.done",
            StreamEventType::ReasoningDelta => "response.reasoning.delta",
            StreamEventType::ReasoningDone => "response.reasoning.done",
            StreamEventType::ReasoningSummaryPartAdded => "response.reasoning_summary_part.added",
            StreamEventType::ReasoningSummaryPartDone => "response.reasoning_summary_part.done",
            StreamEventType::ReasoningSummaryTextDelta => "response.reasoning_summary_text.delta",
            StreamEventType::ReasoningSummaryTextDone => "response.reasoning_summary_text.done",
            StreamEventType::Error => "error",
        }
    }

    /// The `.done` type that closes a `.delta` type
    pub fn done_for(&self) -> Option<StreamEventType> {
        match self {
            StreamEventType::OutputTextDelta => Some(StreamEventType::OutputTextDone),
            StreamEventType::RefusalDelta => Some(StreamEventType::RefusalDone),
            StreamEventType::FunctionCallArgumentsDelta => {
                Some(StreamEventType::FunctionCallArgumentsDone)
            }
            StreamEventType::ReasoningDelta => Some(StreamEventType::ReasoningDone),
            StreamEventType::ReasoningSummaryTextDelta => {
                Some(StreamEventType::ReasoningSummaryTextDone)
            }
            _ => None,
        }
    }

    /// Statuses the embedded response may have for a lifecycle event
    ///
    /// Empty for events that carry no response snapshot.
    pub fn expected_status(&self) -> &'static [ResponseStatus] {
        match self {
            StreamEventType::ResponseCreated => &[ResponseStatus::Queued, ResponseStatus::InProgress],
            StreamEventType::ResponseQueued => &[ResponseStatus::Queued],
            StreamEventType::ResponseInProgress => &[ResponseStatus::InProgress],
            StreamEventType::ResponseCompleted => &[ResponseStatus::Completed],
            StreamEventType::ResponseFailed => &[ResponseStatus::Failed],
            StreamEventType::ResponseIncomplete => &[ResponseStatus::Incomplete],
            _ => &[],
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StreamEventType::ResponseCompleted
                | StreamEventType::ResponseFailed
                | StreamEventType::ResponseIncomplete
        )
    }
}

impl std::fmt::Display for StreamEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of the response lifecycle events
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResponseLifecycleEvent {
    pub sequence_number: u64,
    pub response: Response,
}

/// Payload of `response.output_item.added` / `.done`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputItemEvent {
    pub sequence_number: u64,
    pub output_index: u32,
    pub item: Item,
}

/// Payload of `response.content_part.added` / `.done`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContentPartEvent {
    pub sequence_number: u64,
    pub item_id: String,
    pub output_index: u32,
    pub content_index: u32,
    pub part: ContentPart,
}

/// Incremental text for a content part (output text, refusal or reasoning)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TextDeltaEvent {
    pub sequence_number: u64,
    pub item_id: String,
    pub output_index: u32,
    pub content_index: u32,
    pub delta: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub logprobs: Vec<Value>,
}

/// Final text of an output text or reasoning content part
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TextDoneEvent {
    pub sequence_number: u64,
    pub item_id: String,
    pub output_index: u32,
    pub content_index: u32,
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub logprobs: Vec<Value>,
}

/// Final text of a refusal content part
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RefusalDoneEvent {
    pub sequence_number: u64,
    pub item_id: String,
    pub output_index: u32,
    pub content_index: u32,
    pub refusal: String,
}

/// Annotation attached to an output text part
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutputTextAnnotationAddedEvent {
    pub sequence_number: u64,
    pub item_id: String,
    pub output_index: u32,
    pub content_index: u32,
    pub annotation_index: u32,
    pub annotation: Annotation,
}

/// Incremental JSON text of a function call's arguments
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FunctionCallArgumentsDeltaEvent {
    pub sequence_number: u64,
    pub item_id: String,
    pub output_index: u32,
    pub delta: String,
}

/// Final arguments of a function call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FunctionCallArgumentsDoneEvent {
    pub sequence_number: u64,
    pub item_id: String,
    pub output_index: u32,
    pub arguments: String,
}

/// Payload of `response.reasoning_summary_part.added` / `.done`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReasoningSummaryPartEvent {
    pub sequence_number: u64,
    pub item_id: String,
    pub output_index: u32,
    pub summary_index: u32,
    pub part: SummaryText,
}

/// Incremental reasoning summary text
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReasoningSummaryTextDeltaEvent {
    pub sequence_number: u64,
    pub item_id: String,
    pub output_index: u32,
    pub summary_index: u32,
    pub delta: String,
}

/// Final reasoning summary text
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReasoningSummaryTextDoneEvent {
    pub sequence_number: u64,
    pub item_id: String,
    pub output_index: u32,
    pub summary_index: u32,
    pub text: String,
}

/// Stream-level error report
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorEvent {
    pub sequence_number: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub param: Option<String>,
}

/// Stream event for Open Responses streaming
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum StreamEvent {
    #[serde(rename = "response.created")]
    ResponseCreated(ResponseLifecycleEvent),
    #[serde(rename = "response.queued")]
    ResponseQueued(ResponseLifecycleEvent),
    #[serde(rename = "response.in_progress")]
    ResponseInProgress(ResponseLifecycleEvent),
    #[serde(rename = "response.completed")]
    ResponseCompleted(ResponseLifecycleEvent),
    #[serde(rename = "response.failed")]
    ResponseFailed(ResponseLifecycleEvent),
    #[serde(rename = "response.incomplete")]
    ResponseIncomplete(ResponseLifecycleEvent),
    #[serde(rename = "response.output_item.added")]
    OutputItemAdded(OutputItemEvent),
    #[serde(rename = "response.output_item.done")]
    OutputItemDone(OutputItemEvent),
    #[serde(rename = "response.content_part.added")]
    ContentPartAdded(ContentPartEvent),
    #[serde(rename = "response.content_part.done")]
    ContentPartDone(ContentPartEvent),
    #[serde(rename = "response.output_text.delta")]
    OutputTextDelta(TextDeltaEvent),
    #[serde(rename = "response.output_text.done")]
    OutputTextDone(TextDoneEvent),
    #[serde(rename = "response.output_text.annotation.added")]
    OutputTextAnnotationAdded(OutputTextAnnotationAddedEvent),
    #[serde(rename = "response.refusal.delta")]
    RefusalDelta(TextDeltaEvent),
    #[serde(rename = "response.refusal.done")]
    RefusalDone(RefusalDoneEvent),
    #[serde(rename = "response.function_call_arguments.delta")]
    FunctionCallArgumentsDelta(FunctionCallArgumentsDeltaEvent),
    #[serde(rename = "response.function_call_arguments.done")]
    FunctionCallArgumentsDone(FunctionCallArgumentsDoneEvent),
    #[serde(rename = "response.reasoning.delta")]
    ReasoningDelta(TextDeltaEvent),
    #[serde(rename = "response.reasoning.done")]
    ReasoningDone(TextDoneEvent),
    #[serde(rename = "response.reasoning_summary_part.added")]
    ReasoningSummaryPartAdded(ReasoningSummaryPartEvent),
    #[serde(rename = "response.reasoning_summary_part.done")]
    ReasoningSummaryPartDone(ReasoningSummaryPartEvent),
    #[serde(rename = "response.reasoning_summary_text.delta")]
    ReasoningSummaryTextDelta(ReasoningSummaryTextDeltaEvent),
    #[serde(rename = "response.reasoning_summary_text.done")]
    ReasoningSummaryTextDone(ReasoningSummaryTextDoneEvent),
    #[serde(rename = "error")]
    Error(ErrorEvent),
}

impl StreamEvent {
    pub fn event_type(&self) -> StreamEventType {
        match self {
            StreamEvent::ResponseCreated(_) => StreamEventType::ResponseCreated,
            StreamEvent::ResponseQueued(_) => StreamEventType::ResponseQueued,
            StreamEvent::ResponseInProgress(_) => StreamEventType::ResponseInProgress,
            StreamEvent::ResponseCompleted(_) => StreamEventType::ResponseCompleted,
            StreamEvent::ResponseFailed(_) => StreamEventType::ResponseFailed,
            StreamEvent::ResponseIncomplete(_) => StreamEventType::ResponseIncomplete,
            StreamEvent::OutputItemAdded(_) => StreamEventType::OutputItemAdded,
            StreamEvent::OutputItemDone(_) => StreamEventType::OutputItemDone,
            StreamEvent::ContentPartAdded(_) => StreamEventType::ContentPartAdded,
            StreamEvent::ContentPartDone(_) => StreamEventType::ContentPartDone,
            StreamEvent::OutputTextDelta(_) => StreamEventType::OutputTextDelta,
            StreamEvent::OutputTextDone(_) => StreamEventType::OutputTextDone,
            StreamEvent::OutputTextAnnotationAdded(_) => {
                StreamEventType::OutputTextAnnotationAdded
            }
            StreamEvent::RefusalDelta(_) => StreamEventType::RefusalDelta,
            StreamEvent::RefusalDone(_) => StreamEventType::RefusalDone,
            StreamEvent::FunctionCallArgumentsDelta(_) => {
                StreamEventType::FunctionCallArgumentsDelta
            }
            StreamEvent::FunctionCallArgumentsDone(_) => StreamEventType::FunctionCallArgumentsDone,
            StreamEvent::ReasoningDelta(_) => StreamEventType::ReasoningDelta,
            StreamEvent::ReasoningDone(_) => StreamEventType::ReasoningDone,
            StreamEvent::ReasoningSummaryPartAdded(_) => StreamEventType::ReasoningSummaryPartAdded,
            StreamEvent::ReasoningSummaryPartDone(_) => StreamEventType::ReasoningSummaryPartDone,
            StreamEvent::ReasoningSummaryTextDelta(_) => StreamEventType::ReasoningSummaryTextDelta,
            StreamEvent::ReasoningSummaryTextDone(_) => StreamEventType::ReasoningSummaryTextDone,
            StreamEvent::Error(_) => StreamEventType::Error,
        }
    }

    pub fn sequence_number(&self) -> u64 {
        match self {
            StreamEvent::ResponseCreated(e)
            | StreamEvent::ResponseQueued(e)
            | StreamEvent::ResponseInProgress(e)
            | StreamEvent::ResponseCompleted(e)
            | StreamEvent::ResponseFailed(e)
            | StreamEvent::ResponseIncomplete(e) => e.sequence_number,
            StreamEvent::OutputItemAdded(e) | StreamEvent::OutputItemDone(e) => e.sequence_number,
            StreamEvent::ContentPartAdded(e) | StreamEvent::ContentPartDone(e) => {
                e.sequence_number
            }
            StreamEvent::OutputTextDelta(e)
            | StreamEvent::RefusalDelta(e)
            | StreamEvent::ReasoningDelta(e) => e.sequence_number,
            StreamEvent::OutputTextDone(e) | StreamEvent::ReasoningDone(e) => e.sequence_number,
            StreamEvent::OutputTextAnnotationAdded(e) => e.sequence_number,
            StreamEvent::RefusalDone(e) => e.sequence_number,
            StreamEvent::FunctionCallArgumentsDelta(e) => e.sequence_number,
            StreamEvent::FunctionCallArgumentsDone(e) => e.sequence_number,
            StreamEvent::ReasoningSummaryPartAdded(e) | StreamEvent::ReasoningSummaryPartDone(e) => {
                e.sequence_number
            }
            StreamEvent::ReasoningSummaryTextDelta(e) => e.sequence_number,
            StreamEvent::ReasoningSummaryTextDone(e) => e.sequence_number,
            StreamEvent::Error(e) => e.sequence_number,
        }
    }

    /// Embedded response snapshot of a lifecycle event
    pub fn response(&self) -> Option<&Response> {
        match self {
            StreamEvent::ResponseCreated(e)
            | StreamEvent::ResponseQueued(e)
            | StreamEvent::ResponseInProgress(e)
            | StreamEvent::ResponseCompleted(e)
            | StreamEvent::ResponseFailed(e)
            | StreamEvent::ResponseIncomplete(e) => Some(&e.response),
            _ => None,
        }
    }

    /// Output index of item-scoped events
    pub fn output_index(&self) -> Option<u32> {
        match self {
            StreamEvent::OutputItemAdded(e) | StreamEvent::OutputItemDone(e) => {
                Some(e.output_index)
            }
            StreamEvent::ContentPartAdded(e) | StreamEvent::ContentPartDone(e) => {
                Some(e.output_index)
            }
            StreamEvent::OutputTextDelta(e)
            | StreamEvent::RefusalDelta(e)
            | StreamEvent::ReasoningDelta(e) => Some(e.output_index),
            StreamEvent::OutputTextDone(e) | StreamEvent::ReasoningDone(e) => Some(e.output_index),
            StreamEvent::OutputTextAnnotationAdded(e) => Some(e.output_index),
            StreamEvent::RefusalDone(e) => Some(e.output_index),
            StreamEvent::FunctionCallArgumentsDelta(e) => Some(e.output_index),
            StreamEvent::FunctionCallArgumentsDone(e) => Some(e.output_index),
            StreamEvent::ReasoningSummaryPartAdded(e) | StreamEvent::ReasoningSummaryPartDone(e) => {
                Some(e.output_index)
            }
            StreamEvent::ReasoningSummaryTextDelta(e) => Some(e.output_index),
            StreamEvent::ReasoningSummaryTextDone(e) => Some(e.output_index),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.event_type().is_terminal()
    }
}

impl Discriminated for StreamEvent {
    const UNION: &'static str = "stream event";
    const TYPES: &'static [&'static str] = &[
        "response.created",
        "response.queued",
        "response.in_progress",
        "response.completed",
        "response.failed",
        "response.incomplete",
        "response.output_item.added",
        "response.output_item.done",
        "response.content_part.added",
        "response.content_part.done",
        "response.output_text.delta",
        "response.output_text.done",
        "response.output_text.annotation.added",
        "response.refusal.delta",
        "response.refusal.done",
        "response.function_call_arguments.delta",
        "response.function_call_arguments.done",
        "response.reasoning.delta",
        "response.reasoning.done",
        "response.reasoning_summary_part.added",
        "response.reasoning_summary_part.done",
        "response.reasoning_summary_text.delta",
        "response.reasoning_summary_text.done",
        "error",
    ];

    fn type_name(&self) -> &'static str {
        self.event_type().as_str()
    }
}

impl Validate for StreamEvent {
    fn validate(&self, config: &ValidationConfig) -> Result<(), ValidationError> {
        let event_type = self.event_type();
        if let Some(response) = self.response() {
            response
                .validate(config)
                .map_err(|e| e.within("response"))?;
            let expected = event_type.expected_status();
            if config.response_status && !expected.contains(&response.status) {
                return Err(ValidationError::field(
                    "response.status",
                    format!(
                        "`{}` does not match event `{}`",
                        response.status.as_str(),
                        event_type
                    ),
                ));
            }
        }
        match self {
            StreamEvent::OutputItemDone(e)
                if config.response_status && e.item.status() == Some(ItemStatus::InProgress) =>
            {
                Err(ValidationError::field(
                    "item.status",
                    "a finished item cannot be `in_progress`",
                ))
            }
            StreamEvent::OutputItemAdded(e) | StreamEvent::OutputItemDone(e) => {
                e.item.validate(config).map_err(|err| err.within("item"))
            }
            StreamEvent::ContentPartAdded(e) | StreamEvent::ContentPartDone(e) => {
                e.part.validate(config).map_err(|err| err.within("part"))
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openresponses::Usage;
    use crate::validate::decode_tagged;
    use std::collections::HashSet;

    fn strict() -> ValidationConfig {
        ValidationConfig::default()
    }

    #[test]
    fn test_type_strings_match_serde() {
        let from_enum: HashSet<&str> = StreamEventType::ALL.iter().map(|t| t.as_str()).collect();
        let listed: HashSet<&str> = StreamEvent::TYPES.iter().copied().collect();
        assert_eq!(from_enum, listed);
        assert_eq!(listed.len(), StreamEventType::ALL.len());

        for event_type in StreamEventType::ALL {
            let encoded = serde_json::to_value(event_type).unwrap();
            assert_eq!(encoded, event_type.as_str());
        }
    }

    #[test]
    fn test_output_text_delta_parsing() {
        let json = r#"{
            "type": "response.output_text.delta",
            "sequence_number": 4,
            "item_id": "msg_1",
            "output_index": 0,
            "content_index": 0,
            "delta": "Hel"
        }"#;
        let event: StreamEvent = decode_tagged(json, &strict()).unwrap();
        assert_eq!(event.event_type(), StreamEventType::OutputTextDelta);
        assert_eq!(event.sequence_number(), 4);
        assert_eq!(event.output_index(), Some(0));
        match event {
            StreamEvent::OutputTextDelta(delta) => assert_eq!(delta.delta, "Hel"),
            _ => panic!("Expected OutputTextDelta variant"),
        }
    }

    #[test]
    fn test_unknown_event_type_rejected() {
        let json = r#"{"type": "response.output_audio.delta", "sequence_number": 1, "delta": "AAA"}"#;
        let err = decode_tagged::<StreamEvent>(json, &strict()).unwrap_err();
        match err {
            ValidationError::UnknownDiscriminant { union, value } => {
                assert_eq!(union, "stream event");
                assert_eq!(value, "response.output_audio.delta");
            }
            other => panic!("Expected shape error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_type_rejected() {
        let err = decode_tagged::<StreamEvent>(r#"{"sequence_number": 1}"#, &strict()).unwrap_err();
        assert!(matches!(err, ValidationError::MissingDiscriminant { .. }));
    }

    #[test]
    fn test_delta_done_pairs() {
        let deltas: Vec<StreamEventType> = StreamEventType::ALL
            .iter()
            .copied()
            .filter(|t| t.as_str().ends_with(".delta"))
            .collect();
        assert_eq!(deltas.len(), 5);
        for delta in deltas {
            let done = delta.done_for().unwrap();
            assert_eq!(
                done.as_str(),
                delta.as_str().replace(".delta", ".done"),
                "delta {} pairs with the wrong done",
                delta
            );
        }
        assert_eq!(StreamEventType::OutputItemAdded.done_for(), None);
    }

    #[test]
    fn test_lifecycle_status_mismatch_rejected() {
        let mut response = Response::new("gpt-5");
        response.status = ResponseStatus::InProgress;
        let event = StreamEvent::ResponseCompleted(ResponseLifecycleEvent {
            sequence_number: 9,
            response,
        });
        let err = event.validate(&strict()).unwrap_err();
        assert!(err.to_string().contains("does not match"));
        assert!(event.validate(&ValidationConfig::lenient()).is_ok());
    }

    #[test]
    fn test_completed_event_roundtrip() {
        let mut response = Response::new("gpt-5");
        response.status = ResponseStatus::Completed;
        response.usage = Some(Usage::new(3, 4));
        let event = StreamEvent::ResponseCompleted(ResponseLifecycleEvent {
            sequence_number: 12,
            response,
        });
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"response.completed\""));
        let decoded: StreamEvent = decode_tagged(&json, &strict()).unwrap();
        assert_eq!(decoded, event);
        assert!(decoded.is_terminal());
    }

    #[test]
    fn test_error_event_parsing() {
        let json = r#"{"type": "error", "sequence_number": 2, "code": "rate_limit_exceeded", "message": "Slow down"}"#;
        let event: StreamEvent = decode_tagged(json, &strict()).unwrap();
        match event {
            StreamEvent::Error(error) => {
                assert_eq!(error.code.as_deref(), Some("rate_limit_exceeded"));
                assert_eq!(error.message, "Slow down");
            }
            _ => panic!("Expected Error variant"),
        }
    }

    #[test]
    fn test_wrong_payload_for_type_rejected() {
        // A refusal.done must carry `refusal`, not `text`
        let json = r#"{
            "type": "response.refusal.done",
            "sequence_number": 3,
            "item_id": "msg_1",
            "output_index": 0,
            "content_index": 0,
            "text": "no"
        }"#;
        let err = decode_tagged::<StreamEvent>(json, &strict()).unwrap_err();
        assert!(matches!(err, ValidationError::Decode(_)));
    }
}
