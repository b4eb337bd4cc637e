// Response Stream Emitter
// Produces a well-ordered event sequence for a text response.

use crate::openresponses::{
    ContentPart, ContentPartEvent, Item, ItemStatus, MessageContent, MessageItem,
    OutputItemEvent, OutputTokensDetails, ReasoningItem, ReasoningSummaryPartEvent,
    ReasoningSummaryTextDeltaEvent, ReasoningSummaryTextDoneEvent, Response,
    ResponseLifecycleEvent, ResponseStatus, StreamEvent, SummaryText, TextDeltaEvent,
    TextDoneEvent, Usage,
};
use crate::stream::format_sse;
use async_stream::stream;
use futures::Stream;
use std::pin::Pin;

/// Split text into word and whitespace tokens
///
/// Concatenating the tokens gives back the input.
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current_word = String::new();

    for ch in text.chars() {
        if ch.is_whitespace() {
            if !current_word.is_empty() {
                tokens.push(std::mem::take(&mut current_word));
            }
            tokens.push(ch.to_string());
        } else {
            current_word.push(ch);
        }
    }

    if !current_word.is_empty() {
        tokens.push(current_word);
    }

    tokens
}

fn count_words(tokens: &[String]) -> u64 {
    tokens
        .iter()
        .filter(|t| !t.chars().all(char::is_whitespace))
        .count() as u64
}

/// Hands out increasing sequence numbers while collecting events
struct Emitter {
    next: u64,
    events: Vec<StreamEvent>,
}

impl Emitter {
    fn seq(&mut self) -> u64 {
        let seq = self.next;
        self.next += 1;
        seq
    }

    fn lifecycle(&mut self, response: &Response) -> ResponseLifecycleEvent {
        ResponseLifecycleEvent {
            sequence_number: self.seq(),
            response: response.clone(),
        }
    }

    fn item(&mut self, output_index: u32, item: Item) -> OutputItemEvent {
        OutputItemEvent {
            sequence_number: self.seq(),
            output_index,
            item,
        }
    }
}

/// Builder for the event sequence of one streamed text response
pub struct ResponseStreamBuilder {
    model: String,
    content: String,
    response_id: Option<String>,
    message_id: Option<String>,
    reasoning_summary: Option<String>,
    input_tokens: u64,
    usage: Option<Usage>,
}

impl ResponseStreamBuilder {
    pub fn new(model: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            content: content.into(),
            response_id: None,
            message_id: None,
            reasoning_summary: None,
            input_tokens: 0,
            usage: None,
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.response_id = Some(id.into());
        self
    }

    pub fn message_id(mut self, id: impl Into<String>) -> Self {
        self.message_id = Some(id.into());
        self
    }

    /// Emit a reasoning item with this summary before the message
    pub fn reasoning_summary(mut self, summary: impl Into<String>) -> Self {
        self.reasoning_summary = Some(summary.into());
        self
    }

    /// Prompt size reported when usage is estimated
    pub fn input_tokens(mut self, input_tokens: u64) -> Self {
        self.input_tokens = input_tokens;
        self
    }

    /// Report this usage instead of a word-count estimate
    pub fn usage(mut self, usage: Usage) -> Self {
        self.usage = Some(usage);
        self
    }

    /// Produce every event, from `response.created` to `response.completed`
    pub fn build(self) -> Vec<StreamEvent> {
        let mut response = Response::new(self.model);
        if let Some(id) = self.response_id {
            response.id = id;
        }
        let message_id = self
            .message_id
            .unwrap_or_else(|| format!("msg_{}", uuid::Uuid::new_v4().simple()));

        let mut out = Emitter {
            next: 0,
            events: Vec::new(),
        };
        let created = out.lifecycle(&response);
        out.events.push(StreamEvent::ResponseCreated(created));
        let in_progress = out.lifecycle(&response);
        out.events.push(StreamEvent::ResponseInProgress(in_progress));

        let mut output: Vec<Item> = Vec::new();
        let mut reasoning_tokens = 0;

        if let Some(summary) = &self.reasoning_summary {
            let reasoning_id = format!("rs_{}", uuid::Uuid::new_v4().simple());
            let tokens = tokenize(summary);
            reasoning_tokens = count_words(&tokens);
            let output_index = output.len() as u32;

            let mut item = ReasoningItem {
                id: Some(reasoning_id.clone()),
                status: Some(ItemStatus::InProgress),
                ..Default::default()
            };
            let added = out.item(output_index, item.clone().into());
            out.events.push(StreamEvent::OutputItemAdded(added));

            let seq = out.seq();
            out.events
                .push(StreamEvent::ReasoningSummaryPartAdded(ReasoningSummaryPartEvent {
                    sequence_number: seq,
                    item_id: reasoning_id.clone(),
                    output_index,
                    summary_index: 0,
                    part: SummaryText::new(""),
                }));
            for token in tokens {
                let seq = out.seq();
                out.events.push(StreamEvent::ReasoningSummaryTextDelta(
                    ReasoningSummaryTextDeltaEvent {
                        sequence_number: seq,
                        item_id: reasoning_id.clone(),
                        output_index,
                        summary_index: 0,
                        delta: token,
                    },
                ));
            }
            let seq = out.seq();
            out.events.push(StreamEvent::ReasoningSummaryTextDone(
                ReasoningSummaryTextDoneEvent {
                    sequence_number: seq,
                    item_id: reasoning_id.clone(),
                    output_index,
                    summary_index: 0,
                    text: summary.clone(),
                },
            ));
            let seq = out.seq();
            out.events
                .push(StreamEvent::ReasoningSummaryPartDone(ReasoningSummaryPartEvent {
                    sequence_number: seq,
                    item_id: reasoning_id,
                    output_index,
                    summary_index: 0,
                    part: SummaryText::new(summary.clone()),
                }));

            item.status = Some(ItemStatus::Completed);
            item.summary = vec![SummaryText::new(summary.clone())];
            let done = out.item(output_index, item.clone().into());
            out.events.push(StreamEvent::OutputItemDone(done));
            output.push(item.into());
        }

        // The assistant message
        let output_index = output.len() as u32;
        let tokens = tokenize(&self.content);
        let output_words = count_words(&tokens);
        let mut message = MessageItem::assistant(message_id.clone());
        let added = out.item(output_index, message.clone().into());
        out.events.push(StreamEvent::OutputItemAdded(added));

        let part_event = |sequence_number: u64, text: &str| ContentPartEvent {
            sequence_number,
            item_id: message_id.clone(),
            output_index,
            content_index: 0,
            part: ContentPart::output_text(text),
        };
        let seq = out.seq();
        out.events
            .push(StreamEvent::ContentPartAdded(part_event(seq, "")));
        for token in tokens {
            let seq = out.seq();
            out.events.push(StreamEvent::OutputTextDelta(TextDeltaEvent {
                sequence_number: seq,
                item_id: message_id.clone(),
                output_index,
                content_index: 0,
                delta: token,
                logprobs: Vec::new(),
            }));
        }
        let seq = out.seq();
        out.events.push(StreamEvent::OutputTextDone(TextDoneEvent {
            sequence_number: seq,
            item_id: message_id.clone(),
            output_index,
            content_index: 0,
            text: self.content.clone(),
            logprobs: Vec::new(),
        }));
        let seq = out.seq();
        out.events
            .push(StreamEvent::ContentPartDone(part_event(seq, &self.content)));

        message.status = Some(ItemStatus::Completed);
        message.content = MessageContent::Parts(vec![ContentPart::output_text(&self.content)]);
        let done = out.item(output_index, message.clone().into());
        out.events.push(StreamEvent::OutputItemDone(done));
        output.push(message.into());

        let usage = self.usage.unwrap_or_else(|| {
            let mut usage = Usage::new(self.input_tokens, output_words + reasoning_tokens);
            if reasoning_tokens > 0 {
                usage.output_tokens_details = Some(OutputTokensDetails { reasoning_tokens });
            }
            usage
        });

        response.status = ResponseStatus::Completed;
        response.completed_at = Some(chrono::Utc::now().timestamp().max(response.created_at));
        response.output = output;
        response.usage = Some(usage);
        let completed = out.lifecycle(&response);
        out.events.push(StreamEvent::ResponseCompleted(completed));

        tracing::debug!(
            response_id = %response.id,
            events = out.events.len(),
            "built response stream"
        );
        out.events
    }

    /// The same events as an async stream
    pub fn into_stream(self) -> Pin<Box<dyn Stream<Item = StreamEvent> + Send>> {
        let events = self.build();
        Box::pin(stream! {
            for event in events {
                yield event;
            }
        })
    }

    /// The same events rendered as Server-Sent Events
    pub fn into_sse_stream(self) -> Pin<Box<dyn Stream<Item = String> + Send>> {
        let events = self.build();
        Box::pin(stream! {
            for event in events {
                yield format_sse(&event);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::EventSequence;
    use crate::openresponses::StreamEventType;
    use futures::StreamExt;

    #[test]
    fn test_tokenize() {
        assert_eq!(tokenize("Hello, world!"), vec!["Hello,", " ", "world!"]);
        assert_eq!(tokenize("a  b"), vec!["a", " ", " ", "b"]);
        assert!(tokenize("").is_empty());
        assert_eq!(tokenize(" x\n").concat(), " x\n");
    }

    #[test]
    fn test_event_order() {
        let events = ResponseStreamBuilder::new("gpt-5", "Hello world").build();
        let types: Vec<StreamEventType> = events.iter().map(StreamEvent::event_type).collect();
        assert_eq!(
            types,
            vec![
                StreamEventType::ResponseCreated,
                StreamEventType::ResponseInProgress,
                StreamEventType::OutputItemAdded,
                StreamEventType::ContentPartAdded,
                StreamEventType::OutputTextDelta,
                StreamEventType::OutputTextDelta,
                StreamEventType::OutputTextDelta,
                StreamEventType::OutputTextDone,
                StreamEventType::ContentPartDone,
                StreamEventType::OutputItemDone,
                StreamEventType::ResponseCompleted,
            ]
        );
        for (expected, event) in events.iter().enumerate() {
            assert_eq!(event.sequence_number(), expected as u64);
        }
    }

    #[test]
    fn test_stream_passes_validation() {
        let events = ResponseStreamBuilder::new("gpt-5", "The answer is 42.")
            .reasoning_summary("Recall the number.")
            .input_tokens(7)
            .build();
        let mut sequence = EventSequence::default();
        for event in &events {
            sequence.push(event).unwrap();
        }
        sequence.finish().unwrap();
    }

    #[test]
    fn test_reasoning_comes_first() {
        let events = ResponseStreamBuilder::new("gpt-5", "Hi")
            .reasoning_summary("Greet back")
            .build();
        let response = events.last().and_then(StreamEvent::response).unwrap();
        assert_eq!(response.output.len(), 2);
        assert!(matches!(response.output[0], Item::Reasoning(_)));
        assert_eq!(response.output_text(), "Hi");

        let usage = response.usage.as_ref().unwrap();
        assert_eq!(usage.output_tokens, 3);
        assert_eq!(
            usage.output_tokens_details.as_ref().unwrap().reasoning_tokens,
            2
        );
    }

    #[test]
    fn test_explicit_ids_and_usage() {
        let events = ResponseStreamBuilder::new("gpt-5", "ok")
            .id("resp_fixed")
            .message_id("msg_fixed")
            .usage(Usage::new(10, 1))
            .build();
        let response = events.last().and_then(StreamEvent::response).unwrap();
        assert_eq!(response.id, "resp_fixed");
        assert_eq!(response.output[0].id(), Some("msg_fixed"));
        assert_eq!(response.usage.as_ref().unwrap().total_tokens, 11);
    }

    #[test]
    fn test_empty_content() {
        let events = ResponseStreamBuilder::new("gpt-5", "").build();
        assert!(!events
            .iter()
            .any(|e| e.event_type() == StreamEventType::OutputTextDelta));
        let mut sequence = EventSequence::default();
        for event in &events {
            sequence.push(event).unwrap();
        }
        sequence.finish().unwrap();
    }

    #[tokio::test]
    async fn test_into_stream_matches_build() {
        let events: Vec<StreamEvent> = ResponseStreamBuilder::new("gpt-5", "a b")
            .into_stream()
            .collect()
            .await;
        assert_eq!(events.len(), 11);
        assert!(events.last().unwrap().is_terminal());
    }

    #[tokio::test]
    async fn test_sse_stream() {
        let frames: Vec<String> = ResponseStreamBuilder::new("gpt-5", "Hi")
            .into_sse_stream()
            .collect()
            .await;
        assert!(frames[0].starts_with("event: response.created\n"));
        assert!(frames.last().unwrap().starts_with("event: response.completed\n"));
    }
}
