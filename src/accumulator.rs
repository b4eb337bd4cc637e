// Stream Accumulator
// Rebuilds a response object from its stream of events.

use crate::config::ValidationConfig;
use crate::errors::ValidationError;
use crate::lifecycle::EventSequence;
use crate::openresponses::{
    ContentPart, ErrorEvent, Item, ReasoningItem, ReasoningText, Response, StreamEvent,
};

/// Applies stream events to a response under construction
///
/// Every event first goes through an [`EventSequence`], so an event that
/// breaks the lifecycle is rejected before it can corrupt the response.
#[derive(Debug)]
pub struct ResponseAccumulator {
    sequence: EventSequence,
    response: Option<Response>,
    errors: Vec<ErrorEvent>,
}

impl Default for ResponseAccumulator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}

impl ResponseAccumulator {
    pub fn new(config: ValidationConfig) -> Self {
        Self {
            sequence: EventSequence::new(config),
            response: None,
            errors: Vec::new(),
        }
    }

    /// Accumulate a complete event list into its final response
    pub fn collect<'a>(
        events: impl IntoIterator<Item = &'a StreamEvent>,
        config: ValidationConfig,
    ) -> Result<Response, ValidationError> {
        let mut accumulator = Self::new(config);
        for event in events {
            accumulator.apply(event)?;
        }
        accumulator.finish()
    }

    /// The response as accumulated so far
    pub fn response(&self) -> Option<&Response> {
        self.response.as_ref()
    }

    /// `error` events seen so far
    pub fn errors(&self) -> &[ErrorEvent] {
        &self.errors
    }

    pub fn is_finished(&self) -> bool {
        self.sequence.is_terminated()
    }

    pub fn apply(&mut self, event: &StreamEvent) -> Result<(), ValidationError> {
        self.sequence.push(event)?;
        let seq = event.sequence_number();

        match event {
            StreamEvent::ResponseCreated(e)
            | StreamEvent::ResponseQueued(e)
            | StreamEvent::ResponseInProgress(e)
            | StreamEvent::ResponseCompleted(e)
            | StreamEvent::ResponseFailed(e)
            | StreamEvent::ResponseIncomplete(e) => {
                let mut snapshot = e.response.clone();
                if snapshot.output.is_empty() {
                    if let Some(previous) = self.response.take() {
                        snapshot.output = previous.output;
                    }
                }
                tracing::debug!(
                    response_id = %snapshot.id,
                    status = snapshot.status.as_str(),
                    "adopted response snapshot"
                );
                self.response = Some(snapshot);
            }
            StreamEvent::Error(e) => {
                tracing::warn!(code = ?e.code, message = %e.message, "stream reported an error");
                self.errors.push(e.clone());
            }
            StreamEvent::OutputItemAdded(e) | StreamEvent::OutputItemDone(e) => {
                let output = &mut self.response_mut(seq)?.output;
                let index = e.output_index as usize;
                if index < output.len() {
                    output[index] = e.item.clone();
                } else if index == output.len() {
                    output.push(e.item.clone());
                } else {
                    return Err(ValidationError::sequence(
                        seq,
                        format!("output_index {} skips past {} items", index, output.len()),
                    ));
                }
            }
            StreamEvent::ContentPartAdded(e) | StreamEvent::ContentPartDone(e) => {
                let index = e.content_index as usize;
                match self.item_mut(seq, e.output_index)? {
                    Item::Message(message) => {
                        let parts = message.content.parts_mut(message.role).ok_or_else(|| {
                            ValidationError::sequence(seq, "message content is not a part list")
                        })?;
                        put(seq, parts, index, e.part.clone())?;
                    }
                    Item::Reasoning(reasoning) => {
                        let text = e.part.text().unwrap_or_default();
                        let content = reasoning.content.get_or_insert_with(Vec::new);
                        put(seq, content, index, ReasoningText::new(text))?;
                    }
                    _ => {
                        return Err(ValidationError::sequence(
                            seq,
                            format!("item {} has no content parts", e.output_index),
                        ))
                    }
                }
            }
            StreamEvent::OutputTextDelta(e) | StreamEvent::RefusalDelta(e) => {
                self.part_text_mut(seq, e.output_index, e.content_index)?
                    .push_str(&e.delta);
            }
            StreamEvent::ReasoningDelta(e) => {
                self.reasoning_text_mut(seq, e.output_index, e.content_index)?
                    .push_str(&e.delta);
            }
            StreamEvent::OutputTextDone(e) => {
                *self.part_text_mut(seq, e.output_index, e.content_index)? = e.text.clone();
            }
            StreamEvent::RefusalDone(e) => {
                *self.part_text_mut(seq, e.output_index, e.content_index)? = e.refusal.clone();
            }
            StreamEvent::ReasoningDone(e) => {
                *self.reasoning_text_mut(seq, e.output_index, e.content_index)? = e.text.clone();
            }
            StreamEvent::OutputTextAnnotationAdded(e) => {
                match self.part_mut(seq, e.output_index, e.content_index)? {
                    ContentPart::OutputText { annotations, .. } => {
                        let index = (e.annotation_index as usize).min(annotations.len());
                        annotations.insert(index, e.annotation.clone());
                    }
                    _ => {
                        return Err(ValidationError::sequence(
                            seq,
                            "annotations belong to output_text parts",
                        ))
                    }
                }
            }
            StreamEvent::FunctionCallArgumentsDelta(e) => {
                self.arguments_mut(seq, e.output_index)?.push_str(&e.delta);
            }
            StreamEvent::FunctionCallArgumentsDone(e) => {
                *self.arguments_mut(seq, e.output_index)? = e.arguments.clone();
            }
            StreamEvent::ReasoningSummaryPartAdded(e) | StreamEvent::ReasoningSummaryPartDone(e) => {
                let reasoning = self.reasoning_mut(seq, e.output_index)?;
                put(
                    seq,
                    &mut reasoning.summary,
                    e.summary_index as usize,
                    e.part.clone(),
                )?;
            }
            StreamEvent::ReasoningSummaryTextDelta(e) => {
                self.summary_text_mut(seq, e.output_index, e.summary_index)?
                    .push_str(&e.delta);
            }
            StreamEvent::ReasoningSummaryTextDone(e) => {
                *self.summary_text_mut(seq, e.output_index, e.summary_index)? = e.text.clone();
            }
        }
        Ok(())
    }

    /// The final response, once a terminal event was applied
    pub fn finish(self) -> Result<Response, ValidationError> {
        self.sequence.finish()?;
        match self.response {
            Some(response) if self.sequence.is_terminated() => Ok(response),
            _ => Err(ValidationError::sequence(
                0,
                "stream ended before a terminal event",
            )),
        }
    }

    fn response_mut(&mut self, seq: u64) -> Result<&mut Response, ValidationError> {
        self.response
            .as_mut()
            .ok_or_else(|| ValidationError::sequence(seq, "no response snapshot received yet"))
    }

    fn item_mut(&mut self, seq: u64, output_index: u32) -> Result<&mut Item, ValidationError> {
        self.response_mut(seq)?
            .output
            .get_mut(output_index as usize)
            .ok_or_else(|| {
                ValidationError::sequence(seq, format!("no output item at index {}", output_index))
            })
    }

    fn part_mut(
        &mut self,
        seq: u64,
        output_index: u32,
        content_index: u32,
    ) -> Result<&mut ContentPart, ValidationError> {
        let missing = || {
            ValidationError::sequence(
                seq,
                format!(
                    "no content part {} on item {}",
                    content_index, output_index
                ),
            )
        };
        match self.item_mut(seq, output_index)? {
            Item::Message(message) => message
                .content
                .parts_mut(message.role)
                .and_then(|parts| parts.get_mut(content_index as usize))
                .ok_or_else(missing),
            _ => Err(missing()),
        }
    }

    fn part_text_mut(
        &mut self,
        seq: u64,
        output_index: u32,
        content_index: u32,
    ) -> Result<&mut String, ValidationError> {
        self.part_mut(seq, output_index, content_index)?
            .text_mut()
            .ok_or_else(|| ValidationError::sequence(seq, "content part holds no text"))
    }

    fn reasoning_mut(
        &mut self,
        seq: u64,
        output_index: u32,
    ) -> Result<&mut ReasoningItem, ValidationError> {
        match self.item_mut(seq, output_index)? {
            Item::Reasoning(reasoning) => Ok(reasoning),
            _ => Err(ValidationError::sequence(
                seq,
                format!("item {} is not a reasoning item", output_index),
            )),
        }
    }

    fn reasoning_text_mut(
        &mut self,
        seq: u64,
        output_index: u32,
        content_index: u32,
    ) -> Result<&mut String, ValidationError> {
        self.reasoning_mut(seq, output_index)?
            .content
            .as_mut()
            .and_then(|content| content.get_mut(content_index as usize))
            .map(|part| &mut part.text)
            .ok_or_else(|| {
                ValidationError::sequence(
                    seq,
                    format!("no reasoning part {} on item {}", content_index, output_index),
                )
            })
    }

    fn summary_text_mut(
        &mut self,
        seq: u64,
        output_index: u32,
        summary_index: u32,
    ) -> Result<&mut String, ValidationError> {
        self.reasoning_mut(seq, output_index)?
            .summary
            .get_mut(summary_index as usize)
            .map(|part| &mut part.text)
            .ok_or_else(|| {
                ValidationError::sequence(
                    seq,
                    format!("no summary part {} on item {}", summary_index, output_index),
                )
            })
    }

    fn arguments_mut(&mut self, seq: u64, output_index: u32) -> Result<&mut String, ValidationError> {
        match self.item_mut(seq, output_index)? {
            Item::FunctionCall(call) => Ok(&mut call.arguments),
            _ => Err(ValidationError::sequence(
                seq,
                format!("item {} is not a function call", output_index),
            )),
        }
    }
}

/// Replace the element at `index`, or append when `index` is one past the end
fn put<T>(seq: u64, list: &mut Vec<T>, index: usize, value: T) -> Result<(), ValidationError> {
    if index < list.len() {
        list[index] = value;
    } else if index == list.len() {
        list.push(value);
    } else {
        return Err(ValidationError::sequence(
            seq,
            format!("index {} skips past {} entries", index, list.len()),
        ));
    }
    Ok(())
}
