// Streaming Lifecycle Validation
// Checks that a sequence of stream events describes one well-formed response.

use crate::config::ValidationConfig;
use crate::errors::ValidationError;
use crate::openresponses::{ContentPart, Item, StreamEvent, StreamEventType};
use crate::validate::Validate;

/// Where a response stream is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecyclePhase {
    /// Nothing seen yet
    #[default]
    Start,
    Created,
    Queued,
    InProgress,
    /// A `response.completed`, `.failed` or `.incomplete` event was seen
    Terminated,
}

/// Kind of text a fragment slot accumulates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotKind {
    OutputText,
    Refusal,
    Reasoning,
    Summary,
    Arguments,
}

impl SlotKind {
    fn label(&self) -> &'static str {
        match self {
            SlotKind::OutputText => "output_text",
            SlotKind::Refusal => "refusal",
            SlotKind::Reasoning => "reasoning",
            SlotKind::Summary => "reasoning_summary_text",
            SlotKind::Arguments => "function_call_arguments",
        }
    }

    fn of_part(part: &ContentPart) -> Option<SlotKind> {
        match part {
            ContentPart::OutputText { .. } => Some(SlotKind::OutputText),
            ContentPart::Refusal { .. } => Some(SlotKind::Refusal),
            ContentPart::ReasoningText { .. } => Some(SlotKind::Reasoning),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct Slot {
    kind: SlotKind,
    text: String,
    text_done: bool,
    closed: bool,
}

impl Slot {
    fn new(kind: SlotKind) -> Self {
        Self {
            kind,
            text: String::new(),
            text_done: false,
            closed: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ItemKind {
    Message,
    Reasoning,
    FunctionCall,
    Other,
}

impl ItemKind {
    fn of(item: &Item) -> Self {
        match item {
            Item::Message(_) => ItemKind::Message,
            Item::Reasoning(_) => ItemKind::Reasoning,
            Item::FunctionCall(_) => ItemKind::FunctionCall,
            _ => ItemKind::Other,
        }
    }

    fn accepts(&self, slot: SlotKind) -> bool {
        matches!(
            (self, slot),
            (ItemKind::Message, SlotKind::OutputText)
                | (ItemKind::Message, SlotKind::Refusal)
                | (ItemKind::Reasoning, SlotKind::Reasoning)
        )
    }
}

#[derive(Debug)]
struct ItemState {
    id: Option<String>,
    kind: ItemKind,
    closed: bool,
    parts: Vec<Slot>,
    summaries: Vec<Slot>,
    arguments: Option<Slot>,
}

/// Incremental checker for the event order of one streamed response
///
/// Feed events with [`EventSequence::push`] in arrival order and call
/// [`EventSequence::finish`] at end of stream. Which rules apply is decided
/// by the [`ValidationConfig`]; every event is also validated on its own.
#[derive(Debug)]
pub struct EventSequence {
    config: ValidationConfig,
    phase: LifecyclePhase,
    last_sequence: Option<u64>,
    items: Vec<ItemState>,
}

impl Default for EventSequence {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}

impl EventSequence {
    pub fn new(config: ValidationConfig) -> Self {
        Self {
            config,
            phase: LifecyclePhase::Start,
            last_sequence: None,
            items: Vec::new(),
        }
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    pub fn phase(&self) -> LifecyclePhase {
        self.phase
    }

    pub fn is_terminated(&self) -> bool {
        self.phase == LifecyclePhase::Terminated
    }

    /// Number of output items announced so far
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Check one event against everything seen before it
    pub fn push(&mut self, event: &StreamEvent) -> Result<(), ValidationError> {
        let sequence_number = event.sequence_number();
        tracing::trace!(
            sequence_number,
            event_type = %event.event_type(),
            "checking stream event"
        );

        let result = self.check(event);
        self.last_sequence = Some(sequence_number);
        if let Err(err) = &result {
            tracing::debug!(error = %err, "stream event rejected");
        }
        result
    }

    /// Check that the stream ended properly
    pub fn finish(&self) -> Result<(), ValidationError> {
        if self.config.event_order && !self.is_terminated() {
            return Err(ValidationError::sequence(
                self.last_sequence.unwrap_or(0),
                "stream ended without a terminal event",
            ));
        }
        Ok(())
    }

    fn check(&mut self, event: &StreamEvent) -> Result<(), ValidationError> {
        let sequence_number = event.sequence_number();
        event.validate(&self.config)?;

        if self.config.sequence_numbers {
            if let Some(last) = self.last_sequence {
                if sequence_number <= last {
                    return Err(ValidationError::sequence(
                        sequence_number,
                        format!("sequence_number does not increase (previous {})", last),
                    ));
                }
            }
        }

        if self.config.event_order {
            self.apply(event)
        } else {
            match event.event_type() {
                StreamEventType::ResponseCreated => self.phase = LifecyclePhase::Created,
                t if t.is_terminal() => self.phase = LifecyclePhase::Terminated,
                _ => {}
            }
            Ok(())
        }
    }

    fn apply(&mut self, event: &StreamEvent) -> Result<(), ValidationError> {
        let seq = event.sequence_number();
        let event_type = event.event_type();

        if self.phase == LifecyclePhase::Terminated {
            return Err(ValidationError::sequence(
                seq,
                format!("`{}` after the terminal event", event_type),
            ));
        }
        match event_type {
            StreamEventType::Error => return Ok(()),
            StreamEventType::ResponseCreated => {
                if self.phase != LifecyclePhase::Start {
                    return Err(ValidationError::sequence(
                        seq,
                        "response.created must be the first event",
                    ));
                }
                self.phase = LifecyclePhase::Created;
                return Ok(());
            }
            _ if self.phase == LifecyclePhase::Start => {
                return Err(ValidationError::sequence(
                    seq,
                    format!("`{}` before response.created", event_type),
                ));
            }
            _ => {}
        }

        match event {
            StreamEvent::ResponseQueued(_) => {
                if self.phase != LifecyclePhase::Created {
                    return Err(ValidationError::sequence(
                        seq,
                        "response.queued must directly follow response.created",
                    ));
                }
                self.phase = LifecyclePhase::Queued;
            }
            StreamEvent::ResponseInProgress(_) => {
                if !self.items.is_empty() {
                    return Err(ValidationError::sequence(
                        seq,
                        "response.in_progress after the first output item",
                    ));
                }
                self.phase = LifecyclePhase::InProgress;
            }
            StreamEvent::ResponseCompleted(_) => {
                if let Some(index) = self.items.iter().position(|item| !item.closed) {
                    return Err(ValidationError::sequence(
                        seq,
                        format!("response.completed while output item {} is open", index),
                    ));
                }
                self.phase = LifecyclePhase::Terminated;
            }
            StreamEvent::ResponseFailed(_) | StreamEvent::ResponseIncomplete(_) => {
                self.phase = LifecyclePhase::Terminated;
            }
            StreamEvent::OutputItemAdded(e) => {
                if self.phase == LifecyclePhase::Queued {
                    return Err(ValidationError::sequence(
                        seq,
                        "output item added while the response is queued",
                    ));
                }
                if e.output_index as usize != self.items.len() {
                    return Err(ValidationError::sequence(
                        seq,
                        format!(
                            "output_index {} is not the next index {}",
                            e.output_index,
                            self.items.len()
                        ),
                    ));
                }
                self.items.push(ItemState {
                    id: e.item.id().map(str::to_string),
                    kind: ItemKind::of(&e.item),
                    closed: false,
                    parts: Vec::new(),
                    summaries: Vec::new(),
                    arguments: None,
                });
            }
            StreamEvent::OutputItemDone(e) => {
                let done_matches = self.config.done_matches_deltas;
                let item = self.open_item(seq, e.output_index, e.item.id())?;
                if item.kind != ItemKind::of(&e.item) {
                    return Err(ValidationError::sequence(
                        seq,
                        format!("item {} changed type", e.output_index),
                    ));
                }
                if let Some(index) = item.parts.iter().position(|part| !part.closed) {
                    return Err(ValidationError::sequence(
                        seq,
                        format!("output_item.done while content part {} is open", index),
                    ));
                }
                if let Some(index) = item.summaries.iter().position(|part| !part.closed) {
                    return Err(ValidationError::sequence(
                        seq,
                        format!("output_item.done while summary part {} is open", index),
                    ));
                }
                if let Some(arguments) = &item.arguments {
                    if !arguments.text_done {
                        return Err(ValidationError::sequence(
                            seq,
                            "output_item.done before function_call_arguments.done",
                        ));
                    }
                    if let Item::FunctionCall(call) = &e.item {
                        if done_matches && call.arguments != arguments.text {
                            return Err(ValidationError::sequence(
                                seq,
                                "function call arguments differ from the streamed arguments",
                            ));
                        }
                    }
                }
                item.closed = true;
            }
            StreamEvent::ContentPartAdded(e) => {
                let kind = SlotKind::of_part(&e.part).ok_or_else(|| {
                    ValidationError::sequence(seq, "content part is not an output part")
                })?;
                let item = self.open_item(seq, e.output_index, Some(&e.item_id))?;
                if !item.kind.accepts(kind) {
                    return Err(ValidationError::sequence(
                        seq,
                        format!("item {} cannot hold a {} part", e.output_index, kind.label()),
                    ));
                }
                open_slot(seq, &mut item.parts, e.content_index, kind, "content")?;
            }
            StreamEvent::ContentPartDone(e) => {
                let done_matches = self.config.done_matches_deltas;
                let item = self.open_item(seq, e.output_index, Some(&e.item_id))?;
                let slot = slot_mut(seq, &mut item.parts, e.content_index, "content")?;
                if SlotKind::of_part(&e.part) != Some(slot.kind) {
                    return Err(ValidationError::sequence(
                        seq,
                        format!("content part {} changed type", e.content_index),
                    ));
                }
                if !slot.text_done {
                    return Err(ValidationError::sequence(
                        seq,
                        format!("content_part.done before {}.done", slot.kind.label()),
                    ));
                }
                if done_matches && e.part.text() != Some(slot.text.as_str()) {
                    return Err(ValidationError::sequence(
                        seq,
                        "finished content part differs from the streamed text",
                    ));
                }
                slot.closed = true;
            }
            StreamEvent::OutputTextDelta(e)
            | StreamEvent::RefusalDelta(e)
            | StreamEvent::ReasoningDelta(e) => {
                let kind = delta_kind(event_type);
                let item = self.open_item(seq, e.output_index, Some(&e.item_id))?;
                let slot = typed_slot(seq, &mut item.parts, e.content_index, kind, "content")?;
                append(seq, slot, &e.delta)?;
            }
            StreamEvent::OutputTextDone(e) | StreamEvent::ReasoningDone(e) => {
                let kind = delta_kind(event_type);
                let done_matches = self.config.done_matches_deltas;
                let item = self.open_item(seq, e.output_index, Some(&e.item_id))?;
                let slot = typed_slot(seq, &mut item.parts, e.content_index, kind, "content")?;
                close_text(seq, slot, &e.text, done_matches)?;
            }
            StreamEvent::RefusalDone(e) => {
                let done_matches = self.config.done_matches_deltas;
                let item = self.open_item(seq, e.output_index, Some(&e.item_id))?;
                let slot =
                    typed_slot(seq, &mut item.parts, e.content_index, SlotKind::Refusal, "content")?;
                close_text(seq, slot, &e.refusal, done_matches)?;
            }
            StreamEvent::OutputTextAnnotationAdded(e) => {
                let item = self.open_item(seq, e.output_index, Some(&e.item_id))?;
                typed_slot(
                    seq,
                    &mut item.parts,
                    e.content_index,
                    SlotKind::OutputText,
                    "content",
                )?;
            }
            StreamEvent::FunctionCallArgumentsDelta(e) => {
                let item = self.open_item(seq, e.output_index, Some(&e.item_id))?;
                if item.kind != ItemKind::FunctionCall {
                    return Err(ValidationError::sequence(
                        seq,
                        format!("item {} is not a function call", e.output_index),
                    ));
                }
                let slot = item
                    .arguments
                    .get_or_insert_with(|| Slot::new(SlotKind::Arguments));
                append(seq, slot, &e.delta)?;
            }
            StreamEvent::FunctionCallArgumentsDone(e) => {
                let done_matches = self.config.done_matches_deltas;
                let item = self.open_item(seq, e.output_index, Some(&e.item_id))?;
                if item.kind != ItemKind::FunctionCall {
                    return Err(ValidationError::sequence(
                        seq,
                        format!("item {} is not a function call", e.output_index),
                    ));
                }
                let slot = item
                    .arguments
                    .get_or_insert_with(|| Slot::new(SlotKind::Arguments));
                close_text(seq, slot, &e.arguments, done_matches)?;
            }
            StreamEvent::ReasoningSummaryPartAdded(e) => {
                let item = self.open_item(seq, e.output_index, Some(&e.item_id))?;
                if item.kind != ItemKind::Reasoning {
                    return Err(ValidationError::sequence(
                        seq,
                        format!("item {} is not a reasoning item", e.output_index),
                    ));
                }
                open_slot(
                    seq,
                    &mut item.summaries,
                    e.summary_index,
                    SlotKind::Summary,
                    "summary",
                )?;
            }
            StreamEvent::ReasoningSummaryPartDone(e) => {
                let done_matches = self.config.done_matches_deltas;
                let item = self.open_item(seq, e.output_index, Some(&e.item_id))?;
                let slot = slot_mut(seq, &mut item.summaries, e.summary_index, "summary")?;
                if !slot.text_done {
                    return Err(ValidationError::sequence(
                        seq,
                        "reasoning_summary_part.done before reasoning_summary_text.done",
                    ));
                }
                if done_matches && e.part.text != slot.text {
                    return Err(ValidationError::sequence(
                        seq,
                        "finished summary part differs from the streamed text",
                    ));
                }
                slot.closed = true;
            }
            StreamEvent::ReasoningSummaryTextDelta(e) => {
                let item = self.open_item(seq, e.output_index, Some(&e.item_id))?;
                let slot = typed_slot(
                    seq,
                    &mut item.summaries,
                    e.summary_index,
                    SlotKind::Summary,
                    "summary",
                )?;
                append(seq, slot, &e.delta)?;
            }
            StreamEvent::ReasoningSummaryTextDone(e) => {
                let done_matches = self.config.done_matches_deltas;
                let item = self.open_item(seq, e.output_index, Some(&e.item_id))?;
                let slot = typed_slot(
                    seq,
                    &mut item.summaries,
                    e.summary_index,
                    SlotKind::Summary,
                    "summary",
                )?;
                close_text(seq, slot, &e.text, done_matches)?;
            }
            StreamEvent::ResponseCreated(_) | StreamEvent::Error(_) => {}
        }
        Ok(())
    }

    /// The open item at `output_index`, checked against the event's `item_id`
    fn open_item(
        &mut self,
        seq: u64,
        output_index: u32,
        item_id: Option<&str>,
    ) -> Result<&mut ItemState, ValidationError> {
        let check_ids = self.config.item_ids;
        let item = self
            .items
            .get_mut(output_index as usize)
            .ok_or_else(|| {
                ValidationError::sequence(
                    seq,
                    format!("no output item was added at index {}", output_index),
                )
            })?;
        if item.closed {
            return Err(ValidationError::sequence(
                seq,
                format!("output item {} is already done", output_index),
            ));
        }
        if check_ids {
            if let (Some(expected), Some(actual)) = (item.id.as_deref(), item_id) {
                if expected != actual {
                    return Err(ValidationError::sequence(
                        seq,
                        format!(
                            "item_id `{}` does not match item `{}` at index {}",
                            actual, expected, output_index
                        ),
                    ));
                }
            }
        }
        Ok(item)
    }
}

fn delta_kind(event_type: StreamEventType) -> SlotKind {
    match event_type {
        StreamEventType::RefusalDelta | StreamEventType::RefusalDone => SlotKind::Refusal,
        StreamEventType::ReasoningDelta | StreamEventType::ReasoningDone => SlotKind::Reasoning,
        _ => SlotKind::OutputText,
    }
}

fn open_slot(
    seq: u64,
    slots: &mut Vec<Slot>,
    index: u32,
    kind: SlotKind,
    what: &str,
) -> Result<(), ValidationError> {
    if index as usize != slots.len() {
        return Err(ValidationError::sequence(
            seq,
            format!("{} index {} is not the next index {}", what, index, slots.len()),
        ));
    }
    slots.push(Slot::new(kind));
    Ok(())
}

fn slot_mut<'a>(
    seq: u64,
    slots: &'a mut [Slot],
    index: u32,
    what: &str,
) -> Result<&'a mut Slot, ValidationError> {
    let slot = slots.get_mut(index as usize).ok_or_else(|| {
        ValidationError::sequence(seq, format!("no {} part was added at index {}", what, index))
    })?;
    if slot.closed {
        return Err(ValidationError::sequence(
            seq,
            format!("{} part {} is already done", what, index),
        ));
    }
    Ok(slot)
}

fn typed_slot<'a>(
    seq: u64,
    slots: &'a mut [Slot],
    index: u32,
    kind: SlotKind,
    what: &str,
) -> Result<&'a mut Slot, ValidationError> {
    let slot = slot_mut(seq, slots, index, what)?;
    if slot.kind != kind {
        return Err(ValidationError::sequence(
            seq,
            format!(
                "{} event for a {} part at index {}",
                kind.label(),
                slot.kind.label(),
                index
            ),
        ));
    }
    Ok(slot)
}

fn append(seq: u64, slot: &mut Slot, delta: &str) -> Result<(), ValidationError> {
    if slot.text_done {
        return Err(ValidationError::sequence(
            seq,
            format!("{}.delta after {}.done", slot.kind.label(), slot.kind.label()),
        ));
    }
    slot.text.push_str(delta);
    Ok(())
}

fn close_text(
    seq: u64,
    slot: &mut Slot,
    text: &str,
    done_matches: bool,
) -> Result<(), ValidationError> {
    if slot.text_done {
        return Err(ValidationError::sequence(
            seq,
            format!("duplicate {}.done", slot.kind.label()),
        ));
    }
    if done_matches && slot.text != text {
        return Err(ValidationError::sequence(
            seq,
            format!(
                "{}.done text does not equal the concatenated deltas",
                slot.kind.label()
            ),
        ));
    }
    slot.text = text.to_string();
    slot.text_done = true;
    Ok(())
}
