// Server-Sent Events Codec
// Frames stream events for the wire and reads them back.

use crate::config::ValidationConfig;
use crate::errors::ValidationError;
use crate::lifecycle::EventSequence;
use crate::openresponses::StreamEvent;
use crate::validate::{check_discriminant, Validate};
use async_stream::stream;
use futures::{Stream, StreamExt};
use serde_json::Value;
use std::pin::Pin;

/// Sentinel some servers send after the terminal event
pub const DONE_MARKER: &str = "[DONE]";

/// A stream of decoded, lifecycle-checked events
pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, ValidationError>> + Send>>;

/// Format an event as a Server-Sent Event
pub fn format_sse(event: &StreamEvent) -> String {
    let json = serde_json::to_string(event).unwrap_or_else(|_| "{}".to_string());
    format!("event: {}\ndata: {}\n\n", event.event_type(), json)
}

/// Parse one SSE frame with the default (strict) configuration
///
/// Returns `Ok(None)` for frames that carry no event: comment-only frames,
/// frames without `data:` lines and the `[DONE]` marker.
pub fn parse_sse_frame(frame: &str) -> Result<Option<StreamEvent>, ValidationError> {
    parse_sse_frame_with(frame, &ValidationConfig::default())
}

/// Parse and validate one SSE frame
pub fn parse_sse_frame_with(
    frame: &str,
    config: &ValidationConfig,
) -> Result<Option<StreamEvent>, ValidationError> {
    let event = decode_frame(frame)?;
    if let Some(event) = &event {
        event.validate(config)?;
    }
    Ok(event)
}

/// Shape-check a frame without running field validation
fn decode_frame(frame: &str) -> Result<Option<StreamEvent>, ValidationError> {
    let mut event_name: Option<&str> = None;
    let mut data: Vec<&str> = Vec::new();

    for line in frame.lines() {
        if line.is_empty() || line.starts_with(':') {
            continue;
        }
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "event" => event_name = Some(value),
            "data" => data.push(value),
            _ => {}
        }
    }

    if data.is_empty() {
        return Ok(None);
    }
    let payload = data.join("\n");
    if payload.trim() == DONE_MARKER {
        return Ok(None);
    }

    let raw: Value = serde_json::from_str(&payload)?;
    check_discriminant::<StreamEvent>(&raw)?;
    if let Some(name) = event_name {
        let tag = raw.get("type").and_then(Value::as_str).unwrap_or_default();
        if name != tag {
            return Err(ValidationError::Sse(format!(
                "event name `{}` does not match payload type `{}`",
                name, tag
            )));
        }
    }
    let event: StreamEvent = serde_json::from_value(raw)?;
    Ok(Some(event))
}

/// Incremental splitter turning arbitrary text chunks into complete frames
#[derive(Debug, Default)]
pub struct SseFrameBuffer {
    buffer: String,
}

impl SseFrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a chunk and take every frame it completes
    pub fn push(&mut self, chunk: &str) -> Vec<String> {
        self.buffer.push_str(chunk);
        if self.buffer.contains('\r') {
            self.buffer = self.buffer.replace("\r\n", "\n");
        }

        let mut frames = Vec::new();
        while let Some(end) = self.buffer.find("\n\n") {
            let frame: String = self.buffer.drain(..end + 2).collect();
            frames.push(frame);
        }
        frames
    }

    /// Take whatever is left once the input ends
    pub fn finish(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.buffer);
        if rest.trim().is_empty() {
            None
        } else {
            Some(rest)
        }
    }
}

/// Decode a stream of SSE frames into lifecycle-checked events
///
/// The stream ends after the terminal event. The first error is yielded and
/// ends the stream as well, including a missing terminal event at end of input.
pub fn decode_sse_stream<S>(frames: S, config: ValidationConfig) -> EventStream
where
    S: Stream<Item = String> + Send + 'static,
{
    Box::pin(stream! {
        let mut frames = Box::pin(frames);
        let mut sequence = EventSequence::new(config);

        while let Some(frame) = frames.next().await {
            let event = match decode_frame(&frame) {
                Ok(Some(event)) => event,
                Ok(None) => continue,
                Err(err) => {
                    tracing::debug!(error = %err, "dropping stream at malformed frame");
                    yield Err(err);
                    return;
                }
            };
            if let Err(err) = sequence.push(&event) {
                yield Err(err);
                return;
            }
            let terminal = event.is_terminal();
            yield Ok(event);
            if terminal {
                return;
            }
        }

        if let Err(err) = sequence.finish() {
            yield Err(err);
        }
    })
}

/// Decode raw body chunks (arbitrary boundaries) into lifecycle-checked events
pub fn decode_sse_chunks<S>(chunks: S, config: ValidationConfig) -> EventStream
where
    S: Stream<Item = String> + Send + 'static,
{
    let frames = stream! {
        let mut chunks = Box::pin(chunks);
        let mut buffer = SseFrameBuffer::new();
        while let Some(chunk) = chunks.next().await {
            for frame in buffer.push(&chunk) {
                yield frame;
            }
        }
        if let Some(rest) = buffer.finish() {
            yield rest;
        }
    };
    decode_sse_stream(frames, config)
}
