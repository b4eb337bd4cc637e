//! # openresponses-types
//!
//! Typed data model for the Open Responses API: request bodies, the response
//! resource, items, content parts, tools and streaming events, together with
//! validation of the response and streaming lifecycles.
//!
//! ## Features
//!
//! - Serde types for every wire shape, with closed discriminated unions
//! - Field validation (numeric bounds, metadata limits, status invariants)
//! - Streaming event order validation ([`EventSequence`])
//! - Rebuilding a response from its events ([`ResponseAccumulator`])
//! - Server-Sent Events framing and parsing
//!
//! ## Usage
//!
//! ```rust
//! use openresponses_types::{decode, output_text, Response};
//!
//! let json = r#"{
//!     "id": "resp_1",
//!     "object": "response",
//!     "created_at": 1700000000,
//!     "status": "completed",
//!     "model": "gpt-5",
//!     "usage": {"input_tokens": 3, "output_tokens": 2, "total_tokens": 5},
//!     "output": [{
//!         "type": "message",
//!         "id": "msg_1",
//!         "role": "assistant",
//!         "status": "completed",
//!         "content": [{"type": "output_text", "text": "Hello!", "annotations": []}]
//!     }]
//! }"#;
//!
//! let response: Response = decode(json).unwrap();
//! assert_eq!(output_text(&response), "Hello!");
//! ```
//!
//! Streams are checked event by event:
//!
//! ```rust
//! use openresponses_types::{ResponseAccumulator, ResponseStreamBuilder, ValidationConfig};
//!
//! let events = ResponseStreamBuilder::new("gpt-5", "Hello world").build();
//! let response = ResponseAccumulator::collect(&events, ValidationConfig::strict()).unwrap();
//! assert_eq!(response.output_text(), "Hello world");
//! ```

// Core library modules
pub mod accumulator;
pub mod config;
pub mod errors;
pub mod helpers;
pub mod lifecycle;
pub mod openresponses;
pub mod responses_stream;
pub mod stream;
pub mod validate;

// Re-export commonly used types
pub use accumulator::ResponseAccumulator;
pub use config::{ConfigError, ValidationConfig};
pub use errors::ValidationError;
pub use helpers::{get_output_text, output_text, output_text_from_value};
pub use lifecycle::{EventSequence, LifecyclePhase};
pub use openresponses::*;
pub use responses_stream::{tokenize, ResponseStreamBuilder};
pub use stream::{
    decode_sse_chunks, decode_sse_stream, format_sse, parse_sse_frame, parse_sse_frame_with,
    EventStream, SseFrameBuffer,
};
pub use validate::{decode, decode_tagged, decode_with, Discriminated, Validate};

// Names used by earlier releases
pub type ResponseResource = Response;
pub type OpenResponsesResponse = Response;
pub type ResponsesParams = CreateResponseBody;
pub type OpenResponsesRequestBody = CreateResponseBody;
pub type ResponseStreamEvent = StreamEvent;
pub type OpenResponsesStreamEventType = StreamEventType;
pub type FunctionToolParam = FunctionTool;
pub type OpenResponsesReasoningConfig = ReasoningParam;
pub type OpenResponsesReasoningItem = ReasoningItem;
pub type GeneratedReasoningEffort = ReasoningEffortEnum;
pub type ReasoningDeltaEvent = TextDeltaEvent;
pub type ReasoningSummaryDeltaEvent = ReasoningSummaryTextDeltaEvent;

macro_rules! impl_from_str {
    ($($ty:ty => $decode:ident),* $(,)?) => {
        $(
            impl std::str::FromStr for $ty {
                type Err = ValidationError;

                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    validate::$decode(s, &ValidationConfig::default())
                }
            }
        )*
    };
}

impl_from_str! {
    Response => decode_with,
    CreateResponseBody => decode_with,
    StreamEvent => decode_tagged,
    Item => decode_tagged,
    ContentPart => decode_tagged,
    Tool => decode_tagged,
}
