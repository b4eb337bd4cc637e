// Validation Errors
// Every failure this crate can report while decoding or checking a payload.

use thiserror::Error;

/// Error raised when a payload does not satisfy the Open Responses contract
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The `type` discriminant names no variant of the union
    #[error("unknown {union} type `{value}`")]
    UnknownDiscriminant { union: &'static str, value: String },

    /// The payload has no string `type` discriminant
    #[error("{union} payload is missing a string `type` field")]
    MissingDiscriminant { union: &'static str },

    /// A recognized field holds a value outside its allowed range or set
    #[error("invalid field `{field}`: {reason}")]
    Field { field: String, reason: String },

    /// A streaming event arrived in a position the lifecycle forbids
    #[error("out-of-order event at sequence {sequence_number}: {reason}")]
    Sequence { sequence_number: u64, reason: String },

    /// The JSON itself could not be mapped onto the expected shape
    #[error("failed to decode payload: {0}")]
    Decode(#[from] serde_json::Error),

    /// A Server-Sent-Events frame could not be parsed
    #[error("malformed SSE frame: {0}")]
    Sse(String),
}

impl ValidationError {
    pub fn field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Field {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn sequence(sequence_number: u64, reason: impl Into<String>) -> Self {
        Self::Sequence {
            sequence_number,
            reason: reason.into(),
        }
    }

    /// Prefix the field path of a field error, e.g. `tools[2]` + `name`
    pub fn within(self, parent: impl std::fmt::Display) -> Self {
        match self {
            Self::Field { field, reason } => Self::Field {
                field: format!("{}.{}", parent, field),
                reason,
            },
            other => other,
        }
    }

    /// Whether this is a shape error (discriminant mismatch)
    pub fn is_shape_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownDiscriminant { .. } | Self::MissingDiscriminant { .. }
        )
    }

    pub fn is_sequence_error(&self) -> bool {
        matches!(self, Self::Sequence { .. })
    }
}
