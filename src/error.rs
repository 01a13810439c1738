use thiserror::Error;

use crate::types::TimingSide;

#[derive(Debug, Error)]
pub enum AlignmentError {
    #[error("I/O error while {context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON parse error while {context}: {source}")]
    Json {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("insufficient timing data: {knots} {side} knot(s), at least 2 are required to interpolate")]
    InsufficientTimingData { side: TimingSide, knots: usize },
    #[error("edit script invariant violated: {message}")]
    OpcodeInvariantViolation { message: String },
}

impl AlignmentError {
    pub(crate) fn io(context: &'static str, source: std::io::Error) -> Self {
        Self::Io { context, source }
    }

    pub(crate) fn json(context: &'static str, source: serde_json::Error) -> Self {
        Self::Json { context, source }
    }

    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub(crate) fn insufficient_timing(side: TimingSide, knots: usize) -> Self {
        Self::InsufficientTimingData { side, knots }
    }

    pub(crate) fn opcode_violation(message: impl Into<String>) -> Self {
        Self::OpcodeInvariantViolation {
            message: message.into(),
        }
    }
}
