//! Error taxonomy for the door engine.

use thiserror::Error;

/// Which structured call produced a parse failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Generator,
    Judge,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Generator => f.write_str("Generator"),
            Stage::Judge => f.write_str("Judge"),
        }
    }
}

/// Which content gate blocked a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    Input,
    Output,
}

/// Coarse error classes, for callers that only need to branch on the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    Parse,
    PolicyViolation,
    Precondition,
    Busy,
    Unsupported,
}

#[derive(Debug, Error)]
pub enum DoorError {
    /// Network failure or non-2xx HTTP status.
    #[error("{provider} {}: {detail}", status_label(.status))]
    Transport {
        provider: &'static str,
        status: Option<u16>,
        /// Transport error text and/or a bounded snippet of the response body.
        detail: String,
    },

    #[error("{provider}: no messages provided.")]
    NoMessages { provider: &'static str },

    /// No `"content"` field could be mined from the response body.
    #[error("{provider} response parse failed.")]
    ResponseParse { provider: &'static str },

    #[error("{stage} returned no JSON envelope.")]
    NoEnvelope { stage: Stage },

    #[error("{stage} JSON parse failed.")]
    Decode {
        stage: Stage,
        #[source]
        source: serde_json::Error,
    },

    #[error("{reason}")]
    PolicyViolation { gate: Gate, reason: String },

    #[error("{0}")]
    Precondition(String),

    /// A turn is already in flight for this session.
    #[error("Busy.")]
    Busy,

    #[error("{provider} streaming is not supported. Use chat_once with paced output.")]
    StreamingUnsupported { provider: &'static str },
}

fn status_label(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!("HTTP {}", code),
        None => "request failed".to_string(),
    }
}

impl DoorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DoorError::Transport { .. } => ErrorKind::Transport,
            DoorError::ResponseParse { .. }
            | DoorError::NoEnvelope { .. }
            | DoorError::Decode { .. } => ErrorKind::Parse,
            DoorError::PolicyViolation { .. } => ErrorKind::PolicyViolation,
            DoorError::NoMessages { .. } | DoorError::Precondition(_) => ErrorKind::Precondition,
            DoorError::Busy => ErrorKind::Busy,
            DoorError::StreamingUnsupported { .. } => ErrorKind::Unsupported,
        }
    }

    pub fn input_blocked(reason: impl Into<String>) -> Self {
        DoorError::PolicyViolation {
            gate: Gate::Input,
            reason: reason.into(),
        }
    }

    pub fn output_blocked(reason: impl Into<String>) -> Self {
        DoorError::PolicyViolation {
            gate: Gate::Output,
            reason: reason.into(),
        }
    }

    /// True when the door's own reply was blocked.
    pub fn is_output_blocked(&self) -> bool {
        matches!(
            self,
            DoorError::PolicyViolation {
                gate: Gate::Output,
                ..
            }
        )
    }
}

pub type Result<T> = std::result::Result<T, DoorError>;
