//! Errors raised by the stage sequencer.

use thiserror::Error;

use crate::models::ThoughtStatus;

/// Reasons a sequencer event is rejected.
///
/// A rejected event leaves the thought process untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequenceError {
    /// The event does not apply to the current stage.
    #[error("cannot apply {event} while {status:?}")]
    InvalidTransition { event: String, status: ThoughtStatus },

    /// A tool event referenced a position outside the plan.
    #[error("tool index {index} out of range ({len} tools)")]
    ToolIndexOutOfRange { index: usize, len: usize },

    /// The tool is not in the status the event expects.
    #[error("tool {index} cannot {action} from {status}")]
    ToolNotReady {
        index: usize,
        action: &'static str,
        status: String,
    },

    /// A final reasoning event arrived for a plan without one.
    #[error("thought process has no final reasoning block")]
    MissingFinalReasoning,

    /// Pending cards cannot be expanded or collapsed.
    #[error("card {card} is still pending")]
    CardPending { card: String },

    /// The sequencer task is no longer running.
    #[error("sequence was cancelled")]
    Cancelled,
}

impl SequenceError {
    /// Short code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            SequenceError::InvalidTransition { .. } => "SEQ_INVALID_TRANSITION",
            SequenceError::ToolIndexOutOfRange { .. } => "SEQ_TOOL_INDEX",
            SequenceError::ToolNotReady { .. } => "SEQ_TOOL_NOT_READY",
            SequenceError::MissingFinalReasoning => "SEQ_NO_FINAL_REASONING",
            SequenceError::CardPending { .. } => "SEQ_CARD_PENDING",
            SequenceError::Cancelled => "SEQ_CANCELLED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = SequenceError::InvalidTransition {
            event: "StartTool(0)".to_string(),
            status: ThoughtStatus::Reasoning,
        };
        assert_eq!(err.to_string(), "cannot apply StartTool(0) while Reasoning");

        let err = SequenceError::ToolIndexOutOfRange { index: 4, len: 2 };
        assert_eq!(err.to_string(), "tool index 4 out of range (2 tools)");
    }

    #[test]
    fn test_error_codes_are_distinct() {
        let codes = [
            SequenceError::MissingFinalReasoning.error_code(),
            SequenceError::Cancelled.error_code(),
            SequenceError::CardPending {
                card: "tool-0".to_string(),
            }
            .error_code(),
        ];
        assert_ne!(codes[0], codes[1]);
        assert_ne!(codes[1], codes[2]);
    }
}
