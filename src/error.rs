//! Error types for mailmark.
//!
//! Stages never catch their own failures: every error bubbles up to the
//! pipeline boundary, which decides between legacy fallback and propagation.

use thiserror::Error;

/// Errors that can occur while formatting a markup document.
#[derive(Debug, Error)]
pub enum FormatError {
    /// Element nesting exceeded the supported depth.
    #[error("markup nesting too deep: exceeded {depth} levels")]
    NestingTooDeep {
        /// Maximum supported depth
        depth: usize,
    },

    /// A pipeline stage failed.
    #[error("stage `{stage}` failed: {message}")]
    Stage {
        /// Stage name as reported by `Stage::name`
        stage: &'static str,
        /// Failure description
        message: String,
    },
}

/// Result type alias for formatting operations.
pub type FormatResult<T> = Result<T, FormatError>;

impl FormatError {
    /// Create a stage failure with a message.
    pub fn stage(stage: &'static str, message: impl Into<String>) -> Self {
        Self::Stage {
            stage,
            message: message.into(),
        }
    }

    /// Name of the failing stage, if the error came from one.
    pub fn stage_name(&self) -> Option<&'static str> {
        match self {
            Self::Stage { stage, .. } => Some(*stage),
            Self::NestingTooDeep { .. } => None,
        }
    }
}
