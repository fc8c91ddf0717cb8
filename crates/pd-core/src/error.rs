//! Error types for the prize draw

use thiserror::Error;

use crate::DrawPhase;

/// Core error type
///
/// Every variant describes a rejected operation. A rejected operation never
/// leaves partial changes behind.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DrawError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("No participants left in the pool")]
    EmptyPool,

    #[error("Cannot {action} while {phase}")]
    IllegalTransition {
        action: &'static str,
        phase: DrawPhase,
    },

    #[error("Stale winner report from session {reported} (current session {current})")]
    StaleReport { reported: u64, current: u64 },

    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("All prizes have been awarded")]
    DrawComplete,

    #[error("Unknown prize tier: {0}")]
    UnknownTier(u32),

    #[error("Prize tier {0} has no unawarded instances left")]
    TierExhausted(u32),

    #[error("No active prize at the current queue position")]
    NoActivePrize,

    #[error("No winner with participant id {0}")]
    WinnerNotFound(String),
}

impl DrawError {
    /// Shorthand for a validation failure
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Whether this error only needs to be logged, not surfaced
    pub fn is_silent(&self) -> bool {
        matches!(self, Self::StaleReport { .. })
    }
}

/// Result type alias
pub type DrawResult<T> = Result<T, DrawError>;
