//! pd-core: Shared types and error taxonomy for the prize draw
//!
//! This crate provides the foundational types used across all draw crates.

mod error;
mod participant;
mod prize;

pub use error::*;
pub use participant::*;
pub use prize::*;

/// Phase of the draw state machine
///
/// `Complete` is never stored. It is derived from the ledger whenever the
/// stored phase is `Ready`, so an undo can leave it again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum DrawPhase {
    /// Waiting for the facilitator to start a spin
    Ready,
    /// Animator armed, no winner reported yet
    Spinning,
    /// Winner reported and pending confirmation
    Stopped,
    /// Every prize instance has been awarded
    Complete,
}

impl DrawPhase {
    /// Display name
    pub fn name(self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::Spinning => "spinning",
            Self::Stopped => "stopped",
            Self::Complete => "complete",
        }
    }

    /// Whether a spin is in flight (armed or awaiting confirmation)
    #[inline]
    pub fn is_drawing(self) -> bool {
        matches!(self, Self::Spinning | Self::Stopped)
    }
}

impl Default for DrawPhase {
    fn default() -> Self {
        Self::Ready
    }
}

impl std::fmt::Display for DrawPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
