//! State errors

use pd_core::DrawError;

/// Persistence and import errors
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Draw(#[from] DrawError),

    #[error("Save already in progress")]
    SaveInProgress,

    #[error("No autosave found")]
    NotFound,
}

/// Result type alias
pub type StateResult<T> = Result<T, StateError>;
