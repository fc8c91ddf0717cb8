//! Participants

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{DrawError, DrawResult};

/// Maximum participant id length (characters)
pub const MAX_PARTICIPANT_ID_LEN: usize = 50;

/// Maximum participant name length (characters)
pub const MAX_PARTICIPANT_NAME_LEN: usize = 100;

/// A drawable entry
///
/// Owned by the pool while undrawn. Once awarded, the winner ledger keeps a
/// frozen copy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Participant {
    /// Unique within a pool
    pub id: String,
    /// Display name
    pub name: String,
}

impl Participant {
    /// Create a validated participant
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> DrawResult<Self> {
        let participant = Self {
            id: id.into(),
            name: name.into(),
        };
        participant.validate()?;
        Ok(participant)
    }

    /// Check field lengths
    pub fn validate(&self) -> DrawResult<()> {
        check_len("participant id", &self.id, MAX_PARTICIPANT_ID_LEN)?;
        check_len("participant name", &self.name, MAX_PARTICIPANT_NAME_LEN)?;
        Ok(())
    }
}

impl std::fmt::Display for Participant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// Validate a participant list: every entry valid, ids unique
pub fn validate_participants(participants: &[Participant]) -> DrawResult<()> {
    let mut seen = HashSet::with_capacity(participants.len());
    for participant in participants {
        participant.validate()?;
        if !seen.insert(participant.id.as_str()) {
            return Err(DrawError::Validation(format!(
                "duplicate participant id '{}'",
                participant.id
            )));
        }
    }
    Ok(())
}

pub(crate) fn check_len(field: &str, value: &str, max: usize) -> DrawResult<()> {
    let len = value.chars().count();
    if len == 0 {
        return Err(DrawError::Validation(format!("{field} must not be empty")));
    }
    if len > max {
        return Err(DrawError::Validation(format!(
            "{field} '{value}' exceeds {max} characters"
        )));
    }
    Ok(())
}
