//! Persistable draw snapshot

use serde::{Deserialize, Serialize};

use pd_core::{Participant, PrizeTier};

use crate::ledger::WinnerEntry;

/// Everything needed to resume a draw
///
/// `participants` holds the remaining pool, not the original roster. The
/// snapshot may have been edited outside the program, so restoring it
/// re-validates everything and clamps the cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawSnapshot {
    #[serde(default)]
    pub participants: Vec<Participant>,
    #[serde(default)]
    pub prize_tiers: Vec<PrizeTier>,
    #[serde(default)]
    pub cursor: usize,
    #[serde(default)]
    pub winners: Vec<WinnerEntry>,
}
