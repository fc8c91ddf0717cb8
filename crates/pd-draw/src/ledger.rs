//! Winner ledger: committed, reversible award history

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pd_core::Participant;

use crate::queue::PrizeQueueEntry;

/// A committed award
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinnerEntry {
    /// Frozen copy of the participant at award time
    pub participant: Participant,
    /// Frozen copy of the awarded slot
    pub prize: PrizeQueueEntry,
    pub timestamp: DateTime<Utc>,
}

impl WinnerEntry {
    pub fn new(participant: Participant, prize: PrizeQueueEntry) -> Self {
        Self {
            participant,
            prize,
            timestamp: Utc::now(),
        }
    }
}

/// Winners in award order
///
/// Only two removals exist: the most recent entry (undo) and a specific
/// participant (targeted re-add).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WinnerLedger {
    entries: Vec<WinnerEntry>,
}

impl WinnerLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<WinnerEntry>) -> Self {
        Self { entries }
    }

    pub fn append(&mut self, entry: WinnerEntry) {
        self.entries.push(entry);
    }

    pub fn pop_last(&mut self) -> Option<WinnerEntry> {
        self.entries.pop()
    }

    pub fn remove_by_id(&mut self, participant_id: &str) -> Option<WinnerEntry> {
        let pos = self
            .entries
            .iter()
            .position(|e| e.participant.id == participant_id)?;
        Some(self.entries.remove(pos))
    }

    /// Number of awards made for a tier
    pub fn count_for_tier(&self, tier_id: u32) -> usize {
        self.entries
            .iter()
            .filter(|e| e.prize.tier_id == tier_id)
            .count()
    }

    /// Whether a specific prize instance is held by a winner
    pub fn holds_instance(&self, tier_id: u32, instance_number: u32) -> bool {
        self.entries
            .iter()
            .any(|e| e.prize.tier_id == tier_id && e.prize.instance_number == instance_number)
    }

    /// Lowest instance number of a tier not currently held by a winner
    pub fn next_unawarded_instance(&self, tier_id: u32, quantity: u32) -> Option<u32> {
        (1..=quantity).find(|&instance| !self.holds_instance(tier_id, instance))
    }

    pub fn contains(&self, participant_id: &str) -> bool {
        self.entries.iter().any(|e| e.participant.id == participant_id)
    }

    pub fn last(&self) -> Option<&WinnerEntry> {
        self.entries.last()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WinnerEntry> {
        self.entries.iter()
    }

    pub fn entries(&self) -> &[WinnerEntry] {
        &self.entries
    }
}
