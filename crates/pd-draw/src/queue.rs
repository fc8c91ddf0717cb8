//! Prize queue: tiers expanded into ordered award slots

use serde::{Deserialize, Serialize};

use pd_core::{DrawResult, PrizeTier, total_quantity, validate_tiers};

/// One concrete award slot of a tier (e.g. "Second Prize #2 of 3")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrizeQueueEntry {
    pub tier_id: u32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub localized_name: Option<String>,
    /// Tier quantity, copied for "#n of m" display
    pub quantity: u32,
    /// 1-based instance within the tier
    pub instance_number: u32,
}

impl PrizeQueueEntry {
    fn from_tier(tier: &PrizeTier, instance_number: u32) -> Self {
        Self {
            tier_id: tier.id,
            name: tier.name.clone(),
            localized_name: tier.localized_name.clone(),
            quantity: tier.quantity,
            instance_number,
        }
    }

    /// Display label, e.g. "Second Prize #2/3"
    pub fn label(&self) -> String {
        format!("{} #{}/{}", self.name, self.instance_number, self.quantity)
    }
}

/// Ordered, fully expanded sequence of prize instances
///
/// Tiers are sorted by id descending so the least prestigious tier is drawn
/// first and the grand prize last. Entries are never patched; a re-import
/// builds a new queue.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrizeQueue {
    entries: Vec<PrizeQueueEntry>,
}

impl PrizeQueue {
    /// Build the queue from a tier list
    pub fn build(tiers: &[PrizeTier]) -> DrawResult<Self> {
        validate_tiers(tiers)?;

        let mut sorted: Vec<&PrizeTier> = tiers.iter().collect();
        sorted.sort_by(|a, b| b.id.cmp(&a.id));

        let mut entries = Vec::with_capacity(total_quantity(tiers));
        for tier in sorted {
            for instance in 1..=tier.quantity {
                entries.push(PrizeQueueEntry::from_tier(tier, instance));
            }
        }

        Ok(Self { entries })
    }

    /// Entry at `cursor`, or `None` when the queue is exhausted
    #[inline]
    pub fn current(&self, cursor: usize) -> Option<&PrizeQueueEntry> {
        self.entries.get(cursor)
    }

    /// Next cursor position, saturating at the queue length
    #[inline]
    pub fn advance(&self, cursor: usize) -> usize {
        (cursor + 1).min(self.entries.len())
    }

    /// Previous cursor position, saturating at 0
    #[inline]
    pub fn retreat(&self, cursor: usize) -> usize {
        cursor.saturating_sub(1)
    }

    /// Clamp an untrusted cursor into `[0, len]`
    #[inline]
    pub fn clamp(&self, cursor: usize) -> usize {
        cursor.min(self.entries.len())
    }

    /// Queue index of the `occurrence`-th (1-based) slot of a tier
    pub fn find_slot_for_tier(&self, tier_id: u32, occurrence: u32) -> Option<usize> {
        if occurrence == 0 {
            return None;
        }
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.tier_id == tier_id)
            .nth(occurrence as usize - 1)
            .map(|(idx, _)| idx)
    }

    /// Quantity of a tier, `None` if the tier is not in the queue
    pub fn tier_quantity(&self, tier_id: u32) -> Option<u32> {
        self.entries
            .iter()
            .find(|e| e.tier_id == tier_id)
            .map(|e| e.quantity)
    }

    /// Number of slots (== sum of tier quantities)
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[PrizeQueueEntry] {
        &self.entries
    }
}
