//! Prize tiers

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::participant::check_len;
use crate::{DrawError, DrawResult};

/// Maximum award quantity for a single tier
pub const MAX_TIER_QUANTITY: u32 = 1000;

/// Maximum tier name length (characters)
pub const MAX_TIER_NAME_LEN: usize = 100;

/// A named prize category with a fixed award quantity
///
/// Lower ids are more prestigious. The grand prize usually has id 1 and is
/// drawn last.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrizeTier {
    /// Priority key (> 0)
    pub id: u32,
    /// Display name
    pub name: String,
    /// Optional second-language name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub localized_name: Option<String>,
    /// Number of instances to award (1..=1000)
    pub quantity: u32,
}

impl PrizeTier {
    /// Create a validated tier
    pub fn new(id: u32, name: impl Into<String>, quantity: u32) -> DrawResult<Self> {
        let tier = Self {
            id,
            name: name.into(),
            localized_name: None,
            quantity,
        };
        tier.validate()?;
        Ok(tier)
    }

    /// Set localized name
    pub fn with_localized_name(mut self, name: impl Into<String>) -> Self {
        self.localized_name = Some(name.into());
        self
    }

    /// Check id, name and quantity bounds
    pub fn validate(&self) -> DrawResult<()> {
        if self.id == 0 {
            return Err(DrawError::validation("prize tier id must be greater than 0"));
        }
        check_len("prize tier name", &self.name, MAX_TIER_NAME_LEN)?;
        if self.quantity < 1 || self.quantity > MAX_TIER_QUANTITY {
            return Err(DrawError::Validation(format!(
                "prize tier {} quantity {} outside 1..={}",
                self.id, self.quantity, MAX_TIER_QUANTITY
            )));
        }
        Ok(())
    }
}

/// Validate a tier list: every tier valid, ids unique
pub fn validate_tiers(tiers: &[PrizeTier]) -> DrawResult<()> {
    let mut seen = HashSet::with_capacity(tiers.len());
    for tier in tiers {
        tier.validate()?;
        if !seen.insert(tier.id) {
            return Err(DrawError::Validation(format!(
                "duplicate prize tier id {}",
                tier.id
            )));
        }
    }
    Ok(())
}

/// Total number of prize instances across all tiers
pub fn total_quantity(tiers: &[PrizeTier]) -> usize {
    tiers.iter().map(|t| t.quantity as usize).sum()
}
