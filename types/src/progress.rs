//! Derived guarantor-progress snapshot.

use serde::{Deserialize, Serialize};

/// Immutable per-read view of how far guarantor collection has come.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub found: u32,
    pub required: u32,
    /// `round(found / required * 100)`, integer round-half-up.
    pub percentage: u32,
    pub remaining: u32,
}

impl ProgressSnapshot {
    /// Build a snapshot from raw counts. `found` is clamped to `required`.
    pub fn from_counts(found: u32, required: u32) -> Self {
        let required = required.max(1);
        let found = found.min(required);
        Self {
            found,
            required,
            percentage: percent_round_half_up(found, required),
            remaining: required - found,
        }
    }

    /// Whether all required guarantors have been found.
    pub fn is_complete(&self) -> bool {
        self.found == self.required
    }
}

/// Integer percentage with explicit round-half-up semantics, so results
/// never depend on platform float rounding.
fn percent_round_half_up(found: u32, required: u32) -> u32 {
    let found = u64::from(found);
    let required = u64::from(required.max(1));
    ((200 * found + required) / (2 * required)) as u32
}
