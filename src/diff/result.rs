//! Delta job results.

use serde::{Deserialize, Serialize};

use crate::config::StageKind;

use super::modification::ModificationSet;

/// Counts of entities per verdict after a pipeline run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaSummary {
    /// Claimed by an exact-match pass; annotated `matched` with no state.
    pub unchanged: usize,
    pub modifications: usize,
    pub additions: usize,
    pub deletions: usize,
}

impl DeltaSummary {
    #[must_use]
    pub fn total_changes(&self) -> usize {
        self.modifications + self.additions + self.deletions
    }

    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.total_changes() > 0
    }
}

/// How many keys one stage settled, for observability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageClaim {
    pub stage: StageKind,
    pub claimed: usize,
}

/// Everything a delta job reports back besides the annotations persisted
/// in the two snapshots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeltaReport {
    /// Existing-to-new entity pairs with differing values.
    pub modifications: ModificationSet,
    pub summary: DeltaSummary,
    /// Per-stage claim counts, in pipeline order.
    pub stage_claims: Vec<StageClaim>,
}

impl DeltaReport {
    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.summary.has_changes()
    }
}
