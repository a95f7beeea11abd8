//! Ordered match-stage pipeline.

use crate::config::{DeltaConfig, StageKind};
use crate::error::Result;
use crate::model::KeyedEntities;

use super::exact::ExactMatcher;
use super::marker::Marker;
use super::matcher::{ClaimedKeys, SnapshotPair};
use super::modification::ModificationMatcher;
use super::result::{DeltaReport, StageClaim};

/// Runs the configured match stages in order over one pair of entity
/// collections, threading the claimed-key set so each stage only sees
/// what earlier stages left unresolved.
///
/// Residual marking (the addition/deletion sweep) happens at most once,
/// on the final stage, and only when the final stage is a modification
/// pass.
#[derive(Debug, Clone, Default)]
pub struct DeltaPipeline {
    config: DeltaConfig,
}

impl DeltaPipeline {
    /// Pipeline with the default configuration: exact match, then
    /// modification, with residual marking.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pipeline with a custom configuration.
    pub fn with_config(config: DeltaConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    #[must_use]
    pub fn config(&self) -> &DeltaConfig {
        &self.config
    }

    /// Run all stages and collect the report. Annotations are written
    /// into both snapshots as a side effect; the caller owns the
    /// surrounding transactions.
    pub fn run(
        &self,
        existing: &KeyedEntities,
        new: &KeyedEntities,
        snapshots: &mut SnapshotPair<'_>,
        marker: &dyn Marker,
    ) -> Result<DeltaReport> {
        self.config.validate()?;

        let mut claimed = ClaimedKeys::new();
        let mut report = DeltaReport::default();

        for (index, stage) in self.config.stages.iter().enumerate() {
            let is_final = index + 1 == self.config.stages.len();

            let outcome = match stage {
                StageKind::ExactMatch => {
                    let mut matcher =
                        ExactMatcher::new(existing, new, marker).with_claimed(claimed.clone());
                    let outcome = matcher.run(snapshots)?;
                    report.summary.unchanged += outcome.matched.len();
                    outcome
                }
                StageKind::Modification => {
                    let mut matcher = ModificationMatcher::new(existing, new, marker)
                        .with_claimed(claimed.clone());
                    if !(is_final && self.config.mark_residual) {
                        matcher = matcher.without_residual();
                    }
                    let outcome = matcher.run(snapshots)?;
                    report.modifications = matcher.modifications().clone();
                    report.summary.modifications += outcome.matched.len();
                    report.summary.additions += outcome.additions.len();
                    report.summary.deletions += outcome.deletions.len();
                    outcome
                }
            };

            tracing::debug!(
                stage = %outcome.stage,
                matched = outcome.matched.len(),
                additions = outcome.additions.len(),
                deletions = outcome.deletions.len(),
                "stage complete"
            );
            report.stage_claims.push(StageClaim {
                stage: outcome.stage,
                claimed: outcome.claimed_keys().count(),
            });
            claimed.extend(outcome.claimed_keys().cloned());
        }

        Ok(report)
    }
}

/// Convenience: run the default pipeline over one pair of collections.
pub fn run_default(
    existing: &KeyedEntities,
    new: &KeyedEntities,
    snapshots: &mut SnapshotPair<'_>,
    marker: &dyn Marker,
) -> Result<DeltaReport> {
    DeltaPipeline::new().run(existing, new, snapshots, marker)
}
