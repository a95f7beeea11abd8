//! Engine configuration.
//!
//! A delta job is an ordered pipeline of match stages. Earlier stages
//! claim keys that later stages never reconsider; the final stage may
//! additionally sweep everything still unclaimed into additions and
//! deletions.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{GraphDeltaError, Result};

/// The closed set of match strategies a pipeline can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    /// Claims common keys whose comparison outcome is "unchanged" and
    /// marks them matched with no delta state.
    ExactMatch,
    /// Claims common keys whose values differ and marks them MODIFICATION.
    Modification,
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageKind::ExactMatch => f.write_str("exact-match"),
            StageKind::Modification => f.write_str("modification"),
        }
    }
}

/// Configuration for a [`DeltaPipeline`](crate::diff::DeltaPipeline).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaConfig {
    /// Match stages, run in order.
    pub stages: Vec<StageKind>,
    /// Whether the final modification stage also marks the residual
    /// (additions and deletions). Off, the pipeline only claims matches
    /// and leaves everything else in play for the caller.
    pub mark_residual: bool,
}

impl Default for DeltaConfig {
    fn default() -> Self {
        Self {
            stages: vec![StageKind::ExactMatch, StageKind::Modification],
            mark_residual: true,
        }
    }
}

impl DeltaConfig {
    /// Replace the stage list.
    #[must_use]
    pub fn with_stages(mut self, stages: Vec<StageKind>) -> Self {
        self.stages = stages;
        self
    }

    /// Enable or disable residual marking on the final stage.
    #[must_use]
    pub fn mark_residual(mut self, mark: bool) -> Self {
        self.mark_residual = mark;
        self
    }

    /// A single-stage pipeline running only the modification matcher.
    ///
    /// Note: without a preceding exact-match stage, common keys with equal
    /// values are swept into DELETION + ADDITION by residual marking.
    #[must_use]
    pub fn modification_only() -> Self {
        Self {
            stages: vec![StageKind::Modification],
            mark_residual: true,
        }
    }

    /// Validate the stage list: at least one stage, each kind at most once.
    pub fn validate(&self) -> Result<()> {
        if self.stages.is_empty() {
            return Err(GraphDeltaError::config("pipeline has no stages"));
        }
        for (i, stage) in self.stages.iter().enumerate() {
            if self.stages[..i].contains(stage) {
                return Err(GraphDeltaError::config(format!(
                    "stage '{stage}' appears more than once"
                )));
            }
        }
        Ok(())
    }
}
