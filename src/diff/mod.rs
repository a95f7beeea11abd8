//! The matching/diff engine.
//!
//! Turns two keyed entity collections into a three-way partition
//! (unchanged, modified, added-or-deleted) and projects the verdict back
//! onto graph paths as persistent annotations.
//!
//! # Architecture
//!
//! - [`Marker`](marker::Marker): resolves entity keys to paths and writes
//!   annotations; pluggable per entity kind.
//! - [`Matcher`](matcher::Matcher): the shared one-shot match/mark driver
//!   behind a [`MatchPolicy`](matcher::MatchPolicy).
//! - Concrete stages: [`ExactMatcher`] (claims unchanged entities) and
//!   [`ModificationMatcher`] (claims differing-value entities, optionally
//!   sweeping the residual into additions and deletions).
//! - [`DeltaPipeline`]: runs stages in order, threading the claimed-key
//!   context so later passes only see what earlier passes left unresolved.
//!
//! # Example
//!
//! ```ignore
//! use graph_delta::diff::{DeltaPipeline, PathMarker, SnapshotPair, SnapshotSide};
//!
//! let marker = PathMarker::attribute();
//! let mut snapshots = SnapshotPair {
//!     existing: SnapshotSide { accessor: &mut existing_graph, root_uri: existing_root },
//!     new: SnapshotSide { accessor: &mut new_graph, root_uri: new_root },
//! };
//! let report = DeltaPipeline::new().run(&existing, &new, &mut snapshots, &marker)?;
//! println!("modified: {}", report.summary.modifications);
//! ```

mod exact;
pub mod marker;
pub mod matcher;
mod modification;
mod pipeline;
mod result;

pub use exact::{ExactMatcher, ExactPolicy};
pub use marker::{Marker, PathMarker};
pub use matcher::{
    ClaimedKeys, MatchPhase, MatchPolicy, MatchSet, Matcher, SnapshotPair, SnapshotSide,
    StageOutcome,
};
pub use modification::{
    ModificationMatcher, ModificationPair, ModificationPolicy, ModificationSet,
};
pub use pipeline::{run_default, DeltaPipeline};
pub use result::{DeltaReport, DeltaSummary, StageClaim};
