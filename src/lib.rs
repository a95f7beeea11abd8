//! **Delta detection for versioned records in a property graph.**
//!
//! `graph-delta` compares two snapshots of the same logical resource — an
//! "existing" version and a "new" version, each living in its own graph
//! store under a root resource URI — and determines, at fine structural
//! granularity, which parts of the record were added, deleted, or
//! modified. The verdict is written back onto the graph itself as
//! queryable annotations (`matched` and `delta_state` properties on every
//! node and relationship of the affected paths).
//!
//! The crate is the matching core of a larger versioning service: parsing
//! wire formats into the graph, extracting keyed entities from paths, and
//! the transport that triggers a diff job are all external collaborators.
//! The engine consumes already-extracted, already-keyed entities.
//!
//! ## Core Concepts & Modules
//!
//! - **[`model`]**: [`Entity`] — a stable structural key plus an optional
//!   comparison value — collected per snapshot into [`KeyedEntities`],
//!   and [`DeltaState`], the classification persisted on paths.
//! - **[`graph`]**: the [`SnapshotAccessor`] contract the engine requires
//!   from each snapshot (resolve a key to an opaque [`PathHandle`],
//!   idempotently annotate it), plus [`MemoryGraph`], an in-process
//!   reference store.
//! - **[`diff`]**: the matcher pipeline. An exact-match pass claims
//!   unchanged entities, a modification pass claims differing-value
//!   entities, and the residual is swept into additions and deletions.
//! - **[`config`]**: which stages run, in what order, and whether the
//!   final stage marks the residual.
//!
//! ## Getting Started: Diffing Two Snapshots
//!
//! ```
//! use graph_delta::diff::{DeltaPipeline, PathMarker, SnapshotPair, SnapshotSide};
//! use graph_delta::graph::MemoryGraph;
//! use graph_delta::model::{ComparableValue, Entity, KeyedEntities};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let marker = PathMarker::attribute();
//!
//!     // Normally the extraction collaborator builds these from the store.
//!     let mut existing_graph = MemoryGraph::new("existing");
//!     let path = existing_graph.register_simple_path("http://example.org/r1", &marker.qualify("dc:title"));
//!     let existing = KeyedEntities::from_entities(vec![Entity::new(
//!         "dc:title",
//!         ComparableValue::Literal("old title".into()),
//!         path,
//!     )])?;
//!
//!     let mut new_graph = MemoryGraph::new("new");
//!     let path = new_graph.register_simple_path("http://example.org/r1", &marker.qualify("dc:title"));
//!     let new = KeyedEntities::from_entities(vec![Entity::new(
//!         "dc:title",
//!         ComparableValue::Literal("new title".into()),
//!         path,
//!     )])?;
//!
//!     let mut snapshots = SnapshotPair {
//!         existing: SnapshotSide { accessor: &mut existing_graph, root_uri: "http://example.org/r1" },
//!         new: SnapshotSide { accessor: &mut new_graph, root_uri: "http://example.org/r1" },
//!     };
//!     let report = DeltaPipeline::new().run(&existing, &new, &mut snapshots, &marker)?;
//!
//!     assert_eq!(report.summary.modifications, 1);
//!     Ok(())
//! }
//! ```
//!
//! ## Concurrency & Transactions
//!
//! A diff job runs synchronously and single-threaded inside transactional
//! scopes the caller owns, one per snapshot. The engine never opens or
//! closes transactions and performs no locking; on a store failure the
//! caller rolls the transaction back and the whole pass is voided.

// Lint to discourage unwrap() in production code - prefer explicit error handling
#![warn(clippy::unwrap_used)]
#![allow(
    // # Errors / # Panics doc sections are aspirational for this API surface
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    // Variable names like `old`/`new` or `existing`/`new` are clear in context
    clippy::similar_names
)]

pub mod config;
pub mod diff;
pub mod error;
pub mod graph;
pub mod model;

// Re-export main types for convenience
pub use config::{DeltaConfig, StageKind};
pub use diff::{
    ClaimedKeys, DeltaPipeline, DeltaReport, DeltaSummary, ExactMatcher, Marker,
    ModificationMatcher, ModificationSet, PathMarker, SnapshotPair, SnapshotSide,
};
pub use error::{ErrorContext, GraphDeltaError, OptionContext, Result, StoreErrorKind};
pub use graph::{Annotation, MemoryGraph, PathHandle, SnapshotAccessor};
pub use model::{ComparableValue, DeltaState, Entity, EntityKind, KeyedEntities};
