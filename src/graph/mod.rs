//! Snapshot accessor contract and the in-memory reference store.
//!
//! The engine reads and writes each snapshot exclusively through
//! [`SnapshotAccessor`]. A path is an equality-opaque token: the engine
//! resolves entity keys to [`PathHandle`]s and annotates them, but never
//! inspects path structure. All access happens inside a bounded
//! transactional scope owned by the caller; the engine issues reads and
//! writes within it and never opens or closes transactions itself.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{GraphDeltaError, Result, StoreErrorKind};
use crate::model::{DeltaState, DELTA_STATE_PROPERTY, MATCHED_PROPERTY};

/// Opaque token for a concrete path/subgraph inside one snapshot.
///
/// Handles are only meaningful against the snapshot that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathHandle(usize);

impl PathHandle {
    /// Wrap a raw path index. Intended for accessor implementations and
    /// the extraction collaborator.
    #[must_use]
    pub fn from_index(index: usize) -> Self {
        Self(index)
    }

    /// Raw index, for accessor implementations.
    #[must_use]
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Read/write façade over one graph snapshot.
///
/// Implementations must make [`annotate`](SnapshotAccessor::annotate) a
/// set, not an append: repeating a call with identical arguments leaves
/// the store unchanged.
pub trait SnapshotAccessor {
    /// Snapshot identity, carried in store errors.
    fn id(&self) -> &str;

    /// Resolve an entity key to the path representing it under the given
    /// record root.
    ///
    /// Returns `Ok(None)` when the key has no structural counterpart here.
    /// Keys drawn from this snapshot's own extraction should always
    /// resolve; a miss is still not an error at this layer.
    fn find_path(&self, root_uri: &str, key: &str) -> Result<Option<PathHandle>>;

    /// Set the matched flag and, if present, the delta state on every node
    /// and relationship along the path.
    fn annotate(
        &mut self,
        path: PathHandle,
        matched: bool,
        state: Option<DeltaState>,
    ) -> Result<()>;
}

/// Annotation state of one node or relationship, readable back for
/// verification and export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub matched: Option<bool>,
    pub delta_state: Option<DeltaState>,
}

impl Annotation {
    /// The annotation as graph property key/value pairs, keyed by
    /// [`MATCHED_PROPERTY`] and [`DELTA_STATE_PROPERTY`]. Unset fields
    /// produce no pair; a store-backed accessor writes exactly these
    /// properties onto each path element.
    #[must_use]
    pub fn properties(&self) -> Vec<(&'static str, String)> {
        let mut properties = Vec::with_capacity(2);
        if let Some(matched) = self.matched {
            properties.push((MATCHED_PROPERTY, matched.to_string()));
        }
        if let Some(state) = self.delta_state {
            properties.push((DELTA_STATE_PROPERTY, state.as_property_value().to_string()));
        }
        properties
    }
}

#[derive(Debug, Clone, Default)]
struct PathRecord {
    nodes: Vec<usize>,
    relationships: Vec<usize>,
}

/// In-memory property-graph snapshot.
///
/// Reference [`SnapshotAccessor`] used by the test suites and by embedded
/// callers that extract entities into process memory before diffing. Paths
/// are registered by the extraction collaborator under `(root_uri, key)`;
/// annotations land on the nodes and relationships the path covers.
#[derive(Debug, Default)]
pub struct MemoryGraph {
    id: String,
    node_annotations: HashMap<usize, Annotation>,
    rel_annotations: HashMap<usize, Annotation>,
    paths: Vec<PathRecord>,
    path_index: HashMap<(String, String), PathHandle>,
    next_node: usize,
    next_rel: usize,
}

impl MemoryGraph {
    /// Create an empty snapshot with the given identity.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Allocate a node.
    pub fn add_node(&mut self) -> usize {
        let id = self.next_node;
        self.next_node += 1;
        self.node_annotations.insert(id, Annotation::default());
        id
    }

    /// Allocate a relationship.
    pub fn add_relationship(&mut self) -> usize {
        let id = self.next_rel;
        self.next_rel += 1;
        self.rel_annotations.insert(id, Annotation::default());
        id
    }

    /// Register the path a key resolves to under a record root.
    pub fn register_path(
        &mut self,
        root_uri: &str,
        key: &str,
        nodes: Vec<usize>,
        relationships: Vec<usize>,
    ) -> PathHandle {
        let handle = PathHandle::from_index(self.paths.len());
        self.paths.push(PathRecord {
            nodes,
            relationships,
        });
        self.path_index
            .insert((root_uri.to_string(), key.to_string()), handle);
        handle
    }

    /// Convenience for tests: a fresh single-node, single-relationship
    /// path registered under `(root_uri, key)`.
    pub fn register_simple_path(&mut self, root_uri: &str, key: &str) -> PathHandle {
        let node = self.add_node();
        let rel = self.add_relationship();
        self.register_path(root_uri, key, vec![node], vec![rel])
    }

    /// Annotation currently persisted on a node.
    #[must_use]
    pub fn node_annotation(&self, node: usize) -> Option<Annotation> {
        self.node_annotations.get(&node).copied()
    }

    /// Annotation currently persisted on a relationship.
    #[must_use]
    pub fn rel_annotation(&self, rel: usize) -> Option<Annotation> {
        self.rel_annotations.get(&rel).copied()
    }

    /// Annotation on the first node of the path a key resolves to.
    /// Test helper; every element of a path carries the same annotation.
    #[must_use]
    pub fn annotation_for(&self, root_uri: &str, key: &str) -> Option<Annotation> {
        let handle = self
            .path_index
            .get(&(root_uri.to_string(), key.to_string()))?;
        let record = self.paths.get(handle.index())?;
        record
            .nodes
            .first()
            .and_then(|n| self.node_annotation(*n))
    }
}

impl SnapshotAccessor for MemoryGraph {
    fn id(&self) -> &str {
        &self.id
    }

    fn find_path(&self, root_uri: &str, key: &str) -> Result<Option<PathHandle>> {
        Ok(self
            .path_index
            .get(&(root_uri.to_string(), key.to_string()))
            .copied())
    }

    fn annotate(
        &mut self,
        path: PathHandle,
        matched: bool,
        state: Option<DeltaState>,
    ) -> Result<()> {
        let record = self.paths.get(path.index()).cloned().ok_or_else(|| {
            GraphDeltaError::store(
                &self.id,
                "annotating path",
                StoreErrorKind::DanglingHandle(path.index()),
            )
        })?;

        for node in &record.nodes {
            let annotation = self.node_annotations.entry(*node).or_default();
            annotation.matched = Some(matched);
            if state.is_some() {
                annotation.delta_state = state;
            }
        }
        for rel in &record.relationships {
            let annotation = self.rel_annotations.entry(*rel).or_default();
            annotation.matched = Some(matched);
            if state.is_some() {
                annotation.delta_state = state;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_path_miss_is_none_not_error() {
        let graph = MemoryGraph::new("existing");
        let resolved = graph.find_path("http://example.org/r1", "no-such-key");
        assert!(matches!(resolved, Ok(None)));
    }

    #[test]
    fn test_annotate_covers_all_path_elements() {
        let mut graph = MemoryGraph::new("existing");
        let n1 = graph.add_node();
        let n2 = graph.add_node();
        let r1 = graph.add_relationship();
        let handle = graph.register_path("root", "k", vec![n1, n2], vec![r1]);

        graph
            .annotate(handle, true, Some(DeltaState::Modification))
            .unwrap();

        for node in [n1, n2] {
            let annotation = graph.node_annotation(node).unwrap();
            assert_eq!(annotation.matched, Some(true));
            assert_eq!(annotation.delta_state, Some(DeltaState::Modification));
        }
        let annotation = graph.rel_annotation(r1).unwrap();
        assert_eq!(annotation.matched, Some(true));
        assert_eq!(annotation.delta_state, Some(DeltaState::Modification));
    }

    #[test]
    fn test_annotate_is_idempotent() {
        let mut graph = MemoryGraph::new("new");
        let handle = graph.register_simple_path("root", "k");

        graph
            .annotate(handle, true, Some(DeltaState::Addition))
            .unwrap();
        let first = graph.annotation_for("root", "k").unwrap();

        graph
            .annotate(handle, true, Some(DeltaState::Addition))
            .unwrap();
        let second = graph.annotation_for("root", "k").unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_annotate_without_state_keeps_existing_state_clear() {
        let mut graph = MemoryGraph::new("new");
        let handle = graph.register_simple_path("root", "k");

        graph.annotate(handle, true, None).unwrap();
        let annotation = graph.annotation_for("root", "k").unwrap();
        assert_eq!(annotation.matched, Some(true));
        assert_eq!(annotation.delta_state, None);
    }

    #[test]
    fn test_annotation_exports_named_properties() {
        let mut graph = MemoryGraph::new("new");
        let handle = graph.register_simple_path("root", "k");
        graph
            .annotate(handle, false, Some(DeltaState::Addition))
            .unwrap();

        let annotation = graph.annotation_for("root", "k").unwrap();
        assert_eq!(
            annotation.properties(),
            vec![
                (MATCHED_PROPERTY, "false".to_string()),
                (DELTA_STATE_PROPERTY, "ADDITION".to_string()),
            ]
        );

        // An untouched element exports nothing.
        assert!(Annotation::default().properties().is_empty());
    }

    #[test]
    fn test_dangling_handle_is_store_error() {
        let mut graph = MemoryGraph::new("existing");
        let err = graph
            .annotate(PathHandle::from_index(99), false, None)
            .unwrap_err();
        match err {
            GraphDeltaError::Store { snapshot, .. } => assert_eq!(snapshot, "existing"),
            other => panic!("expected Store error, got {other:?}"),
        }
    }
}
