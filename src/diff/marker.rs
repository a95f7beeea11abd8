//! Path marking: projecting match verdicts back onto the graph.
//!
//! A [`Marker`] decouples *what got matched* from *how a path is located
//! and annotated*. Record-level and attribute-level entities resolve
//! differently, so markers are pluggable per [`EntityKind`].

use std::collections::BTreeSet;

use crate::error::{ErrorContext, GraphDeltaError, Result};
use crate::graph::SnapshotAccessor;
use crate::model::{DeltaState, EntityKind, KeyedEntities};

/// Capability to annotate the paths behind a batch of entity keys.
pub trait Marker {
    /// Resolve each key via the snapshot's accessor and annotate its path.
    ///
    /// `entities` is the collection the keys were drawn from. A key with
    /// no resolvable path is logged and skipped when its entity carries a
    /// comparison value; one bad path must not void a diff over N
    /// entities. An entity with neither a value nor a resolvable path has
    /// nothing identifying it at all and is rejected as a precondition
    /// violation. Store failures abort the batch and surface to the
    /// caller.
    fn mark(
        &self,
        keys: &BTreeSet<String>,
        entities: &KeyedEntities,
        matched: bool,
        state: Option<DeltaState>,
        snapshot: &mut dyn SnapshotAccessor,
        root_uri: &str,
    ) -> Result<()>;
}

/// Reference marker for entity paths of one kind.
///
/// Entity keys are qualified with the kind's namespace before resolution,
/// so resource-level and attribute-level paths under the same record root
/// never collide. The accessor handles everything else about how a path
/// of this kind is materialized.
#[derive(Debug, Clone, Copy)]
pub struct PathMarker {
    kind: EntityKind,
}

impl PathMarker {
    #[must_use]
    pub fn new(kind: EntityKind) -> Self {
        Self { kind }
    }

    /// Marker for whole-record paths.
    #[must_use]
    pub fn resource() -> Self {
        Self::new(EntityKind::Resource)
    }

    /// Marker for single-attribute paths.
    #[must_use]
    pub fn attribute() -> Self {
        Self::new(EntityKind::Attribute)
    }

    #[must_use]
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// The qualified key this marker resolves paths under. Extraction
    /// collaborators register paths with the same convention.
    #[must_use]
    pub fn qualify(&self, key: &str) -> String {
        format!("{}:{}", self.kind.namespace(), key)
    }
}

impl Marker for PathMarker {
    fn mark(
        &self,
        keys: &BTreeSet<String>,
        entities: &KeyedEntities,
        matched: bool,
        state: Option<DeltaState>,
        snapshot: &mut dyn SnapshotAccessor,
        root_uri: &str,
    ) -> Result<()> {
        for key in keys {
            let qualified = self.qualify(key);
            let resolved = snapshot
                .find_path(root_uri, &qualified)
                .with_context(|| format!("resolving path for key '{key}'"))?;

            match resolved {
                Some(path) => {
                    snapshot
                        .annotate(path, matched, state)
                        .with_context(|| format!("marking key '{key}'"))?;
                }
                None => {
                    let valueless = entities
                        .get(key)
                        .map_or(false, |entity| entity.value().is_none());
                    if valueless {
                        return Err(GraphDeltaError::precondition(format!(
                            "entity '{key}' has neither a value nor a resolvable \
                             path in snapshot '{}'",
                            snapshot.id()
                        )));
                    }
                    tracing::warn!(
                        snapshot = %snapshot.id(),
                        %root_uri,
                        key = %qualified,
                        "no path found for entity key, skipping"
                    );
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{MemoryGraph, PathHandle};
    use crate::model::{ComparableValue, Entity};

    fn keys(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn entities(items: &[(&str, bool)]) -> KeyedEntities {
        KeyedEntities::from_entities(items.iter().enumerate().map(|(i, (key, valued))| {
            let handle = PathHandle::from_index(i);
            if *valued {
                Entity::new(*key, ComparableValue::Literal("v".into()), handle)
            } else {
                Entity::keyed(*key, handle)
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_marks_resolved_paths() {
        let marker = PathMarker::attribute();
        let mut graph = MemoryGraph::new("existing");
        graph.register_simple_path("root", &marker.qualify("k1"));

        marker
            .mark(
                &keys(&["k1"]),
                &entities(&[("k1", true)]),
                true,
                Some(DeltaState::Deletion),
                &mut graph,
                "root",
            )
            .unwrap();

        let annotation = graph.annotation_for("root", &marker.qualify("k1")).unwrap();
        assert_eq!(annotation.matched, Some(true));
        assert_eq!(annotation.delta_state, Some(DeltaState::Deletion));
    }

    #[test]
    fn test_unresolvable_key_is_skipped_not_fatal() {
        let marker = PathMarker::resource();
        let mut graph = MemoryGraph::new("existing");
        graph.register_simple_path("root", &marker.qualify("good"));

        // "ghost" carries a value but resolves to nothing; the batch
        // still completes.
        marker
            .mark(
                &keys(&["ghost", "good"]),
                &entities(&[("ghost", true), ("good", true)]),
                false,
                Some(DeltaState::Addition),
                &mut graph,
                "root",
            )
            .unwrap();

        let annotation = graph
            .annotation_for("root", &marker.qualify("good"))
            .unwrap();
        assert_eq!(annotation.delta_state, Some(DeltaState::Addition));
    }

    #[test]
    fn test_valueless_entity_without_path_is_rejected() {
        let marker = PathMarker::attribute();
        let mut graph = MemoryGraph::new("new");

        // Neither a comparison value nor a registered path: nothing
        // identifies the entity, so the batch fails instead of skipping.
        let err = marker
            .mark(
                &keys(&["ghost"]),
                &entities(&[("ghost", false)]),
                false,
                Some(DeltaState::Addition),
                &mut graph,
                "root",
            )
            .unwrap_err();
        assert!(matches!(err, GraphDeltaError::Precondition(_)));
        assert!(err.to_string().contains("ghost"));
    }

    #[test]
    fn test_valueless_entity_with_path_is_marked() {
        let marker = PathMarker::attribute();
        let mut graph = MemoryGraph::new("existing");
        graph.register_simple_path("root", &marker.qualify("k"));

        marker
            .mark(
                &keys(&["k"]),
                &entities(&[("k", false)]),
                false,
                Some(DeltaState::Deletion),
                &mut graph,
                "root",
            )
            .unwrap();

        let annotation = graph.annotation_for("root", &marker.qualify("k")).unwrap();
        assert_eq!(annotation.matched, Some(false));
        assert_eq!(annotation.delta_state, Some(DeltaState::Deletion));
    }

    #[test]
    fn test_kind_namespaces_do_not_collide() {
        let resource = PathMarker::resource();
        let attribute = PathMarker::attribute();
        assert_ne!(resource.qualify("k"), attribute.qualify("k"));
    }
}
