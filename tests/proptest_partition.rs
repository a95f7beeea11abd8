//! Property-based tests for the partition contract.
//!
//! For arbitrary entity collections, a default pipeline run must settle
//! every key in existing ∪ new exactly once, classification driven only
//! by value presence and equality.

use proptest::prelude::*;
use std::collections::BTreeMap;

use graph_delta::diff::{DeltaPipeline, PathMarker, SnapshotPair, SnapshotSide};
use graph_delta::graph::MemoryGraph;
use graph_delta::model::{ComparableValue, DeltaState, Entity, KeyedEntities};

const ROOT: &str = "http://example.org/records/p";

type Fixture = BTreeMap<String, Option<u8>>;

fn build_snapshot(id: &str, marker: &PathMarker, items: &Fixture) -> (MemoryGraph, KeyedEntities) {
    let mut graph = MemoryGraph::new(id);
    let entities: Vec<Entity> = items
        .iter()
        .map(|(key, value)| {
            let path = graph.register_simple_path(ROOT, &marker.qualify(key));
            match value {
                Some(v) => Entity::new(
                    key.clone(),
                    ComparableValue::Literal(v.to_string()),
                    path,
                ),
                None => Entity::keyed(key.clone(), path),
            }
        })
        .collect();
    let entities = KeyedEntities::from_entities(entities).expect("BTreeMap keys are unique");
    (graph, entities)
}

fn fixture_strategy() -> impl Strategy<Value = Fixture> {
    prop::collection::btree_map("[a-f]", prop::option::of(0u8..3), 0..8)
}

proptest! {
    #[test]
    fn partition_is_complete_and_disjoint(
        existing_items in fixture_strategy(),
        new_items in fixture_strategy(),
    ) {
        let marker = PathMarker::attribute();
        let (mut existing_graph, existing) = build_snapshot("existing", &marker, &existing_items);
        let (mut new_graph, new) = build_snapshot("new", &marker, &new_items);

        let mut snapshots = SnapshotPair {
            existing: SnapshotSide { accessor: &mut existing_graph, root_uri: ROOT },
            new: SnapshotSide { accessor: &mut new_graph, root_uri: ROOT },
        };
        let report = DeltaPipeline::new()
            .run(&existing, &new, &mut snapshots, &marker)
            .expect("pipeline run");

        let mut unchanged = 0usize;
        let mut modifications = 0usize;
        let mut additions = 0usize;
        let mut deletions = 0usize;

        let all_keys: std::collections::BTreeSet<&String> =
            existing_items.keys().chain(new_items.keys()).collect();

        for key in all_keys {
            let existing_value = existing_items.get(key);
            let new_value = new_items.get(key);

            match (existing_value, new_value) {
                (Some(ev), Some(nv)) if ev == nv => {
                    // Unchanged (equal values or key-presence match):
                    // matched, no state, never in the modification set.
                    unchanged += 1;
                    prop_assert!(!report.modifications.contains_key(key));
                    let a = existing_graph.annotation_for(ROOT, &marker.qualify(key)).unwrap();
                    prop_assert_eq!((a.matched, a.delta_state), (Some(true), None));
                }
                (Some(Some(_)), Some(Some(_))) => {
                    // Both values present, differing: a modification.
                    modifications += 1;
                    prop_assert!(report.modifications.contains_key(key));
                    for graph in [&existing_graph, &new_graph] {
                        let a = graph.annotation_for(ROOT, &marker.qualify(key)).unwrap();
                        prop_assert_eq!(
                            (a.matched, a.delta_state),
                            (Some(true), Some(DeltaState::Modification))
                        );
                    }
                }
                (Some(_), Some(_)) => {
                    // Value on exactly one side: cannot determine
                    // modification, swept both ways by the residual.
                    deletions += 1;
                    additions += 1;
                    prop_assert!(!report.modifications.contains_key(key));
                    let d = existing_graph.annotation_for(ROOT, &marker.qualify(key)).unwrap();
                    prop_assert_eq!(d.delta_state, Some(DeltaState::Deletion));
                    let a = new_graph.annotation_for(ROOT, &marker.qualify(key)).unwrap();
                    prop_assert_eq!(a.delta_state, Some(DeltaState::Addition));
                }
                (Some(_), None) => {
                    deletions += 1;
                    prop_assert!(!report.modifications.contains_key(key));
                    let a = existing_graph.annotation_for(ROOT, &marker.qualify(key)).unwrap();
                    prop_assert_eq!(
                        (a.matched, a.delta_state),
                        (Some(false), Some(DeltaState::Deletion))
                    );
                }
                (None, Some(_)) => {
                    additions += 1;
                    prop_assert!(!report.modifications.contains_key(key));
                    let a = new_graph.annotation_for(ROOT, &marker.qualify(key)).unwrap();
                    prop_assert_eq!(
                        (a.matched, a.delta_state),
                        (Some(false), Some(DeltaState::Addition))
                    );
                }
                (None, None) => unreachable!("key drawn from the union"),
            }
        }

        prop_assert_eq!(report.summary.unchanged, unchanged);
        prop_assert_eq!(report.summary.modifications, modifications);
        prop_assert_eq!(report.summary.additions, additions);
        prop_assert_eq!(report.summary.deletions, deletions);
        prop_assert_eq!(report.modifications.len(), modifications);
    }

    #[test]
    fn none_collections_never_produce_modifications(new_items in fixture_strategy()) {
        let marker = PathMarker::attribute();
        let existing = KeyedEntities::none();
        let mut existing_graph = MemoryGraph::new("existing");
        let (mut new_graph, new) = build_snapshot("new", &marker, &new_items);

        let mut snapshots = SnapshotPair {
            existing: SnapshotSide { accessor: &mut existing_graph, root_uri: ROOT },
            new: SnapshotSide { accessor: &mut new_graph, root_uri: ROOT },
        };
        let report = DeltaPipeline::new()
            .run(&existing, &new, &mut snapshots, &marker)
            .expect("pipeline run");

        prop_assert!(report.modifications.is_empty());
        prop_assert_eq!(report.summary.modifications, 0);
        prop_assert_eq!(report.summary.unchanged, 0);
        prop_assert_eq!(report.summary.additions, new_items.len());
    }
}
