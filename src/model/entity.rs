//! Comparable entities extracted from graph paths.
//!
//! An entity's key is a structural identity computed once per path by the
//! extraction collaborator (derived from the chain of predicate and type
//! labels from the record root, never from a store-assigned numeric id),
//! so it is stable and comparable across two independently-grown graphs.

use serde::{Deserialize, Serialize};
use std::fmt;
use xxhash_rust::xxh3::xxh3_64;

use crate::error::{GraphDeltaError, Result};
use crate::graph::PathHandle;

/// The payload an entity carries for value comparison.
///
/// Entities with no comparable value are matched on key presence alone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparableValue {
    /// Literal object text, e.g. the value of a `rdfs:label` statement.
    Literal(String),
    /// Structural hash over a sub-graph (order-independent content digest).
    Hash(u64),
    /// A type URI, compared verbatim.
    TypeUri(String),
}

impl ComparableValue {
    /// Build a structural [`ComparableValue::Hash`] over pre-serialized
    /// sub-graph content.
    #[must_use]
    pub fn hash_of(content: &[u8]) -> Self {
        ComparableValue::Hash(xxh3_64(content))
    }
}

impl fmt::Display for ComparableValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComparableValue::Literal(s) => write!(f, "literal:{s}"),
            ComparableValue::Hash(h) => write!(f, "hash:{h:016x}"),
            ComparableValue::TypeUri(u) => write!(f, "type:{u}"),
        }
    }
}

/// Kind of graph path an entity was extracted from.
///
/// Record-level and attribute-level paths are resolved and annotated
/// differently by the snapshot accessor; markers are pluggable per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A whole-record path from the resource root.
    Resource,
    /// A single-attribute path (one predicate hop plus its object).
    Attribute,
}

impl EntityKind {
    /// Namespace prefix under which the accessor registers paths of this
    /// kind. Keeps resource-level and attribute-level keys from colliding
    /// in one snapshot.
    #[must_use]
    pub fn namespace(&self) -> &'static str {
        match self {
            EntityKind::Resource => "resource",
            EntityKind::Attribute => "attribute",
        }
    }
}

/// A keyed, optionally-valued unit of comparison.
///
/// Equality covers key and value only; `source_path` is an opaque handle
/// into one specific snapshot and identifies nothing across snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    key: String,
    value: Option<ComparableValue>,
    /// Opaque reference back to the path in the owning snapshot. Used only
    /// for annotation, never for equality.
    source_path: PathHandle,
}

impl Entity {
    /// Create an entity carrying a comparison value.
    pub fn new(
        key: impl Into<String>,
        value: ComparableValue,
        source_path: PathHandle,
    ) -> Self {
        Self {
            key: key.into(),
            value: Some(value),
            source_path,
        }
    }

    /// Create an entity matched on key presence alone.
    pub fn keyed(key: impl Into<String>, source_path: PathHandle) -> Self {
        Self {
            key: key.into(),
            value: None,
            source_path,
        }
    }

    /// Structural identity, stable across snapshots.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Comparison payload, if this entity carries one.
    #[must_use]
    pub fn value(&self) -> Option<&ComparableValue> {
        self.value.as_ref()
    }

    /// Path reference in the owning snapshot.
    #[must_use]
    pub fn source_path(&self) -> PathHandle {
        self.source_path
    }
}

impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.value == other.value
    }
}

impl Eq for Entity {}

/// One snapshot's extracted entities of a single kind, keyed by structural
/// identity.
///
/// `KeyedEntities::none()` means the snapshot has no extractable entities of
/// this kind at all; an extracted-but-empty mapping is a distinct state
/// (visible via [`KeyedEntities::is_extracted`]) that behaves identically
/// for matching.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeyedEntities {
    entities: Option<indexmap::IndexMap<String, Entity>>,
}

impl KeyedEntities {
    /// The snapshot yielded no entities of this kind.
    #[must_use]
    pub fn none() -> Self {
        Self { entities: None }
    }

    /// Build a collection from extracted entities.
    ///
    /// Fails fast on a duplicate key: silently keeping one entry would
    /// corrupt the diff's correctness guarantees.
    pub fn from_entities(entities: impl IntoIterator<Item = Entity>) -> Result<Self> {
        let mut map = indexmap::IndexMap::new();
        for entity in entities {
            let key = entity.key().to_string();
            if map.insert(key.clone(), entity).is_some() {
                return Err(GraphDeltaError::duplicate_key(key));
            }
        }
        Ok(Self {
            entities: Some(map),
        })
    }

    /// Whether extraction produced a mapping at all (even an empty one).
    #[must_use]
    pub fn is_extracted(&self) -> bool {
        self.entities.is_some()
    }

    /// Number of entities; zero for both the `none` and the empty case.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.as_ref().map_or(0, indexmap::IndexMap::len)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up an entity by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Entity> {
        self.entities.as_ref().and_then(|m| m.get(key))
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Iterate entities in extraction order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Entity)> {
        self.entities
            .iter()
            .flat_map(|m| m.iter())
            .map(|(k, e)| (k.as_str(), e))
    }

    /// Iterate keys in extraction order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.iter().map(|(k, _)| k)
    }
}
