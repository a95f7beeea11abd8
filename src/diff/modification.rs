//! Modification stage: claims common keys whose values differ.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::config::StageKind;
use crate::model::{DeltaState, Entity, KeyedEntities};

use super::marker::Marker;
use super::matcher::{ClaimedKeys, MatchPolicy, MatchSet, Matcher};

/// One modified entity: its existing and new versions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModificationPair {
    pub existing: Entity,
    pub new: Entity,
}

/// Stable read-only view of the modifications one pass found, keyed by
/// entity key in existing-collection extraction order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModificationSet {
    pairs: IndexMap<String, ModificationPair>,
}

impl ModificationSet {
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ModificationPair> {
        self.pairs.get(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.pairs.contains_key(key)
    }

    /// Iterate `(key, pair)` in extraction order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ModificationPair)> {
        self.pairs.iter().map(|(k, p)| (k.as_str(), p))
    }

    /// Iterate `(existing, new)` entity pairs.
    pub fn pairs(&self) -> impl Iterator<Item = (&Entity, &Entity)> {
        self.pairs.values().map(|p| (&p.existing, &p.new))
    }

    fn insert(&mut self, key: String, existing: Entity, new: Entity) {
        self.pairs.insert(key, ModificationPair { existing, new });
    }
}

/// Policy claiming keys present in both collections where both sides
/// carry a value and the values differ.
///
/// An absent value on either side means "cannot determine modification";
/// such keys are never in the modification set. The modifications mapping
/// is populated in the same scan that computes the match set; there is no
/// separate computation step.
#[derive(Debug, Default)]
pub struct ModificationPolicy {
    mark_residual: bool,
    modifications: ModificationSet,
}

impl ModificationPolicy {
    #[must_use]
    pub fn new() -> Self {
        Self {
            mark_residual: true,
            modifications: ModificationSet::default(),
        }
    }

    pub(crate) fn set_mark_residual(&mut self, mark: bool) {
        self.mark_residual = mark;
    }

    pub(crate) fn modifications(&self) -> &ModificationSet {
        &self.modifications
    }
}

impl MatchPolicy for ModificationPolicy {
    fn kind(&self) -> StageKind {
        StageKind::Modification
    }

    fn matched_state(&self) -> Option<DeltaState> {
        Some(DeltaState::Modification)
    }

    fn marks_residual(&self) -> bool {
        self.mark_residual
    }

    fn calculate(
        &mut self,
        existing: &KeyedEntities,
        new: &KeyedEntities,
        claimed: &ClaimedKeys,
    ) -> MatchSet {
        let mut matches = MatchSet::new();

        for (key, existing_entity) in existing.iter() {
            if claimed.contains(key) {
                continue;
            }
            let Some(new_entity) = new.get(key) else {
                continue;
            };
            if let (Some(existing_value), Some(new_value)) =
                (existing_entity.value(), new_entity.value())
            {
                if existing_value != new_value {
                    self.modifications.insert(
                        key.to_string(),
                        existing_entity.clone(),
                        new_entity.clone(),
                    );
                    matches.insert(key.to_string());
                }
            }
        }

        matches
    }
}

/// Matcher pass claiming differing-value common keys as MODIFICATION.
///
/// When run as a residual stage (the default), everything not claimed as
/// a modification and not claimed by an earlier pass is swept into
/// DELETION (existing snapshot) and ADDITION (new snapshot). Run alone,
/// that sweep also catches common keys with equal values; a preceding
/// exact-match pass is what keeps unchanged entities out of it.
pub type ModificationMatcher<'a> = Matcher<'a, ModificationPolicy>;

impl<'a> ModificationMatcher<'a> {
    pub fn new(
        existing: &'a KeyedEntities,
        new: &'a KeyedEntities,
        marker: &'a dyn Marker,
    ) -> Self {
        Matcher::with_policy(ModificationPolicy::new(), existing, new, marker)
    }

    /// Disable the addition/deletion sweep; this pass then only claims
    /// and marks modifications.
    #[must_use]
    pub fn without_residual(mut self) -> Self {
        self.policy_mut().set_mark_residual(false);
        self
    }

    /// The modifications this pass found, memoized on first access.
    ///
    /// Available after [`run`](Matcher::run) or after calling this getter
    /// alone; repeated calls return the identical mapping.
    pub fn modifications(&mut self) -> &ModificationSet {
        self.ensure_matches();
        self.policy().modifications()
    }
}
