//! Exact-match stage: claims unchanged entities.

use crate::config::StageKind;
use crate::model::{DeltaState, KeyedEntities};

use super::marker::Marker;
use super::matcher::{ClaimedKeys, MatchPolicy, MatchSet, Matcher};

/// Policy claiming keys present in both snapshots whose comparison
/// outcome is "unchanged": equal values, or no value on either side
/// (key-presence matching).
///
/// Matched paths get `matched = true` and no delta state; an unchanged
/// entity is never annotated with one. The stage never marks residual,
/// so everything it leaves unclaimed stays in play for later passes.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExactPolicy;

impl MatchPolicy for ExactPolicy {
    fn kind(&self) -> StageKind {
        StageKind::ExactMatch
    }

    fn matched_state(&self) -> Option<DeltaState> {
        None
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
            let unchanged = match (existing_entity.value(), new_entity.value()) {
                (Some(a), Some(b)) => a == b,
                (None, None) => true,
                _ => false,
            };
            if unchanged {
                matches.insert(key.to_string());
            }
        }

        matches
    }
}

/// Matcher pass that claims unchanged entities so later stages only see
/// what is genuinely in play.
pub type ExactMatcher<'a> = Matcher<'a, ExactPolicy>;

impl<'a> ExactMatcher<'a> {
    pub fn new(
        existing: &'a KeyedEntities,
        new: &'a KeyedEntities,
        marker: &'a dyn Marker,
    ) -> Self {
        Matcher::with_policy(ExactPolicy, existing, new, marker)
    }
}
