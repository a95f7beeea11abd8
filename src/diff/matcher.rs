//! Shared match/mark machinery for all pipeline stages.
//!
//! A [`Matcher`] is single-use: it computes its match set at most once
//! (memoized as a sum type, not a boolean guard) and drives the phase
//! machine `Unstarted -> MatchesComputed -> MatchedPathsMarked -> Done`
//! in one [`Matcher::run`] call. Running it again is a no-op that returns
//! the cached outcome; annotations are never written twice.

use std::collections::BTreeSet;

use crate::config::StageKind;
use crate::error::Result;
use crate::graph::SnapshotAccessor;
use crate::model::{DeltaState, KeyedEntities};

use super::marker::Marker;

/// The set of entity keys a stage claims.
pub type MatchSet = BTreeSet<String>;

/// Keys already claimed by earlier pipeline stages.
///
/// Threaded explicitly between stages: a stage never compares, claims, or
/// annotates a key some earlier pass already settled.
#[derive(Debug, Clone, Default)]
pub struct ClaimedKeys(BTreeSet<String>);

impl ClaimedKeys {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains(key)
    }

    pub fn claim(&mut self, key: impl Into<String>) {
        self.0.insert(key.into());
    }

    pub fn extend(&mut self, keys: impl IntoIterator<Item = String>) {
        self.0.extend(keys);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// One snapshot plus the root resource it is diffed under.
pub struct SnapshotSide<'a> {
    pub accessor: &'a mut dyn SnapshotAccessor,
    pub root_uri: &'a str,
}

/// The two snapshots of one diff job.
pub struct SnapshotPair<'a> {
    pub existing: SnapshotSide<'a>,
    pub new: SnapshotSide<'a>,
}

/// Progress of a single matcher through its one-shot protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPhase {
    Unstarted,
    MatchesComputed,
    MatchedPathsMarked,
    Done,
}

/// Memoized match computation: either not yet run, or its result.
#[derive(Debug)]
enum MatchCache {
    NotComputed,
    Computed(MatchSet),
}

/// What one stage did: the keys it claimed as matches and, for a residual
/// stage, the keys it swept into additions and deletions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageOutcome {
    pub stage: StageKind,
    pub matched: MatchSet,
    pub additions: MatchSet,
    pub deletions: MatchSet,
}

impl StageOutcome {
    /// All keys this stage settled, in whatever role.
    pub fn claimed_keys(&self) -> impl Iterator<Item = &String> {
        self.matched
            .iter()
            .chain(self.additions.iter())
            .chain(self.deletions.iter())
    }
}

/// Stage-specific matching policy behind the shared driver.
///
/// The closed set of policies lives in the sibling modules: exact match
/// and modification.
pub trait MatchPolicy {
    fn kind(&self) -> StageKind;

    /// Delta state written alongside `matched = true` for claimed keys.
    /// `None` for an unchanged-entity pass.
    fn matched_state(&self) -> Option<DeltaState>;

    /// Whether this stage sweeps unclaimed leftovers into additions and
    /// deletions after marking its matches.
    fn marks_residual(&self) -> bool {
        false
    }

    /// Compute the match set over keys not yet claimed by earlier stages.
    fn calculate(
        &mut self,
        existing: &KeyedEntities,
        new: &KeyedEntities,
        claimed: &ClaimedKeys,
    ) -> MatchSet;
}

/// Driver owning the two keyed entity collections, a marker, and the
/// matched-key bookkeeping shared by all concrete strategies.
///
/// Not safe for concurrent use; one instance serves exactly one pass of
/// one diff job.
pub struct Matcher<'a, P> {
    policy: P,
    existing: &'a KeyedEntities,
    new: &'a KeyedEntities,
    marker: &'a dyn Marker,
    claimed_at_entry: ClaimedKeys,
    cache: MatchCache,
    phase: MatchPhase,
    outcome: Option<StageOutcome>,
}

impl<'a, P: MatchPolicy> Matcher<'a, P> {
    /// Create a matcher for one pass over the given collections.
    pub fn with_policy(
        policy: P,
        existing: &'a KeyedEntities,
        new: &'a KeyedEntities,
        marker: &'a dyn Marker,
    ) -> Self {
        Self {
            policy,
            existing,
            new,
            marker,
            claimed_at_entry: ClaimedKeys::new(),
            cache: MatchCache::NotComputed,
            phase: MatchPhase::Unstarted,
            outcome: None,
        }
    }

    /// Seed the keys earlier pipeline stages already claimed.
    #[must_use]
    pub fn with_claimed(mut self, claimed: ClaimedKeys) -> Self {
        self.claimed_at_entry = claimed;
        self
    }

    #[must_use]
    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    pub(crate) fn policy(&self) -> &P {
        &self.policy
    }

    pub(crate) fn policy_mut(&mut self) -> &mut P {
        &mut self.policy
    }

    pub(crate) fn ensure_matches(&mut self) {
        if matches!(self.cache, MatchCache::NotComputed) {
            let set = self
                .policy
                .calculate(self.existing, self.new, &self.claimed_at_entry);
            self.cache = MatchCache::Computed(set);
            if self.phase == MatchPhase::Unstarted {
                self.phase = MatchPhase::MatchesComputed;
            }
        }
    }

    /// The match set this pass claims. Computed lazily on first access
    /// and cached for the lifetime of the matcher.
    pub fn matches(&mut self) -> &MatchSet {
        self.ensure_matches();
        match &self.cache {
            MatchCache::Computed(set) => set,
            MatchCache::NotComputed => unreachable!("ensure_matches always computes"),
        }
    }

    /// The outcome of [`run`](Self::run), once it has completed.
    #[must_use]
    pub fn outcome(&self) -> Option<&StageOutcome> {
        self.outcome.as_ref()
    }

    /// Keys of a collection this pass matched.
    fn matches_in(collection: &KeyedEntities, matched: &MatchSet) -> MatchSet {
        matched
            .iter()
            .filter(|k| collection.contains_key(k))
            .cloned()
            .collect()
    }

    /// Keys of a collection neither matched by this pass nor claimed by
    /// an earlier one.
    fn non_matches(&self, collection: &KeyedEntities, matched: &MatchSet) -> MatchSet {
        collection
            .keys()
            .filter(|k| !matched.contains(*k) && !self.claimed_at_entry.contains(k))
            .map(str::to_string)
            .collect()
    }

    /// Drive the full match/mark protocol: compute matches, mark matched
    /// paths in both snapshots, then (for a residual stage) mark the
    /// leftovers as deletions and additions.
    ///
    /// A second call performs no recomputation and no writes; it returns
    /// the cached outcome.
    pub fn run(&mut self, snapshots: &mut SnapshotPair<'_>) -> Result<StageOutcome> {
        if let Some(outcome) = &self.outcome {
            return Ok(outcome.clone());
        }

        self.ensure_matches();
        let matched = match &self.cache {
            MatchCache::Computed(set) => set.clone(),
            MatchCache::NotComputed => unreachable!("ensure_matches always computes"),
        };
        let stage = self.policy.kind();
        let state = self.policy.matched_state();

        tracing::debug!(%stage, "mark matched paths in existing resource");
        self.marker.mark(
            &Self::matches_in(self.existing, &matched),
            self.existing,
            true,
            state,
            snapshots.existing.accessor,
            snapshots.existing.root_uri,
        )?;

        tracing::debug!(%stage, "mark matched paths in new resource");
        self.marker.mark(
            &Self::matches_in(self.new, &matched),
            self.new,
            true,
            state,
            snapshots.new.accessor,
            snapshots.new.root_uri,
        )?;
        self.phase = MatchPhase::MatchedPathsMarked;

        let mut additions = MatchSet::new();
        let mut deletions = MatchSet::new();
        if self.policy.marks_residual() {
            deletions = self.non_matches(self.existing, &matched);
            tracing::debug!(%stage, "mark non-matched paths in existing resource (deletions)");
            self.marker.mark(
                &deletions,
                self.existing,
                false,
                Some(DeltaState::Deletion),
                snapshots.existing.accessor,
                snapshots.existing.root_uri,
            )?;

            additions = self.non_matches(self.new, &matched);
            tracing::debug!(%stage, "mark non-matched paths in new resource (additions)");
            self.marker.mark(
                &additions,
                self.new,
                false,
                Some(DeltaState::Addition),
                snapshots.new.accessor,
                snapshots.new.root_uri,
            )?;
        }

        let outcome = StageOutcome {
            stage,
            matched,
            additions,
            deletions,
        };
        self.outcome = Some(outcome.clone());
        self.phase = MatchPhase::Done;
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claimed_keys_bookkeeping() {
        let mut claimed = ClaimedKeys::new();
        assert!(claimed.is_empty());

        claimed.claim("a");
        claimed.extend(vec!["b".to_string(), "c".to_string()]);
        assert_eq!(claimed.len(), 3);
        assert!(claimed.contains("b"));
        assert!(!claimed.contains("d"));
    }

    #[test]
    fn test_stage_outcome_claims_all_roles() {
        let outcome = StageOutcome {
            stage: StageKind::Modification,
            matched: ["m".to_string()].into(),
            additions: ["a".to_string()].into(),
            deletions: ["d".to_string()].into(),
        };
        let claimed: Vec<&String> = outcome.claimed_keys().collect();
        assert_eq!(claimed.len(), 3);
    }
}
