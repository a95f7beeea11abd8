//! Delta classification written back onto graph paths.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Property key for the matched flag on nodes and relationships.
pub const MATCHED_PROPERTY: &str = "matched";

/// Property key for the delta state on nodes and relationships.
pub const DELTA_STATE_PROPERTY: &str = "delta_state";

/// Classification of a graph path between two snapshots of a record.
///
/// Written as a persistent annotation; entities determined unchanged are
/// never annotated with a state (only with `matched = true`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeltaState {
    /// Present only in the new snapshot.
    Addition,
    /// Present only in the existing snapshot.
    Deletion,
    /// Present in both snapshots with a differing comparison value.
    Modification,
}

impl DeltaState {
    /// The value persisted under [`DELTA_STATE_PROPERTY`].
    #[must_use]
    pub fn as_property_value(&self) -> &'static str {
        match self {
            DeltaState::Addition => "ADDITION",
            DeltaState::Deletion => "DELETION",
            DeltaState::Modification => "MODIFICATION",
        }
    }
}

impl fmt::Display for DeltaState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_property_value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_values_are_stable() {
        assert_eq!(DeltaState::Addition.to_string(), "ADDITION");
        assert_eq!(DeltaState::Deletion.to_string(), "DELETION");
        assert_eq!(DeltaState::Modification.to_string(), "MODIFICATION");
    }

    #[test]
    fn test_serde_round_trip_uses_property_values() {
        let json = serde_json::to_string(&DeltaState::Modification).unwrap();
        assert_eq!(json, "\"MODIFICATION\"");
        let back: DeltaState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, DeltaState::Modification);
    }
}
