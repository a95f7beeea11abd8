//! Core data model for delta detection.
//!
//! The engine never sees wire formats or store internals. Its world is the
//! [`Entity`]: a keyed, optionally-valued unit extracted upstream from a
//! graph path, collected per snapshot into a [`KeyedEntities`] mapping, and
//! classified into a [`DeltaState`] by the matcher pipeline.

mod delta;
mod entity;

pub use delta::{DeltaState, DELTA_STATE_PROPERTY, MATCHED_PROPERTY};
pub use entity::{ComparableValue, Entity, EntityKind, KeyedEntities};
