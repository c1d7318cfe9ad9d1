//! The entity contract shared by every collection.

use std::cmp::Ordering;
use std::fmt;

use crate::EntityId;

/// A record that can live in an [`EntityCollection`](crate::EntityCollection).
///
/// The collection never generates ids itself: it asks the entity through
/// [`Entity::id`]. Updates are expressed as a partial value (`Delta`) which
/// may change the id, in which case the collection re-keys the record.
pub trait Entity: Clone + fmt::Debug {
    /// Partial update applied by `updateEntities`.
    type Delta: Clone + fmt::Debug;

    /// Key of this entity.
    fn id(&self) -> EntityId;

    /// Merge `delta` into this entity.
    fn apply(&mut self, delta: &Self::Delta);

    /// Compare two entities on a named field for local sorting.
    ///
    /// Entities that do not support local sorting keep the default, which
    /// leaves the order untouched.
    fn compare_field(&self, other: &Self, field: &str) -> Ordering {
        let _ = (other, field);
        Ordering::Equal
    }
}

/// A partial update addressed to one entity.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EntityUpdate<D> {
    pub id: EntityId,
    pub delta: D,
}

impl<D> EntityUpdate<D> {
    pub fn new(id: impl Into<EntityId>, delta: D) -> Self {
        Self {
            id: id.into(),
            delta,
        }
    }
}
