//! Keyed entity collection with an authoritative display order.

use std::collections::HashMap;
use std::ops::Range;

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::{Entity, EntityId};

/// Result of applying a delta to one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// No entity with that id is cached.
    Missing,
    /// The entity changed but kept its id.
    Updated,
    /// The delta changed the entity's id.
    Rekeyed { from: EntityId, to: EntityId },
}

/// Ordered id list plus an id -> entity map.
///
/// `ids` always holds exactly the keys of `by_id`, without duplicates.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityCollection<T> {
    ids: Vec<EntityId>,
    by_id: HashMap<EntityId, T>,
}

impl<T> Default for EntityCollection<T> {
    fn default() -> Self {
        Self {
            ids: Vec::new(),
            by_id: HashMap::new(),
        }
    }
}

impl<T: Entity> EntityCollection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a collection from entities in display order.
    ///
    /// A repeated id keeps its first position and its last value.
    pub fn from_entities(entities: Vec<T>) -> Self {
        let mut collection = Self::new();
        collection.append(entities);
        collection
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Ids in display order.
    pub fn ids(&self) -> &[EntityId] {
        &self.ids
    }

    pub fn get(&self, id: &EntityId) -> Option<&T> {
        self.by_id.get(id)
    }

    pub fn contains(&self, id: &EntityId) -> bool {
        self.by_id.contains_key(id)
    }

    /// Entities in display order.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.ids.iter().filter_map(|id| self.by_id.get(id))
    }

    /// Entities at positions `range`, clamped to the collection bounds.
    pub fn slice(&self, range: Range<usize>) -> Vec<&T> {
        let end = range.end.min(self.ids.len());
        let start = range.start.min(end);
        self.ids[start..end]
            .iter()
            .filter_map(|id| self.by_id.get(id))
            .collect()
    }

    /// Replace the whole collection.
    pub fn set_all(&mut self, entities: Vec<T>) {
        self.clear();
        self.append(entities);
    }

    /// Append entities at the end, returning how many ids were new.
    ///
    /// Entities whose id is already present replace the cached value in place.
    pub fn append(&mut self, entities: Vec<T>) -> usize {
        let mut added = 0;
        for entity in entities {
            if self.upsert(entity) {
                added += 1;
            }
        }
        added
    }

    /// Insert or replace one entity. Returns `true` when the id was new.
    pub fn upsert(&mut self, entity: T) -> bool {
        let id = entity.id();
        let created = self.by_id.insert(id.clone(), entity).is_none();
        if created {
            self.ids.push(id);
        }
        created
    }

    /// Apply `delta` to the entity stored under `id`.
    ///
    /// When the delta changes the id, the entity keeps its position and is
    /// stored under the new key. Another entity already holding the new key
    /// is dropped.
    pub fn update(&mut self, id: &EntityId, delta: &T::Delta) -> UpdateOutcome {
        let Some(mut entity) = self.by_id.remove(id) else {
            return UpdateOutcome::Missing;
        };
        entity.apply(delta);
        let new_id = entity.id();
        if new_id == *id {
            self.by_id.insert(new_id, entity);
            return UpdateOutcome::Updated;
        }

        if self.by_id.remove(&new_id).is_some() {
            self.ids.retain(|existing| *existing != new_id);
        }
        if let Some(slot) = self.ids.iter_mut().find(|existing| **existing == *id) {
            *slot = new_id.clone();
        }
        self.by_id.insert(new_id.clone(), entity);
        UpdateOutcome::Rekeyed {
            from: id.clone(),
            to: new_id,
        }
    }

    /// Remove the given ids, returning the ones that were actually cached.
    pub fn remove(&mut self, ids: &[EntityId]) -> Vec<EntityId> {
        let removed: Vec<EntityId> = ids
            .iter()
            .filter(|id| self.by_id.remove(*id).is_some())
            .cloned()
            .collect();
        if !removed.is_empty() {
            let by_id = &self.by_id;
            self.ids.retain(|id| by_id.contains_key(id));
        }
        removed
    }

    /// Remove every entity matching `predicate`, in display order.
    pub fn remove_where(&mut self, mut predicate: impl FnMut(&T) -> bool) -> Vec<EntityId> {
        let matching: Vec<EntityId> = self
            .ids
            .iter()
            .filter(|id| self.by_id.get(*id).is_some_and(&mut predicate))
            .cloned()
            .collect();
        self.remove(&matching)
    }

    pub fn clear(&mut self) {
        self.ids.clear();
        self.by_id.clear();
    }
}

impl<T: Serialize> Serialize for EntityCollection<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.ids.iter().filter_map(|id| self.by_id.get(id)))
    }
}

impl<'de, T: Entity + Deserialize<'de>> Deserialize<'de> for EntityCollection<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entities = Vec::<T>::deserialize(deserializer)?;
        Ok(Self::from_entities(entities))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        id: i64,
        name: &'static str,
    }

    impl Entity for Item {
        type Delta = (Option<i64>, &'static str);

        fn id(&self) -> EntityId {
            EntityId::Int(self.id)
        }

        fn apply(&mut self, delta: &Self::Delta) {
            if let Some(id) = delta.0 {
                self.id = id;
            }
            self.name = delta.1;
        }
    }

    fn item(id: i64, name: &'static str) -> Item {
        Item { id, name }
    }

    #[test]
    fn append_keeps_ids_unique() {
        let mut collection = EntityCollection::from_entities(vec![item(1, "a"), item(2, "b")]);
        let added = collection.append(vec![item(2, "b2"), item(3, "c")]);
        assert_eq!(added, 1);
        assert_eq!(collection.ids(), &[EntityId::Int(1), EntityId::Int(2), EntityId::Int(3)]);
        assert_eq!(collection.get(&2.into()).unwrap().name, "b2");
    }

    #[test]
    fn update_rekeys_in_place() {
        let mut collection =
            EntityCollection::from_entities(vec![item(1, "a"), item(2, "b"), item(3, "c")]);
        let outcome = collection.update(&2.into(), &(Some(20), "bb"));
        assert_eq!(
            outcome,
            UpdateOutcome::Rekeyed {
                from: 2.into(),
                to: 20.into()
            }
        );
        assert_eq!(collection.ids(), &[EntityId::Int(1), EntityId::Int(20), EntityId::Int(3)]);
        assert!(!collection.contains(&2.into()));
        assert_eq!(
            collection.update(&99.into(), &(None, "x")),
            UpdateOutcome::Missing
        );
    }

    #[test]
    fn slice_is_clamped() {
        let collection = EntityCollection::from_entities(vec![item(1, "a"), item(2, "b")]);
        assert_eq!(collection.slice(1..10).len(), 1);
        assert!(collection.slice(5..10).is_empty());
    }
}
