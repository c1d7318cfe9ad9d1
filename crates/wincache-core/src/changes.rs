//! Views over the CRUD change log.
//!
//! The raw log records every local mutation. For an upstream batch sync
//! only the net effect matters, which [`reconcile`] computes in one pass:
//!
//! | history for an id         | new entry | result                          |
//! |---------------------------|-----------|---------------------------------|
//! | none                      | any       | kept                            |
//! | anything                  | updated   | dropped                         |
//! | contains created          | deleted   | created..deleted removed        |
//! | updated / deleted only    | deleted   | earlier entries replaced by it  |
//! | anything                  | created   | kept                            |

use std::collections::HashMap;

use wincache_model::{
    ChangeLog, ChangeLogEntry, ChangeType, Entity, EntityCollection, EntityId,
};

/// A log entry joined with the live entity.
///
/// `entity` is `None` when the record is no longer cached; callers then
/// only have the id to send.
#[derive(Debug)]
pub struct ChangeRecord<'a, T: Entity> {
    pub id: &'a EntityId,
    pub change_type: ChangeType,
    pub entity: Option<&'a T>,
    pub delta: Option<&'a T::Delta>,
}

/// Deduplicate the log into the minimal ordered list of operations.
pub fn reconcile<D>(entries: &[ChangeLogEntry<D>]) -> Vec<&ChangeLogEntry<D>> {
    let mut kept: Vec<Option<&ChangeLogEntry<D>>> = Vec::with_capacity(entries.len());
    // Per id: output slots still holding its entries, oldest first.
    let mut history: HashMap<&EntityId, Vec<(usize, ChangeType)>> = HashMap::new();

    for entry in entries {
        let Some(slots) = history.get_mut(&entry.id) else {
            history.insert(&entry.id, vec![(kept.len(), entry.change_type)]);
            kept.push(Some(entry));
            continue;
        };

        match entry.change_type {
            ChangeType::Updated => {}
            ChangeType::Created => {
                slots.push((kept.len(), ChangeType::Created));
                kept.push(Some(entry));
            }
            ChangeType::Deleted => {
                let created_at = slots
                    .iter()
                    .rposition(|(_, change)| *change == ChangeType::Created);
                match created_at {
                    Some(position) => {
                        // Created and deleted in the same batch: nothing to send.
                        for (slot, _) in slots.drain(position..) {
                            kept[slot] = None;
                        }
                        if slots.is_empty() {
                            history.remove(&entry.id);
                        }
                    }
                    None => {
                        for (slot, _) in slots.drain(..) {
                            kept[slot] = None;
                        }
                        slots.push((kept.len(), ChangeType::Deleted));
                        kept.push(Some(entry));
                    }
                }
            }
        }
    }

    kept.into_iter().flatten().collect()
}

/// Every log entry, joined with current entity data.
pub fn full_changes<'a, T: Entity>(
    log: &'a ChangeLog<T::Delta>,
    collection: &'a EntityCollection<T>,
) -> Vec<ChangeRecord<'a, T>> {
    log.entries()
        .iter()
        .map(|entry| join(entry, collection))
        .collect()
}

/// The reconciled log, joined with current entity data.
pub fn reconciled_changes<'a, T: Entity>(
    log: &'a ChangeLog<T::Delta>,
    collection: &'a EntityCollection<T>,
) -> Vec<ChangeRecord<'a, T>> {
    reconcile(log.entries())
        .into_iter()
        .map(|entry| join(entry, collection))
        .collect()
}

fn join<'a, T: Entity>(
    entry: &'a ChangeLogEntry<T::Delta>,
    collection: &'a EntityCollection<T>,
) -> ChangeRecord<'a, T> {
    ChangeRecord {
        id: &entry.id,
        change_type: entry.change_type,
        entity: collection.get(&entry.id),
        delta: entry.delta.as_ref(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Entry = ChangeLogEntry<()>;

    fn summary(entries: &[Entry]) -> Vec<(EntityId, ChangeType)> {
        reconcile(entries)
            .into_iter()
            .map(|e| (e.id.clone(), e.change_type))
            .collect()
    }

    #[test]
    fn created_then_deleted_vanishes() {
        let log = [Entry::created(1), Entry::deleted(1)];
        assert!(summary(&log).is_empty());
    }

    #[test]
    fn repeated_updates_collapse_into_create() {
        let log = [Entry::created(1), Entry::updated(1, ()), Entry::updated(1, ())];
        assert_eq!(summary(&log), vec![(EntityId::Int(1), ChangeType::Created)]);
    }

    #[test]
    fn update_then_delete_keeps_delete() {
        let log = [Entry::updated(1, ()), Entry::deleted(1)];
        assert_eq!(summary(&log), vec![(EntityId::Int(1), ChangeType::Deleted)]);
    }

    #[test]
    fn delete_moves_to_its_own_position() {
        let log = [
            Entry::updated(1, ()),
            Entry::created(2),
            Entry::deleted(1),
        ];
        assert_eq!(
            summary(&log),
            vec![(EntityId::Int(2), ChangeType::Created), (EntityId::Int(1), ChangeType::Deleted)]
        );
    }

    #[test]
    fn recreated_id_keeps_original_delete() {
        let log = [
            Entry::deleted(5),
            Entry::created(5),
            Entry::updated(5, ()),
            Entry::deleted(5),
            Entry::created(5),
        ];
        assert_eq!(
            summary(&log),
            vec![(EntityId::Int(5), ChangeType::Deleted), (EntityId::Int(5), ChangeType::Created)]
        );
    }
}
