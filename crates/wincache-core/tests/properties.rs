use proptest::prelude::*;
use wincache_core::model::{ChangeLogEntry, ChangeType, Entity, EntityCollection, EntityId};
use wincache_core::pagination::strategy::{merge_full, merge_grow, merge_partial};
use wincache_core::{CacheType, PaginationState, reconcile};

#[derive(Debug, Clone, PartialEq)]
struct Row(i64);

impl Entity for Row {
    type Delta = ();

    fn id(&self) -> EntityId {
        EntityId::Int(self.0)
    }

    fn apply(&mut self, _delta: &()) {}
}

fn rows(start: i64, len: usize) -> Vec<Row> {
    (start..start + len as i64).map(Row).collect()
}

fn entry((kind, id): (u8, i64)) -> ChangeLogEntry<()> {
    match kind {
        0 => ChangeLogEntry::created(id),
        1 => ChangeLogEntry::updated(id, ()),
        _ => ChangeLogEntry::deleted(id),
    }
}

fn log_strategy() -> impl Strategy<Value = Vec<ChangeLogEntry<()>>> {
    proptest::collection::vec((0u8..3, 0i64..5), 0..40)
        .prop_map(|raw| raw.into_iter().map(entry).collect())
}

proptest! {
    #[test]
    fn grow_end_never_decreases(chunks in proptest::collection::vec(0usize..50, 1..10)) {
        let mut pagination = PaginationState::new(20, 3, CacheType::Grow);
        let mut collection = EntityCollection::new();
        let mut next = 0i64;
        let mut previous_end = 0;
        for chunk in chunks {
            merge_grow(&mut pagination, &mut collection, rows(next, chunk));
            next += chunk as i64;
            prop_assert!(pagination.cache.end >= previous_end);
            prop_assert_eq!(pagination.cache.end, collection.len());
            previous_end = pagination.cache.end;
        }
        prop_assert_eq!(collection.len() as i64, next);
    }

    #[test]
    fn full_merge_is_idempotent(len in 0usize..200) {
        let mut pagination = PaginationState::new(20, 3, CacheType::Full);
        let mut collection = EntityCollection::new();
        merge_full(&mut pagination, &mut collection, rows(0, len));
        let once = (pagination.clone(), collection.clone());
        merge_full(&mut pagination, &mut collection, rows(0, len));
        prop_assert_eq!(&once, &(pagination.clone(), collection.clone()));
        prop_assert_eq!((pagination.cache.start, pagination.cache.end), (0, len));
        prop_assert_eq!(pagination.total, Some(len));
    }

    #[test]
    fn partial_window_matches_cached_rows(page in 0usize..10, len in 0usize..60) {
        let mut pagination = PaginationState::new(20, 3, CacheType::Partial);
        let mut collection = EntityCollection::new();
        pagination.current_page = page;
        pagination.request_page = page;
        let start = (page * 20) as i64;
        merge_partial(&mut pagination, &mut collection, Vec::new(), rows(start, len));
        prop_assert_eq!(pagination.cache.start, page * 20);
        prop_assert_eq!(pagination.cache.len(), collection.len());
    }

    #[test]
    fn reconcile_is_idempotent(log in log_strategy()) {
        let once: Vec<ChangeLogEntry<()>> = reconcile(&log).into_iter().cloned().collect();
        let twice: Vec<ChangeLogEntry<()>> = reconcile(&once).into_iter().cloned().collect();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn reconcile_keeps_log_order(log in log_strategy()) {
        let positions: Vec<usize> = reconcile(&log)
            .into_iter()
            .map(|kept| {
                log.iter()
                    .position(|entry| std::ptr::eq(entry, kept))
                    .expect("reconciled entries come from the log")
            })
            .collect();
        prop_assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn reconciled_ids_never_update_twice(log in log_strategy()) {
        let reconciled = reconcile(&log);
        for (index, entry) in reconciled.iter().enumerate() {
            if entry.change_type == ChangeType::Updated {
                let earlier = reconciled[..index].iter().any(|other| other.id == entry.id);
                prop_assert!(!earlier, "update for {} follows another entry", entry.id);
            }
        }
    }
}

#[test]
fn reconcile_laws() {
    let created_deleted = [ChangeLogEntry::<()>::created(1), ChangeLogEntry::deleted(1)];
    assert!(reconcile(&created_deleted).is_empty());

    let created_updated = [
        ChangeLogEntry::created(1),
        ChangeLogEntry::updated(1, ()),
        ChangeLogEntry::updated(1, ()),
    ];
    let kept = reconcile(&created_updated);
    assert_eq!(kept, vec![&ChangeLogEntry::created(1)]);

    let updated_deleted = [ChangeLogEntry::updated(1, ()), ChangeLogEntry::deleted(1)];
    assert_eq!(reconcile(&updated_deleted), vec![&ChangeLogEntry::deleted(1)]);
}
