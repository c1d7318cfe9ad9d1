//! Local re-derivation of the display order.

use std::cmp::Ordering;

use wincache_model::{Entity, EntityCollection, EntityId, FilterState, Sort, SortDirection};

use crate::options::StoreOptions;

/// Ids of the cached records in display order.
///
/// The locally applied filter drops records, then a local sort reorders
/// the rest. Remote filters and sorts were applied by the source, so the
/// collection order is kept as-is for them.
pub(crate) fn compute_view<T: Entity, F>(
    collection: &EntityCollection<T>,
    filter: &FilterState<F>,
    sort: &Sort,
    sort_is_remote: bool,
    options: &StoreOptions<T, F>,
) -> Vec<EntityId> {
    let mut entities: Vec<&T> = collection.iter().collect();

    if filter.applied_locally
        && let (Some(value), Some(matches)) = (&filter.current, &options.local_filter)
    {
        entities.retain(|entity| matches(*entity, value));
    }

    if !sort_is_remote && !sort.is_unsorted() {
        let compare = |a: &&T, b: &&T| match &options.compare {
            Some(compare) => compare(*a, *b, sort.field.as_str()),
            None => a.compare_field(*b, sort.field.as_str()),
        };
        match sort.direction {
            SortDirection::Desc => entities.sort_by(|a, b| compare(b, a)),
            _ => entities.sort_by(compare),
        }
    }

    entities.into_iter().map(|entity| entity.id()).collect()
}

/// Reverse an ordering when the direction is descending.
pub fn directed(ordering: Ordering, direction: SortDirection) -> Ordering {
    match direction {
        SortDirection::Desc => ordering.reverse(),
        _ => ordering,
    }
}
