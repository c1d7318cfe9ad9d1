//! Merge strategies, one per [`CacheType`].
//!
//! Each strategy receives the fetched records and rewrites both the cached
//! collection and the cache window. `total` is left to the caller, except
//! for the full cache where the fetched set *is* the total.

use tracing::trace;
use wincache_model::{Entity, EntityCollection};

use super::{CacheType, PaginationState};

/// What a merge did to the previously cached records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Earlier records were discarded.
    pub replaced: bool,
}

/// Merge `entities` according to the state's cache type.
///
/// `visible` holds the records of the current page. Only the partial
/// strategy reads it, to keep the visible page when a prefetch lands.
pub fn merge<T: Entity>(
    pagination: &mut PaginationState,
    collection: &mut EntityCollection<T>,
    visible: Vec<T>,
    entities: Vec<T>,
) -> MergeOutcome {
    let outcome = match pagination.cache_type() {
        CacheType::Full => merge_full(pagination, collection, entities),
        CacheType::Partial => merge_partial(pagination, collection, visible, entities),
        CacheType::Grow => merge_grow(pagination, collection, entities),
    };
    trace!(
        cache_type = pagination.cache_type().as_str(),
        start = pagination.cache.start,
        end = pagination.cache.end,
        replaced = outcome.replaced,
        "merged fetched records"
    );
    outcome
}

/// Replace everything. The window is the whole result.
pub fn merge_full<T: Entity>(
    pagination: &mut PaginationState,
    collection: &mut EntityCollection<T>,
    entities: Vec<T>,
) -> MergeOutcome {
    collection.set_all(entities);
    pagination.cache.start = 0;
    pagination.cache.end = collection.len();
    pagination.total = Some(collection.len());
    MergeOutcome { replaced: true }
}

/// Keep one contiguous block starting at the current page.
///
/// A prefetch of the page right after the current one is appended to the
/// visible page; any other result replaces the block.
pub fn merge_partial<T: Entity>(
    pagination: &mut PaginationState,
    collection: &mut EntityCollection<T>,
    visible: Vec<T>,
    entities: Vec<T>,
) -> MergeOutcome {
    let is_prefetch = pagination.current_page.checked_add(1) == Some(pagination.request_page);
    let merged = if is_prefetch {
        let mut merged = visible;
        merged.extend(entities);
        merged
    } else {
        entities
    };
    collection.set_all(merged);
    let start = pagination.current_page.saturating_mul(pagination.page_size);
    pagination.cache.start = start;
    pagination.cache.end = start.saturating_add(collection.len());
    MergeOutcome {
        replaced: !is_prefetch,
    }
}

/// Append. The window only ever grows until the cache is cleared.
pub fn merge_grow<T: Entity>(
    pagination: &mut PaginationState,
    collection: &mut EntityCollection<T>,
    entities: Vec<T>,
) -> MergeOutcome {
    collection.append(entities);
    pagination.cache.end = pagination.cache.start.saturating_add(collection.len());
    MergeOutcome { replaced: false }
}
