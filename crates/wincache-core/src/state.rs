//! The store state and its derived queries.

use serde::{Deserialize, Serialize};
use wincache_model::{
    ChangeLog, Entity, EntityCollection, EntityId, FilterState, LoadStatus, Selection, SortState,
};

use crate::changes::{self, ChangeRecord};
use crate::config::StoreConfig;
use crate::event::{FetchKind, FetchTicket};
use crate::filter::Filter;
use crate::options::StoreOptions;
use crate::pagination::{PageInfo, PageRequest, PaginationState};

/// The fetch the store is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingFetch {
    pub ticket: FetchTicket,
    pub page: Option<usize>,
    pub kind: FetchKind,
    /// Issued by a reload from scratch; its result drops the selection.
    #[serde(default)]
    pub reload: bool,
}

/// Everything a store knows, as plain data.
///
/// `entities` holds the cached window in source order, `view` the ids in
/// display order after the local filter and sort. Non-paginated stores
/// have no `pagination` record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(
    serialize = "T: Serialize, T::Delta: Serialize, F: Serialize",
    deserialize = "T: Entity + Deserialize<'de>, T::Delta: Deserialize<'de>, F: Deserialize<'de>"
))]
pub struct WindowState<T: Entity, F> {
    pub entities: EntityCollection<T>,
    pub view: Vec<EntityId>,
    pub status: LoadStatus,
    pub pagination: Option<PaginationState>,
    pub filter: FilterState<F>,
    pub sort: SortState,
    pub changes: ChangeLog<T::Delta>,
    pub selection: Selection,
    pub pending: Option<PendingFetch>,
    pub next_ticket: u64,
}

impl<T: Entity, F: Filter> WindowState<T, F> {
    /// Initial state for a configuration.
    pub fn new(config: &StoreConfig, options: &StoreOptions<T, F>) -> Self {
        Self {
            entities: EntityCollection::new(),
            view: Vec::new(),
            status: LoadStatus::Idle,
            pagination: config.pagination.as_ref().map(PaginationState::from_config),
            filter: FilterState {
                current: options.default_filter.clone(),
                applied_locally: options.default_filter_is_local(),
            },
            sort: SortState::new(config.sort.default_sort()),
            changes: ChangeLog::new(),
            selection: Selection::new(config.selection),
            pending: None,
            next_ticket: 1,
        }
    }
}

impl<T: Entity, F> WindowState<T, F> {
    pub fn is_paginated(&self) -> bool {
        self.pagination.is_some()
    }

    /// Cached entities in display order.
    pub fn entities(&self) -> Vec<&T> {
        self.view
            .iter()
            .filter_map(|id| self.entities.get(id))
            .collect()
    }

    /// Entities of `page` (default: the current page).
    ///
    /// Returns an empty list for pages outside the cache window; check
    /// [`is_page_in_cache`](Self::is_page_in_cache) first. Non-paginated
    /// stores return the whole view.
    pub fn page_slice(&self, page: Option<usize>) -> Vec<&T> {
        let Some(pagination) = &self.pagination else {
            return self.entities();
        };
        let range = pagination.slice_range(page.unwrap_or(pagination.current_page));
        let end = range.end.min(self.view.len());
        let start = range.start.min(end);
        self.view[start..end]
            .iter()
            .filter_map(|id| self.entities.get(id))
            .collect()
    }

    pub fn page_info(&self) -> Option<PageInfo> {
        self.pagination.as_ref().map(PaginationState::page_info)
    }

    /// Fetch parameters the next page request would use.
    pub fn paged_request_params(&self) -> Option<PageRequest> {
        self.pagination.as_ref().map(PaginationState::request_params)
    }

    pub fn is_page_in_cache(&self, page: usize) -> bool {
        self.pagination
            .as_ref()
            .is_some_and(|pagination| pagination.is_page_in_cache(page))
    }

    pub fn full_changes(&self) -> Vec<ChangeRecord<'_, T>> {
        changes::full_changes(&self.changes, &self.entities)
    }

    pub fn reconciled_changes(&self) -> Vec<ChangeRecord<'_, T>> {
        changes::reconciled_changes(&self.changes, &self.entities)
    }

    pub fn selected_ids(&self) -> Vec<&EntityId> {
        self.selection.ids()
    }

    /// Selected entities that are still cached.
    pub fn selected_entities(&self) -> Vec<&T> {
        self.selection
            .ids()
            .into_iter()
            .filter_map(|id| self.entities.get(id))
            .collect()
    }

    pub fn is_selected(&self, id: &EntityId) -> bool {
        self.selection.contains(id)
    }
}
