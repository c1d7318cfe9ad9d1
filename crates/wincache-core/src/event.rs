//! Inbound events and outbound effects of a [`WindowStore`](crate::WindowStore).

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use wincache_model::{Entity, EntityId, EntityUpdate, Sort};

use crate::filter::{Filter, FilterRequest};

/// Identifies one outstanding fetch. Results carrying any other ticket are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FetchTicket(pub u64);

impl fmt::Display for FetchTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Why a fetch was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchKind {
    /// The page the user asked for.
    Page,
    /// Background load of the page after the visible one.
    Prefetch,
    /// The whole collection.
    Full,
}

impl FetchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Page => "page",
            Self::Prefetch => "prefetch",
            Self::Full => "full",
        }
    }
}

/// Descriptor handed to the fetch collaborator.
///
/// `filter` is only set when the filter is applied remotely, `sort` only
/// when sorting is remote. `size: None` asks for everything from
/// `start_index` on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchRequest<F> {
    pub ticket: FetchTicket,
    pub kind: FetchKind,
    pub start_index: usize,
    pub size: Option<usize>,
    pub page: Option<usize>,
    pub filter: Option<F>,
    pub sort: Option<Sort>,
}

/// Predicate used by [`Event::RemoveEntitiesWhere`].
#[derive(Clone)]
pub struct EntityPredicate<T>(Arc<dyn Fn(&T) -> bool + Send + Sync>);

impl<T> EntityPredicate<T> {
    pub fn new(predicate: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(predicate))
    }

    pub fn matches(&self, entity: &T) -> bool {
        (self.0)(entity)
    }
}

impl<T> fmt::Debug for EntityPredicate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EntityPredicate(..)")
    }
}

#[derive(Debug, Clone)]
pub enum Event<T: Entity, F: Filter> {
    LoadPage { page: usize, force_load: bool },
    LoadFirstPage,
    LoadNextPage,
    LoadPreviousPage,
    /// Ignored while the page count is unknown.
    LoadLastPage,
    ClearPagesCache,
    /// Reload from scratch. The only load event of a non-paginated store.
    LoadEntities,
    LoadSuccess {
        ticket: FetchTicket,
        entities: Vec<T>,
        total: Option<usize>,
        has_more: Option<bool>,
    },
    LoadFail {
        ticket: FetchTicket,
        error: Option<String>,
    },

    SetFilter(FilterRequest<F>),
    SetSort(Sort),
    ResetSort,

    AddEntities(Vec<T>),
    UpsertEntities(Vec<T>),
    UpdateEntities(Vec<EntityUpdate<T::Delta>>),
    RemoveEntities(Vec<EntityId>),
    RemoveEntitiesWhere(EntityPredicate<T>),
    RemoveAllEntities,
    ClearChanges,

    Select(EntityId),
    Deselect(EntityId),
    ToggleSelect(EntityId),
    /// Multi selection only: select every id in the current view.
    SelectAll,
    ClearSelection,

    /// Rebuild the state from configuration.
    Reset,
}

impl<T: Entity, F: Filter> Event<T, F> {
    pub fn load_page(page: usize) -> Self {
        Self::LoadPage {
            page,
            force_load: false,
        }
    }

    pub fn reload_page(page: usize) -> Self {
        Self::LoadPage {
            page,
            force_load: true,
        }
    }

    pub fn success(ticket: FetchTicket, entities: Vec<T>, total: Option<usize>) -> Self {
        Self::LoadSuccess {
            ticket,
            entities,
            total,
            has_more: None,
        }
    }

    pub fn fail(ticket: FetchTicket, error: impl Into<String>) -> Self {
        Self::LoadFail {
            ticket,
            error: Some(error.into()),
        }
    }

    pub fn remove_where(predicate: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        Self::RemoveEntitiesWhere(EntityPredicate::new(predicate))
    }

    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::LoadPage { .. } => "load_page",
            Self::LoadFirstPage => "load_first_page",
            Self::LoadNextPage => "load_next_page",
            Self::LoadPreviousPage => "load_previous_page",
            Self::LoadLastPage => "load_last_page",
            Self::ClearPagesCache => "clear_pages_cache",
            Self::LoadEntities => "load_entities",
            Self::LoadSuccess { .. } => "load_success",
            Self::LoadFail { .. } => "load_fail",
            Self::SetFilter(_) => "set_filter",
            Self::SetSort(_) => "set_sort",
            Self::ResetSort => "reset_sort",
            Self::AddEntities(_) => "add_entities",
            Self::UpsertEntities(_) => "upsert_entities",
            Self::UpdateEntities(_) => "update_entities",
            Self::RemoveEntities(_) => "remove_entities",
            Self::RemoveEntitiesWhere(_) => "remove_entities_where",
            Self::RemoveAllEntities => "remove_all_entities",
            Self::ClearChanges => "clear_changes",
            Self::Select(_) => "select",
            Self::Deselect(_) => "deselect",
            Self::ToggleSelect(_) => "toggle_select",
            Self::SelectAll => "select_all",
            Self::ClearSelection => "clear_selection",
            Self::Reset => "reset",
        }
    }
}

/// Work the store asks its driver to perform.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect<F> {
    /// Run this fetch and answer with `LoadSuccess` or `LoadFail`.
    Fetch(FetchRequest<F>),
    /// The requested page was already cached; no fetch was issued.
    PageSatisfied { page: usize },
}

impl<F> Effect<F> {
    pub fn as_fetch(&self) -> Option<&FetchRequest<F>> {
        match self {
            Self::Fetch(request) => Some(request),
            Self::PageSatisfied { .. } => None,
        }
    }
}
