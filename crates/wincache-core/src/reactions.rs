//! Reaction rules.
//!
//! After every event the store raises [`Signal`]s describing what just
//! happened. Each registered rule looks at a signal and the resulting
//! state and may ask for a follow-up [`Reaction`]. Rules are plain
//! functions, so the policies below are testable without a store.

use wincache_model::Entity;

use crate::event::FetchKind;
use crate::pagination::CacheType;
use crate::state::WindowState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// A page load was answered from the cache.
    PageSatisfied { page: usize },
    /// A fetch result was merged.
    Loaded { kind: FetchKind },
    LoadFailed { kind: FetchKind },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    /// Fetch `page` in the background without moving the current page.
    Prefetch { page: usize },
    ClearChanges,
}

pub type ReactionRule<T, F> = fn(&Signal, &WindowState<T, F>) -> Option<Reaction>;

/// Rules every store starts with.
pub fn default_rules<T: Entity, F>() -> Vec<ReactionRule<T, F>> {
    vec![
        prefetch_next_page::<T, F> as ReactionRule<T, F>,
        clear_changes_after_full_reload::<T, F>,
    ]
}

/// Warm the page after the visible one once the visible one is available.
///
/// Needs a known total, a non-full cache, a next page that is not cached
/// yet and no fetch in flight.
pub fn prefetch_next_page<T: Entity, F>(
    signal: &Signal,
    state: &WindowState<T, F>,
) -> Option<Reaction> {
    if !matches!(signal, Signal::PageSatisfied { .. } | Signal::Loaded { .. }) {
        return None;
    }
    let pagination = state.pagination.as_ref()?;
    if pagination.cache_type() == CacheType::Full
        || pagination.total.is_none()
        || state.pending.is_some()
        || !pagination.page_info().has_next
    {
        return None;
    }
    let next = pagination.current_page.checked_add(1)?;
    (!pagination.is_page_in_cache(next)).then_some(Reaction::Prefetch { page: next })
}

/// A full reload of a non-paginated store means upstream is in sync.
pub fn clear_changes_after_full_reload<T: Entity, F>(
    signal: &Signal,
    state: &WindowState<T, F>,
) -> Option<Reaction> {
    match signal {
        Signal::Loaded {
            kind: FetchKind::Full,
        } if !state.is_paginated() => Some(Reaction::ClearChanges),
        _ => None,
    }
}
