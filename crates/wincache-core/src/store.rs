//! The single-writer reducer.
//!
//! [`WindowStore::dispatch`] applies one event to the state and returns the
//! effects a driver has to carry out. Time only enters through the `now`
//! argument, which keeps the filter debounce deterministic under test.

use std::time::Instant;

use tracing::{debug, debug_span, trace, warn};
use wincache_model::{
    ChangeLogEntry, ChangeType, Entity, EntityId, EntityUpdate, LoadStatus, Sort, UpdateOutcome,
};

use crate::config::StoreConfig;
use crate::debounce::Debouncer;
use crate::error::ConfigError;
use crate::event::{Effect, EntityPredicate, Event, FetchKind, FetchRequest, FetchTicket};
use crate::filter::{self, Filter, FilterDecision, FilterRequest};
use crate::options::StoreOptions;
use crate::pagination::{CacheType, PaginationState, strategy};
use crate::reactions::{self, Reaction, ReactionRule, Signal};
use crate::state::{PendingFetch, WindowState};
use crate::view::compute_view;

/// Effects and signals produced while handling one event.
struct Step<F> {
    effects: Vec<Effect<F>>,
    signals: Vec<Signal>,
}

impl<F> Step<F> {
    fn new() -> Self {
        Self {
            effects: Vec::new(),
            signals: Vec::new(),
        }
    }
}

pub struct WindowStore<T: Entity, F: Filter> {
    config: StoreConfig,
    options: StoreOptions<T, F>,
    state: WindowState<T, F>,
    filter_debounce: Debouncer<FilterRequest<F>>,
    rules: Vec<ReactionRule<T, F>>,
}

impl<T: Entity, F: Filter> WindowStore<T, F> {
    /// Validate `config` and build the initial state.
    pub fn new(config: StoreConfig, options: StoreOptions<T, F>) -> Result<Self, ConfigError> {
        config.validate()?;
        let state = WindowState::new(&config, &options);
        let store = Self {
            config,
            options,
            state,
            filter_debounce: Debouncer::new(),
            rules: reactions::default_rules(),
        };
        Ok(store)
    }

    /// Replace the reaction rules.
    #[must_use]
    pub fn with_rules(mut self, rules: Vec<ReactionRule<T, F>>) -> Self {
        self.rules = rules;
        self
    }

    pub fn add_rule(&mut self, rule: ReactionRule<T, F>) {
        self.rules.push(rule);
    }

    pub fn state(&self) -> &WindowState<T, F> {
        &self.state
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn options(&self) -> &StoreOptions<T, F> {
        &self.options
    }

    /// When the pending filter change settles, if one is waiting.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.filter_debounce.deadline()
    }

    /// Apply a settled filter change, if its deadline has passed.
    pub fn tick(&mut self, now: Instant) -> Vec<Effect<F>> {
        let mut step = Step::new();
        self.fire_due(now, &mut step);
        self.run_reactions(&mut step);
        step.effects
    }

    /// Handle one event.
    pub fn dispatch(&mut self, event: Event<T, F>, now: Instant) -> Vec<Effect<F>> {
        let _span = debug_span!("dispatch", event = event.name()).entered();
        let mut step = Step::new();
        self.fire_due(now, &mut step);
        self.reduce(event, now, &mut step);
        // A zero debounce settles immediately.
        self.fire_due(now, &mut step);
        self.run_reactions(&mut step);
        step.effects
    }

    fn reduce(&mut self, event: Event<T, F>, now: Instant, step: &mut Step<F>) {
        match event {
            Event::LoadPage { page, force_load } => self.load_page(page, force_load, step),
            Event::LoadFirstPage => self.load_page(0, false, step),
            Event::LoadNextPage => match self.state.page_info() {
                Some(info) if info.has_next => match info.page_index.checked_add(1) {
                    Some(next) => self.load_page(next, false, step),
                    None => debug!("no page after the last addressable one"),
                },
                _ => debug!("no next page"),
            },
            Event::LoadPreviousPage => match self.state.page_info() {
                Some(info) if info.has_previous => {
                    self.load_page(info.page_index - 1, false, step);
                }
                _ => debug!("no previous page"),
            },
            Event::LoadLastPage => match self.state.page_info().and_then(|info| info.pages_count) {
                Some(count) => self.load_page(count - 1, false, step),
                None => debug!("page count unknown, ignoring last page request"),
            },
            Event::ClearPagesCache => self.clear_cache(),
            Event::LoadEntities => self.reload(step),
            Event::LoadSuccess {
                ticket,
                entities,
                total,
                has_more,
            } => self.load_success(ticket, entities, total, has_more, step),
            Event::LoadFail { ticket, error } => self.load_fail(ticket, error, step),

            Event::SetFilter(request) => self.set_filter(request, now, step),
            Event::SetSort(sort) => self.set_sort(sort, step),
            Event::ResetSort => self.set_sort(self.state.sort.default.clone(), step),

            Event::AddEntities(entities) => self.add_entities(entities),
            Event::UpsertEntities(entities) => self.upsert_entities(entities),
            Event::UpdateEntities(updates) => self.update_entities(updates),
            Event::RemoveEntities(ids) => self.remove_entities(&ids),
            Event::RemoveEntitiesWhere(predicate) => self.remove_entities_where(&predicate),
            Event::RemoveAllEntities => self.remove_all_entities(),
            Event::ClearChanges => self.state.changes.clear(),

            Event::Select(id) => self.state.selection.select(id),
            Event::Deselect(id) => self.state.selection.deselect(&id),
            Event::ToggleSelect(id) => self.state.selection.toggle(id),
            Event::SelectAll => self.state.selection.select_all(self.state.view.iter()),
            Event::ClearSelection => self.state.selection.clear(),

            Event::Reset => self.reset(),
        }
    }

    // --- pagination ---------------------------------------------------

    fn load_page(&mut self, page: usize, force_load: bool, step: &mut Step<F>) {
        let Some(pagination) = self.state.pagination.as_mut() else {
            debug!(page, "ignoring page load on a non-paginated store");
            return;
        };

        if let Some(pending) = self.state.pending.as_mut() {
            let full_pending =
                pagination.cache_type() == CacheType::Full && pending.kind == FetchKind::Full;
            if full_pending || pending.page == Some(page) {
                // The outstanding fetch already covers this page.
                if pending.kind == FetchKind::Prefetch {
                    pending.kind = FetchKind::Page;
                }
                pending.page = Some(page);
                pagination.current_page = page;
                pagination.request_page = page;
                self.state.status = LoadStatus::Loading;
                debug!(page, ticket = pending.ticket.0, "coalesced with outstanding fetch");
                return;
            }
            debug!(ticket = pending.ticket.0, "superseding outstanding fetch");
            self.state.pending = None;
        }

        pagination.current_page = page;
        pagination.request_page = page;
        if !force_load && pagination.is_page_in_cache(page) {
            trace!(page, "page served from cache");
            self.state.status = LoadStatus::Success;
            step.effects.push(Effect::PageSatisfied { page });
            step.signals.push(Signal::PageSatisfied { page });
            return;
        }

        let kind = match pagination.cache_type() {
            CacheType::Full => FetchKind::Full,
            CacheType::Partial | CacheType::Grow => FetchKind::Page,
        };
        self.issue_fetch(kind, Some(page), step);
        self.state.status = LoadStatus::Loading;
    }

    /// Start over from page 0 with a fresh fetch.
    fn reload(&mut self, step: &mut Step<F>) {
        match self.state.pagination.as_ref().map(PaginationState::cache_type) {
            Some(cache_type) => {
                if cache_type != CacheType::Full {
                    self.clear_cache();
                }
                self.state.pending = None;
                self.load_page(0, true, step);
            }
            None => {
                self.state.pending = None;
                self.issue_fetch(FetchKind::Full, None, step);
                self.state.status = LoadStatus::Loading;
            }
        }
        if let Some(pending) = self.state.pending.as_mut() {
            pending.reload = true;
        }
    }

    fn issue_fetch(&mut self, kind: FetchKind, page: Option<usize>, step: &mut Step<F>) {
        let ticket = FetchTicket(self.state.next_ticket);
        self.state.next_ticket += 1;

        let (start_index, size) = match &self.state.pagination {
            Some(pagination) => {
                let params = pagination.request_params();
                (params.start_index, params.size)
            }
            None => (0, None),
        };
        let filter = if self.state.filter.applied_locally {
            None
        } else {
            self.state.filter.current.clone()
        };
        let sort = &self.state.sort.current;
        let sort = (self.config.sort.remote && !sort.is_unsorted()).then(|| sort.clone());

        debug!(
            ticket = ticket.0,
            kind = kind.as_str(),
            start_index,
            size = ?size,
            page = ?page,
            "issuing fetch"
        );
        self.state.pending = Some(PendingFetch {
            ticket,
            page,
            kind,
            reload: false,
        });
        step.effects.push(Effect::Fetch(FetchRequest {
            ticket,
            kind,
            start_index,
            size,
            page,
            filter,
            sort,
        }));
    }

    fn load_success(
        &mut self,
        ticket: FetchTicket,
        entities: Vec<T>,
        total: Option<usize>,
        has_more: Option<bool>,
        step: &mut Step<F>,
    ) {
        let Some(pending) = self.state.pending.take_if(|pending| pending.ticket == ticket) else {
            debug!(ticket = ticket.0, "ignoring stale fetch result");
            return;
        };
        let count = entities.len();

        let clears_selection = match self.state.pagination.as_mut() {
            Some(pagination) => {
                let visible: Vec<T> = if pagination.cache_type() == CacheType::Partial {
                    self.state
                        .entities
                        .slice(pagination.slice_range(pagination.current_page))
                        .into_iter()
                        .cloned()
                        .collect()
                } else {
                    Vec::new()
                };
                let outcome =
                    strategy::merge(pagination, &mut self.state.entities, visible, entities);
                pagination.request_page = pagination.current_page;
                if pagination.cache_type() != CacheType::Full {
                    if let Some(total) = total {
                        pagination.total = Some(total);
                    } else if has_more == Some(false) {
                        pagination.total = Some(pagination.cache.end);
                    }
                }
                // Partial results are not guaranteed to line up with what was visible.
                outcome.replaced || pagination.cache_type() == CacheType::Partial
            }
            None => {
                self.state.entities.set_all(entities);
                true
            }
        };

        let clears_selection = clears_selection || pending.reload;
        if clears_selection {
            self.state.selection.clear();
        }
        self.refresh_view();
        if pending.kind != FetchKind::Prefetch {
            self.state.status = LoadStatus::Success;
        }
        debug!(
            ticket = ticket.0,
            kind = pending.kind.as_str(),
            count,
            clears_selection,
            "fetch result merged"
        );
        step.signals.push(Signal::Loaded { kind: pending.kind });
    }

    fn load_fail(&mut self, ticket: FetchTicket, error: Option<String>, step: &mut Step<F>) {
        let Some(pending) = self.state.pending.take_if(|pending| pending.ticket == ticket) else {
            debug!(ticket = ticket.0, "ignoring stale fetch failure");
            return;
        };
        if let Some(pagination) = self.state.pagination.as_mut() {
            pagination.request_page = pagination.current_page;
        }
        if pending.kind == FetchKind::Prefetch {
            warn!(ticket = ticket.0, error = ?error, "prefetch failed");
        } else {
            warn!(ticket = ticket.0, kind = pending.kind.as_str(), error = ?error, "fetch failed");
            self.state.status = LoadStatus::Fail { error };
        }
        step.signals.push(Signal::LoadFailed { kind: pending.kind });
    }

    /// Drop the cached window. The selection is left alone.
    fn clear_cache(&mut self) {
        self.state.entities.clear();
        self.state.view.clear();
        if let Some(pagination) = self.state.pagination.as_mut() {
            pagination.clear_cache();
        }
        self.state.pending = None;
        debug!("cache cleared");
    }

    // --- filter and sort ----------------------------------------------

    fn set_filter(&mut self, request: FilterRequest<F>, now: Instant, step: &mut Step<F>) {
        if request.force_load {
            self.filter_debounce.cancel();
            self.apply_filter(request, step);
            return;
        }
        let delay = request.debounce.unwrap_or(self.config.filter.debounce());
        let generation = self.filter_debounce.push(request, delay, now);
        trace!(
            generation,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            "filter change debounced"
        );
    }

    fn fire_due(&mut self, now: Instant, step: &mut Step<F>) {
        if let Some(request) = self.filter_debounce.take_due(now) {
            self.apply_filter(request, step);
        }
    }

    fn apply_filter(&mut self, request: FilterRequest<F>, step: &mut Step<F>) {
        let previous = self.state.filter.current.as_ref();
        let resolved = request.value.resolve(previous);
        let decision = filter::classify(
            previous,
            resolved,
            request.force_load,
            self.options.is_remote_filter.as_deref(),
            self.options.local_filter.is_some(),
        );
        match decision {
            FilterDecision::Unchanged => trace!("filter unchanged"),
            FilterDecision::Remote(value) => {
                debug!("remote filter change, reloading");
                self.state.filter.current = Some(value);
                self.state.filter.applied_locally = false;
                self.state.selection.clear();
                self.reload(step);
            }
            FilterDecision::Local(value) => {
                debug!("local filter change");
                self.state.filter.current = Some(value);
                self.state.filter.applied_locally = true;
                self.refresh_view();
                self.back_to_first_page(step);
            }
        }
    }

    fn set_sort(&mut self, sort: Sort, step: &mut Step<F>) {
        if self.state.sort.current == sort {
            trace!("sort unchanged");
            return;
        }
        debug!(field = %sort.field, direction = %sort.direction, remote = self.config.sort.remote, "sort changed");
        self.state.sort.current = sort;
        if self.config.sort.remote {
            self.state.selection.clear();
            self.reload(step);
        } else {
            self.refresh_view();
            self.back_to_first_page(step);
        }
    }

    fn back_to_first_page(&mut self, step: &mut Step<F>) {
        if self.state.is_paginated() {
            self.load_page(0, false, step);
        }
    }

    /// Re-derive the display order from the cached records.
    fn refresh_view(&mut self) {
        self.state.view = compute_view(
            &self.state.entities,
            &self.state.filter,
            &self.state.sort.current,
            self.config.sort.remote,
            &self.options,
        );
        // A full cache pages over the view, so its window follows it.
        if let Some(pagination) = self.state.pagination.as_mut()
            && pagination.cache_type() == CacheType::Full
            && pagination.total.is_some()
        {
            pagination.cache.start = 0;
            pagination.cache.end = self.state.view.len();
            pagination.total = Some(self.state.view.len());
        }
    }

    // --- local CRUD ---------------------------------------------------

    /// Adding an id that is already cached replaces it and logs `updated`,
    /// the same way an upsert does.
    fn add_entities(&mut self, entities: Vec<T>) {
        let added = self.store_entities(entities);
        debug!(added, "entities added");
        self.resync_window(added, 0);
    }

    fn upsert_entities(&mut self, entities: Vec<T>) {
        let added = self.store_entities(entities);
        debug!(added, "entities upserted");
        self.resync_window(added, 0);
    }

    /// Insert or replace each entity, logging `created` for new ids and
    /// `updated` otherwise. Returns how many ids were new.
    fn store_entities(&mut self, entities: Vec<T>) -> usize {
        let mut added = 0;
        for entity in entities {
            let id = entity.id();
            let entry = if self.state.entities.upsert(entity) {
                added += 1;
                ChangeLogEntry::created(id)
            } else {
                ChangeLogEntry {
                    id,
                    change_type: ChangeType::Updated,
                    delta: None,
                }
            };
            self.state.changes.push(entry);
        }
        added
    }

    fn update_entities(&mut self, updates: Vec<EntityUpdate<T::Delta>>) {
        for EntityUpdate { id, delta } in updates {
            match self.state.entities.update(&id, &delta) {
                UpdateOutcome::Missing => debug!(id = %id, "update for an entity that is not cached"),
                UpdateOutcome::Updated => {}
                UpdateOutcome::Rekeyed { from, to } => {
                    debug!(from = %from, to = %to, "entity re-keyed");
                    self.state.selection.rekey(&from, &to);
                }
            }
            self.state.changes.push(ChangeLogEntry::updated(id, delta));
        }
        self.refresh_view();
    }

    fn remove_entities(&mut self, ids: &[EntityId]) {
        self.state
            .changes
            .extend(ids.iter().cloned().map(ChangeLogEntry::deleted));
        let removed = self.state.entities.remove(ids);
        self.after_removal(&removed);
    }

    fn remove_entities_where(&mut self, predicate: &EntityPredicate<T>) {
        let removed = self
            .state
            .entities
            .remove_where(|entity| predicate.matches(entity));
        self.state
            .changes
            .extend(removed.iter().cloned().map(ChangeLogEntry::deleted));
        self.after_removal(&removed);
    }

    fn after_removal(&mut self, removed: &[EntityId]) {
        debug!(removed = removed.len(), "entities removed");
        self.state.selection.prune(removed);
        self.resync_window(0, removed.len());
    }

    fn remove_all_entities(&mut self) {
        let ids = self.state.entities.ids().to_vec();
        debug!(removed = ids.len(), "removing all entities");
        self.state
            .changes
            .extend(ids.into_iter().map(ChangeLogEntry::deleted));
        self.state.selection.clear();
        self.clear_cache();
    }

    /// Keep the window and total in step with local additions and removals.
    fn resync_window(&mut self, added: usize, removed: usize) {
        if let Some(pagination) = self.state.pagination.as_mut()
            && pagination.cache_type() != CacheType::Full
        {
            pagination.cache.end = pagination.cache.start.saturating_add(self.state.entities.len());
            if let Some(total) = pagination.total {
                pagination.total = Some(total.saturating_add(added).saturating_sub(removed));
            }
        }
        self.refresh_view();
    }

    fn reset(&mut self) {
        self.filter_debounce.cancel();
        let next_ticket = self.state.next_ticket;
        self.state = WindowState::new(&self.config, &self.options);
        // Tickets keep counting so results of pre-reset fetches stay stale.
        self.state.next_ticket = next_ticket;
        debug!("store reset");
    }

    // --- reactions ----------------------------------------------------

    fn run_reactions(&mut self, step: &mut Step<F>) {
        let signals = std::mem::take(&mut step.signals);
        let rules = self.rules.clone();
        for signal in signals {
            for rule in &rules {
                if let Some(reaction) = rule(&signal, &self.state) {
                    self.apply_reaction(reaction, step);
                }
            }
        }
    }

    fn apply_reaction(&mut self, reaction: Reaction, step: &mut Step<F>) {
        match reaction {
            Reaction::Prefetch { page } => {
                if let Some(pagination) = self.state.pagination.as_mut() {
                    pagination.request_page = page;
                }
                debug!(page, "prefetching next page");
                self.issue_fetch(FetchKind::Prefetch, Some(page), step);
            }
            Reaction::ClearChanges => {
                debug!(cleared = self.state.changes.len(), "change log cleared after full reload");
                self.state.changes.clear();
            }
        }
    }
}

impl<T: Entity, F: Filter> std::fmt::Debug for WindowStore<T, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowStore")
            .field("config", &self.config)
            .field("options", &self.options)
            .field("state", &self.state)
            .field("rules", &self.rules.len())
            .finish_non_exhaustive()
    }
}
