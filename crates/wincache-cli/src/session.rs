//! Store sessions over JSON records.
//!
//! Each session spawns a store on the current tokio runtime, answers its
//! fetches from an [`InMemorySource`], and returns owned snapshots once the
//! store has settled.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};
use wincache_core::model::{ChangeLogEntry, ChangeType, Sort, SortDirection};
use wincache_core::{
    ChangeRecord, CoreError, Event, FilterRequest, QueryParams, Record, StoreConfig,
    StoreOptions, WindowState, WindowStore, reconcile,
};
use wincache_runtime::{InMemorySource, RuntimeError, StoreHandle, spawn_store};

use crate::logging::redact_payload;
use crate::script::{Action, Step};
use crate::summary::{ChangeRow, PageView};

pub type RecordStore = WindowStore<Record, Value>;
pub type RecordSource = InMemorySource<Record, Value>;
type RecordHandle = StoreHandle<Record, Value>;

/// Read a JSON array of records.
pub fn load_records(path: &Path) -> Result<Vec<Record>> {
    let contents =
        std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parse records in {}", path.display()))
}

/// Read a TOML store config, or fall back to the defaults.
pub fn load_config(path: Option<&Path>) -> Result<StoreConfig> {
    match path {
        Some(path) => StoreConfig::load(path).context("load store config"),
        None => Ok(StoreConfig::default()),
    }
}

pub fn record_store(config: StoreConfig, local_filter: bool) -> Result<RecordStore> {
    let mut options = StoreOptions::new();
    if local_filter {
        options =
            options.with_local_filter(|record: &Record, filter: &Value| record.matches(filter));
    }
    WindowStore::new(config, options).context("invalid store config")
}

pub fn record_source(records: Vec<Record>, latency: Option<Duration>) -> Arc<RecordSource> {
    let source = InMemorySource::for_records(records);
    Arc::new(match latency {
        Some(latency) => source.with_latency(latency),
        None => source,
    })
}

/// Parse `FIELD` or `FIELD:DIR`.
pub fn parse_sort(value: &str) -> Result<Sort> {
    let (field, direction) = match value.split_once(':') {
        Some((field, direction)) => (field, direction.parse::<SortDirection>()?),
        None => (value, SortDirection::Asc),
    };
    anyhow::ensure!(!field.trim().is_empty(), "sort field is empty");
    Ok(Sort::new(field.trim(), direction))
}

/// What the `page` command should show.
#[derive(Debug, Clone, Default)]
pub struct PageQuery {
    /// Restored first, so the other fields win.
    pub params: Option<QueryParams>,
    pub filter: Option<Value>,
    pub sort: Option<Sort>,
    pub page: Option<usize>,
}

impl PageQuery {
    fn events(&self) -> Result<Vec<Event<Record, Value>>> {
        let mut events = match &self.params {
            Some(params) => params.to_events()?,
            None => Vec::new(),
        };
        if let Some(filter) = &self.filter {
            events.push(Event::SetFilter(
                FilterRequest::replace(filter.clone()).with_force_load(true),
            ));
        }
        if let Some(sort) = &self.sort {
            events.push(Event::SetSort(sort.clone()));
        }
        if let Some(page) = self.page {
            events.push(Event::load_page(page));
        }
        Ok(events)
    }
}

/// Load the store, apply `query` and return the visible page.
pub async fn show_page(
    store: RecordStore,
    source: Arc<RecordSource>,
    query: &PageQuery,
) -> Result<PageView> {
    let events = query.events()?;
    let (handle, task) = spawn_store(store, source);

    let initial = if handle.query(WindowState::is_paginated).await? {
        Event::LoadFirstPage
    } else {
        Event::LoadEntities
    };
    handle.dispatch(initial).await?;
    settle(&handle).await?;
    for event in events {
        debug!(event = event.name(), "applying page query");
        handle.dispatch(event).await?;
    }
    settle(&handle).await?;

    let view = handle.query(page_view).await??;
    handle.shutdown().await?;
    task.await.context("store driver panicked")?;
    Ok(view)
}

/// Result of replaying a script.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayOutcome {
    pub steps: usize,
    pub page: PageView,
    pub changes: Vec<ChangeRow>,
    pub full_changes: Vec<ChangeRow>,
}

/// Run `steps` in order, then report the final page and change log.
///
/// Failed fetches are logged and the replay carries on; the final status
/// reports them.
pub async fn replay(
    store: RecordStore,
    source: Arc<RecordSource>,
    steps: Vec<Step>,
) -> Result<ReplayOutcome> {
    let count = steps.len();
    let (handle, task) = spawn_store(store, source);

    for (index, step) in steps.into_iter().enumerate() {
        debug!(step = index + 1, payload = %redact_payload(&step), "replaying step");
        match step.into_action() {
            Action::Dispatch(event) => handle.dispatch(event).await?,
            Action::Wait(duration) => tokio::time::sleep(duration).await,
            Action::Settle => settle_or_warn(&handle).await?,
        }
    }
    settle_or_warn(&handle).await?;

    let (page, changes, full_changes) = handle
        .query(|state: &WindowState<Record, Value>| {
            let changes: Vec<ChangeRow> =
                state.reconciled_changes().iter().map(change_row).collect();
            let full: Vec<ChangeRow> = state.full_changes().iter().map(change_row).collect();
            page_view(state).map(|page| (page, changes, full))
        })
        .await??;
    handle.shutdown().await?;
    task.await.context("store driver panicked")?;
    info!(steps = count, changes = changes.len(), "replay finished");

    Ok(ReplayOutcome {
        steps: count,
        page,
        changes,
        full_changes,
    })
}

/// Reconcile a raw change log.
pub fn reconcile_log(entries: &[ChangeLogEntry<Map<String, Value>>]) -> Vec<ChangeRow> {
    reconcile(entries)
        .into_iter()
        .map(|entry| ChangeRow {
            id: entry.id.clone(),
            change_type: entry.change_type,
            payload: entry.delta.clone().map(Value::Object),
        })
        .collect()
}

/// Snapshot of the visible page.
pub fn page_view(state: &WindowState<Record, Value>) -> Result<PageView, CoreError> {
    Ok(PageView {
        rows: state.page_slice(None).into_iter().cloned().collect(),
        info: state.page_info(),
        status: state.status.clone(),
        cached: state.entities.len(),
        selected: state.selected_ids().into_iter().cloned().collect(),
        query: QueryParams::from_state(state)?,
    })
}

/// Created rows carry the record, updated rows the delta.
fn change_row(change: &ChangeRecord<'_, Record>) -> ChangeRow {
    let payload = match change.change_type {
        ChangeType::Created => change.entity.map(|record| Value::Object(record.0.clone())),
        ChangeType::Updated => change.delta.cloned().map(Value::Object),
        ChangeType::Deleted => None,
    };
    ChangeRow {
        id: change.id.clone(),
        change_type: change.change_type,
        payload,
    }
}

async fn settle(handle: &RecordHandle) -> Result<()> {
    handle.settled().await.context("load records")
}

async fn settle_or_warn(handle: &RecordHandle) -> Result<()> {
    match handle.settled().await {
        Ok(()) => Ok(()),
        Err(RuntimeError::Source(error)) => {
            warn!(%error, "load failed during replay");
            Ok(())
        }
        Err(error) => Err(error.into()),
    }
}
