//! JSON-lines replay scripts.
//!
//! Each non-blank line is one step, tagged by `op`:
//!
//! ```text
//! {"op": "load_first_page"}
//! {"op": "set_filter", "value": {"name": "ada"}}
//! {"op": "wait", "ms": 500}
//! {"op": "update", "id": 3, "changes": {"name": "Grace"}}
//! ```
//!
//! Lines starting with `#` are comments.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use wincache_core::model::{EntityId, EntityUpdate, Sort, SortDirection};
use wincache_core::{Event, FilterRequest, Record};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    LoadPage {
        page: usize,
        #[serde(default)]
        force: bool,
    },
    LoadFirstPage,
    LoadNextPage,
    LoadPreviousPage,
    LoadLastPage,
    ClearPagesCache,
    LoadEntities,
    SetFilter {
        value: Value,
        /// Merge `value` into the stored filter instead of replacing it.
        #[serde(default)]
        patch: bool,
        #[serde(default)]
        force: bool,
        #[serde(default)]
        debounce_ms: Option<u64>,
    },
    SetSort {
        field: String,
        #[serde(default = "ascending")]
        direction: SortDirection,
    },
    ResetSort,
    Add {
        records: Vec<Record>,
    },
    Upsert {
        records: Vec<Record>,
    },
    Update {
        id: EntityId,
        changes: Map<String, Value>,
    },
    Remove {
        ids: Vec<EntityId>,
    },
    /// Remove every cached record matching `filter`.
    RemoveWhere {
        filter: Value,
    },
    RemoveAll,
    ClearChanges,
    Select {
        id: EntityId,
    },
    Deselect {
        id: EntityId,
    },
    Toggle {
        id: EntityId,
    },
    SelectAll,
    ClearSelection,
    Reset,
    /// Let time pass, e.g. so a debounced filter fires.
    Wait {
        ms: u64,
    },
    /// Block until no fetch or filter change is outstanding.
    Settle,
}

fn ascending() -> SortDirection {
    SortDirection::Asc
}

/// What the replay loop does for one step.
#[derive(Debug)]
pub enum Action {
    Dispatch(Event<Record, Value>),
    Wait(Duration),
    Settle,
}

impl Step {
    pub fn into_action(self) -> Action {
        let event = match self {
            Self::Wait { ms } => return Action::Wait(Duration::from_millis(ms)),
            Self::Settle => return Action::Settle,
            Self::LoadPage { page, force } => Event::LoadPage {
                page,
                force_load: force,
            },
            Self::LoadFirstPage => Event::LoadFirstPage,
            Self::LoadNextPage => Event::LoadNextPage,
            Self::LoadPreviousPage => Event::LoadPreviousPage,
            Self::LoadLastPage => Event::LoadLastPage,
            Self::ClearPagesCache => Event::ClearPagesCache,
            Self::LoadEntities => Event::LoadEntities,
            Self::SetFilter {
                value,
                patch,
                force,
                debounce_ms,
            } => {
                let request = if patch {
                    FilterRequest::patch(value)
                } else {
                    FilterRequest::replace(value)
                };
                let request = request.with_force_load(force);
                Event::SetFilter(match debounce_ms {
                    Some(ms) => request.with_debounce(Duration::from_millis(ms)),
                    None => request,
                })
            }
            Self::SetSort { field, direction } => Event::SetSort(Sort::new(field, direction)),
            Self::ResetSort => Event::ResetSort,
            Self::Add { records } => Event::AddEntities(records),
            Self::Upsert { records } => Event::UpsertEntities(records),
            Self::Update { id, changes } => {
                Event::UpdateEntities(vec![EntityUpdate::new(id, changes)])
            }
            Self::Remove { ids } => Event::RemoveEntities(ids),
            Self::RemoveWhere { filter } => {
                Event::remove_where(move |record: &Record| record.matches(&filter))
            }
            Self::RemoveAll => Event::RemoveAllEntities,
            Self::ClearChanges => Event::ClearChanges,
            Self::Select { id } => Event::Select(id),
            Self::Deselect { id } => Event::Deselect(id),
            Self::Toggle { id } => Event::ToggleSelect(id),
            Self::SelectAll => Event::SelectAll,
            Self::ClearSelection => Event::ClearSelection,
            Self::Reset => Event::Reset,
        };
        Action::Dispatch(event)
    }
}

/// Parse a whole script. Errors name the offending line.
pub fn parse_script(contents: &str) -> Result<Vec<Step>> {
    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(index, line)| {
            serde_json::from_str(line.trim()).with_context(|| format!("script line {}", index + 1))
        })
        .collect()
}
