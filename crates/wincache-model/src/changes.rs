//! Append-only CRUD change log.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{EntityId, ModelError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Created,
    Updated,
    Deleted,
}

impl ChangeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
        }
    }
}

impl FromStr for ChangeType {
    type Err = ModelError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "created" => Ok(Self::Created),
            "updated" => Ok(Self::Updated),
            "deleted" => Ok(Self::Deleted),
            _ => Err(ModelError::InvalidChangeType(value.to_string())),
        }
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One local mutation waiting to be synced upstream.
///
/// `delta` is only carried by `updated` entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "D: Deserialize<'de>"))]
pub struct ChangeLogEntry<D> {
    pub id: EntityId,
    pub change_type: ChangeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta: Option<D>,
}

impl<D> ChangeLogEntry<D> {
    pub fn created(id: impl Into<EntityId>) -> Self {
        Self {
            id: id.into(),
            change_type: ChangeType::Created,
            delta: None,
        }
    }

    pub fn updated(id: impl Into<EntityId>, delta: D) -> Self {
        Self {
            id: id.into(),
            change_type: ChangeType::Updated,
            delta: Some(delta),
        }
    }

    pub fn deleted(id: impl Into<EntityId>) -> Self {
        Self {
            id: id.into(),
            change_type: ChangeType::Deleted,
            delta: None,
        }
    }
}

/// The raw log. Entries are only ever appended, or dropped all at once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeLog<D> {
    entries: Vec<ChangeLogEntry<D>>,
}

impl<D> Default for ChangeLog<D> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<D> ChangeLog<D> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: ChangeLogEntry<D>) {
        self.entries.push(entry);
    }

    pub fn extend(&mut self, entries: impl IntoIterator<Item = ChangeLogEntry<D>>) {
        self.entries.extend(entries);
    }

    pub fn entries(&self) -> &[ChangeLogEntry<D>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<D> From<Vec<ChangeLogEntry<D>>> for ChangeLog<D> {
    fn from(entries: Vec<ChangeLogEntry<D>>) -> Self {
        Self { entries }
    }
}
