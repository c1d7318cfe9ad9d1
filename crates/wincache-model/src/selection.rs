//! Single and multi selection over entity ids.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::EntityId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    #[default]
    Single,
    Multi,
}

/// Selected ids.
///
/// Ids are not checked against the collection here; views that resolve
/// selected entities skip ids that are no longer cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum Selection {
    Single { selected: Option<EntityId> },
    Multi { selected: BTreeSet<EntityId> },
}

impl Selection {
    pub fn new(mode: SelectionMode) -> Self {
        match mode {
            SelectionMode::Single => Self::Single { selected: None },
            SelectionMode::Multi => Self::Multi {
                selected: BTreeSet::new(),
            },
        }
    }

    pub fn mode(&self) -> SelectionMode {
        match self {
            Self::Single { .. } => SelectionMode::Single,
            Self::Multi { .. } => SelectionMode::Multi,
        }
    }

    pub fn select(&mut self, id: EntityId) {
        match self {
            Self::Single { selected } => *selected = Some(id),
            Self::Multi { selected } => {
                selected.insert(id);
            }
        }
    }

    pub fn deselect(&mut self, id: &EntityId) {
        match self {
            Self::Single { selected } => {
                if selected.as_ref() == Some(id) {
                    *selected = None;
                }
            }
            Self::Multi { selected } => {
                selected.remove(id);
            }
        }
    }

    pub fn toggle(&mut self, id: EntityId) {
        if self.contains(&id) {
            self.deselect(&id);
        } else {
            self.select(id);
        }
    }

    /// Select every id given. Single selection ignores this.
    pub fn select_all<'a>(&mut self, ids: impl IntoIterator<Item = &'a EntityId>) {
        if let Self::Multi { selected } = self {
            selected.extend(ids.into_iter().cloned());
        }
    }

    pub fn clear(&mut self) {
        match self {
            Self::Single { selected } => *selected = None,
            Self::Multi { selected } => selected.clear(),
        }
    }

    pub fn contains(&self, id: &EntityId) -> bool {
        match self {
            Self::Single { selected } => selected.as_ref() == Some(id),
            Self::Multi { selected } => selected.contains(id),
        }
    }

    /// Move the selection flag from `from` to `to`, if `from` was selected.
    pub fn rekey(&mut self, from: &EntityId, to: &EntityId) {
        if self.contains(from) {
            self.deselect(from);
            self.select(to.clone());
        }
    }

    /// Drop removed ids from the selection.
    pub fn prune<'a>(&mut self, removed: impl IntoIterator<Item = &'a EntityId>) {
        for id in removed {
            self.deselect(id);
        }
    }

    /// Selected ids in a stable order.
    pub fn ids(&self) -> Vec<&EntityId> {
        match self {
            Self::Single { selected } => selected.iter().collect(),
            Self::Multi { selected } => selected.iter().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Single { selected } => selected.is_none(),
            Self::Multi { selected } => selected.is_empty(),
        }
    }
}

impl Default for Selection {
    fn default() -> Self {
        Self::new(SelectionMode::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_selection_replaces() {
        let mut selection = Selection::new(SelectionMode::Single);
        selection.select(1.into());
        selection.select(2.into());
        assert_eq!(selection.ids(), vec![&EntityId::Int(2)]);
        selection.toggle(2.into());
        assert!(selection.is_empty());
    }

    #[test]
    fn multi_selection_rekeys() {
        let mut selection = Selection::new(SelectionMode::Multi);
        selection.select_all(&[EntityId::Int(1), EntityId::Int(3)]);
        selection.rekey(&3.into(), &11.into());
        assert_eq!(selection.ids(), vec![&EntityId::Int(1), &EntityId::Int(11)]);
        selection.prune(&[EntityId::Int(1)]);
        assert_eq!(selection.ids(), vec![&EntityId::Int(11)]);
    }
}
