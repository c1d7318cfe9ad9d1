//! Tests for wincache-model types.

use serde::{Deserialize, Serialize};
use wincache_model::{
    ChangeLog, ChangeLogEntry, ChangeType, Entity, EntityCollection, EntityId, LoadStatus,
    Selection, SelectionMode,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Todo {
    id: i64,
    title: String,
}

impl Entity for Todo {
    type Delta = String;

    fn id(&self) -> EntityId {
        EntityId::Int(self.id)
    }

    fn apply(&mut self, delta: &Self::Delta) {
        self.title = delta.clone();
    }
}

fn todo(id: i64, title: &str) -> Todo {
    Todo {
        id,
        title: title.to_string(),
    }
}

#[test]
fn collection_serializes_in_display_order() {
    let collection = EntityCollection::from_entities(vec![todo(3, "c"), todo(1, "a")]);
    let json = serde_json::to_string(&collection).expect("serialize collection");
    assert_eq!(json, r#"[{"id":3,"title":"c"},{"id":1,"title":"a"}]"#);

    let back: EntityCollection<Todo> = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back.ids(), &[EntityId::Int(3), EntityId::Int(1)]);
}

#[test]
fn remove_where_reports_only_cached_ids() {
    let mut collection =
        EntityCollection::from_entities(vec![todo(1, "keep"), todo(2, "drop"), todo(3, "drop")]);
    let removed = collection.remove_where(|t| t.title == "drop");
    assert_eq!(removed, vec![EntityId::Int(2), EntityId::Int(3)]);
    assert_eq!(collection.len(), 1);

    let removed = collection.remove(&[EntityId::Int(1), EntityId::Int(42)]);
    assert_eq!(removed, vec![EntityId::Int(1)]);
    assert!(collection.is_empty());
}

#[test]
fn change_log_entries_serialize_compactly() {
    let mut log: ChangeLog<String> = ChangeLog::new();
    log.push(ChangeLogEntry::created(1));
    log.push(ChangeLogEntry::updated(1, "renamed".to_string()));
    log.push(ChangeLogEntry::deleted("x"));

    let json = serde_json::to_string(&log).expect("serialize log");
    assert_eq!(
        json,
        r#"[{"id":1,"change_type":"created"},{"id":1,"change_type":"updated","delta":"renamed"},{"id":"x","change_type":"deleted"}]"#
    );
    assert_eq!(log.entries()[2].change_type, ChangeType::Deleted);
    assert_eq!("Updated".parse::<ChangeType>().unwrap(), ChangeType::Updated);
}

#[test]
fn selection_and_status_serialize_tagged() {
    let mut selection = Selection::new(SelectionMode::Multi);
    selection.select(EntityId::Int(2));
    let json = serde_json::to_string(&selection).expect("serialize selection");
    assert_eq!(json, r#"{"mode":"multi","selected":[2]}"#);

    let status = LoadStatus::Fail {
        error: Some("timeout".to_string()),
    };
    let json = serde_json::to_string(&status).expect("serialize status");
    assert_eq!(json, r#"{"status":"fail","error":"timeout"}"#);
    assert!(status.is_fail());
}
