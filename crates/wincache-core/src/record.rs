//! A schemaless entity over JSON objects.
//!
//! Used by the CLI and by tests that do not want to declare a type. The
//! key is the `id` field (number or string); deltas are objects merged
//! shallowly, with `null` removing a field.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use wincache_model::{Entity, EntityId};

use crate::filter::Filter;

/// Field holding the record key.
pub const ID_FIELD: &str = "id";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(pub Map<String, Value>);

impl Record {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Does this record match every field of `filter`?
    ///
    /// String criteria match case-insensitively as substrings; other values
    /// must be equal. A non-object filter matches any string field that
    /// contains it. `null` and empty criteria match everything.
    pub fn matches(&self, filter: &Value) -> bool {
        match filter {
            Value::Null => true,
            Value::Object(criteria) => criteria
                .iter()
                .all(|(field, wanted)| field_matches(self.0.get(field), wanted)),
            Value::String(needle) => {
                needle.is_empty()
                    || self
                        .0
                        .values()
                        .any(|value| matches!(value, Value::String(s) if contains_ci(s, needle)))
            }
            other => self.0.values().any(|value| value == other),
        }
    }
}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

impl Entity for Record {
    type Delta = Map<String, Value>;

    fn id(&self) -> EntityId {
        match self.0.get(ID_FIELD) {
            Some(Value::Number(n)) => match n.as_i64() {
                Some(n) => EntityId::Int(n),
                None => EntityId::Str(n.to_string()),
            },
            Some(Value::String(s)) => EntityId::Str(s.clone()),
            Some(other) => EntityId::Str(other.to_string()),
            None => EntityId::Str(String::new()),
        }
    }

    fn apply(&mut self, delta: &Self::Delta) {
        for (field, value) in delta {
            if value.is_null() {
                self.0.remove(field);
            } else {
                self.0.insert(field.clone(), value.clone());
            }
        }
    }

    fn compare_field(&self, other: &Self, field: &str) -> Ordering {
        compare_values(self.0.get(field), other.0.get(field))
    }
}

/// Order JSON values: missing and null first, then booleans, numbers,
/// strings. Mixed kinds compare by that rank.
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.unwrap_or(&Value::Null);
    let b = b.unwrap_or(&Value::Null);
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.total_cmp(&y)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

fn rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

fn field_matches(actual: Option<&Value>, wanted: &Value) -> bool {
    match (actual, wanted) {
        (_, Value::Null) => true,
        (Some(Value::String(actual)), Value::String(wanted)) => contains_ci(actual, wanted),
        (Some(actual), wanted) => actual == wanted,
        (None, _) => false,
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// JSON filters. Object patches are merged field by field; anything else
/// replaces the stored value.
impl Filter for Value {
    type Patch = Value;

    fn patched(&self, patch: &Self::Patch) -> Self {
        match (self, patch) {
            (Value::Object(stored), Value::Object(fields)) => {
                let mut merged = stored.clone();
                for (field, value) in fields {
                    merged.insert(field.clone(), value.clone());
                }
                Value::Object(merged)
            }
            _ => patch.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn record(value: Value) -> Record {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn id_comes_from_id_field() {
        assert_eq!(record(json!({"id": 7})).id(), EntityId::Int(7));
        assert_eq!(record(json!({"id": "a"})).id(), EntityId::Str("a".into()));
    }

    #[test]
    fn delta_merges_and_null_removes() {
        let mut r = record(json!({"id": 1, "name": "a", "tag": "x"}));
        let delta = json!({"name": "b", "tag": null});
        r.apply(delta.as_object().unwrap());
        assert_eq!(r, record(json!({"id": 1, "name": "b"})));
    }

    #[test]
    fn object_filter_matches_substrings_and_values() {
        let r = record(json!({"id": 1, "name": "Alpha", "active": true}));
        assert!(r.matches(&json!({"name": "alp"})));
        assert!(r.matches(&json!({"active": true, "name": null})));
        assert!(!r.matches(&json!({"active": false})));
        assert!(!r.matches(&json!({"missing": 1})));
        assert!(r.matches(&json!("PHA")));
    }

    #[test]
    fn object_patch_merges() {
        let stored = json!({"name": "a", "active": true});
        assert_eq!(
            stored.patched(&json!({"name": "b"})),
            json!({"name": "b", "active": true})
        );
        assert_eq!(stored.patched(&json!("text")), json!("text"));
    }

    #[test]
    fn numbers_sort_numerically() {
        let a = record(json!({"id": 1, "n": 9}));
        let b = record(json!({"id": 2, "n": 10}));
        assert_eq!(a.compare_field(&b, "n"), Ordering::Less);
        assert_eq!(a.compare_field(&b, "missing"), Ordering::Equal);
    }
}
