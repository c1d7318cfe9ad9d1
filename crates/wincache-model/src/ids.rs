use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Identifier of an entity inside a collection.
///
/// Backends hand out either numeric or string keys, so both are accepted.
/// Serialized untagged: `1` and `"a-1"` are both valid ids.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Int(i64),
    Str(String),
}

impl EntityId {
    /// Parse an id from user input, preferring the numeric form.
    pub fn parse(value: &str) -> Result<Self, ModelError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ModelError::InvalidId(value.to_string()));
        }
        Ok(trimmed
            .parse::<i64>()
            .map_or_else(|_| Self::Str(trimmed.to_string()), Self::Int))
    }
}

impl From<i64> for EntityId {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for EntityId {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::Str(value) => f.write_str(value),
        }
    }
}
