//! Sort and filter state records.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Sort direction. `None` means "unsorted" and serializes as `""`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortDirection {
    #[serde(rename = "asc")]
    Asc,
    #[serde(rename = "desc")]
    Desc,
    #[default]
    #[serde(rename = "")]
    None,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
            Self::None => "",
        }
    }
}

impl FromStr for SortDirection {
    type Err = ModelError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            "" | "none" => Ok(Self::None),
            _ => Err(ModelError::InvalidSortDirection(value.to_string())),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A field plus a direction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Sort {
    pub field: String,
    pub direction: SortDirection,
}

impl Sort {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Asc)
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Desc)
    }

    /// True when no ordering should be applied.
    pub fn is_unsorted(&self) -> bool {
        self.direction == SortDirection::None || self.field.is_empty()
    }
}

/// Current and default sort.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortState {
    pub current: Sort,
    pub default: Sort,
}

impl SortState {
    pub fn new(default: Sort) -> Self {
        Self {
            current: default.clone(),
            default,
        }
    }
}

/// Last accepted filter value.
///
/// `applied_locally` records how the value was classified when it was
/// accepted: locally applied filters are re-run over the cached set,
/// remote ones were already applied by the data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterState<F> {
    pub current: Option<F>,
    pub applied_locally: bool,
}

impl<F> Default for FilterState<F> {
    fn default() -> Self {
        Self {
            current: None,
            applied_locally: false,
        }
    }
}

impl<F> FilterState<F> {
    pub fn new(current: Option<F>) -> Self {
        Self {
            current,
            applied_locally: false,
        }
    }
}
