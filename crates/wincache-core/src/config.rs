//! Store configuration.
//!
//! Loaded from TOML. Every section is optional; a file without a
//! `[pagination]` table describes a non-paginated store.
//!
//! ```toml
//! selection = "multi"
//!
//! [pagination]
//! page_size = 20
//! pages_to_cache = 3
//! cache_type = "partial"
//!
//! [filter]
//! debounce_ms = 300
//!
//! [sort]
//! remote = true
//! field = "name"
//! direction = "asc"
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use wincache_model::{SelectionMode, Sort, SortDirection};

use crate::error::ConfigError;
use crate::pagination::CacheType;

/// Default quiet period before a filter change is applied.
pub const DEFAULT_FILTER_DEBOUNCE_MS: u64 = 400;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Paging and cache strategy. `None` loads the whole collection at once.
    pub pagination: Option<PaginationConfig>,
    pub filter: FilterConfig,
    pub sort: SortConfig,
    pub selection: SelectionMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    pub page_size: usize,
    /// Pages fetched per request for partial and grow caches.
    pub pages_to_cache: usize,
    pub cache_type: CacheType,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            pages_to_cache: 3,
            cache_type: CacheType::Full,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub debounce_ms: u64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_FILTER_DEBOUNCE_MS,
        }
    }
}

impl FilterConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SortConfig {
    /// Sorting is done by the data source; changes trigger a reload.
    pub remote: bool,
    /// Default sort field.
    pub field: String,
    /// Default sort direction.
    pub direction: SortDirection,
}

impl SortConfig {
    pub fn default_sort(&self) -> Sort {
        Sort::new(self.field.clone(), self.direction)
    }
}

impl StoreConfig {
    /// A paginated store with the given page size and cache strategy.
    pub fn paginated(page_size: usize, pages_to_cache: usize, cache_type: CacheType) -> Self {
        Self {
            pagination: Some(PaginationConfig {
                page_size,
                pages_to_cache,
                cache_type,
            }),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_selection(mut self, selection: SelectionMode) -> Self {
        self.selection = selection;
        self
    }

    #[must_use]
    pub fn with_filter_debounce(mut self, debounce: Duration) -> Self {
        self.filter.debounce_ms = u64::try_from(debounce.as_millis()).unwrap_or(u64::MAX);
        self
    }

    #[must_use]
    pub fn with_sort(mut self, default: Sort, remote: bool) -> Self {
        self.sort = SortConfig {
            remote,
            field: default.field,
            direction: default.direction,
        };
        self
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&contents).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(pagination) = &self.pagination {
            if pagination.page_size == 0 {
                return Err(ConfigError::invalid("pagination.page_size must be at least 1"));
            }
            if pagination.pages_to_cache == 0 {
                return Err(ConfigError::invalid(
                    "pagination.pages_to_cache must be at least 1",
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_non_paginated() {
        let config = StoreConfig::from_toml_str("").unwrap();
        assert!(config.pagination.is_none());
        assert_eq!(config.filter.debounce_ms, DEFAULT_FILTER_DEBOUNCE_MS);
        assert_eq!(config.selection, SelectionMode::Single);
    }

    #[test]
    fn full_document_parses() {
        let config = StoreConfig::from_toml_str(
            r#"
            selection = "multi"

            [pagination]
            page_size = 20
            cache_type = "grow"

            [sort]
            remote = true
            field = "name"
            direction = "desc"
            "#,
        )
        .unwrap();
        let pagination = config.pagination.unwrap();
        assert_eq!(pagination.page_size, 20);
        assert_eq!(pagination.pages_to_cache, 3);
        assert_eq!(pagination.cache_type, CacheType::Grow);
        assert!(config.sort.remote);
        assert_eq!(config.sort.default_sort(), Sort::desc("name"));
        assert_eq!(config.selection, SelectionMode::Multi);
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let err = StoreConfig::from_toml_str("[pagination]\npage_size = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }
}
