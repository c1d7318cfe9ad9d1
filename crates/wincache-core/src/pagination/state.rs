//! Pagination record and cache-window arithmetic.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::config::PaginationConfig;

/// How fetched pages are merged into the cached window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheType {
    /// The source returns the whole collection; paging is local.
    #[default]
    Full,
    /// Only a contiguous block of pages is cached; jumps replace it.
    Partial,
    /// Pages accumulate (infinite scroll) until the cache is cleared.
    Grow,
}

impl CacheType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Partial => "partial",
            Self::Grow => "grow",
        }
    }
}

/// Half-open index range `[start, end)` of the source that is cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CacheWindow {
    #[serde(rename = "type")]
    pub cache_type: CacheType,
    pub start: usize,
    pub end: usize,
}

impl CacheWindow {
    pub fn new(cache_type: CacheType) -> Self {
        Self {
            cache_type,
            start: 0,
            end: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }
}

/// Derived page metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    pub page_index: usize,
    pub total: Option<usize>,
    pub page_size: usize,
    pub pages_count: Option<usize>,
    pub has_previous: bool,
    pub has_next: bool,
    pub cache_type: CacheType,
}

/// Where the next fetch should start and how much it should ask for.
///
/// `size` is `None` when the whole collection is wanted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub start_index: usize,
    pub size: Option<usize>,
    pub page: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationState {
    pub current_page: usize,
    /// Page a fetch is outstanding for. Equal to `current_page` otherwise.
    pub request_page: usize,
    pub page_size: usize,
    /// Size of the source collection, when known.
    pub total: Option<usize>,
    pub pages_to_cache: usize,
    pub cache: CacheWindow,
}

impl PaginationState {
    pub fn new(page_size: usize, pages_to_cache: usize, cache_type: CacheType) -> Self {
        Self {
            current_page: 0,
            request_page: 0,
            page_size: page_size.max(1),
            total: None,
            pages_to_cache: pages_to_cache.max(1),
            cache: CacheWindow::new(cache_type),
        }
    }

    pub fn from_config(config: &PaginationConfig) -> Self {
        Self::new(config.page_size, config.pages_to_cache, config.cache_type)
    }

    #[inline]
    pub fn cache_type(&self) -> CacheType {
        self.cache.cache_type
    }

    /// Source indexes covered by `page`, clamped to `total` when known.
    pub fn page_range(&self, page: usize) -> Range<usize> {
        let start = page.saturating_mul(self.page_size);
        let mut end = start.saturating_add(self.page_size);
        if let Some(total) = self.total {
            end = end.min(total);
        }
        start..end.max(start)
    }

    /// True when every record of `page` is inside the cache window.
    ///
    /// A known-empty source counts page 0 as cached so it is not refetched.
    pub fn is_page_in_cache(&self, page: usize) -> bool {
        let range = self.page_range(page);
        if range.is_empty() {
            return self.total == Some(0) && page == 0 && self.cache.start == 0;
        }
        range.start >= self.cache.start && range.end <= self.cache.end
    }

    /// Positions of `page` relative to the cached window.
    ///
    /// Pages starting before the window degrade to an empty range.
    pub fn slice_range(&self, page: usize) -> Range<usize> {
        let page_start = page.saturating_mul(self.page_size);
        let Some(start) = page_start.checked_sub(self.cache.start) else {
            return 0..0;
        };
        let end = start.saturating_add(self.page_size).min(self.cache.len());
        start.min(end)..end
    }

    pub fn pages_count(&self) -> Option<usize> {
        match self.total {
            Some(total) if total > 0 => Some(total.div_ceil(self.page_size)),
            _ => None,
        }
    }

    pub fn page_info(&self) -> PageInfo {
        self.page_info_at(self.current_page)
    }

    /// Page metadata as if `page` were the current page.
    pub fn page_info_at(&self, page: usize) -> PageInfo {
        let pages_count = self.pages_count();
        PageInfo {
            page_index: page,
            total: self.total,
            page_size: self.page_size,
            pages_count,
            has_previous: page > 0,
            // Optimistic while the total is unknown.
            has_next: pages_count.is_none_or(|count| page.saturating_add(1) < count),
            cache_type: self.cache.cache_type,
        }
    }

    /// Fetch parameters for `request_page`.
    pub fn request_params(&self) -> PageRequest {
        let page = self.request_page;
        let chunk = self.page_size.saturating_mul(self.pages_to_cache);
        match self.cache.cache_type {
            CacheType::Full => PageRequest {
                start_index: 0,
                size: None,
                page,
            },
            CacheType::Partial => PageRequest {
                start_index: page.saturating_mul(self.page_size),
                size: Some(chunk),
                page,
            },
            CacheType::Grow => {
                // Continue where the window ends so appended records stay contiguous.
                let wanted_end = page.saturating_add(1).saturating_mul(self.page_size);
                let missing = wanted_end.saturating_sub(self.cache.end);
                PageRequest {
                    start_index: self.cache.end,
                    size: Some(chunk.max(missing)),
                    page,
                }
            }
        }
    }

    /// Forget the cached window and go back to the first page.
    pub fn clear_cache(&mut self) {
        self.current_page = 0;
        self.request_page = 0;
        self.total = None;
        self.cache.start = 0;
        self.cache.end = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(total: Option<usize>, start: usize, end: usize) -> PaginationState {
        let mut state = PaginationState::new(20, 3, CacheType::Partial);
        state.total = total;
        state.cache.start = start;
        state.cache.end = end;
        state
    }

    #[test]
    fn last_page_is_clamped_to_total() {
        let state = state(Some(135), 120, 135);
        assert_eq!(state.page_range(6), 120..135);
        assert!(state.is_page_in_cache(6));
        assert!(!state.is_page_in_cache(5));
    }

    #[test]
    fn page_info_for_last_page() {
        let state = state(Some(135), 0, 60);
        let info = state.page_info_at(6);
        assert_eq!(info.pages_count, Some(7));
        assert!(!info.has_next);
        assert!(info.has_previous);
        assert!(state.page_info_at(5).has_next);
    }

    #[test]
    fn unknown_total_is_optimistic() {
        let state = state(None, 0, 0);
        let info = state.page_info();
        assert_eq!(info.pages_count, None);
        assert!(info.has_next);
        assert!(!info.has_previous);
        assert!(!state.is_page_in_cache(0));
    }

    #[test]
    fn slice_before_window_is_empty() {
        let state = state(Some(135), 120, 135);
        assert_eq!(state.slice_range(2), 0..0);
        assert_eq!(state.slice_range(6), 0..15);
    }

    #[test]
    fn grow_requests_continue_at_window_end() {
        let mut state = PaginationState::new(20, 3, CacheType::Grow);
        state.cache.end = 60;
        state.request_page = 3;
        let request = state.request_params();
        assert_eq!(request.start_index, 60);
        assert_eq!(request.size, Some(60));

        state.request_page = 9;
        assert_eq!(state.request_params().size, Some(140));
    }

    #[test]
    fn huge_page_index_saturates() {
        let mut state = state(Some(135), 0, 60);
        assert!(!state.page_info_at(usize::MAX).has_next);
        assert!(state.page_range(usize::MAX).is_empty());
        assert_eq!(state.slice_range(usize::MAX), 60..60);

        state.cache.cache_type = CacheType::Grow;
        state.request_page = usize::MAX;
        let request = state.request_params();
        assert_eq!((request.start_index, request.size), (60, Some(usize::MAX - 60)));
    }
}
