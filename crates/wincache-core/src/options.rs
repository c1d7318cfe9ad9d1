//! Behavioural hooks that cannot live in the TOML config.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use wincache_model::Entity;

use crate::filter::Filter;

/// Local filter function: does `entity` pass `filter`?
pub type LocalFilterFn<T, F> = Arc<dyn Fn(&T, &F) -> bool + Send + Sync>;
/// Decides whether a change from the previous filter needs a refetch.
pub type RemoteFilterFn<F> = Arc<dyn Fn(Option<&F>, &F) -> bool + Send + Sync>;
/// Local comparator on a named field.
pub type CompareFn<T> = Arc<dyn Fn(&T, &T, &str) -> Ordering + Send + Sync>;

pub struct StoreOptions<T, F> {
    pub local_filter: Option<LocalFilterFn<T, F>>,
    pub is_remote_filter: Option<RemoteFilterFn<F>>,
    /// Falls back to [`Entity::compare_field`] when unset.
    pub compare: Option<CompareFn<T>>,
    pub default_filter: Option<F>,
}

impl<T, F> Default for StoreOptions<T, F> {
    fn default() -> Self {
        Self {
            local_filter: None,
            is_remote_filter: None,
            compare: None,
            default_filter: None,
        }
    }
}

impl<T, F> Clone for StoreOptions<T, F>
where
    F: Clone,
{
    fn clone(&self) -> Self {
        Self {
            local_filter: self.local_filter.clone(),
            is_remote_filter: self.is_remote_filter.clone(),
            compare: self.compare.clone(),
            default_filter: self.default_filter.clone(),
        }
    }
}

impl<T: Entity, F: Filter> StoreOptions<T, F> {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_local_filter(
        mut self,
        filter: impl Fn(&T, &F) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.local_filter = Some(Arc::new(filter));
        self
    }

    #[must_use]
    pub fn with_remote_filter_predicate(
        mut self,
        predicate: impl Fn(Option<&F>, &F) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.is_remote_filter = Some(Arc::new(predicate));
        self
    }

    #[must_use]
    pub fn with_compare(
        mut self,
        compare: impl Fn(&T, &T, &str) -> Ordering + Send + Sync + 'static,
    ) -> Self {
        self.compare = Some(Arc::new(compare));
        self
    }

    #[must_use]
    pub fn with_default_filter(mut self, filter: F) -> Self {
        self.default_filter = Some(filter);
        self
    }

    /// How the default filter is classified at startup.
    pub(crate) fn default_filter_is_local(&self) -> bool {
        match (&self.default_filter, &self.local_filter) {
            (Some(filter), Some(_)) => !self
                .is_remote_filter
                .as_ref()
                .is_some_and(|predicate| predicate(None, filter)),
            _ => false,
        }
    }
}

impl<T, F: fmt::Debug> fmt::Debug for StoreOptions<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreOptions")
            .field("local_filter", &self.local_filter.is_some())
            .field("is_remote_filter", &self.is_remote_filter.is_some())
            .field("compare", &self.compare.is_some())
            .field("default_filter", &self.default_filter)
            .finish()
    }
}
