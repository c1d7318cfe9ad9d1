//! Filter values, requests and the remote/local decision.

use std::fmt;
use std::time::Duration;

/// A filter value the store can hold.
///
/// Equality is used to suppress changes that resolve to the stored value.
pub trait Filter: Clone + PartialEq + Default + fmt::Debug {
    /// Partial filter merged over the stored value.
    type Patch: Clone + fmt::Debug;

    /// Return `self` with `patch` applied.
    fn patched(&self, patch: &Self::Patch) -> Self;
}

/// Replacement or patch carried by a filter request.
#[derive(Debug, Clone)]
pub enum FilterValue<F: Filter> {
    Replace(F),
    Patch(F::Patch),
}

impl<F: Filter> FilterValue<F> {
    /// Resolve against the value stored when the request fires.
    pub fn resolve(self, stored: Option<&F>) -> F {
        match self {
            Self::Replace(value) => value,
            Self::Patch(patch) => stored.cloned().unwrap_or_default().patched(&patch),
        }
    }
}

/// A `setFilter` request.
#[derive(Debug, Clone)]
pub struct FilterRequest<F: Filter> {
    pub value: FilterValue<F>,
    /// Skip debounce and distinct suppression.
    pub force_load: bool,
    /// Overrides the configured debounce for this request.
    pub debounce: Option<Duration>,
}

impl<F: Filter> FilterRequest<F> {
    pub fn replace(value: F) -> Self {
        Self {
            value: FilterValue::Replace(value),
            force_load: false,
            debounce: None,
        }
    }

    pub fn patch(patch: F::Patch) -> Self {
        Self {
            value: FilterValue::Patch(patch),
            force_load: false,
            debounce: None,
        }
    }

    #[must_use]
    pub fn with_force_load(mut self, force_load: bool) -> Self {
        self.force_load = force_load;
        self
    }

    #[must_use]
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = Some(debounce);
        self
    }
}

/// Where a settled filter change is applied.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterDecision<F> {
    /// Same as the stored value; nothing happens.
    Unchanged,
    /// The data source must refetch.
    Remote(F),
    /// Re-derive the view from the cached records.
    Local(F),
}

/// Classify a resolved filter value.
///
/// Remote when the predicate says so, or when there is no local filter
/// function to apply it with.
pub fn classify<F: Filter>(
    previous: Option<&F>,
    resolved: F,
    force_load: bool,
    is_remote: Option<&(dyn Fn(Option<&F>, &F) -> bool + Send + Sync)>,
    has_local_filter: bool,
) -> FilterDecision<F> {
    if !force_load && previous == Some(&resolved) {
        return FilterDecision::Unchanged;
    }
    let remote = !has_local_filter || is_remote.is_some_and(|predicate| predicate(previous, &resolved));
    if remote {
        FilterDecision::Remote(resolved)
    } else {
        FilterDecision::Local(resolved)
    }
}
