//! An [`EntitySource`] over a vector, for demos and tests.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde_json::Value;
use tracing::trace;
use wincache_core::view::directed;
use wincache_core::{FetchRequest, Record};
use wincache_model::Entity;

use crate::error::SourceError;
use crate::source::{EntitySource, FetchResult};

/// Decides whether a record passes a remote filter.
pub type MatchFn<T, F> = Arc<dyn Fn(&T, &F) -> bool + Send + Sync>;

/// Serves pages out of an in-memory list the way a paging backend would:
/// filter, then sort, then slice, reporting the filtered total.
pub struct InMemorySource<T, F> {
    records: Vec<T>,
    matcher: Option<MatchFn<T, F>>,
    latency: Option<Duration>,
    requests: AtomicUsize,
}

impl<T: Entity, F> InMemorySource<T, F> {
    pub fn new(records: Vec<T>) -> Self {
        Self {
            records,
            matcher: None,
            latency: None,
            requests: AtomicUsize::new(0),
        }
    }

    /// Apply request filters with `matcher`. Without one, filters are ignored.
    #[must_use]
    pub fn with_matcher(mut self, matcher: impl Fn(&T, &F) -> bool + Send + Sync + 'static) -> Self {
        self.matcher = Some(Arc::new(matcher));
        self
    }

    /// Delay every answer.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Number of fetches served so far.
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Answer `request` synchronously.
    pub fn answer(&self, request: &FetchRequest<F>) -> FetchResult<T> {
        let mut matching: Vec<&T> = match (&request.filter, &self.matcher) {
            (Some(filter), Some(matcher)) => self
                .records
                .iter()
                .filter(|record| matcher(*record, filter))
                .collect(),
            _ => self.records.iter().collect(),
        };
        if let Some(sort) = &request.sort
            && !sort.is_unsorted()
        {
            matching.sort_by(|a, b| directed(a.compare_field(b, &sort.field), sort.direction));
        }

        let total = matching.len();
        let start = request.start_index.min(total);
        let end = request
            .size
            .map_or(total, |size| start.saturating_add(size).min(total));
        FetchResult::new(matching.drain(start..end).cloned().collect(), Some(total))
    }
}

impl InMemorySource<Record, Value> {
    /// JSON records filtered with [`Record::matches`].
    pub fn for_records(records: Vec<Record>) -> Self {
        Self::new(records).with_matcher(|record: &Record, filter: &Value| record.matches(filter))
    }
}

impl<T, F> EntitySource<T, F> for InMemorySource<T, F>
where
    T: Entity + Send + Sync + 'static,
    F: Send + Sync + 'static,
{
    fn fetch(
        &self,
        request: FetchRequest<F>,
    ) -> impl Future<Output = Result<FetchResult<T>, SourceError>> + Send {
        self.requests.fetch_add(1, Ordering::Relaxed);
        let result = self.answer(&request);
        trace!(
            ticket = request.ticket.0,
            start_index = request.start_index,
            returned = result.entities.len(),
            total = ?result.total,
            "in-memory fetch answered"
        );
        let latency = self.latency;
        async move {
            if let Some(latency) = latency {
                tokio::time::sleep(latency).await;
            }
            Ok(result)
        }
    }
}

impl<T, F> fmt::Debug for InMemorySource<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemorySource")
            .field("records", &self.records.len())
            .field("matcher", &self.matcher.is_some())
            .field("latency", &self.latency)
            .field("requests", &self.requests.load(Ordering::Relaxed))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wincache_core::FetchKind;
    use wincache_core::event::FetchTicket;
    use wincache_model::Sort;

    use super::*;

    fn records() -> Vec<Record> {
        (0..25)
            .map(|i| serde_json::from_value(json!({"id": i, "name": format!("item-{i}")})).unwrap())
            .collect()
    }

    fn request(start_index: usize, size: Option<usize>) -> FetchRequest<Value> {
        FetchRequest {
            ticket: FetchTicket(1),
            kind: FetchKind::Page,
            start_index,
            size,
            page: None,
            filter: None,
            sort: None,
        }
    }

    #[test]
    fn slices_and_reports_total() {
        let source = InMemorySource::for_records(records());
        let result = source.answer(&request(20, Some(10)));
        assert_eq!(result.entities.len(), 5);
        assert_eq!(result.total, Some(25));
        assert!(source.answer(&request(40, Some(10))).entities.is_empty());
    }

    #[test]
    fn filters_then_sorts() {
        let source = InMemorySource::for_records(records());
        let mut req = request(0, None);
        req.filter = Some(json!({"name": "item-1"}));
        req.sort = Some(Sort::desc("id"));
        let result = source.answer(&req);
        let ids: Vec<i64> = result
            .entities
            .iter()
            .filter_map(|r| r.get("id").and_then(Value::as_i64))
            .collect();
        assert_eq!(ids, vec![19, 18, 17, 16, 15, 14, 13, 12, 11, 10, 1]);
        assert_eq!(result.total, Some(11));
    }
}
