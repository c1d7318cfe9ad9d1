//! The fetch collaborator contract.

use std::future::Future;

use serde::{Deserialize, Serialize};
use wincache_core::FetchRequest;

use crate::error::SourceError;

/// One answered fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchResult<T> {
    pub entities: Vec<T>,
    /// Size of the whole (filtered) collection, when the source knows it.
    #[serde(default)]
    pub total: Option<usize>,
    /// Set by sources that can only tell whether more records follow.
    #[serde(default)]
    pub has_more: Option<bool>,
}

impl<T> FetchResult<T> {
    pub fn new(entities: Vec<T>, total: Option<usize>) -> Self {
        Self {
            entities,
            total,
            has_more: None,
        }
    }
}

/// Answers the fetch requests a store emits.
///
/// Implementations are shared between concurrently running fetches.
pub trait EntitySource<T, F>: Send + Sync + 'static {
    fn fetch(
        &self,
        request: FetchRequest<F>,
    ) -> impl Future<Output = Result<FetchResult<T>, SourceError>> + Send;
}
