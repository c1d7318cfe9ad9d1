//! Pagination cache engine.
//!
//! - `state` - the pagination record, page arithmetic and cache-hit tests
//! - `strategy` - full / partial / grow merge functions

mod state;
pub mod strategy;

pub use state::{CacheType, CacheWindow, PageInfo, PageRequest, PaginationState};
pub use strategy::MergeOutcome;
