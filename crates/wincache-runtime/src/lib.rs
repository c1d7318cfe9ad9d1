//! Async driver for window stores.
//!
//! [`spawn_store`] moves a [`WindowStore`](wincache_core::WindowStore) onto a
//! tokio task, fires its debounce deadlines with `tokio::time` and answers
//! its fetch requests through an [`EntitySource`].

pub mod driver;
pub mod error;
pub mod memory;
pub mod source;

pub use driver::{StoreHandle, spawn_store};
pub use error::{Result, RuntimeError, SourceError};
pub use memory::InMemorySource;
pub use source::{EntitySource, FetchResult};
