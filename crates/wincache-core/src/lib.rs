//! Windowed entity cache engine.
//!
//! A [`WindowStore`] keeps a window of a remote collection in memory and
//! decides, event by event, what to fetch next:
//!
//! - `pagination` - page arithmetic and the full / partial / grow caches
//! - `filter`, `view` - debounced filter and sort changes, applied locally
//!   or by reloading
//! - `changes` - the CRUD change log and its reconciled form
//! - `reactions` - follow-up policies such as next-page prefetch
//!
//! The store never performs I/O. It returns [`Effect`]s describing the
//! fetches to run; results come back as [`Event::LoadSuccess`] or
//! [`Event::LoadFail`].

pub mod changes;
pub mod config;
pub mod debounce;
pub mod error;
pub mod event;
pub mod filter;
pub mod options;
pub mod pagination;
pub mod query_params;
pub mod reactions;
pub mod record;
pub mod state;
pub mod store;
pub mod view;

pub use changes::{ChangeRecord, reconcile};
pub use config::{FilterConfig, PaginationConfig, SortConfig, StoreConfig};
pub use debounce::Debouncer;
pub use error::{ConfigError, CoreError, Result};
pub use event::{Effect, EntityPredicate, Event, FetchKind, FetchRequest, FetchTicket};
pub use filter::{Filter, FilterDecision, FilterRequest, FilterValue};
pub use options::StoreOptions;
pub use pagination::{CacheType, CacheWindow, PageInfo, PageRequest, PaginationState};
pub use query_params::QueryParams;
pub use reactions::{Reaction, ReactionRule, Signal};
pub use record::Record;
pub use state::{PendingFetch, WindowState};
pub use store::WindowStore;

pub use wincache_model as model;
