//! Data model for windowed entity caches.
//!
//! Everything here is plain data: the keyed [`EntityCollection`], the sort
//! and filter records, the CRUD [`ChangeLog`] and the selection overlay.
//! The engine that moves these records between states lives in
//! `wincache-core`.

pub mod changes;
pub mod collection;
pub mod entity;
pub mod error;
pub mod ids;
pub mod selection;
pub mod sort;
pub mod status;

pub use changes::{ChangeLog, ChangeLogEntry, ChangeType};
pub use collection::{EntityCollection, UpdateOutcome};
pub use entity::{Entity, EntityUpdate};
pub use error::{ModelError, Result};
pub use ids::EntityId;
pub use selection::{Selection, SelectionMode};
pub use sort::{FilterState, Sort, SortDirection, SortState};
pub use status::LoadStatus;
