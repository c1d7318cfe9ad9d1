use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid entity id: {0:?}")]
    InvalidId(String),
    #[error("invalid sort direction: {0:?} (expected asc, desc or empty)")]
    InvalidSortDirection(String),
    #[error("invalid change type: {0:?}")]
    InvalidChangeType(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
