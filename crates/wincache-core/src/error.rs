use std::path::PathBuf;

use thiserror::Error;
use wincache_model::ModelError;

/// Configuration loading error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML config {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to parse TOML config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {message}")]
    Invalid { message: String },
}

impl ConfigError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("failed to encode or decode filter as JSON: {0}")]
    FilterJson(#[from] serde_json::Error),

    #[error("invalid query parameter {name}={value:?}")]
    InvalidQueryParam { name: String, value: String },
}

pub type Result<T> = std::result::Result<T, CoreError>;
