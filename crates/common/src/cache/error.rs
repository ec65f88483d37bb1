//! Cache error types
//!
//! Only construction and configuration can fail inside the cache itself.
//! Loader failures are not represented here: `CacheMap::try_get` hands the
//! loader's own error back to the caller unchanged.

use thiserror::Error;

/// Cache error type
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Invalid cache configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to spawn cache sweeper thread: {0}")]
    SweeperSpawn(#[source] std::io::Error),

    #[error("Failed to read cache configuration: {0}")]
    ConfigIo(#[source] std::io::Error),

    #[error(transparent)]
    ConfigParse(#[from] toml::de::Error),
}

/// Cache result type
pub type CacheResult<T> = Result<T, CacheError>;

impl CacheError {
    /// Shorthand for an [`CacheError::InvalidConfig`] with a formatted reason
    pub(crate) fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig(reason.into())
    }
}
