use thiserror::Error;

/// Result type for record store operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Hard failures of a record store.
///
/// Not-found conditions are never represented here: they surface as
/// `Ok(None)`, `Ok(false)` or an empty collection.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    #[error("storage operation timed out: {0}")]
    Timeout(String),
    #[error("storage query failed: {0}")]
    Query(String),
    #[error("storage i/o failed: {0}")]
    Io(String),
    #[error("storage serialization failed: {0}")]
    Serialization(String),
    #[error("stored data is invalid: {0}")]
    InvalidData(String),
    #[error("record id already exists: {0}")]
    Conflict(String),
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}
