//! Core error types

use thiserror::Error;

/// Key-value store failures
///
/// Callers in the engines treat every variant as "no saved value"; the
/// distinction only matters for logging.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Storage is disabled or otherwise not reachable
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Reading or writing the backing file failed
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The backing data could not be decoded
    #[error("store data is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Result type for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;
