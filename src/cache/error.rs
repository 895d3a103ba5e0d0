use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
/// Errors returned by the result cache.
pub enum CacheError {
    /// Reading or writing the cache file failed.
    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The cache file is not valid JSON for the expected shape.
    #[error("cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The cache file was written by an incompatible format version.
    #[error("unsupported cache format version {found} in {path}")]
    UnsupportedVersion {
        /// File that was read.
        path: PathBuf,
        /// Version found in the file.
        found: u32,
    },
}

/// Convenience result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;
