//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

use crate::constants::ThresholdError;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A numeric environment variable could not be parsed.
    #[error("failed to parse {name}='{value}': expected a number")]
    InvalidNumber { name: &'static str, value: String },

    /// A boolean environment variable could not be parsed.
    #[error("failed to parse {name}='{value}': expected true/false")]
    InvalidBool { name: &'static str, value: String },

    /// Acceptance/uncertain thresholds are out of range or inverted.
    #[error("invalid thresholds: {0}")]
    Thresholds(#[from] ThresholdError),

    /// Politeness delay window has `min > max`.
    #[error("invalid delay window: min {min_ms}ms is greater than max {max_ms}ms")]
    InvalidDelayWindow { min_ms: u64, max_ms: u64 },

    /// Backoff jitter window has `min > max`.
    #[error("invalid jitter window: min {min_ms}ms is greater than max {max_ms}ms")]
    InvalidJitterWindow { min_ms: u64, max_ms: u64 },

    /// A count that must be positive was zero.
    #[error("{name} must be greater than zero")]
    Zero { name: &'static str },

    /// A source URL is empty.
    #[error("{name} must not be empty")]
    EmptyUrl { name: &'static str },

    /// The cache path points at a directory.
    #[error("cache path is a directory: {path}")]
    CachePathIsDirectory { path: PathBuf },
}
