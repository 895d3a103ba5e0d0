use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
/// Errors returned while reading a bibliography.
pub enum ParseError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Neither whole-file nor per-entry parsing produced any entry.
    #[error("no BibTeX entries found")]
    NoEntries,
}

/// Convenience result type for bibliography parsing.
pub type ParseResult<T> = Result<T, ParseError>;
