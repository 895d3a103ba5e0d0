//! Citation verification library (used by the `citecheck` binary and integration tests).
//!
//! # Public API Surface
//!
//! ## Pipeline
//! - [`Verifier`] - per-entry decision procedure and bounded batch runner
//! - [`Verdict`], [`VerdictStatus`] - one result per entry
//! - [`CitationEntry`] and [`entry::bibtex`] - input records and the BibTeX reader
//!
//! ## Sources
//! - [`SearchSource`], [`IdentifierResolver`] - adapter seams
//! - [`CrossrefDoiResolver`], [`CrossrefSearch`], [`ArxivSearch`], [`SemanticScholarSearch`]
//! - [`HttpTransport`], [`ReqwestTransport`] - network seam
//! - [`RequestPacing`] - politeness delay and rate-limit backoff
//!
//! ## Scoring
//! - [`scoring::score`], [`scoring::title_similarity`], [`scoring::author_matches`],
//!   [`scoring::year_matches`] - pure similarity functions
//! - [`Thresholds`] - acceptance / uncertain cut-offs
//!
//! ## Cache
//! - [`ResultCache`], [`CacheHandle`] - fingerprint → candidate store with JSON persistence
//! - [`hashing::fingerprint`] - cache keys
//!
//! ## Test/Mock Support
//! Mock transport and sources are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod cache;
pub mod config;
pub mod constants;
pub mod entry;
pub mod hashing;
pub mod report;
pub mod scoring;
pub mod sources;
pub mod verify;

pub use cache::{CacheError, CacheHandle, CacheResult, ResultCache};
pub use config::{Config, ConfigError};
pub use constants::{ThresholdError, Thresholds};
pub use entry::{CitationEntry, ParseError};
pub use hashing::fingerprint;
pub use scoring::{AuthorName, ScoreBreakdown, YearAgreement};
pub use sources::{
    ArxivSearch, Candidate, CrossrefDoiResolver, CrossrefSearch, HttpTransport,
    IdentifierResolver, ReqwestTransport, RequestPacing, SearchQuery, SearchSource,
    SemanticScholarSearch, SourceContext, SourceError,
};
#[cfg(any(test, feature = "mock"))]
pub use sources::{MockResolver, MockSearchSource, MockTransport};
pub use verify::{Verdict, VerdictStatus, Verifier};
