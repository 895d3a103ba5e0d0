//! Bibliographic source adapters.
//!
//! Each adapter turns a [`SearchQuery`] (or a DOI) into at most one scored
//! [`Candidate`]. Adapters share a [`SourceContext`]: the HTTP transport, the result
//! cache and the request pacing. Lookups go cache → politeness delay → request →
//! score → cache insert. Failures are logged and reported as "no result".

pub mod arxiv;
pub mod crossref;
pub mod error;
pub mod pacing;
pub mod semantic_scholar;
pub mod transport;
pub mod types;

#[cfg(any(test, feature = "mock"))]
pub mod mock;


use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::cache::CacheHandle;
use crate::config::Config;

pub use arxiv::ArxivSearch;
pub use crossref::{CrossrefDoiResolver, CrossrefSearch, normalize_doi};
pub use error::{SourceError, SourceResult};
pub use pacing::RequestPacing;
pub use semantic_scholar::SemanticScholarSearch;
pub use transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
pub use types::{Candidate, SearchQuery, SourceRecord, best_candidate};

#[cfg(any(test, feature = "mock"))]
pub use mock::{MockResolver, MockSearchSource, MockTransport};

#[async_trait]
/// A title search against one bibliographic source.
pub trait SearchSource: Send + Sync {
    /// Label reported as the verdict's `source`.
    fn name(&self) -> &str;

    /// Returns the best-scoring candidate, or `None` on no hit or any failure.
    async fn search(&self, query: &SearchQuery) -> Option<Candidate>;
}

#[async_trait]
/// Direct lookup of a persistent identifier (DOI).
pub trait IdentifierResolver: Send + Sync {
    fn name(&self) -> &str;

    /// Returns the record the identifier resolves to, or `None` if it does not resolve.
    async fn resolve(&self, identifier: &str) -> Option<Candidate>;
}

/// Transport, cache and pacing shared by every adapter.
#[derive(Clone)]
pub struct SourceContext {
    pub transport: Arc<dyn HttpTransport>,
    pub cache: CacheHandle,
    pub pacing: RequestPacing,
}

impl SourceContext {
    pub fn new(transport: Arc<dyn HttpTransport>, cache: CacheHandle, pacing: RequestPacing) -> Self {
        Self {
            transport,
            cache,
            pacing,
        }
    }

    /// Real HTTP transport configured from `config`.
    pub fn from_config(config: &Config, cache: CacheHandle) -> SourceResult<Self> {
        let transport = ReqwestTransport::new(&config.user_agent, config.request_timeout())?;
        Ok(Self::new(
            Arc::new(transport),
            cache,
            RequestPacing::from_config(config),
        ))
    }

    /// Serves `fingerprint` from the cache, or runs `fetch` and caches a hit.
    ///
    /// Misses and errors are not cached.
    pub(crate) async fn cached<F, Fut>(
        &self,
        source: &str,
        fingerprint: String,
        fetch: F,
    ) -> Option<Candidate>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = SourceResult<Option<Candidate>>>,
    {
        if let Some(hit) = self.cache.get(&fingerprint) {
            debug!(source, fingerprint = %fingerprint, "Cache hit");
            return Some(hit);
        }

        match fetch().await {
            Ok(Some(candidate)) => {
                debug!(
                    source,
                    title = %candidate.title,
                    adjusted_score = candidate.adjusted_score,
                    "Source hit"
                );
                self.cache.insert(fingerprint, candidate.clone());
                Some(candidate)
            }
            Ok(None) => {
                debug!(source, "No result");
                None
            }
            Err(err) => {
                warn!(source, error = %err, "Source lookup failed");
                None
            }
        }
    }

    /// Sends `request` with rate-limit backoff and returns the 2xx body.
    pub(crate) async fn fetch_with_backoff(
        &self,
        source: &str,
        request: &HttpRequest,
    ) -> SourceResult<String> {
        self.pacing
            .with_backoff(source, || async {
                self.transport.get(request).await?.into_body()
            })
            .await
    }

    /// Sends `request` once and returns the 2xx body.
    pub(crate) async fn fetch_once(&self, request: &HttpRequest) -> SourceResult<String> {
        self.pacing
            .once(|| async { self.transport.get(request).await?.into_body() })
            .await
    }
}

impl std::fmt::Debug for SourceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceContext")
            .field("cache", &self.cache)
            .field("pacing", &self.pacing)
            .finish()
    }
}

/// Base URL without trailing slashes.
pub(crate) fn trim_base(url: &str) -> &str {
    url.trim().trim_end_matches('/')
}
