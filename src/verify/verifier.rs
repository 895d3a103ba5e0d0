use std::sync::Arc;

use futures_util::stream::{self, StreamExt};
use tracing::{debug, info, instrument};

use super::verdict::Verdict;
use crate::cache::CacheHandle;
use crate::config::Config;
use crate::constants::Thresholds;
use crate::entry::CitationEntry;
use crate::scoring::{CitedWork, YearAgreement, normalize_title, score, year_matches};
use crate::sources::{
    ArxivSearch, Candidate, CrossrefDoiResolver, CrossrefSearch, IdentifierResolver,
    SearchQuery, SearchSource, SemanticScholarSearch, SourceContext, SourceResult,
    best_candidate,
};

pub const NO_TITLE_REASON: &str = "no title";
pub const NO_RESULTS_REASON: &str = "no results from any source";

/// Default concurrent verifications in [`Verifier::verify_all`].
pub const DEFAULT_MAX_WORKERS: usize = 5;

/// Runs the per-entry decision procedure over an identifier resolver and an ordered
/// cascade of search sources.
///
/// `verify` never fails: source errors have already been folded into "no result" by
/// the adapters, and an entry without a title becomes an `error` verdict.
pub struct Verifier {
    thresholds: Thresholds,
    resolver: Option<Arc<dyn IdentifierResolver>>,
    sources: Vec<Arc<dyn SearchSource>>,
    max_workers: usize,
}

impl Verifier {
    /// Creates a verifier with no sources. Add them with [`Verifier::with_resolver`] and
    /// [`Verifier::with_source`]; sources are queried in the order they are added.
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            thresholds,
            resolver: None,
            sources: Vec::new(),
            max_workers: DEFAULT_MAX_WORKERS,
        }
    }

    /// Crossref DOI resolution, then Crossref search → arXiv → Semantic Scholar.
    pub fn from_config(config: &Config, cache: CacheHandle) -> SourceResult<Self> {
        let ctx = SourceContext::from_config(config, cache)?;
        Ok(Self::with_context(config, ctx))
    }

    /// Same cascade as [`Verifier::from_config`] over a caller-provided context.
    pub fn with_context(config: &Config, ctx: SourceContext) -> Self {
        Self::new(config.thresholds())
            .with_max_workers(config.max_workers)
            .with_resolver(Arc::new(CrossrefDoiResolver::new(
                config.crossref_url.clone(),
                ctx.clone(),
            )))
            .with_source(Arc::new(CrossrefSearch::new(
                config.crossref_url.clone(),
                ctx.clone(),
            )))
            .with_source(Arc::new(ArxivSearch::new(
                config.arxiv_url.clone(),
                ctx.clone(),
            )))
            .with_source(Arc::new(
                SemanticScholarSearch::new(config.semantic_scholar_url.clone(), ctx)
                    .with_api_key(config.semantic_scholar_api_key.clone()),
            ))
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn IdentifierResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn with_source(mut self, source: Arc<dyn SearchSource>) -> Self {
        self.sources.push(source);
        self
    }

    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.max(1);
        self
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    /// Names of the search sources, in cascade order.
    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Verifies one entry.
    #[instrument(skip(self, entry), fields(entry_id = %entry.id))]
    pub async fn verify(&self, entry: &CitationEntry) -> Verdict {
        let title = normalize_title(entry.title.as_deref().unwrap_or_default());
        if title.is_empty() {
            debug!("Entry has no title");
            return Verdict::error(&entry.id, NO_TITLE_REASON);
        }

        let query = SearchQuery::new(title, entry.author.clone(), entry.year.clone());

        if let Some(verdict) = self.check_identifier(entry, &query).await {
            return verdict;
        }

        let mut candidates = Vec::with_capacity(self.sources.len());
        for source in &self.sources {
            let Some(candidate) = source.search(&query).await else {
                continue;
            };

            if candidate.adjusted_score >= self.thresholds.acceptance {
                info!(
                    source = source.name(),
                    adjusted_score = candidate.adjusted_score,
                    "Citation verified"
                );
                return Verdict::valid(&entry.id, &candidate);
            }
            candidates.push(candidate);
        }

        self.decide(&entry.id, candidates)
    }

    /// DOI short-circuit. Returns `None` when there is no DOI or it does not resolve.
    async fn check_identifier(
        &self,
        entry: &CitationEntry,
        query: &SearchQuery,
    ) -> Option<Verdict> {
        let resolver = self.resolver.as_ref()?;
        let doi = entry.doi.as_deref().filter(|d| !d.trim().is_empty())?;
        let hit = resolver.resolve(doi).await?;

        let cited = query.cited();
        let rescored = rescore(&cited, &hit);

        match year_matches(cited.year, hit.year.as_deref()) {
            YearAgreement::Mismatch => {
                let reason = format!(
                    "DOI resolved but year mismatch (cited: {}, record: {})",
                    cited.year.unwrap_or_default(),
                    hit.year.as_deref().unwrap_or_default()
                );
                info!(doi, %reason, "DOI year disagrees");
                Some(Verdict::uncertain(&entry.id, &rescored, reason))
            }
            YearAgreement::Match | YearAgreement::Unknown => {
                info!(doi, "Citation verified by DOI");
                Some(Verdict::valid(&entry.id, &rescored))
            }
        }
    }

    fn decide(&self, entry_id: &str, candidates: Vec<Candidate>) -> Verdict {
        let Some(best) = best_candidate(candidates) else {
            info!("No source returned a candidate");
            return Verdict::not_found(entry_id, NO_RESULTS_REASON, None);
        };

        if best.adjusted_score >= self.thresholds.uncertain {
            let reason = uncertain_reason(&best, self.thresholds.acceptance);
            info!(source = %best.source_name, %reason, "Citation uncertain");
            return Verdict::uncertain(entry_id, &best, reason);
        }

        let reason = format!(
            "Best match only {:.0}% similar (adjusted score {:.0})",
            best.raw_similarity, best.adjusted_score
        );
        info!(source = %best.source_name, %reason, "Citation not found");
        Verdict::not_found(entry_id, reason, Some(best))
    }

    /// Verifies `entries` with up to `max_workers` in flight. Verdicts are returned in
    /// input order.
    pub async fn verify_all(&self, entries: &[CitationEntry]) -> Vec<Verdict> {
        let mut indexed: Vec<(usize, Verdict)> = stream::iter(entries.iter().enumerate())
            .map(|(index, entry)| async move { (index, self.verify(entry).await) })
            .buffer_unordered(self.max_workers)
            .collect()
            .await;

        indexed.sort_by_key(|(index, _)| *index);
        indexed.into_iter().map(|(_, verdict)| verdict).collect()
    }
}

impl std::fmt::Debug for Verifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Verifier")
            .field("thresholds", &self.thresholds)
            .field(
                "resolver",
                &self.resolver.as_ref().map(|r| r.name().to_string()),
            )
            .field("sources", &self.source_names())
            .field("max_workers", &self.max_workers)
            .finish()
    }
}

/// Replaces a resolved record's fixed score with its actual agreement with the
/// citation, keeping the record itself.
fn rescore(cited: &CitedWork<'_>, hit: &Candidate) -> Candidate {
    let breakdown = score(cited, &hit.title, &hit.authors, hit.year.as_deref());
    Candidate {
        raw_similarity: breakdown.raw_similarity,
        adjusted_score: breakdown.adjusted_score,
        author_bonus: breakdown.author_bonus,
        year_penalty: breakdown.year_penalty,
        ..hit.clone()
    }
}

/// `"Similarity 80% (boosted by author match) (threshold 85%)"`.
pub(crate) fn uncertain_reason(candidate: &Candidate, acceptance: f64) -> String {
    let mut reason = format!("Similarity {:.0}%", candidate.raw_similarity);
    if candidate.author_bonus {
        reason.push_str(" (boosted by author match)");
    }
    if candidate.year_penalty {
        reason.push_str(" (penalized by year mismatch)");
    }
    reason.push_str(&format!(" (threshold {acceptance:.0}%)"));
    reason
}
