//! Crossref REST API: DOI resolution and bibliographic search.

use async_trait::async_trait;
use serde::Deserialize;

use super::types::{Candidate, SearchQuery, SourceRecord, best_candidate};
use super::{
    HttpRequest, IdentifierResolver, SearchSource, SourceContext, SourceError, SourceResult,
    trim_base,
};
use crate::constants::MAX_SCORE;
use crate::hashing::fingerprint;
use crate::scoring::{AuthorName, first_author_surname};

pub const DOI_SOURCE_NAME: &str = "Crossref (DOI)";
pub const SEARCH_SOURCE_NAME: &str = "Crossref (Search)";

/// Items requested per bibliographic search.
const SEARCH_ROWS: &str = "3";

const DOI_PREFIXES: [&str; 5] = [
    "https://doi.org/",
    "http://doi.org/",
    "https://dx.doi.org/",
    "http://dx.doi.org/",
    "doi:",
];

/// Strips resolver URL and `doi:` prefixes. Returns `None` for a blank DOI.
pub fn normalize_doi(raw: &str) -> Option<String> {
    let mut doi = raw.trim();
    for prefix in DOI_PREFIXES {
        if doi
            .get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
        {
            doi = doi[prefix.len()..].trim();
            break;
        }
    }
    (!doi.is_empty()).then(|| doi.to_string())
}

#[derive(Debug, Deserialize)]
struct WorkEnvelope {
    message: Work,
}

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    message: WorkList,
}

#[derive(Debug, Deserialize)]
struct WorkList {
    #[serde(default)]
    items: Vec<Work>,
}

#[derive(Debug, Deserialize)]
struct Work {
    #[serde(default)]
    title: Vec<String>,
    #[serde(rename = "URL", default)]
    url: Option<String>,
    #[serde(rename = "DOI", default)]
    doi: Option<String>,
    #[serde(default)]
    author: Vec<AuthorName>,
    #[serde(default)]
    published: Option<DateParts>,
    #[serde(default)]
    issued: Option<DateParts>,
}

#[derive(Debug, Deserialize)]
struct DateParts {
    #[serde(rename = "date-parts", default)]
    date_parts: Vec<Vec<Option<i32>>>,
}

impl DateParts {
    fn year(&self) -> Option<i32> {
        self.date_parts.first()?.first().copied().flatten()
    }
}

impl Work {
    fn year(&self) -> Option<String> {
        self.published
            .as_ref()
            .and_then(DateParts::year)
            .or_else(|| self.issued.as_ref().and_then(DateParts::year))
            .map(|y| y.to_string())
    }

    fn into_record(self) -> SourceRecord {
        let year = self.year();
        SourceRecord {
            title: self.title.into_iter().next().unwrap_or_default(),
            url: self.url.unwrap_or_default(),
            identifier: self.doi,
            authors: self.author,
            year,
        }
    }
}

/// `{base}/works/{doi}` with every DOI segment percent-encoded; `/` inside the DOI is kept.
pub(crate) fn work_url(base_url: &str, doi: &str) -> SourceResult<String> {
    let base = trim_base(base_url);
    let mut url = reqwest::Url::parse(base).map_err(|e| SourceError::Transport {
        message: format!("invalid Crossref URL {base}: {e}"),
    })?;
    url.path_segments_mut()
        .map_err(|()| SourceError::Transport {
            message: format!("Crossref URL {base} cannot carry a path"),
        })?
        .pop_if_empty()
        .push("works")
        .extend(doi.split('/'));
    Ok(url.into())
}

/// Parses a `/works/{doi}` response body.
pub(crate) fn parse_work(body: &str) -> SourceResult<SourceRecord> {
    let envelope: WorkEnvelope = serde_json::from_str(body)?;
    Ok(envelope.message.into_record())
}

/// Parses a `/works?query...` response body.
pub(crate) fn parse_search(body: &str) -> SourceResult<Vec<SourceRecord>> {
    let envelope: SearchEnvelope = serde_json::from_str(body)?;
    Ok(envelope
        .message
        .items
        .into_iter()
        .map(Work::into_record)
        .collect())
}

/// Resolves DOIs through `GET {base}/works/{doi}`.
///
/// A resolved DOI is authoritative: the returned candidate always carries the maximum
/// score. Requests are not retried on rate limiting.
#[derive(Debug, Clone)]
pub struct CrossrefDoiResolver {
    base_url: String,
    ctx: SourceContext,
}

impl CrossrefDoiResolver {
    pub fn new(base_url: impl Into<String>, ctx: SourceContext) -> Self {
        Self {
            base_url: base_url.into(),
            ctx,
        }
    }

    async fn fetch(&self, doi: &str) -> SourceResult<Option<Candidate>> {
        let url = work_url(&self.base_url, doi)?;
        let body = self.ctx.fetch_once(&HttpRequest::get(url)).await?;
        let record = parse_work(&body)?;

        Ok(Some(Candidate {
            title: record.title,
            url: record.url,
            identifier: record.identifier.or_else(|| Some(doi.to_string())),
            authors: record.authors,
            year: record.year,
            source_name: DOI_SOURCE_NAME.to_string(),
            raw_similarity: MAX_SCORE,
            adjusted_score: MAX_SCORE,
            author_bonus: false,
            year_penalty: false,
        }))
    }
}

#[async_trait]
impl IdentifierResolver for CrossrefDoiResolver {
    fn name(&self) -> &str {
        DOI_SOURCE_NAME
    }

    async fn resolve(&self, identifier: &str) -> Option<Candidate> {
        let doi = normalize_doi(identifier)?;
        let key = fingerprint("crossref_doi", &[Some(doi.as_str())]);
        self.ctx
            .cached(DOI_SOURCE_NAME, key, || self.fetch(&doi))
            .await
    }
}

/// Bibliographic search through `GET {base}/works?query.bibliographic=...`.
///
/// The query is the title followed by the first author's surname. The best of the
/// returned items is kept.
#[derive(Debug, Clone)]
pub struct CrossrefSearch {
    base_url: String,
    ctx: SourceContext,
}

impl CrossrefSearch {
    pub fn new(base_url: impl Into<String>, ctx: SourceContext) -> Self {
        Self {
            base_url: base_url.into(),
            ctx,
        }
    }

    pub(crate) fn build_request(&self, query: &SearchQuery) -> HttpRequest {
        let mut text = query.title.clone();
        if let Some(surname) = query
            .author
            .as_deref()
            .map(first_author_surname)
            .filter(|s| !s.is_empty())
        {
            text.push(' ');
            text.push_str(&surname);
        }

        HttpRequest::get(format!("{}/works", trim_base(&self.base_url)))
            .query("query.bibliographic", text)
            .query("rows", SEARCH_ROWS)
    }

    async fn fetch(&self, query: &SearchQuery) -> SourceResult<Option<Candidate>> {
        let request = self.build_request(query);
        let body = self
            .ctx
            .fetch_with_backoff(SEARCH_SOURCE_NAME, &request)
            .await?;
        let cited = query.cited();

        Ok(best_candidate(
            parse_search(&body)?
                .into_iter()
                .map(|record| record.score_against(&cited, SEARCH_SOURCE_NAME)),
        ))
    }
}

#[async_trait]
impl SearchSource for CrossrefSearch {
    fn name(&self) -> &str {
        SEARCH_SOURCE_NAME
    }

    async fn search(&self, query: &SearchQuery) -> Option<Candidate> {
        let key = query.fingerprint("crossref_search");
        self.ctx
            .cached(SEARCH_SOURCE_NAME, key, || self.fetch(query))
            .await
    }
}
