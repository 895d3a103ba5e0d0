//! arXiv export API (Atom feed) search.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use super::types::{Candidate, SearchQuery, SourceRecord};
use super::{HttpRequest, SearchSource, SourceContext, SourceResult};
use crate::scoring::{AuthorName, first_author_surname};

pub const SOURCE_NAME: &str = "arXiv API";

static NON_WORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s]").expect("valid punctuation regex"));

#[derive(Debug, Deserialize)]
struct AtomFeed {
    #[serde(default)]
    entry: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    #[serde(default)]
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    published: Option<String>,
    #[serde(default)]
    author: Vec<AtomAuthor>,
}

#[derive(Debug, Deserialize)]
struct AtomAuthor {
    #[serde(default)]
    name: String,
}

impl AtomEntry {
    /// arXiv reports query errors as a single entry under `/api/errors`.
    fn is_error(&self) -> bool {
        self.id.contains("/api/errors")
    }

    fn into_record(self) -> SourceRecord {
        let identifier = self
            .id
            .split_once("/abs/")
            .map(|(_, id)| format!("arXiv:{id}"));
        SourceRecord {
            title: self.title.split_whitespace().collect::<Vec<_>>().join(" "),
            year: self
                .published
                .as_deref()
                .and_then(|p| p.get(..4))
                .map(str::to_string),
            authors: self
                .author
                .into_iter()
                .map(|a| a.name.trim().to_string())
                .filter(|n| !n.is_empty())
                .map(AuthorName::Display)
                .collect(),
            url: self.id,
            identifier,
        }
    }
}

/// Parses an Atom feed and returns its first real entry.
pub(crate) fn parse_feed(body: &str) -> SourceResult<Option<SourceRecord>> {
    let feed: AtomFeed = quick_xml::de::from_str(body)?;
    Ok(feed
        .entry
        .into_iter()
        .find(|e| !e.is_error())
        .map(AtomEntry::into_record))
}

/// Replaces punctuation with spaces and collapses whitespace.
fn clean_terms(text: &str) -> String {
    NON_WORD_RE
        .replace_all(text, " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// The strict and relaxed `search_query` expressions for `query`.
///
/// The relaxed form is only produced when an author surname is available.
pub(crate) fn query_stages(query: &SearchQuery) -> (String, Option<String>) {
    let title = clean_terms(&query.title);
    let surname = query
        .author
        .as_deref()
        .map(|a| clean_terms(&first_author_surname(a)))
        .filter(|s| !s.is_empty());

    match surname {
        Some(surname) => (
            format!("ti:\"{title}\" AND au:\"{surname}\""),
            Some(format!("all:{title} AND au:{surname}")),
        ),
        None => (format!("ti:\"{title}\""), None),
    }
}

/// Title search against arXiv.
///
/// Tries an exact-phrase title query first and falls back to a bag-of-words query
/// when the first one returns no entry.
#[derive(Debug, Clone)]
pub struct ArxivSearch {
    base_url: String,
    ctx: SourceContext,
}

impl ArxivSearch {
    pub fn new(base_url: impl Into<String>, ctx: SourceContext) -> Self {
        Self {
            base_url: base_url.into(),
            ctx,
        }
    }

    fn request(&self, search_query: String) -> HttpRequest {
        HttpRequest::get(self.base_url.trim())
            .query("search_query", search_query)
            .query("start", "0")
            .query("max_results", "1")
    }

    async fn fetch_stage(&self, search_query: String) -> SourceResult<Option<SourceRecord>> {
        let body = self
            .ctx
            .fetch_with_backoff(SOURCE_NAME, &self.request(search_query))
            .await?;
        parse_feed(&body)
    }

    async fn fetch(&self, query: &SearchQuery) -> SourceResult<Option<Candidate>> {
        let (strict, relaxed) = query_stages(query);

        let mut record = self.fetch_stage(strict).await?;
        if record.is_none() {
            if let Some(relaxed) = relaxed {
                record = self.fetch_stage(relaxed).await?;
            }
        }

        let cited = query.cited();
        Ok(record.map(|r| r.score_against(&cited, SOURCE_NAME)))
    }
}

#[async_trait]
impl SearchSource for ArxivSearch {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    async fn search(&self, query: &SearchQuery) -> Option<Candidate> {
        let key = query.fingerprint("arxiv");
        self.ctx
            .cached(SOURCE_NAME, key, || self.fetch(query))
            .await
    }
}
