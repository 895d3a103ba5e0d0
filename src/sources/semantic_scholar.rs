//! Semantic Scholar Graph API paper search.

use async_trait::async_trait;
use serde::Deserialize;

use super::types::{Candidate, SearchQuery, SourceRecord};
use super::{HttpRequest, SearchSource, SourceContext, SourceResult, trim_base};
use crate::scoring::AuthorName;

pub const SOURCE_NAME: &str = "Semantic Scholar";

const FIELDS: &str = "title,url,year,authors,externalIds";

#[derive(Debug, Deserialize)]
struct SearchPage {
    #[serde(default)]
    data: Vec<Paper>,
}

#[derive(Debug, Deserialize)]
struct Paper {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    year: Option<i32>,
    #[serde(default)]
    authors: Vec<AuthorName>,
    #[serde(rename = "externalIds", default)]
    external_ids: Option<ExternalIds>,
}

#[derive(Debug, Deserialize)]
struct ExternalIds {
    #[serde(rename = "DOI", default)]
    doi: Option<String>,
}

impl Paper {
    fn into_record(self) -> SourceRecord {
        SourceRecord {
            title: self.title.unwrap_or_default(),
            url: self.url.unwrap_or_default(),
            identifier: self.external_ids.and_then(|ids| ids.doi),
            authors: self.authors,
            year: self.year.map(|y| y.to_string()),
        }
    }
}

/// Parses a `/paper/search` response and returns its first paper.
pub(crate) fn parse_page(body: &str) -> SourceResult<Option<SourceRecord>> {
    let page: SearchPage = serde_json::from_str(body)?;
    Ok(page.data.into_iter().next().map(Paper::into_record))
}

/// Title search against Semantic Scholar (single best result).
#[derive(Debug, Clone)]
pub struct SemanticScholarSearch {
    base_url: String,
    api_key: Option<String>,
    ctx: SourceContext,
}

impl SemanticScholarSearch {
    pub fn new(base_url: impl Into<String>, ctx: SourceContext) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            ctx,
        }
    }

    /// Sends `x-api-key` with every request.
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    pub(crate) fn build_request(&self, query: &SearchQuery) -> HttpRequest {
        let request = HttpRequest::get(format!(
            "{}/graph/v1/paper/search",
            trim_base(&self.base_url)
        ))
        .query("query", query.title.clone())
        .query("limit", "1")
        .query("fields", FIELDS);

        match &self.api_key {
            Some(key) => request.header("x-api-key", key.clone()),
            None => request,
        }
    }

    async fn fetch(&self, query: &SearchQuery) -> SourceResult<Option<Candidate>> {
        let body = self
            .ctx
            .fetch_with_backoff(SOURCE_NAME, &self.build_request(query))
            .await?;
        let cited = query.cited();
        Ok(parse_page(&body)?.map(|r| r.score_against(&cited, SOURCE_NAME)))
    }
}

#[async_trait]
impl SearchSource for SemanticScholarSearch {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    async fn search(&self, query: &SearchQuery) -> Option<Candidate> {
        let key = query.fingerprint("semantic_scholar");
        self.ctx
            .cached(SOURCE_NAME, key, || self.fetch(query))
            .await
    }
}
