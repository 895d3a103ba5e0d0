//! In-process stand-ins for the network and for whole adapters.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use super::error::{SourceError, SourceResult};
use super::transport::{HttpRequest, HttpResponse, HttpTransport};
use super::types::{Candidate, SearchQuery};
use super::{IdentifierResolver, SearchSource};

#[derive(Debug)]
struct Route {
    fragment: String,
    replies: VecDeque<SourceResult<HttpResponse>>,
}

/// Scripted [`HttpTransport`].
///
/// Routes match when their fragment occurs in the request signature
/// (`url?key=value&...`, unencoded). Replies for a route are served in order and the
/// last one repeats. Unmatched requests get a 404. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    routes: Arc<Mutex<Vec<Route>>>,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a reply for requests whose signature contains `fragment`.
    pub fn reply(&self, fragment: &str, reply: SourceResult<HttpResponse>) -> &Self {
        let mut routes = self.routes.lock();
        match routes.iter_mut().find(|r| r.fragment == fragment) {
            Some(route) => route.replies.push_back(reply),
            None => routes.push(Route {
                fragment: fragment.to_string(),
                replies: VecDeque::from([reply]),
            }),
        }
        self
    }

    pub fn respond(&self, fragment: &str, status: u16, body: impl Into<String>) -> &Self {
        self.reply(fragment, Ok(HttpResponse::new(status, body)))
    }

    /// Signature of a request as matched by routes.
    pub fn signature(request: &HttpRequest) -> String {
        let query = request
            .query
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        if query.is_empty() {
            request.url.clone()
        } else {
            format!("{}?{}", request.url, query)
        }
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Number of requests whose signature contains `fragment`.
    pub fn calls_matching(&self, fragment: &str) -> usize {
        self.requests
            .lock()
            .iter()
            .filter(|r| Self::signature(r).contains(fragment))
            .count()
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn get(&self, request: &HttpRequest) -> SourceResult<HttpResponse> {
        self.requests.lock().push(request.clone());

        let signature = Self::signature(request);
        let mut routes = self.routes.lock();
        let Some(route) = routes.iter_mut().find(|r| signature.contains(&r.fragment)) else {
            return Ok(HttpResponse::new(404, ""));
        };

        if route.replies.len() > 1 {
            route
                .replies
                .pop_front()
                .unwrap_or(Err(SourceError::Status { code: 404 }))
        } else {
            route
                .replies
                .front()
                .cloned()
                .unwrap_or(Err(SourceError::Status { code: 404 }))
        }
    }
}

/// [`SearchSource`] returning a fixed answer and counting calls.
#[derive(Debug, Clone)]
pub struct MockSearchSource {
    name: String,
    answer: Option<Candidate>,
    calls: Arc<AtomicUsize>,
    queries: Arc<Mutex<Vec<SearchQuery>>>,
}

impl MockSearchSource {
    pub fn new(name: &str, answer: Option<Candidate>) -> Self {
        Self {
            name: name.to_string(),
            answer,
            calls: Arc::new(AtomicUsize::new(0)),
            queries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A source that never finds anything.
    pub fn empty(name: &str) -> Self {
        Self::new(name, None)
    }

    /// A source answering with `title` at the given scores.
    pub fn scoring(name: &str, title: &str, raw_similarity: f64, adjusted_score: f64) -> Self {
        Self::new(
            name,
            Some(Candidate {
                title: title.to_string(),
                url: format!("https://example.org/{}", name.to_lowercase().replace(' ', "-")),
                identifier: None,
                authors: Vec::new(),
                year: None,
                source_name: name.to_string(),
                raw_similarity,
                adjusted_score,
                author_bonus: adjusted_score > raw_similarity,
                year_penalty: adjusted_score < raw_similarity,
            }),
        )
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> Vec<SearchQuery> {
        self.queries.lock().clone()
    }
}

#[async_trait]
impl SearchSource for MockSearchSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn search(&self, query: &SearchQuery) -> Option<Candidate> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().push(query.clone());
        self.answer.clone()
    }
}

/// [`IdentifierResolver`] returning a fixed answer and counting calls.
#[derive(Debug, Clone)]
pub struct MockResolver {
    answer: Option<Candidate>,
    calls: Arc<AtomicUsize>,
}

impl MockResolver {
    pub fn new(answer: Option<Candidate>) -> Self {
        Self {
            answer,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A resolver that finds `title` published in `year`.
    pub fn resolving(title: &str, year: Option<&str>) -> Self {
        Self::new(Some(Candidate {
            title: title.to_string(),
            url: "https://doi.org/10.0000/mock".to_string(),
            identifier: Some("10.0000/mock".to_string()),
            authors: Vec::new(),
            year: year.map(str::to_string),
            source_name: super::crossref::DOI_SOURCE_NAME.to_string(),
            raw_similarity: 100.0,
            adjusted_score: 100.0,
            author_bonus: false,
            year_penalty: false,
        }))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentifierResolver for MockResolver {
    fn name(&self) -> &str {
        super::crossref::DOI_SOURCE_NAME
    }

    async fn resolve(&self, _identifier: &str) -> Option<Candidate> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answer.clone()
    }
}
