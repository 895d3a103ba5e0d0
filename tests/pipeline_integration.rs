//! End-to-end verification against stub Crossref, arXiv and Semantic Scholar servers
//! through the real HTTP transport.

mod common;

use std::time::Duration;

use citecheck::{CacheHandle, CitationEntry, Verdict, VerdictStatus, Verifier};
use common::{
    ARXIV_PATH, S2_PATH, arxiv_feed, config_for, crossref_search, crossref_work, s2_empty,
    s2_page,
};
use tempfile::TempDir;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TITLE: &str = "Attention Is All You Need";

fn attention() -> CitationEntry {
    CitationEntry::new("vaswani2017")
        .with_title(TITLE)
        .with_author("Vaswani, Ashish and Shazeer, Noam")
        .with_year("2017")
}

async fn verify(server: &MockServer, dir: &TempDir, entry: &CitationEntry) -> Verdict {
    let config = config_for(server, dir.path().join("cache.json"));
    let cache = CacheHandle::load(&config.cache_path, config.persist_on_write);
    let verifier = Verifier::from_config(&config, cache).expect("verifier builds");
    verifier.verify(entry).await
}

async fn mount_empty_sources(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/works"))
        .respond_with(ResponseTemplate::new(200).set_body_json(crossref_search(vec![])))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(ARXIV_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(arxiv_feed(&[])))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(S2_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(s2_empty()))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_doi_resolution_skips_search() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/works/10.48550/arXiv.1706.03762"))
        .respond_with(ResponseTemplate::new(200).set_body_json(crossref_work(TITLE, "Vaswani", 2017)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/works"))
        .respond_with(ResponseTemplate::new(200).set_body_json(crossref_search(vec![])))
        .expect(0)
        .mount(&server)
        .await;

    let entry = attention().with_doi("https://doi.org/10.48550/arXiv.1706.03762");
    let verdict = verify(&server, &dir, &entry).await;

    assert_eq!(verdict.status, VerdictStatus::Valid);
    assert_eq!(verdict.source.as_deref(), Some("Crossref (DOI)"));
    assert_eq!(verdict.title.as_deref(), Some(TITLE));
}

#[tokio::test]
async fn test_doi_year_conflict_is_uncertain() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/works/10.1/old"))
        .respond_with(ResponseTemplate::new(200).set_body_json(crossref_work(TITLE, "Vaswani", 2009)))
        .mount(&server)
        .await;

    let verdict = verify(&server, &dir, &attention().with_doi("10.1/old")).await;

    assert_eq!(verdict.status, VerdictStatus::Uncertain);
    assert!(verdict.reason.unwrap().contains("year mismatch"));
}

#[tokio::test]
async fn test_crossref_hit_short_circuits_cascade() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/works"))
        .and(query_param("query.bibliographic", "Attention Is All You Need Vaswani"))
        .and(query_param("rows", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(crossref_search(vec![
            common::crossref_item("Attention Is Not Explanation", "Jain", 2019),
            common::crossref_item(TITLE, "Vaswani", 2017),
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(ARXIV_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(arxiv_feed(&[])))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(S2_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(s2_empty()))
        .expect(0)
        .mount(&server)
        .await;

    let verdict = verify(&server, &dir, &attention()).await;

    assert_eq!(verdict.status, VerdictStatus::Valid);
    assert_eq!(verdict.source.as_deref(), Some("Crossref (Search)"));
    assert_eq!(verdict.url.as_deref(), Some("https://doi.org/10.0/vaswani"));
}

#[tokio::test]
async fn test_failed_source_does_not_stop_cascade() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/works"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(ARXIV_PATH))
        .and(query_param(
            "search_query",
            "ti:\"Attention Is All You Need\" AND au:\"Vaswani\"",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_string(arxiv_feed(&[])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(ARXIV_PATH))
        .and(query_param(
            "search_query",
            "all:Attention Is All You Need AND au:Vaswani",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_string(arxiv_feed(&[(
            TITLE,
            "Ashish Vaswani",
            "2017-06-12T17:57:34Z",
        )])))
        .expect(1)
        .mount(&server)
        .await;

    let verdict = verify(&server, &dir, &attention()).await;

    assert_eq!(verdict.status, VerdictStatus::Valid);
    assert_eq!(verdict.source.as_deref(), Some("arXiv API"));
}

#[tokio::test]
async fn test_semantic_scholar_rate_limit_is_retried() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path(S2_PATH))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(S2_PATH))
        .and(query_param("query", TITLE))
        .and(query_param("limit", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(s2_page(
            "Attention is All you Need",
            "Ashish Vaswani",
            2017,
        )))
        .expect(1)
        .mount(&server)
        .await;
    mount_empty_sources(&server).await;

    let verdict = verify(&server, &dir, &attention()).await;

    assert_eq!(verdict.status, VerdictStatus::Valid);
    assert_eq!(verdict.source.as_deref(), Some("Semantic Scholar"));
}

#[tokio::test]
async fn test_nonsense_title_is_not_found() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_empty_sources(&server).await;

    let entry = CitationEntry::new("fake").with_title("Zxqv Plorb Wibble Snark");
    let verdict = verify(&server, &dir, &entry).await;

    assert_eq!(verdict.status, VerdictStatus::NotFound);
    assert_eq!(verdict.reason.as_deref(), Some("no results from any source"));
}

#[tokio::test]
async fn test_weak_match_is_not_found_with_best_guess() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path(S2_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(s2_page(
            "Protein Folding with Graph Networks",
            "Someone Else",
            2021,
        )))
        .mount(&server)
        .await;
    mount_empty_sources(&server).await;

    let verdict = verify(&server, &dir, &attention()).await;

    assert_eq!(verdict.status, VerdictStatus::NotFound);
    let guess = verdict.best_guess.expect("best guess");
    assert_eq!(guess.source_name, "Semantic Scholar");
    assert!(guess.year_penalty);
}

#[tokio::test]
async fn test_slow_source_times_out() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/works"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(crossref_search(vec![]))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(ARXIV_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(arxiv_feed(&[(
            TITLE,
            "Ashish Vaswani",
            "2017-06-12T17:57:34Z",
        )])))
        .mount(&server)
        .await;

    let verdict = verify(&server, &dir, &attention()).await;

    assert_eq!(verdict.status, VerdictStatus::Valid);
    assert_eq!(verdict.source.as_deref(), Some("arXiv API"));
}

#[tokio::test]
async fn test_user_agent_is_sent() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/works"))
        .and(header("user-agent", citecheck::config::DEFAULT_USER_AGENT))
        .respond_with(ResponseTemplate::new(200).set_body_json(crossref_search(vec![
            common::crossref_item(TITLE, "Vaswani", 2017),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    assert!(verify(&server, &dir, &attention()).await.is_valid());
}

#[tokio::test]
async fn test_verify_all_mixed_batch() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/works"))
        .and(query_param("query.bibliographic", "Attention Is All You Need Vaswani"))
        .respond_with(ResponseTemplate::new(200).set_body_json(crossref_search(vec![
            common::crossref_item(TITLE, "Vaswani", 2017),
        ])))
        .mount(&server)
        .await;
    mount_empty_sources(&server).await;

    let entries = vec![
        attention(),
        CitationEntry::new("untitled"),
        CitationEntry::new("ghost").with_title("A Paper That Does Not Exist"),
    ];

    let config = config_for(&server, dir.path().join("cache.json"));
    let verifier = Verifier::from_config(&config, CacheHandle::in_memory()).unwrap();
    let verdicts = verifier.verify_all(&entries).await;

    let statuses: Vec<_> = verdicts.iter().map(|v| (v.entry_id.as_str(), v.status)).collect();
    assert_eq!(
        statuses,
        vec![
            ("vaswani2017", VerdictStatus::Valid),
            ("untitled", VerdictStatus::Error),
            ("ghost", VerdictStatus::NotFound),
        ]
    );
}
