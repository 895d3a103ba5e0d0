//! The result cache survives process restarts and short-circuits the network.

mod common;

use citecheck::{CacheHandle, CitationEntry, ResultCache, VerdictStatus, Verifier};
use common::{crossref_item, crossref_search, config_for};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TITLE: &str = "Deep Residual Learning for Image Recognition";

fn entry() -> CitationEntry {
    CitationEntry::new("he2016")
        .with_title(TITLE)
        .with_author("He, Kaiming")
        .with_year("2016")
}

#[tokio::test]
async fn test_second_run_is_served_from_disk() {
    let dir = TempDir::new().unwrap();
    let cache_path = dir.path().join("cache.json");

    {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/works"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(crossref_search(vec![crossref_item(TITLE, "He", 2016)])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let config = config_for(&server, cache_path.clone());
        let cache = CacheHandle::load(&config.cache_path, true);
        let verifier = Verifier::from_config(&config, cache).unwrap();

        assert!(verifier.verify(&entry()).await.is_valid());
        assert!(verifier.verify(&entry()).await.is_valid());
    }

    assert!(cache_path.exists());
    assert_eq!(ResultCache::try_load(&cache_path, false).unwrap().len(), 1);

    // Fresh server with nothing mounted: every request would 404.
    let server = MockServer::start().await;
    let config = config_for(&server, cache_path.clone());
    let verifier =
        Verifier::from_config(&config, CacheHandle::load(&config.cache_path, true)).unwrap();

    let verdict = verifier.verify(&entry()).await;
    assert_eq!(verdict.status, VerdictStatus::Valid);
    assert_eq!(verdict.source.as_deref(), Some("Crossref (Search)"));
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn test_misses_are_not_cached() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let config = config_for(&server, dir.path().join("cache.json"));
    let cache = CacheHandle::load(&config.cache_path, true);
    let verifier = Verifier::from_config(&config, cache.clone()).unwrap();

    let verdict = verifier.verify(&entry()).await;

    assert_eq!(verdict.status, VerdictStatus::NotFound);
    assert!(cache.is_empty());
}

#[tokio::test]
async fn test_corrupt_cache_file_starts_empty_and_is_replaced() {
    let dir = TempDir::new().unwrap();
    let cache_path = dir.path().join("cache.json");
    std::fs::write(&cache_path, "definitely not json").unwrap();

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/works"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(crossref_search(vec![crossref_item(TITLE, "He", 2016)])),
        )
        .mount(&server)
        .await;

    let config = config_for(&server, cache_path.clone());
    let cache = CacheHandle::load(&config.cache_path, true);
    assert!(cache.is_empty());

    let verifier = Verifier::from_config(&config, cache).unwrap();
    assert!(verifier.verify(&entry()).await.is_valid());

    assert_eq!(ResultCache::try_load(&cache_path, true).unwrap().len(), 1);
}
