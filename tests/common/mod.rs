//! Shared fixtures for integration tests: config pointed at a stub server and
//! payload builders for the three sources.

#![allow(dead_code)]

use std::path::PathBuf;

use citecheck::Config;
use serde_json::{Value, json};
use wiremock::MockServer;

pub const ARXIV_PATH: &str = "/api/query";
pub const S2_PATH: &str = "/graph/v1/paper/search";

/// Config with every source on `server`, no delays and an in-tempdir cache path.
pub fn config_for(server: &MockServer, cache_path: PathBuf) -> Config {
    Config {
        crossref_url: server.uri(),
        semantic_scholar_url: server.uri(),
        arxiv_url: format!("{}{}", server.uri(), ARXIV_PATH),
        cache_path,
        persist_on_write: true,
        min_delay_ms: 0,
        max_delay_ms: 0,
        backoff_base_ms: 0,
        backoff_jitter_min_ms: 0,
        backoff_jitter_max_ms: 0,
        request_timeout_secs: 2,
        ..Default::default()
    }
}

pub fn crossref_item(title: &str, family: &str, year: i32) -> Value {
    json!({
        "title": [title],
        "URL": format!("https://doi.org/10.0/{}", family.to_lowercase()),
        "DOI": format!("10.0/{}", family.to_lowercase()),
        "author": [{"family": family, "given": "A.", "sequence": "first"}],
        "issued": {"date-parts": [[year]]}
    })
}

pub fn crossref_work(title: &str, family: &str, year: i32) -> Value {
    json!({"status": "ok", "message": crossref_item(title, family, year)})
}

pub fn crossref_search(items: Vec<Value>) -> Value {
    json!({"status": "ok", "message": {"items": items}})
}

pub fn arxiv_feed(entries: &[(&str, &str, &str)]) -> String {
    let body: String = entries
        .iter()
        .enumerate()
        .map(|(i, (title, author, published))| {
            format!(
                "<entry><id>http://arxiv.org/abs/2101.0000{i}v1</id>\
                 <published>{published}</published>\
                 <title>{title}</title>\
                 <author><name>{author}</name></author></entry>"
            )
        })
        .collect();
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <feed xmlns=\"http://www.w3.org/2005/Atom\"><title>ArXiv Query</title>{body}</feed>"
    )
}

pub fn s2_page(title: &str, author: &str, year: i32) -> Value {
    json!({
        "total": 1,
        "offset": 0,
        "data": [{
            "paperId": "abc",
            "title": title,
            "url": "https://www.semanticscholar.org/paper/abc",
            "year": year,
            "externalIds": {"DOI": "10.0/s2"},
            "authors": [{"authorId": "1", "name": author}]
        }]
    })
}

pub fn s2_empty() -> Value {
    json!({"total": 0, "offset": 0, "data": []})
}
