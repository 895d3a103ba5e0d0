//! Environment-backed configuration.
//!
//! Every setting has a default. Override with `CITECHECK_*` environment variables.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{DEFAULT_ACCEPTANCE_THRESHOLD, DEFAULT_UNCERTAIN_THRESHOLD, Thresholds};

/// Default Crossref REST endpoint.
pub const DEFAULT_CROSSREF_URL: &str = "https://api.crossref.org";
/// Default Semantic Scholar Graph API endpoint.
pub const DEFAULT_SEMANTIC_SCHOLAR_URL: &str = "https://api.semanticscholar.org";
/// Default arXiv export query endpoint.
pub const DEFAULT_ARXIV_URL: &str = "http://export.arxiv.org/api/query";
/// Default user agent; Crossref routes requests with a mailto to its polite pool.
pub const DEFAULT_USER_AGENT: &str =
    "citecheck/0.1 (mailto:citation_check_bot@example.com)";
/// Default on-disk cache location.
pub const DEFAULT_CACHE_PATH: &str = "./.citation_cache.json";

/// Runtime configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `CITECHECK_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Minimum adjusted score to accept a citation. Default: `85`.
    pub acceptance_threshold: f64,

    /// Minimum adjusted score to flag a citation as uncertain. Default: `75`.
    pub uncertain_threshold: f64,

    /// Persistent result cache. Default: `./.citation_cache.json`.
    pub cache_path: PathBuf,

    /// Write the cache file after every new entry. Default: `true`.
    pub persist_on_write: bool,

    /// Lower bound of the randomized politeness delay. Default: `800`.
    pub min_delay_ms: u64,

    /// Upper bound of the randomized politeness delay. Default: `1500`.
    pub max_delay_ms: u64,

    /// Per-request timeout. Default: `20`.
    pub request_timeout_secs: u64,

    /// Concurrent entry verifications. Default: `5`.
    pub max_workers: usize,

    /// Attempts made against a rate-limited source. Default: `3`.
    pub max_retries: u32,

    /// First backoff wait, doubled on every attempt. Default: `3000`.
    pub backoff_base_ms: u64,

    /// Jitter added to each backoff wait, drawn from `[min, max]`. Default: `1000..=3000`.
    pub backoff_jitter_min_ms: u64,
    pub backoff_jitter_max_ms: u64,

    pub crossref_url: String,
    pub semantic_scholar_url: String,
    pub arxiv_url: String,

    /// `User-Agent` header sent with every request.
    pub user_agent: String,

    /// Optional Semantic Scholar API key (raises the shared rate limit).
    pub semantic_scholar_api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            acceptance_threshold: DEFAULT_ACCEPTANCE_THRESHOLD,
            uncertain_threshold: DEFAULT_UNCERTAIN_THRESHOLD,
            cache_path: PathBuf::from(DEFAULT_CACHE_PATH),
            persist_on_write: true,
            min_delay_ms: 800,
            max_delay_ms: 1500,
            request_timeout_secs: 20,
            max_workers: 5,
            max_retries: 3,
            backoff_base_ms: 3000,
            backoff_jitter_min_ms: 1000,
            backoff_jitter_max_ms: 3000,
            crossref_url: DEFAULT_CROSSREF_URL.to_string(),
            semantic_scholar_url: DEFAULT_SEMANTIC_SCHOLAR_URL.to_string(),
            arxiv_url: DEFAULT_ARXIV_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            semantic_scholar_api_key: None,
        }
    }
}

impl Config {
    const ENV_ACCEPTANCE_THRESHOLD: &'static str = "CITECHECK_ACCEPTANCE_THRESHOLD";
    const ENV_UNCERTAIN_THRESHOLD: &'static str = "CITECHECK_UNCERTAIN_THRESHOLD";
    const ENV_CACHE_PATH: &'static str = "CITECHECK_CACHE_PATH";
    const ENV_PERSIST_ON_WRITE: &'static str = "CITECHECK_PERSIST_ON_WRITE";
    const ENV_MIN_DELAY_MS: &'static str = "CITECHECK_MIN_DELAY_MS";
    const ENV_MAX_DELAY_MS: &'static str = "CITECHECK_MAX_DELAY_MS";
    const ENV_REQUEST_TIMEOUT_SECS: &'static str = "CITECHECK_REQUEST_TIMEOUT_SECS";
    const ENV_MAX_WORKERS: &'static str = "CITECHECK_MAX_WORKERS";
    const ENV_MAX_RETRIES: &'static str = "CITECHECK_MAX_RETRIES";
    const ENV_BACKOFF_BASE_MS: &'static str = "CITECHECK_BACKOFF_BASE_MS";
    const ENV_BACKOFF_JITTER_MIN_MS: &'static str = "CITECHECK_BACKOFF_JITTER_MIN_MS";
    const ENV_BACKOFF_JITTER_MAX_MS: &'static str = "CITECHECK_BACKOFF_JITTER_MAX_MS";
    const ENV_CROSSREF_URL: &'static str = "CITECHECK_CROSSREF_URL";
    const ENV_SEMANTIC_SCHOLAR_URL: &'static str = "CITECHECK_SEMANTIC_SCHOLAR_URL";
    const ENV_ARXIV_URL: &'static str = "CITECHECK_ARXIV_URL";
    const ENV_USER_AGENT: &'static str = "CITECHECK_USER_AGENT";
    const ENV_SEMANTIC_SCHOLAR_API_KEY: &'static str = "CITECHECK_S2_API_KEY";

    /// Loads configuration from environment variables (falling back to defaults).
    ///
    /// Malformed numbers are reported as errors, not replaced by defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let d = Self::default();

        Ok(Self {
            acceptance_threshold: Self::parse_from_env(
                Self::ENV_ACCEPTANCE_THRESHOLD,
                d.acceptance_threshold,
            )?,
            uncertain_threshold: Self::parse_from_env(
                Self::ENV_UNCERTAIN_THRESHOLD,
                d.uncertain_threshold,
            )?,
            cache_path: Self::parse_path_from_env(Self::ENV_CACHE_PATH, d.cache_path),
            persist_on_write: Self::parse_bool_from_env(
                Self::ENV_PERSIST_ON_WRITE,
                d.persist_on_write,
            )?,
            min_delay_ms: Self::parse_from_env(Self::ENV_MIN_DELAY_MS, d.min_delay_ms)?,
            max_delay_ms: Self::parse_from_env(Self::ENV_MAX_DELAY_MS, d.max_delay_ms)?,
            request_timeout_secs: Self::parse_from_env(
                Self::ENV_REQUEST_TIMEOUT_SECS,
                d.request_timeout_secs,
            )?,
            max_workers: Self::parse_from_env(Self::ENV_MAX_WORKERS, d.max_workers)?,
            max_retries: Self::parse_from_env(Self::ENV_MAX_RETRIES, d.max_retries)?,
            backoff_base_ms: Self::parse_from_env(Self::ENV_BACKOFF_BASE_MS, d.backoff_base_ms)?,
            backoff_jitter_min_ms: Self::parse_from_env(
                Self::ENV_BACKOFF_JITTER_MIN_MS,
                d.backoff_jitter_min_ms,
            )?,
            backoff_jitter_max_ms: Self::parse_from_env(
                Self::ENV_BACKOFF_JITTER_MAX_MS,
                d.backoff_jitter_max_ms,
            )?,
            crossref_url: Self::parse_string_from_env(Self::ENV_CROSSREF_URL, d.crossref_url),
            semantic_scholar_url: Self::parse_string_from_env(
                Self::ENV_SEMANTIC_SCHOLAR_URL,
                d.semantic_scholar_url,
            ),
            arxiv_url: Self::parse_string_from_env(Self::ENV_ARXIV_URL, d.arxiv_url),
            user_agent: Self::parse_string_from_env(Self::ENV_USER_AGENT, d.user_agent),
            semantic_scholar_api_key: Self::parse_optional_string_from_env(
                Self::ENV_SEMANTIC_SCHOLAR_API_KEY,
            ),
        })
    }

    /// Validates thresholds, windows and counts (does not touch the cache file).
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.thresholds().validate()?;

        if self.min_delay_ms > self.max_delay_ms {
            return Err(ConfigError::InvalidDelayWindow {
                min_ms: self.min_delay_ms,
                max_ms: self.max_delay_ms,
            });
        }
        if self.backoff_jitter_min_ms > self.backoff_jitter_max_ms {
            return Err(ConfigError::InvalidJitterWindow {
                min_ms: self.backoff_jitter_min_ms,
                max_ms: self.backoff_jitter_max_ms,
            });
        }
        if self.max_workers == 0 {
            return Err(ConfigError::Zero {
                name: "max_workers",
            });
        }
        if self.max_retries == 0 {
            return Err(ConfigError::Zero {
                name: "max_retries",
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Zero {
                name: "request_timeout_secs",
            });
        }
        for (name, url) in [
            ("crossref_url", &self.crossref_url),
            ("semantic_scholar_url", &self.semantic_scholar_url),
            ("arxiv_url", &self.arxiv_url),
        ] {
            if url.trim().is_empty() {
                return Err(ConfigError::EmptyUrl { name });
            }
        }
        if self.cache_path.is_dir() {
            return Err(ConfigError::CachePathIsDirectory {
                path: self.cache_path.clone(),
            });
        }

        Ok(())
    }

    /// Returns the decision thresholds as a [`Thresholds`] pair.
    pub fn thresholds(&self) -> Thresholds {
        Thresholds::new(self.acceptance_threshold, self.uncertain_threshold)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    fn parse_from_env<T: std::str::FromStr>(
        var_name: &'static str,
        default: T,
    ) -> Result<T, ConfigError> {
        match env::var(var_name) {
            Ok(value) => value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidNumber {
                    name: var_name,
                    value,
                }),
            Err(_) => Ok(default),
        }
    }

    fn parse_bool_from_env(var_name: &'static str, default: bool) -> Result<bool, ConfigError> {
        match env::var(var_name) {
            Ok(value) => match value.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Ok(true),
                "0" | "false" | "no" | "off" => Ok(false),
                _ => Err(ConfigError::InvalidBool {
                    name: var_name,
                    value,
                }),
            },
            Err(_) => Ok(default),
        }
    }

    fn parse_path_from_env(var_name: &str, default: PathBuf) -> PathBuf {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or(default)
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        env::var(var_name).unwrap_or(default)
    }

    fn parse_optional_string_from_env(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}
