//! Politeness delays and rate-limit backoff.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tracing::warn;

use super::error::SourceResult;
use crate::config::Config;

/// Delay and retry schedule shared by all adapters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestPacing {
    /// Randomized delay before every network request, drawn from `[min_delay, max_delay]`.
    pub min_delay: Duration,
    pub max_delay: Duration,
    /// Total attempts made against a rate-limited source (including the first).
    pub max_attempts: u32,
    /// Backoff before retry `n` (0-based) is `backoff_base * 2^n` plus jitter.
    pub backoff_base: Duration,
    pub jitter_min: Duration,
    pub jitter_max: Duration,
}

impl RequestPacing {
    pub fn from_config(config: &Config) -> Self {
        Self {
            min_delay: Duration::from_millis(config.min_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
            max_attempts: config.max_retries.max(1),
            backoff_base: Duration::from_millis(config.backoff_base_ms),
            jitter_min: Duration::from_millis(config.backoff_jitter_min_ms),
            jitter_max: Duration::from_millis(config.backoff_jitter_max_ms),
        }
    }

    /// No delays at all; retries still happen, back to back.
    pub fn immediate() -> Self {
        Self {
            min_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            max_attempts: 3,
            backoff_base: Duration::ZERO,
            jitter_min: Duration::ZERO,
            jitter_max: Duration::ZERO,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Picks the next politeness delay.
    pub fn politeness_delay(&self) -> Duration {
        uniform(self.min_delay, self.max_delay)
    }

    /// Wait before retry `attempt` (0-based).
    pub fn backoff_wait(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.backoff_base.saturating_mul(factor) + uniform(self.jitter_min, self.jitter_max)
    }

    async fn pause(&self) {
        let delay = self.politeness_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    /// Runs `request` once after the politeness delay.
    pub async fn once<F, Fut, T>(&self, request: F) -> SourceResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = SourceResult<T>>,
    {
        self.pause().await;
        request().await
    }

    /// Runs `request` after the politeness delay, retrying rate-limited attempts with
    /// exponential backoff until `max_attempts` is reached.
    pub async fn with_backoff<F, Fut, T>(&self, source: &str, mut request: F) -> SourceResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = SourceResult<T>>,
    {
        let mut attempt = 0;
        loop {
            self.pause().await;
            match request().await {
                Err(err) if err.is_retryable() => {
                    attempt += 1;
                    if attempt >= self.max_attempts {
                        warn!(source, attempts = attempt, "Rate limit retries exhausted");
                        return Err(err);
                    }
                    let wait = self.backoff_wait(attempt - 1);
                    warn!(
                        source,
                        attempt,
                        wait_ms = wait.as_millis() as u64,
                        "Rate limited, backing off"
                    );
                    if !wait.is_zero() {
                        tokio::time::sleep(wait).await;
                    }
                }
                other => return other,
            }
        }
    }
}

impl Default for RequestPacing {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

fn uniform(min: Duration, max: Duration) -> Duration {
    if max <= min {
        return min;
    }
    let ms = rand::thread_rng().gen_range(min.as_millis() as u64..=max.as_millis() as u64);
    Duration::from_millis(ms)
}

