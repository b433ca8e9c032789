//! Retry controller: bounded attempts with proxy rotation and per-class backoff.
//!
//! | Class | Retried? | Wait before next attempt |
//! |-------|----------|--------------------------|
//! | [`FailureClass::RateLimited`] | yes | `base * 2^attempt` |
//! | [`FailureClass::NoTranscript`] | no | - |
//! | [`FailureClass::Unknown`] | yes | uniform random in the unknown-delay window |
//!
//! Every attempt after the first also waits a random jitter first.

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

use crate::config::{Config, RetryConfig, MAX_WAIT_SECS};
use crate::output::{ErrorType, ExtractionResult};
use crate::proxy::{choose_proxy, ProxyProvider};
use crate::transcript::TranscriptSource;

/// How a failed attempt is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Blocked or rate limited; retried with exponential backoff
    RateLimited,
    /// The video has no usable transcript; terminal
    NoTranscript,
    /// Anything else; retried after a short random delay
    Unknown,
}

/// Blocking wait between attempts
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Real wall-clock sleeper
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Drives the attempts for one video
pub struct RetryController {
    retry: RetryConfig,
    languages: Vec<String>,
    proxies: Box<dyn ProxyProvider>,
    source: Box<dyn TranscriptSource>,
    sleeper: Box<dyn Sleeper>,
    rng: StdRng,
}

impl RetryController {
    pub fn new(
        config: &Config,
        proxies: Box<dyn ProxyProvider>,
        source: Box<dyn TranscriptSource>,
        sleeper: Box<dyn Sleeper>,
    ) -> Self {
        Self {
            retry: config.retry.clone(),
            languages: config.transcript.languages.clone(),
            proxies,
            source,
            sleeper,
            rng: StdRng::from_entropy(),
        }
    }

    /// Replace the entropy-seeded RNG with a deterministic one
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Fetch the transcript for `video_id`, never returning an error
    pub async fn extract(&mut self, video_id: &str) -> ExtractionResult {
        let attempts = self.retry.attempts;
        let available_proxies = self.proxies.fetch_proxies().await;

        if available_proxies.is_empty() {
            tracing::info!("No proxies available, fetching directly");
        }

        for attempt in 0..attempts {
            if attempt > 0 {
                let delay = self.uniform(self.retry.jitter_min_secs, self.retry.jitter_max_secs);
                tracing::info!(
                    "Waiting {:.1} seconds before retry {}/{}",
                    delay.as_secs_f64(),
                    attempt + 1,
                    attempts
                );
                self.sleeper.sleep(delay).await;
            }

            let proxy = choose_proxy(&available_proxies, &mut self.rng);
            let proxy_label = proxy.as_ref().map(|p| p.label());
            if let Some(label) = &proxy_label {
                tracing::info!("Using proxy {}", label);
            }

            tracing::debug!(
                "Attempt {}/{} for {} via {}",
                attempt + 1,
                attempts,
                video_id,
                self.source.source_name()
            );

            let error = match self.source.fetch(video_id, &self.languages, proxy).await {
                Ok(segments) => {
                    tracing::info!(
                        "Fetched {} segments on attempt {}/{}",
                        segments.len(),
                        attempt + 1,
                        attempts
                    );
                    return ExtractionResult::success(segments, attempt + 1, proxy_label);
                }
                Err(e) => e,
            };

            let is_last = attempt + 1 >= attempts;

            match error.class() {
                FailureClass::RateLimited => {
                    if is_last {
                        return ExtractionResult::failure(
                            ErrorType::IpBlocked,
                            format!("IP blocked/rate limited after {} attempts: {}", attempts, error),
                        );
                    }
                    let wait = self.retry.rate_limit_backoff(attempt);
                    tracing::warn!(
                        "IP/Rate limit detected, waiting {} seconds before retry {}/{}",
                        wait.as_secs(),
                        attempt + 2,
                        attempts
                    );
                    self.sleeper.sleep(wait).await;
                }
                FailureClass::NoTranscript => {
                    // Terminal even with attempts left
                    tracing::warn!("No transcript available for {}: {}", video_id, error);
                    return ExtractionResult::failure(
                        ErrorType::NoTranscript,
                        format!("No transcript available: {}", error),
                    );
                }
                FailureClass::Unknown => {
                    if is_last {
                        return ExtractionResult::failure(
                            ErrorType::Unknown,
                            format!("Failed after {} attempts: {}", attempts, error),
                        );
                    }
                    let delay = self.uniform(
                        self.retry.unknown_delay_min_secs,
                        self.retry.unknown_delay_max_secs,
                    );
                    tracing::warn!(
                        "General error, waiting {:.1} seconds before retry {}/{}: {}",
                        delay.as_secs_f64(),
                        attempt + 2,
                        attempts,
                        error
                    );
                    self.sleeper.sleep(delay).await;
                }
            }
        }

        ExtractionResult::failure(
            ErrorType::MaxRetriesExceeded,
            format!("All {} attempts failed", attempts),
        )
    }

    fn uniform(&mut self, min_secs: f64, max_secs: f64) -> Duration {
        // Out-of-range windows would make gen_range or from_secs_f64 panic
        let clamp = |secs: f64| if secs.is_nan() { 0.0 } else { secs.clamp(0.0, MAX_WAIT_SECS) };
        let (min_secs, max_secs) = (clamp(min_secs), clamp(max_secs));

        if max_secs <= min_secs {
            return Duration::from_secs_f64(min_secs);
        }
        Duration::from_secs_f64(self.rng.gen_range(min_secs..=max_secs))
    }
}
