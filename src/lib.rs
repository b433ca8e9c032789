//! Transcript Fetch - A Rust CLI tool for pulling YouTube transcripts through rotating proxies
//!
//! This library fetches the caption track of a single video, retrying through a pool of
//! Webshare proxies with per-failure-class backoff, and reports the outcome as one JSON record.

pub mod cli;
pub mod config;
pub mod output;
pub mod proxy;
pub mod retry;
pub mod transcript;
pub mod utils;

pub use cli::Cli;
pub use config::Config;
pub use output::{ErrorType, ExtractionResult};
pub use proxy::{ProxyCredential, ProxyProvider, WebshareClient};
pub use retry::{FailureClass, RetryController, Sleeper, TokioSleeper};
pub use transcript::{TranscriptSegment, TranscriptSource};
pub use transcript::youtube::YoutubeTranscriptSource;

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Failures reported by a transcript source for a single attempt
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    /// YouTube refused the request (IP block, bot check, HTTP 429)
    #[error("{0}")]
    Blocked(String),

    /// The video has no usable transcript in the requested languages
    #[error("{0}")]
    TranscriptUnavailable(String),

    /// Upstream failure that fits neither of the above
    #[error("{0}")]
    RequestFailed(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

impl FetchError {
    /// How the retry controller treats this failure
    pub fn class(&self) -> FailureClass {
        match self {
            FetchError::Blocked(_) => FailureClass::RateLimited,
            FetchError::TranscriptUnavailable(_) => FailureClass::NoTranscript,
            FetchError::RequestFailed(_) | FetchError::Http(_) => FailureClass::Unknown,
        }
    }
}
