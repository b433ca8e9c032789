use async_trait::async_trait;
use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, ACCEPT_ENCODING, ACCEPT_LANGUAGE, CONNECTION, DNT, UPGRADE_INSECURE_REQUESTS,
    USER_AGENT,
};
use serde::{Deserialize, Serialize};

use crate::proxy::ProxyCredential;
use crate::FetchError;

pub mod youtube;

/// Individual transcript segment with timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Segment text
    pub text: String,

    /// Start time in seconds
    pub start: f64,

    /// Duration in seconds
    pub duration: f64,
}

impl TranscriptSegment {
    pub fn new(text: impl Into<String>, start: f64, duration: f64) -> Self {
        Self {
            text: text.into(),
            start,
            duration,
        }
    }
}

/// Join segment texts with single spaces, in order
pub fn join_text(segments: &[TranscriptSegment]) -> String {
    segments
        .iter()
        .map(|segment| segment.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Trait for fetching the transcript of a single video
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Fetch the transcript in the first available language of `languages`,
    /// optionally routing every request through `proxy`
    async fn fetch(
        &self,
        video_id: &str,
        languages: &[String],
        proxy: Option<ProxyCredential>,
    ) -> Result<Vec<TranscriptSegment>, FetchError>;

    /// Get the name of this source
    fn source_name(&self) -> &'static str;
}

/// Headers that make requests look like a desktop browser
pub fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        USER_AGENT,
        HeaderValue::from_static(
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
        ),
    );
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip, deflate"));
    headers.insert(DNT, HeaderValue::from_static("1"));
    headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
    headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
    headers
}

/// Build a fresh HTTP client with browser headers and an optional proxy
pub fn build_http_client(proxy: Option<&ProxyCredential>) -> Result<reqwest::Client, FetchError> {
    let builder = reqwest::Client::builder()
        .default_headers(browser_headers())
        .cookie_store(true);

    // Proxy-less attempts go direct, ignoring any system proxy
    let builder = match proxy {
        Some(proxy) => builder.proxy(proxy.to_reqwest()?),
        None => builder.no_proxy(),
    };

    Ok(builder.build()?)
}
