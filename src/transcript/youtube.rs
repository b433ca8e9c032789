use async_trait::async_trait;
use yt_transcript_rs::api::YouTubeTranscriptApi;
use yt_transcript_rs::errors::{CouldNotRetrieveTranscript, CouldNotRetrieveTranscriptReason};

use super::{build_http_client, TranscriptSegment, TranscriptSource};
use crate::proxy::ProxyCredential;
use crate::FetchError;

/// YouTube transcript source backed by `yt-transcript-rs`
///
/// Each attempt gets its own API instance wrapping a fresh client, so the
/// browser headers and the attempt's proxy apply to every request it makes.
#[derive(Debug, Default)]
pub struct YoutubeTranscriptSource;

impl YoutubeTranscriptSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TranscriptSource for YoutubeTranscriptSource {
    async fn fetch(
        &self,
        video_id: &str,
        languages: &[String],
        proxy: Option<ProxyCredential>,
    ) -> Result<Vec<TranscriptSegment>, FetchError> {
        let http = build_http_client(proxy.as_ref())?;
        let api = YouTubeTranscriptApi::new(None, None, Some(http))
            .map_err(|e| FetchError::RequestFailed(e.to_string()))?;

        let languages: Vec<&str> = languages.iter().map(String::as_str).collect();
        let transcript = api
            .fetch_transcript(video_id, &languages, false)
            .await
            .map_err(map_error)?;

        tracing::debug!(
            "Got {} transcript ({}, generated: {}) for {}",
            transcript.language,
            transcript.language_code,
            transcript.is_generated,
            video_id
        );

        Ok(transcript
            .snippets
            .into_iter()
            .map(|snippet| TranscriptSegment::new(snippet.text, snippet.start, snippet.duration))
            .collect())
    }

    fn source_name(&self) -> &'static str {
        "YouTube"
    }
}

/// Sort a library failure into the error kinds the retry controller understands
fn map_error(err: CouldNotRetrieveTranscript) -> FetchError {
    use CouldNotRetrieveTranscriptReason as Reason;

    let message = err.to_string();
    match err.reason {
        Some(Reason::IpBlocked { .. }) | Some(Reason::RequestBlocked { .. }) => FetchError::Blocked(message),
        Some(Reason::TranscriptsDisabled { .. })
        | Some(Reason::NoTranscriptFound { .. })
        | Some(Reason::VideoUnavailable { .. })
        | Some(Reason::VideoUnplayable { .. })
        | Some(Reason::AgeRestricted { .. })
        | Some(Reason::InvalidVideoId { .. })
        | Some(Reason::TranslationUnavailable { .. })
        | Some(Reason::TranslationLanguageUnavailable { .. }) => FetchError::TranscriptUnavailable(message),
        _ => FetchError::RequestFailed(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FailureClass;

    fn failure(reason: Option<CouldNotRetrieveTranscriptReason>) -> CouldNotRetrieveTranscript {
        CouldNotRetrieveTranscript {
            video_id: "dQw4w9WgXcQ".to_string(),
            reason,
        }
    }

    #[test]
    fn test_terminal_reasons_map_to_no_transcript() {
        for reason in [
            CouldNotRetrieveTranscriptReason::TranscriptsDisabled,
            CouldNotRetrieveTranscriptReason::VideoUnavailable,
            CouldNotRetrieveTranscriptReason::AgeRestricted,
            CouldNotRetrieveTranscriptReason::InvalidVideoId,
        ] {
            let err = map_error(failure(Some(reason)));
            assert!(matches!(err, FetchError::TranscriptUnavailable(_)), "{:?}", err);
            assert_eq!(err.class(), FailureClass::NoTranscript);
        }
    }

    #[test]
    fn test_request_failures_are_retried_as_unknown() {
        let err = map_error(failure(Some(CouldNotRetrieveTranscriptReason::YouTubeRequestFailed(
            "connection reset".to_string(),
        ))));
        assert!(matches!(err, FetchError::RequestFailed(_)));
        assert_eq!(err.class(), FailureClass::Unknown);

        let err = map_error(failure(Some(CouldNotRetrieveTranscriptReason::YouTubeDataUnparsable(
            "unexpected player response".to_string(),
        ))));
        assert_eq!(err.class(), FailureClass::Unknown);

        let err = map_error(failure(None));
        assert_eq!(err.class(), FailureClass::Unknown);
    }

    #[test]
    fn test_mapped_message_keeps_library_text() {
        let library_err = failure(Some(CouldNotRetrieveTranscriptReason::TranscriptsDisabled));
        let expected = library_err.to_string();
        let err = map_error(library_err);
        assert_eq!(err.to_string(), expected);
        assert!(err.to_string().contains("dQw4w9WgXcQ"));
    }

    #[test]
    fn test_source_name() {
        assert_eq!(YoutubeTranscriptSource::new().source_name(), "YouTube");
    }
}
