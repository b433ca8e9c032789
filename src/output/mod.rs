use serde::{Deserialize, Serialize};

use crate::transcript::{join_text, TranscriptSegment};
use crate::Result;

/// Failure categories reported to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorType {
    IpBlocked,
    NoTranscript,
    Unknown,
    MaxRetriesExceeded,
}

/// The single JSON record written to stdout
///
/// Success-only fields (`attempt`, `proxy_used`) and failure-only fields
/// (`error`, `errorType`) are never populated together; use
/// [`ExtractionResult::success`] and [`ExtractionResult::failure`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(rename = "errorType", skip_serializing_if = "Option::is_none")]
    pub error_type: Option<ErrorType>,

    pub segments: Vec<TranscriptSegment>,

    #[serde(rename = "fullText")]
    pub full_text: String,

    #[serde(rename = "segmentCount")]
    pub segment_count: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempt: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy_used: Option<String>,
}

impl ExtractionResult {
    /// Successful extraction on 1-based `attempt`
    pub fn success(segments: Vec<TranscriptSegment>, attempt: u32, proxy_used: Option<String>) -> Self {
        Self {
            success: true,
            error: None,
            error_type: None,
            full_text: join_text(&segments),
            segment_count: segments.len(),
            segments,
            attempt: Some(attempt),
            proxy_used: Some(proxy_used.unwrap_or_else(|| "none".to_string())),
        }
    }

    pub fn failure(error_type: ErrorType, error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            error_type: Some(error_type),
            segments: Vec::new(),
            full_text: String::new(),
            segment_count: 0,
            attempt: None,
            proxy_used: None,
        }
    }

    /// Render as a single line of JSON
    pub fn to_json_line(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// JSON document for argument or configuration errors
pub fn usage_error(message: &str) -> String {
    serde_json::json!({
        "success": false,
        "error": message,
    })
    .to_string()
}

/// Print the result record to stdout
pub fn print_result(result: &ExtractionResult) -> Result<()> {
    println!("{}", result.to_json_line()?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_success_shape() {
        let result = ExtractionResult::success(
            vec![
                TranscriptSegment::new("Hello", 0.0, 1.2),
                TranscriptSegment::new("world", 1.2, 0.8),
            ],
            3,
            Some("10.0.0.1:6000".to_string()),
        );

        let line = result.to_json_line().unwrap();
        assert!(!line.contains('\n'));

        let json: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["fullText"], "Hello world");
        assert_eq!(json["segmentCount"], 2);
        assert_eq!(json["attempt"], 3);
        assert_eq!(json["proxy_used"], "10.0.0.1:6000");
        assert_eq!(json["segments"][1]["text"], "world");
        assert_eq!(json["segments"][1]["start"], 1.2);
        assert_eq!(json["segments"][1]["duration"], 0.8);
        assert!(json.get("error").is_none());
        assert!(json.get("errorType").is_none());
    }

    #[test]
    fn test_success_without_proxy_reports_none() {
        let result = ExtractionResult::success(Vec::new(), 1, None);
        assert_eq!(result.proxy_used.as_deref(), Some("none"));
        assert_eq!(result.full_text, "");
    }

    #[test]
    fn test_failure_shape() {
        let result = ExtractionResult::failure(ErrorType::NoTranscript, "No transcript available: gone");
        let json: Value = serde_json::from_str(&result.to_json_line().unwrap()).unwrap();

        assert_eq!(json["success"], false);
        assert_eq!(json["errorType"], "NO_TRANSCRIPT");
        assert_eq!(json["error"], "No transcript available: gone");
        assert_eq!(json["segments"], Value::Array(Vec::new()));
        assert_eq!(json["fullText"], "");
        assert_eq!(json["segmentCount"], 0);
        assert!(json.get("attempt").is_none());
        assert!(json.get("proxy_used").is_none());
    }

    #[test]
    fn test_error_type_names() {
        let names: Vec<String> = [
            ErrorType::IpBlocked,
            ErrorType::NoTranscript,
            ErrorType::Unknown,
            ErrorType::MaxRetriesExceeded,
        ]
        .iter()
        .map(|t| serde_json::to_value(t).unwrap().as_str().unwrap().to_string())
        .collect();
        assert_eq!(names, vec!["IP_BLOCKED", "NO_TRANSCRIPT", "UNKNOWN", "MAX_RETRIES_EXCEEDED"]);
    }

    #[test]
    fn test_usage_error() {
        let json: Value = serde_json::from_str(&usage_error("Usage: transcript-fetch <video_id>")).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Usage: transcript-fetch <video_id>");
    }
}
