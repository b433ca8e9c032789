use url::Url;

/// Accept a bare video id or a YouTube URL and return the video id
pub fn normalize_video_id(input: &str) -> String {
    let input = input.trim();

    if !(input.starts_with("http://") || input.starts_with("https://")) {
        return input.to_string();
    }

    Url::parse(input)
        .ok()
        .and_then(|url| video_id_from_url(&url))
        .unwrap_or_else(|| input.to_string())
}

fn video_id_from_url(url: &Url) -> Option<String> {
    let host = url.host_str()?.trim_start_matches("www.").trim_start_matches("m.");
    let mut segments = url.path_segments()?.filter(|segment| !segment.is_empty());

    match host {
        "youtu.be" => segments.next().map(str::to_string),
        "youtube.com" | "music.youtube.com" => match segments.next()? {
            "watch" => url
                .query_pairs()
                .find(|(key, _)| key == "v")
                .map(|(_, value)| value.into_owned()),
            "embed" | "shorts" | "live" | "v" => segments.next().map(str::to_string),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_video_id() {
        assert_eq!(normalize_video_id("dQw4w9WgXcQ"), "dQw4w9WgXcQ");
        assert_eq!(normalize_video_id(" abc123 "), "abc123");
        assert_eq!(normalize_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42"), "dQw4w9WgXcQ");
        assert_eq!(normalize_video_id("https://youtu.be/dQw4w9WgXcQ?si=xyz"), "dQw4w9WgXcQ");
        assert_eq!(normalize_video_id("https://m.youtube.com/shorts/dQw4w9WgXcQ"), "dQw4w9WgXcQ");
        assert_eq!(normalize_video_id("https://www.youtube.com/embed/dQw4w9WgXcQ"), "dQw4w9WgXcQ");
        assert_eq!(normalize_video_id("https://example.com/watch?v=x"), "https://example.com/watch?v=x");
    }
}
