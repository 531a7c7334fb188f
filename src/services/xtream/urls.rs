//! Panel URL construction.
//!
//! Pure helpers that build `player_api.php`, `xmltv.php` and direct media
//! URLs from user-supplied credentials. No I/O happens here; nothing checks
//! that the resulting host is reachable.

use url::Url;

use super::types::{ContentKind, OutputFormat};
use crate::error::AppError;

/// Normalize a user-supplied panel base URL.
///
/// Trims whitespace, prefixes `http://` when no scheme is present and strips
/// trailing slashes. Idempotent: normalizing an already-normalized URL
/// returns it unchanged.
pub fn normalize_base_url(input: &str) -> Result<String, AppError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation("Missing baseUrl"));
    }
    let lower = trimmed.to_ascii_lowercase();
    let with_scheme = if lower.starts_with("http://") || lower.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    };
    Ok(with_scheme.trim_end_matches('/').to_string())
}

/// Build a `player_api.php` URL carrying credentials plus arbitrary extra
/// query parameters (`action`, `stream_id`, ...). Parameter order is not
/// significant.
pub fn build_panel_api_url(
    base_url: &str,
    username: &str,
    password: &str,
    extra: &[(&str, &str)],
) -> Result<String, AppError> {
    build_endpoint_url(base_url, "player_api.php", username, password, extra)
}

/// Build the `xmltv.php` guide URL for the given credentials.
pub fn build_xmltv_url(base_url: &str, username: &str, password: &str) -> Result<String, AppError> {
    build_endpoint_url(base_url, "xmltv.php", username, password, &[])
}

fn build_endpoint_url(
    base_url: &str,
    endpoint: &str,
    username: &str,
    password: &str,
    extra: &[(&str, &str)],
) -> Result<String, AppError> {
    let root = normalize_base_url(base_url)?;
    let mut url = Url::parse(&format!("{root}/{endpoint}"))
        .map_err(|e| AppError::validation(format!("Invalid baseUrl: {e}")))?;
    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("username", username);
        pairs.append_pair("password", password);
        for (key, value) in extra {
            pairs.append_pair(key, value);
        }
    }
    Ok(url.to_string())
}

/// Build a direct media URL: `{base}/{kind}/{username}/{password}/{id}.{ext}`.
///
/// Credentials and id travel as percent-encoded path segments, not query
/// parameters; that is the shape the panel's stream endpoints require.
pub fn build_stream_url(
    base_url: &str,
    kind: ContentKind,
    username: &str,
    password: &str,
    id: &str,
    format: OutputFormat,
) -> Result<String, AppError> {
    let root = normalize_base_url(base_url)?;
    Ok(format!(
        "{root}/{}/{}/{}/{}.{}",
        kind.path_segment(),
        urlencoding::encode(username),
        urlencoding::encode(password),
        urlencoding::encode(id),
        format.extension(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_adds_scheme() {
        assert_eq!(
            normalize_base_url("example.com").unwrap(),
            "http://example.com"
        );
    }

    #[test]
    fn test_normalize_strips_trailing_slashes() {
        assert_eq!(
            normalize_base_url("http://example.com/").unwrap(),
            "http://example.com"
        );
        assert_eq!(
            normalize_base_url("https://example.com:8080///").unwrap(),
            "https://example.com:8080"
        );
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for input in ["example.com", "http://example.com/", "  https://h:8080 "] {
            let once = normalize_base_url(input).unwrap();
            let twice = normalize_base_url(&once).unwrap();
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_normalize_rejects_empty() {
        assert!(normalize_base_url("").is_err());
        assert!(normalize_base_url("   ").is_err());
    }

    #[test]
    fn test_panel_api_url() {
        let url = build_panel_api_url(
            "example.com:8080",
            "user",
            "pass",
            &[("action", "get_live_streams")],
        )
        .unwrap();
        assert!(url.starts_with("http://example.com:8080/player_api.php?"));
        assert!(url.contains("username=user"));
        assert!(url.contains("password=pass"));
        assert!(url.contains("action=get_live_streams"));
    }

    #[test]
    fn test_xmltv_url() {
        assert_eq!(
            build_xmltv_url("http://host", "u", "p").unwrap(),
            "http://host/xmltv.php?username=u&password=p"
        );
    }

    #[test]
    fn test_stream_url_shape() {
        assert_eq!(
            build_stream_url(
                "http://host",
                ContentKind::Movie,
                "u",
                "p",
                "42",
                OutputFormat::Hls
            )
            .unwrap(),
            "http://host/movie/u/p/42.m3u8"
        );
        assert_eq!(
            build_stream_url(
                "http://host",
                ContentKind::Live,
                "u",
                "p",
                "7",
                OutputFormat::Mpegts
            )
            .unwrap(),
            "http://host/live/u/p/7.ts"
        );
    }

    #[test]
    fn test_stream_url_bogus_kind_behaves_like_live() {
        let bogus = build_stream_url(
            "http://host",
            ContentKind::parse("bogus"),
            "u",
            "p",
            "7",
            OutputFormat::Mpegts,
        )
        .unwrap();
        let live = build_stream_url(
            "http://host",
            ContentKind::Live,
            "u",
            "p",
            "7",
            OutputFormat::Mpegts,
        )
        .unwrap();
        assert_eq!(bogus, live);
    }

    #[test]
    fn test_stream_url_percent_encodes_segments() {
        let url = build_stream_url(
            "http://host",
            ContentKind::Live,
            "user name",
            "p/ss",
            "1",
            OutputFormat::Mpegts,
        )
        .unwrap();
        assert_eq!(url, "http://host/live/user%20name/p%2Fss/1.ts");
    }
}
