//! Playlist entry mapping and extended-M3U serialization.
//!
//! Entries are built per export request and never persisted. Serialization
//! is deterministic: the same entry list in the same order always produces
//! byte-identical output, and entry order is preserved from the input.

use std::collections::HashMap;

use serde_json::Value;

use crate::error::AppError;
use crate::services::xtream::types::{CatalogItem, ContentKind, Credentials, OutputFormat};
use crate::services::xtream::urls;

/// One playlist entry: an `#EXTINF` directive line plus its media URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaylistEntry {
    pub name: String,
    pub url: String,
    pub tvg_id: Option<String>,
    pub tvg_name: Option<String>,
    pub tvg_logo: Option<String>,
    pub group_title: Option<String>,
}

impl PlaylistEntry {
    /// Render the entry's `#EXTINF` line followed by its URL line.
    ///
    /// Only attributes with a non-empty value are emitted. Values go out
    /// quoted but otherwise verbatim; an embedded `"` is not escaped.
    pub fn to_extinf(&self) -> String {
        let mut attrs = Vec::new();
        for (key, value) in [
            ("tvg-id", &self.tvg_id),
            ("tvg-name", &self.tvg_name),
            ("tvg-logo", &self.tvg_logo),
            ("group-title", &self.group_title),
        ] {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                attrs.push(format!("{key}=\"{value}\""));
            }
        }
        format!("#EXTINF:-1 {},{}\n{}", attrs.join(" "), self.name, self.url)
    }
}

/// Map a raw catalog item to a playlist entry.
///
/// The display name falls back to `"{label} {id}"` when every candidate
/// field is empty, and an item whose `category_id` is absent from the
/// category index lands in the kind's default group rather than failing.
pub fn map_to_entry(
    kind: ContentKind,
    item: &Value,
    categories_by_id: &HashMap<String, String>,
    creds: &Credentials,
    output: OutputFormat,
) -> Result<PlaylistEntry, AppError> {
    let item = CatalogItem(item);
    let id = item
        .id()
        .ok_or_else(|| AppError::validation("Catalog item without an id"))?;
    let name = item
        .display_name()
        .unwrap_or_else(|| format!("{} {}", kind.default_label(), id));
    let group_title = item
        .category_id()
        .and_then(|category_id| categories_by_id.get(&category_id).cloned())
        .unwrap_or_else(|| kind.default_label().to_string());
    let url = urls::build_stream_url(
        &creds.base_url,
        kind,
        &creds.username,
        &creds.password,
        &id,
        output,
    )?;

    Ok(PlaylistEntry {
        name,
        url,
        tvg_logo: item.icon(),
        group_title: Some(group_title),
        ..PlaylistEntry::default()
    })
}

/// Serialize entries into an extended-M3U document: one `#EXTM3U` header
/// line, then each entry's two lines, newline-joined.
pub fn build_playlist(title: &str, entries: &[PlaylistEntry]) -> String {
    let header = format!("#EXTM3U x-tvg-url=\"\" name=\"{title}\"");
    let mut lines = Vec::with_capacity(entries.len() + 1);
    lines.push(header);
    lines.extend(entries.iter().map(PlaylistEntry::to_extinf));
    lines.join("\n")
}

/// Collapse every run of non-alphanumeric characters into a single `_`,
/// for download attachment filenames.
pub fn sanitize_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_separator = false;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch);
            in_separator = false;
        } else if !in_separator {
            out.push('_');
            in_separator = true;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn creds() -> Credentials {
        Credentials {
            base_url: "http://host".into(),
            username: "u".into(),
            password: "p".into(),
        }
    }

    fn news_categories() -> HashMap<String, String> {
        HashMap::from([("1".to_string(), "News".to_string())])
    }

    #[test]
    fn test_map_resolves_group_title() {
        let item = json!({"stream_id": 10, "name": "Channel", "category_id": "1"});
        let entry = map_to_entry(
            ContentKind::Live,
            &item,
            &news_categories(),
            &creds(),
            OutputFormat::Mpegts,
        )
        .unwrap();
        assert_eq!(entry.group_title.as_deref(), Some("News"));
        assert_eq!(entry.url, "http://host/live/u/p/10.ts");
    }

    #[test]
    fn test_map_unknown_category_degrades_to_default() {
        let item = json!({"stream_id": 10, "name": "Channel", "category_id": "9"});
        let entry = map_to_entry(
            ContentKind::Live,
            &item,
            &news_categories(),
            &creds(),
            OutputFormat::Mpegts,
        )
        .unwrap();
        assert_eq!(entry.group_title.as_deref(), Some("Live"));
    }

    #[test]
    fn test_map_vod_defaults_and_hls_extension() {
        let item = json!({"stream_id": 5, "cover": "http://img/c.png"});
        let entry = map_to_entry(
            ContentKind::Movie,
            &item,
            &HashMap::new(),
            &creds(),
            OutputFormat::Hls,
        )
        .unwrap();
        assert_eq!(entry.name, "VOD 5");
        assert_eq!(entry.group_title.as_deref(), Some("VOD"));
        assert_eq!(entry.tvg_logo.as_deref(), Some("http://img/c.png"));
        assert_eq!(entry.url, "http://host/movie/u/p/5.m3u8");
    }

    #[test]
    fn test_map_numeric_category_id_matches_string_key() {
        let item = json!({"stream_id": 10, "name": "Channel", "category_id": 1});
        let entry = map_to_entry(
            ContentKind::Live,
            &item,
            &news_categories(),
            &creds(),
            OutputFormat::Mpegts,
        )
        .unwrap();
        assert_eq!(entry.group_title.as_deref(), Some("News"));
    }

    #[test]
    fn test_map_item_without_id_fails() {
        let item = json!({"name": "Channel"});
        assert!(map_to_entry(
            ContentKind::Live,
            &item,
            &HashMap::new(),
            &creds(),
            OutputFormat::Mpegts,
        )
        .is_err());
    }

    #[test]
    fn test_extinf_emits_only_present_attributes() {
        let entry = PlaylistEntry {
            name: "Channel".into(),
            url: "http://host/live/u/p/1.ts".into(),
            tvg_logo: Some("http://img/logo.png".into()),
            group_title: Some("News".into()),
            ..PlaylistEntry::default()
        };
        assert_eq!(
            entry.to_extinf(),
            "#EXTINF:-1 tvg-logo=\"http://img/logo.png\" group-title=\"News\",Channel\nhttp://host/live/u/p/1.ts"
        );
    }

    #[test]
    fn test_extinf_without_attributes() {
        let entry = PlaylistEntry {
            name: "Bare".into(),
            url: "http://host/live/u/p/1.ts".into(),
            ..PlaylistEntry::default()
        };
        assert_eq!(
            entry.to_extinf(),
            "#EXTINF:-1 ,Bare\nhttp://host/live/u/p/1.ts"
        );
    }

    #[test]
    fn test_empty_playlist_is_one_header_line() {
        let playlist = build_playlist("T", &[]);
        assert_eq!(playlist, "#EXTM3U x-tvg-url=\"\" name=\"T\"");
        assert_eq!(playlist.lines().count(), 1);
    }

    #[test]
    fn test_playlist_preserves_entry_order() {
        let a = PlaylistEntry {
            name: "A".into(),
            url: "http://host/a".into(),
            ..PlaylistEntry::default()
        };
        let b = PlaylistEntry {
            name: "B".into(),
            url: "http://host/b".into(),
            ..PlaylistEntry::default()
        };

        let forward = build_playlist("T", &[a.clone(), b.clone()]);
        let reverse = build_playlist("T", &[b.clone(), a.clone()]);

        assert!(forward.find("A").unwrap() < forward.find("B").unwrap());
        assert!(reverse.find("B").unwrap() < reverse.find("A").unwrap());
        // Deterministic: same input, same bytes.
        assert_eq!(forward, build_playlist("T", &[a, b]));
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("My: Channel!"), "My_Channel_");
        assert_eq!(sanitize_filename("plain42"), "plain42");
        assert_eq!(sanitize_filename("a//b"), "a_b");
    }
}
