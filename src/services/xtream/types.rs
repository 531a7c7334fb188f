//! Xtream panel data types.
//!
//! Panel responses have no stable schema: field names shift between panel
//! versions and ids arrive as strings or numbers depending on the install.
//! Catalog payloads therefore stay raw [`serde_json::Value`] end to end, and
//! the handful of fields this server consumes are read through the accessor
//! helpers below.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use crate::error::AppError;

/// Panel credentials supplied by the browser on every request. Never stored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl Credentials {
    /// All three fields are required before any panel call.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.base_url.trim().is_empty() || self.username.is_empty() || self.password.is_empty()
        {
            return Err(AppError::validation(
                "Missing baseUrl, username or password",
            ));
        }
        Ok(())
    }
}

/// Playable content classification. Selects the media URL path segment and
/// the default playlist group label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Live,
    Movie,
    Series,
}

impl ContentKind {
    /// Parse a client-supplied kind string.
    ///
    /// Anything unrecognized maps to `Live` rather than failing; existing
    /// clients rely on this, though rejecting with a 400 is arguably the
    /// better contract.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "movie" => Self::Movie,
            "series" => Self::Series,
            _ => Self::Live,
        }
    }

    /// Path segment in `{base}/{kind}/{user}/{pass}/{id}.{ext}` URLs.
    pub fn path_segment(self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Movie => "movie",
            Self::Series => "series",
        }
    }

    /// Label used for the fallback display name and the default
    /// `group-title` when an item's category cannot be resolved.
    pub fn default_label(self) -> &'static str {
        match self {
            Self::Live => "Live",
            Self::Movie | Self::Series => "VOD",
        }
    }
}

/// Requested container for synthesized media URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Mpegts,
    Hls,
}

impl OutputFormat {
    /// Parse a client-supplied output format; anything but `hls` means
    /// MPEG-TS.
    pub fn parse(raw: &str) -> Self {
        if raw == "hls" {
            Self::Hls
        } else {
            Self::Mpegts
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Mpegts => "ts",
            Self::Hls => "m3u8",
        }
    }
}

/// Accessor helpers over one raw catalog record.
///
/// Nothing beyond "has an id, maybe a name/icon/category" is assumed;
/// missing fields are tolerated everywhere.
pub struct CatalogItem<'a>(pub &'a Value);

impl CatalogItem<'_> {
    /// Stream or series identifier, stringified.
    pub fn id(&self) -> Option<String> {
        ["stream_id", "series_id", "id"]
            .iter()
            .find_map(|key| json_to_string(self.0.get(*key)?))
    }

    /// First non-empty display-name candidate.
    pub fn display_name(&self) -> Option<String> {
        ["name", "stream_display_name", "title"]
            .iter()
            .filter_map(|key| self.0.get(*key))
            .filter_map(Value::as_str)
            .map(str::trim)
            .find(|name| !name.is_empty())
            .map(String::from)
    }

    /// First non-empty icon/cover URL candidate.
    pub fn icon(&self) -> Option<String> {
        ["stream_icon", "cover"]
            .iter()
            .filter_map(|key| self.0.get(*key))
            .filter_map(Value::as_str)
            .find(|icon| !icon.is_empty())
            .map(String::from)
    }

    /// Category id, stringified. Panels send it as string or number.
    pub fn category_id(&self) -> Option<String> {
        json_to_string(self.0.get("category_id")?)
    }
}

/// Stringify a JSON scalar: `"7"` and `7` both become `"7"`. Category and
/// stream ids are always compared in string form.
pub fn json_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Index a raw category array by stringified `category_id`.
pub fn index_categories(raw: &Value) -> HashMap<String, String> {
    let mut index = HashMap::new();
    if let Some(list) = raw.as_array() {
        for category in list {
            let id = category.get("category_id").and_then(json_to_string);
            let name = category.get("category_name").and_then(Value::as_str);
            if let (Some(id), Some(name)) = (id, name) {
                index.insert(id, name.to_string());
            }
        }
    }
    index
}

/// Filter a raw item array by category id, comparing ids as strings.
/// `None` or a non-array payload passes through untouched.
pub fn filter_by_category(items: Value, category_id: Option<&str>) -> Value {
    match (items, category_id) {
        (Value::Array(list), Some(wanted)) => Value::Array(
            list.into_iter()
                .filter(|item| CatalogItem(item).category_id().as_deref() == Some(wanted))
                .collect(),
        ),
        (items, _) => items,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_parse_known() {
        assert_eq!(ContentKind::parse("movie"), ContentKind::Movie);
        assert_eq!(ContentKind::parse("series"), ContentKind::Series);
        assert_eq!(ContentKind::parse("live"), ContentKind::Live);
    }

    #[test]
    fn test_kind_parse_unknown_falls_back_to_live() {
        assert_eq!(ContentKind::parse("bogus"), ContentKind::Live);
        assert_eq!(ContentKind::parse(""), ContentKind::Live);
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!(OutputFormat::parse("hls"), OutputFormat::Hls);
        assert_eq!(OutputFormat::parse("mpegts"), OutputFormat::Mpegts);
        assert_eq!(OutputFormat::parse("anything"), OutputFormat::Mpegts);
        assert_eq!(OutputFormat::Hls.extension(), "m3u8");
        assert_eq!(OutputFormat::Mpegts.extension(), "ts");
    }

    #[test]
    fn test_catalog_item_id_candidates() {
        assert_eq!(
            CatalogItem(&json!({"stream_id": 42})).id().as_deref(),
            Some("42")
        );
        assert_eq!(
            CatalogItem(&json!({"series_id": "7"})).id().as_deref(),
            Some("7")
        );
        assert_eq!(
            CatalogItem(&json!({"id": 9, "stream_id": 1})).id().as_deref(),
            Some("1")
        );
        assert_eq!(CatalogItem(&json!({"title": "x"})).id(), None);
    }

    #[test]
    fn test_catalog_item_display_name_skips_empty() {
        let item = json!({"name": "", "stream_display_name": "Channel One"});
        assert_eq!(
            CatalogItem(&item).display_name().as_deref(),
            Some("Channel One")
        );
        assert_eq!(CatalogItem(&json!({"name": "  "})).display_name(), None);
    }

    #[test]
    fn test_index_categories_mixed_id_types() {
        let raw = json!([
            {"category_id": "1", "category_name": "News"},
            {"category_id": 2, "category_name": "Sports"},
            {"category_name": "orphan"},
        ]);
        let index = index_categories(&raw);
        assert_eq!(index.get("1").map(String::as_str), Some("News"));
        assert_eq!(index.get("2").map(String::as_str), Some("Sports"));
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_filter_by_category_compares_as_string() {
        let items = json!([
            {"stream_id": 1, "category_id": 5},
            {"stream_id": 2, "category_id": "5"},
            {"stream_id": 3, "category_id": "6"},
        ]);
        let filtered = filter_by_category(items.clone(), Some("5"));
        assert_eq!(filtered.as_array().map(Vec::len), Some(2));

        let unfiltered = filter_by_category(items, None);
        assert_eq!(unfiltered.as_array().map(Vec::len), Some(3));
    }

    #[test]
    fn test_credentials_validate() {
        let creds = Credentials {
            base_url: "example.com".into(),
            username: "u".into(),
            password: "p".into(),
        };
        assert!(creds.validate().is_ok());

        let missing = Credentials {
            base_url: " ".into(),
            username: "u".into(),
            password: "p".into(),
        };
        assert!(missing.validate().is_err());
    }
}
