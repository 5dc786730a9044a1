//! The normalized document model shared by every collector.
//!
//! Each source collector maps its raw payloads (JSON, RSS XML, scraped HTML)
//! into [`NormalizedDocument`] values. The schema is deliberately small: the
//! handful of fields that generalize across sources live as typed fields,
//! everything else rides along in [`NormalizedDocument::source_specific_fields`].
//!
//! # Invariants
//!
//! - `external_id` is never empty and is prefixed with a source tag
//!   (`"newsapi_…"`, `"owm_…"`), so ids never collide across sources.
//! - `body_text` is at most [`MAX_BODY_CHARS`] characters after cleanup.
//! - `published_at` is always populated; when the source provides no usable
//!   date the collection time is used instead.
//!
//! Documents are constructed once inside a collector's `collect` call and
//! never mutated afterwards; deduplication across runs is the persistence
//! layer's problem and keys off `external_id`.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Upper bound on `body_text`, in characters.
pub const MAX_BODY_CHARS: usize = 1000;

/// Placeholder title for records where the source omits one.
pub const UNTITLED: &str = "Untitled";

/// Whether a document came from a structured API or from parsing a page or
/// feed that was not designed as a data API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataKind {
    Api,
    WebScraping,
}

/// One normalized record, the unit of output for every collector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedDocument {
    /// Globally unique id: `<source-tag>_<native-id>`.
    pub external_id: String,
    /// Title or headline; [`UNTITLED`] when the source has none.
    pub title: String,
    /// Cleaned body text, at most [`MAX_BODY_CHARS`] characters.
    pub body_text: String,
    /// Canonical link back to the original item, when one exists.
    pub url: Option<String>,
    /// Publication timestamp; collection time when the source omits it.
    pub published_at: DateTime<Utc>,
    /// Human-readable origin, e.g. `"NewsAPI"` or `"RSS - Le Monde"`.
    pub source_name: String,
    pub data_kind: DataKind,
    /// Fields meaningful only to one source (author, score, temperature, …).
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub source_specific_fields: Map<String, Value>,
}

/// Build a namespaced external id from a source tag and a native id.
pub fn external_id(tag: &str, native: &str) -> String {
    format!("{tag}_{native}")
}

/// Return the title, or [`UNTITLED`] when it is missing or blank.
pub fn title_or_default(title: Option<&str>) -> String {
    match title {
        Some(t) if !t.trim().is_empty() => t.trim().to_string(),
        _ => UNTITLED.to_string(),
    }
}

static RE_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)</?[^>]+>").unwrap());
static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Clean raw body text for storage: decode HTML entities, strip tags,
/// collapse whitespace, and truncate to [`MAX_BODY_CHARS`] characters.
///
/// Truncation counts characters, not bytes, so multi-byte text is never cut
/// mid-codepoint.
pub fn clean_body(raw: &str) -> String {
    let decoded = html_escape::decode_html_entities(raw);
    let stripped = RE_TAGS.replace_all(&decoded, " ");
    let collapsed = RE_WS.replace_all(&stripped, " ");
    let trimmed = collapsed.trim();
    if trimmed.chars().count() > MAX_BODY_CHARS {
        trimmed.chars().take(MAX_BODY_CHARS).collect()
    } else {
        trimmed.to_string()
    }
}

/// Parse an RFC 3339 timestamp (the shape most JSON APIs emit), falling back
/// to the current time when the field is missing or unparseable.
pub fn parse_rfc3339_or_now(raw: Option<&str>) -> DateTime<Utc> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(Utc::now)
}

/// Parse an RFC 2822 timestamp (RSS `pubDate`), falling back to now.
pub fn parse_rfc2822_or_now(raw: Option<&str>) -> DateTime<Utc> {
    raw.and_then(|s| DateTime::parse_from_rfc2822(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(Utc::now)
}

/// Convert unix seconds to a timestamp, falling back to now for values that
/// do not map to a valid instant.
pub fn from_unix_or_now(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_else(Utc::now)
}
