//! Canonical post summary shape.
//!
//! Converts raw content-store records into the immutable summary embedded
//! in resolved trees. Snapshot at resolution time; never cached.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::sanitize::{collapse_whitespace, decode_entities, strip_all};
use crate::stores::{CategoryRef, PostRecord};

/// Words kept in a derived excerpt.
const EXCERPT_WORDS: usize = 30;

/// Canonical post summary embedded in API responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostSummary {
    pub id: i64,
    pub title: String,
    pub link: String,
    pub slug: String,
    /// Display date, e.g. `"Feb 11, 2026"`.
    pub date: String,
    pub thumbnail: Option<String>,
    pub excerpt: String,
    pub categories: Vec<CategoryRef>,
}

/// Format a raw post record into the canonical summary shape.
pub fn format_post(record: &PostRecord) -> PostSummary {
    PostSummary {
        id: record.id,
        title: decode_entities(&record.title),
        link: record.link.clone(),
        slug: record.slug.clone(),
        date: format_date(record.date),
        thumbnail: record.thumbnail.clone(),
        excerpt: excerpt(&record.content),
        categories: record
            .categories
            .iter()
            .map(|c| CategoryRef {
                id: c.id,
                name: decode_entities(&c.name),
            })
            .collect(),
    }
}

fn format_date(date: DateTime<Utc>) -> String {
    collapse_whitespace(&date.format("%b %-d, %Y").to_string())
}

/// Body trimmed to [`EXCERPT_WORDS`] words, all tags stripped, entities
/// decoded. Truncation is marked with an ellipsis.
fn excerpt(content: &str) -> String {
    let text = strip_all(content);
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() > EXCERPT_WORDS {
        format!("{}…", words[..EXCERPT_WORDS].join(" "))
    } else {
        words.join(" ")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record() -> PostRecord {
        PostRecord {
            id: 42,
            title: "Council &amp; Mayor Clash".to_string(),
            slug: "council-mayor-clash".to_string(),
            link: "https://news.example/council-mayor-clash/".to_string(),
            date: Utc.with_ymd_and_hms(2026, 2, 3, 9, 30, 0).unwrap(),
            content: "<p>The <b>council</b> met on Tuesday.</p>".to_string(),
            thumbnail: Some("https://news.example/media/clash.jpg".to_string()),
            categories: vec![CategoryRef {
                id: 5,
                name: "Politics &amp; Policy".to_string(),
            }],
            post_type: "post".to_string(),
            parent: None,
        }
    }

    #[test]
    fn formats_canonical_shape() {
        let summary = format_post(&record());
        assert_eq!(summary.id, 42);
        assert_eq!(summary.title, "Council & Mayor Clash");
        assert_eq!(summary.date, "Feb 3, 2026");
        assert_eq!(summary.excerpt, "The council met on Tuesday.");
        assert_eq!(summary.categories[0].name, "Politics & Policy");
    }

    #[test]
    fn excerpt_trims_to_thirty_words() {
        let mut rec = record();
        rec.content = (1..=40)
            .map(|n| format!("word{n}"))
            .collect::<Vec<_>>()
            .join(" ");
        let summary = format_post(&rec);
        assert_eq!(summary.excerpt.split_whitespace().count(), 30);
        assert!(summary.excerpt.ends_with("word30…"));
    }

    #[test]
    fn excerpt_strips_markup() {
        let mut rec = record();
        rec.content = "<div><script>alert(1)</script><p>Safe text only</p></div>".to_string();
        let summary = format_post(&rec);
        assert!(!summary.excerpt.contains('<'));
        assert!(summary.excerpt.contains("Safe text only"));
    }

    #[test]
    fn missing_thumbnail_stays_null() {
        let mut rec = record();
        rec.thumbnail = None;
        let summary = format_post(&rec);
        assert_eq!(summary.thumbnail, None);
        let json = serde_json::to_value(&summary).unwrap();
        assert!(json["thumbnail"].is_null());
    }

    #[test]
    fn summary_serializes_expected_keys() {
        let json = serde_json::to_value(format_post(&record())).unwrap();
        for key in [
            "id",
            "title",
            "link",
            "slug",
            "date",
            "thumbnail",
            "excerpt",
            "categories",
        ] {
            assert!(json.get(key).is_some(), "missing key {key}");
        }
    }
}
