//! Sidebar widget adaptation.
//!
//! Widget areas hold opaque `base-N` instance tokens. Each instance runs
//! through a closed set of adapters, each of which may contribute a typed
//! payload; instances no adapter recognizes contribute nothing.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::ads::{AdBundle, resolve_ad};
use crate::config::ResolverConfig;
use crate::error::ResolveResult;
use crate::post::{PostSummary, format_post};
use crate::sanitize::decode_entities;
use crate::stores::Stores;
use crate::value::{is_empty, to_integer};

/// Default post count for a recent-posts widget with no configured number.
const DEFAULT_RECENT_COUNT: usize = 3;

/// Instance keys that may carry an ad reference, checked in order.
const AD_INSTANCE_KEYS: [&str; 6] = ["adrotate_id", "adrotate_group", "groupid", "group", "id", "ad"];

// Hard-coded literals; invalid patterns are impossible in practice.
#[allow(clippy::expect_used)]
static WIDGET_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+)-(\d+)$").expect("valid regex literal"));
#[allow(clippy::expect_used)]
static YOUTUBE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:https?://)?(?:www\.)?(?:youtube\.com|youtu\.be)/(?:watch\?v=|embed/|v/|shorts/)?([a-zA-Z0-9_-]{11})",
    )
    .expect("valid regex literal")
});

/// One adapted widget, tagged by adapter kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WidgetPayload {
    /// An embedded video link found in free-form widget text.
    Link { url: String, id: String },
    /// A configured playlist.
    Playlist { url: String, title: String },
    /// A bare video URL on a playlist-capable widget.
    YoutubeUrl { url: String, title: String },
    /// An ad slot.
    Adrotate { advert_code: AdBundle },
    /// A recent-posts block.
    RecentPosts {
        title: String,
        section_posts: Vec<PostSummary>,
    },
    /// A channel link.
    Channel { url: String, id: String },
}

/// Resolve a widget area into its adapted payload document.
///
/// Returns `None` when the area itself does not exist; an existing area
/// with no recognizable widgets yields an empty `data` array.
pub async fn sidebar_data(
    stores: &Stores,
    config: &ResolverConfig,
    area: &str,
) -> ResolveResult<Option<Value>> {
    let Some(tokens) = stores.widgets.area_widgets(area).await? else {
        return Ok(None);
    };

    let mut payloads = Vec::new();
    for token in &tokens {
        let Some((base, instance_id)) = split_token(token) else {
            tracing::debug!(area, token, "skipping malformed widget token");
            continue;
        };
        let Some(instance) = stores.widgets.instance(base, instance_id).await? else {
            continue;
        };
        payloads.extend(adapt(stores, config, base, &instance).await?);
    }

    Ok(Some(json!({ "data": payloads })))
}

/// Split a `base-N` token into its widget base and instance id.
fn split_token(token: &str) -> Option<(&str, &str)> {
    let caps = WIDGET_TOKEN.captures(token)?;
    match (caps.get(1), caps.get(2)) {
        (Some(base), Some(id)) => Some((base.as_str(), id.as_str())),
        _ => None,
    }
}

/// Run every adapter; one widget may contribute several payloads (a text
/// widget can carry both a video link and an ad reference).
async fn adapt(
    stores: &Stores,
    config: &ResolverConfig,
    base: &str,
    instance: &Value,
) -> ResolveResult<Vec<WidgetPayload>> {
    let mut payloads = Vec::new();
    payloads.extend(adapt_video_text(instance));
    payloads.extend(adapt_playlist(base, instance));
    payloads.extend(adapt_ad(stores, config, instance).await?);
    if base == "my_recent_posts_widget" {
        payloads.push(adapt_recent_posts(stores, instance).await?);
    }
    payloads.extend(adapt_channel(instance));
    Ok(payloads)
}

/// Free-form text widgets whose body contains video URLs, one payload per
/// matched URL.
fn adapt_video_text(instance: &Value) -> Vec<WidgetPayload> {
    let Some(text) = ["text", "content"]
        .iter()
        .find_map(|key| instance.get(*key).and_then(Value::as_str))
    else {
        return Vec::new();
    };
    YOUTUBE_URL
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?.as_str();
            let id = caps.get(1)?.as_str();
            Some(WidgetPayload::Link {
                url: whole.to_string(),
                id: id.to_string(),
            })
        })
        .collect()
}

/// Playlist-capable widgets: a configured playlist wins over a bare URL.
fn adapt_playlist(base: &str, instance: &Value) -> Option<WidgetPayload> {
    if base != "bs-youtube-playlist" && !base.contains("youtube") {
        return None;
    }
    let title = instance_title(instance);
    if let Some(url) = non_empty_str(instance, "playlist_url") {
        return Some(WidgetPayload::Playlist {
            url: decode_entities(url),
            title,
        });
    }
    if let Some(url) = non_empty_str(instance, "url") {
        return Some(WidgetPayload::YoutubeUrl {
            url: decode_entities(url),
            title,
        });
    }
    None
}

/// Widgets that carry an ad reference under any of the known keys.
async fn adapt_ad(
    stores: &Stores,
    config: &ResolverConfig,
    instance: &Value,
) -> ResolveResult<Option<WidgetPayload>> {
    let Some(reference) = AD_INSTANCE_KEYS
        .iter()
        .find_map(|key| instance.get(*key))
        .filter(|v| !is_empty(v))
    else {
        return Ok(None);
    };
    let Some(bundle) = resolve_ad(stores, config, reference).await? else {
        return Ok(None);
    };
    Ok(Some(WidgetPayload::Adrotate {
        advert_code: bundle,
    }))
}

async fn adapt_recent_posts(stores: &Stores, instance: &Value) -> ResolveResult<WidgetPayload> {
    let count = match instance.get("number") {
        Some(v) if !is_empty(v) => to_integer(v).max(1) as usize,
        _ => DEFAULT_RECENT_COUNT,
    };
    let records = stores.posts.query(&[], count, 0).await?;
    Ok(WidgetPayload::RecentPosts {
        title: instance_title(instance),
        section_posts: records.iter().map(format_post).collect(),
    })
}

/// Either channel key is enough; the other side defaults to empty (or the
/// URL's trailing segment for a missing id).
fn adapt_channel(instance: &Value) -> Option<WidgetPayload> {
    let url = non_empty_str(instance, "channel_url").unwrap_or("");
    let id = non_empty_str(instance, "channel_id").unwrap_or_else(|| last_path_segment(url));
    if url.is_empty() && id.is_empty() {
        return None;
    }
    Some(WidgetPayload::Channel {
        url: decode_entities(url),
        id: id.to_string(),
    })
}

fn instance_title(instance: &Value) -> String {
    instance
        .get("title")
        .and_then(Value::as_str)
        .map(decode_entities)
        .unwrap_or_default()
}

fn non_empty_str<'a>(instance: &'a Value, key: &str) -> Option<&'a str> {
    instance
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

fn last_path_segment(url: &str) -> &str {
    url.trim_end_matches('/').rsplit('/').next().unwrap_or("")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tokens_split_on_trailing_instance_id() {
        assert_eq!(split_token("text-4"), Some(("text", "4")));
        assert_eq!(
            split_token("my_recent_posts_widget-12"),
            Some(("my_recent_posts_widget", "12"))
        );
        assert_eq!(split_token("orphan"), None);
    }

    #[test]
    fn video_urls_are_found_in_widget_text() {
        let instance = json!({
            "text": "Watch here: https://www.youtube.com/watch?v=dQw4w9WgXcQ today"
        });
        let payloads = adapt_video_text(&instance);
        assert_eq!(
            payloads,
            [WidgetPayload::Link {
                url: "https://www.youtube.com/watch?v=dQw4w9WgXcQ".to_string(),
                id: "dQw4w9WgXcQ".to_string(),
            }]
        );
    }

    #[test]
    fn short_video_links_match_too() {
        let instance = json!({ "content": "https://youtu.be/abcdefghijk" });
        let payloads = adapt_video_text(&instance);
        assert!(matches!(
            &payloads[..],
            [WidgetPayload::Link { id, .. }] if id == "abcdefghijk"
        ));
    }

    #[test]
    fn every_video_url_in_the_text_gets_a_payload() {
        let instance = json!({
            "text": "First https://youtu.be/aaaaaaaaaaa then https://youtu.be/bbbbbbbbbbb"
        });
        let payloads = adapt_video_text(&instance);
        assert_eq!(payloads.len(), 2);
        assert!(matches!(&payloads[0], WidgetPayload::Link { id, .. } if id == "aaaaaaaaaaa"));
        assert!(matches!(&payloads[1], WidgetPayload::Link { id, .. } if id == "bbbbbbbbbbb"));
    }

    #[test]
    fn playlist_beats_bare_url() {
        let instance = json!({
            "title": "Clips &amp; Shorts",
            "playlist_url": "https://www.youtube.com/playlist?list=PL123",
            "url": "https://youtu.be/abcdefghijk"
        });
        let payload = adapt_playlist("bs-youtube-playlist", &instance).unwrap();
        assert_eq!(
            payload,
            WidgetPayload::Playlist {
                url: "https://www.youtube.com/playlist?list=PL123".to_string(),
                title: "Clips & Shorts".to_string(),
            }
        );
    }

    #[test]
    fn non_youtube_base_is_not_a_playlist() {
        let instance = json!({ "playlist_url": "https://www.youtube.com/playlist?list=PL1" });
        assert_eq!(adapt_playlist("text", &instance), None);
    }

    #[test]
    fn channel_id_falls_back_to_url_segment() {
        let instance = json!({ "channel_url": "https://www.youtube.com/c/citydesk/" });
        let payload = adapt_channel(&instance).unwrap();
        assert!(matches!(
            payload,
            WidgetPayload::Channel { id, .. } if id == "citydesk"
        ));
    }

    #[test]
    fn channel_id_alone_still_yields_a_channel() {
        let instance = json!({ "channel_id": "UC123" });
        let payload = adapt_channel(&instance).unwrap();
        assert_eq!(
            payload,
            WidgetPayload::Channel {
                url: String::new(),
                id: "UC123".to_string(),
            }
        );
        assert_eq!(adapt_channel(&json!({ "month": "August" })), None);
    }

    #[test]
    fn payloads_serialize_with_type_tag() {
        let payload = WidgetPayload::YoutubeUrl {
            url: "https://youtu.be/abcdefghijk".to_string(),
            title: String::new(),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["type"], "youtube_url");
    }
}
