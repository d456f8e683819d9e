//! Layout-node enrichment.
//!
//! A layout node is an object the walk recognized by its marker field. The
//! layout name decides which derived lists get attached: recent posts,
//! trending posts, the video sidebar, the generic sidebar. Store failures
//! degrade the affected field and never abort the node.

use serde_json::{Map, Value, json};

use crate::config::ResolverConfig;
use crate::post::format_post;
use crate::sidebar::sidebar_data;
use crate::stores::Stores;
use crate::trending::trending;
use crate::value::{is_empty, numeric_id, to_integer};

/// Classified traits of a layout name. Traits overlap: a
/// `recent_politics_section` is both recent and premium.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayoutKind {
    /// Wants a recent-posts list.
    pub recent: bool,
    /// Premium placement, eligible for over-fetch compensation.
    pub premium: bool,
    /// Wants a trending-posts list.
    pub trending: bool,
    /// Hero banner, which also embeds trending.
    pub hero: bool,
    /// Wants the specialized video sidebar.
    pub youtube: bool,
}

impl LayoutKind {
    /// Classify a layout name. Name fragments are matched here and nowhere
    /// else; downstream logic reads the traits only.
    pub fn classify(name: &str, config: &ResolverConfig) -> Self {
        Self {
            recent: name.contains(&config.recent_marker),
            premium: config.premium_markers.iter().any(|m| name.contains(m)),
            trending: name.contains(&config.trending_marker),
            hero: name == config.hero_layout,
            youtube: name == config.youtube_layout,
        }
    }
}

/// Enrich one layout node in place.
///
/// `name` is the raw marker value; grouped sections swap in their nested
/// sub-layout choice before classification.
pub(crate) async fn resolve_layout(
    stores: &Stores,
    config: &ResolverConfig,
    mut map: Map<String, Value>,
    name: &str,
) -> Map<String, Value> {
    let effective = effective_name(config, &map, name);
    let kind = LayoutKind::classify(&effective, config);

    let categories = selected_categories(config, &map);
    let count = inferred_count(config, &map);
    let offset = inferred_offset(config, &map);

    if kind.recent || !categories.is_empty() {
        let fetch = count + premium_bonus(config, &map, kind);
        match stores.posts.query(&categories, fetch, offset).await {
            Ok(records) => {
                let posts: Vec<Value> = records
                    .iter()
                    .map(|r| json!(format_post(r)))
                    .collect();
                map.insert("section_posts".to_string(), Value::Array(posts));
            }
            Err(error) => {
                tracing::warn!(layout = %effective, %error, "post query failed, skipping section_posts");
            }
        }
    }

    if kind.trending || kind.hero {
        let limit = trending_limit(stores, config, &map).await;
        // A node-local offset scopes section_posts only; the trending list
        // always starts from the top.
        match trending(stores, limit, 0).await {
            Ok(posts) => {
                map.insert("trending_posts".to_string(), json!(posts));
            }
            Err(error) => {
                tracing::warn!(layout = %effective, %error, "trending lookup failed, skipping trending_posts");
            }
        }
    }

    if kind.youtube {
        attach_sidebar(stores, config, &mut map, "youtube_data", &config.youtube_sidebar).await;
    }

    let wants_sidebar = map
        .get(&config.show_sidebar_key)
        .is_some_and(|v| !is_empty(v));
    if wants_sidebar {
        attach_sidebar(stores, config, &mut map, "sidebar_data", &config.generic_sidebar).await;
    }

    map
}

/// Grouped sections carry their real layout in a nested choice field.
fn effective_name(config: &ResolverConfig, map: &Map<String, Value>, name: &str) -> String {
    if name == config.grouped_layout {
        if let Some(sub) = map.get(&config.grouped_sublayout_key).and_then(Value::as_str) {
            if !sub.is_empty() {
                return sub.to_string();
            }
        }
    }
    name.to_string()
}

/// Category scope from the selector field: an id array, a single id, or a
/// comma-separated id string. Non-numeric and non-positive entries drop out.
fn selected_categories(config: &ResolverConfig, map: &Map<String, Value>) -> Vec<i64> {
    let Some(selected) = map.get(&config.category_key) else {
        return Vec::new();
    };
    if is_empty(selected) {
        return Vec::new();
    }
    let ids: Vec<i64> = match selected {
        Value::Array(items) => items.iter().filter_map(numeric_id).collect(),
        Value::String(s) => s
            .split(',')
            .filter_map(|part| part.trim().parse::<i64>().ok())
            .collect(),
        other => numeric_id(other).into_iter().collect(),
    };
    ids.into_iter().filter(|id| *id > 0).collect()
}

/// First count-like field wins: a non-empty value is coerced, an empty one
/// falls back to its declared default. Non-positive results use the
/// built-in count.
fn inferred_count(config: &ResolverConfig, map: &Map<String, Value>) -> usize {
    for (key, value) in map {
        if !config.is_count_key(key) {
            continue;
        }
        let count = if is_empty(value) {
            match config.field_default(key) {
                Some(fallback) => fallback,
                None => continue,
            }
        } else {
            to_integer(value)
        };
        if count > 0 {
            return count as usize;
        }
        return config.default_count.max(1) as usize;
    }
    config.default_count.max(1) as usize
}

fn inferred_offset(config: &ResolverConfig, map: &Map<String, Value>) -> usize {
    for (key, value) in map {
        if !key.contains(&config.offset_key_marker) {
            continue;
        }
        let offset = if is_empty(value) {
            match config.field_default(key) {
                Some(fallback) => fallback,
                None => continue,
            }
        } else {
            to_integer(value)
        };
        return offset.max(0) as usize;
    }
    0
}

/// Premium sections with no configured ad fetch one extra post so the list
/// stays full after an ad would have displaced a slot.
fn premium_bonus(config: &ResolverConfig, map: &Map<String, Value>, kind: LayoutKind) -> usize {
    if !kind.premium {
        return 0;
    }
    let has_ad = config
        .layout_ad_keys
        .iter()
        .any(|key| map.get(key).is_some_and(|v| !is_empty(v)));
    usize::from(!has_ad)
}

/// Trending limit: a node-local count field wins, then the first non-empty
/// settings key, then the built-in default.
async fn trending_limit(
    stores: &Stores,
    config: &ResolverConfig,
    map: &Map<String, Value>,
) -> usize {
    for (key, value) in map {
        if config.is_count_key(key) && !is_empty(value) {
            let count = to_integer(value);
            if count > 0 {
                return count as usize;
            }
        }
    }

    match stores.settings.options().await {
        Ok(options) => {
            for key in &config.trending_limit_settings_keys {
                if let Some(value) = options.get(key) {
                    if !is_empty(value) {
                        let limit = to_integer(value);
                        if limit > 0 {
                            return limit as usize;
                        }
                    }
                }
            }
        }
        Err(error) => {
            tracing::warn!(%error, "settings read failed, using default trending limit");
        }
    }

    config.default_trending_limit.max(1) as usize
}

/// Attach a resolved widget area under `field`. A missing area still
/// records the field as null so consumers see a stable shape.
async fn attach_sidebar(
    stores: &Stores,
    config: &ResolverConfig,
    map: &mut Map<String, Value>,
    field: &str,
    area: &str,
) {
    match sidebar_data(stores, config, area).await {
        Ok(Some(data)) => {
            map.insert(field.to_string(), data);
        }
        Ok(None) => {
            map.insert(field.to_string(), Value::Null);
        }
        Err(error) => {
            tracing::warn!(area, %error, "sidebar resolution failed, skipping field");
        }
    }
}
