//! The recursive field-resolution walk.
//!
//! [`FieldResolver::resolve`] takes a decoded field tree and returns the
//! enriched document: layout nodes gain their derived lists, ad references
//! become creative bundles, image ids become attachment objects, and every
//! remaining string leaf is sanitized. The walk is a pure transform over an
//! owned tree; collaborator reads that fail degrade their field and never
//! abort the document.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::{Map, Value, json};

use crate::ads::resolve_ad;
use crate::config::ResolverConfig;
use crate::layout::resolve_layout;
use crate::sanitize::{sanitize, strip_all};
use crate::stores::Stores;
use crate::value::{is_empty, numeric_id, to_integer};

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Entry type wrapped around posts and ads in an interleaved section list.
const ENTRY_POST: &str = "post";
const ENTRY_AD: &str = "ad";

/// The field-resolution engine.
pub struct FieldResolver {
    stores: Stores,
    config: Arc<ResolverConfig>,
}

impl FieldResolver {
    pub fn new(stores: Stores, config: ResolverConfig) -> Self {
        Self {
            stores,
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve a whole field tree.
    pub async fn resolve(&self, tree: Value) -> Value {
        self.resolve_value(tree, 0).await
    }

    /// Recursive step. Boxed because async recursion needs a nameable
    /// future type.
    fn resolve_value(&self, value: Value, depth: usize) -> BoxFuture<'_, Value> {
        Box::pin(async move {
            if depth > self.config.max_depth {
                tracing::warn!(depth, "field tree exceeds depth ceiling, passing through");
                return value;
            }
            match value {
                Value::String(s) => Value::String(sanitize(&s)),
                Value::Array(items) => {
                    let mut resolved = Vec::with_capacity(items.len());
                    for item in items {
                        resolved.push(self.resolve_element(item, depth + 1).await);
                    }
                    Value::Array(resolved)
                }
                Value::Object(map) => Value::Object(self.resolve_map(map, depth).await),
                other => other,
            }
        })
    }

    /// Array elements: string leaves lose all markup, containers recurse,
    /// already-resolved attachment objects pass through.
    async fn resolve_element(&self, item: Value, depth: usize) -> Value {
        match item {
            Value::String(s) => Value::String(strip_all(&s)),
            Value::Object(map) if is_resolved_reference(&map) => Value::Object(map),
            container @ (Value::Array(_) | Value::Object(_)) => {
                self.resolve_value(container, depth).await
            }
            other => other,
        }
    }

    async fn resolve_map(&self, map: Map<String, Value>, depth: usize) -> Map<String, Value> {
        let config = &*self.config;

        // Layout dispatch happens before field-level passes so the derived
        // lists are present for interleaving below.
        let mut map = match layout_name(config, &map) {
            Some(name) => resolve_layout(&self.stores, config, map, &name).await,
            None => map,
        };

        self.stage_ads(&mut map).await;

        if map.get(&config.social_toggle_key) == Some(&Value::Bool(true)) {
            let social = self.social_items().await;
            map.insert(config.social_toggle_key.clone(), social);
        }

        self.expand_images(&mut map).await;

        if map
            .get("section_posts")
            .is_some_and(|v| matches!(v, Value::Array(_)))
        {
            self.interleave_section(&mut map);
        }

        self.finish_map(map, depth).await
    }

    /// Resolve every ad-reference field into a staged `advert_code` slot.
    /// The original reference key stays; unresolvable references stage null
    /// so consumers see the slot was considered.
    async fn stage_ads(&self, map: &mut Map<String, Value>) {
        let config = &*self.config;
        let references: Vec<(String, Value)> = map
            .iter()
            .filter(|(key, value)| {
                config.is_ad_reference_key(key)
                    && !is_empty(value)
                    && matches!(value, Value::String(_) | Value::Number(_))
            })
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        for (key, reference) in references {
            let staged = match resolve_ad(&self.stores, config, &reference).await {
                Ok(Some(bundle)) => json!(bundle),
                Ok(None) => Value::Null,
                Err(error) => {
                    tracing::warn!(field = %key, %error, "ad resolution failed, staging null");
                    Value::Null
                }
            };
            map.insert(format!("advert_code{}", slot_suffix(&key)), staged);
        }
    }

    /// Expand scalar media ids under image-like keys into attachment
    /// objects. Unknown ids leave the field untouched.
    async fn expand_images(&self, map: &mut Map<String, Value>) {
        let config = &*self.config;
        let candidates: Vec<(String, i64)> = map
            .iter()
            .filter(|(key, _)| config.is_image_key(key) && **key != config.social_toggle_key)
            .filter_map(|(key, value)| {
                numeric_id(value)
                    .filter(|id| *id > 0)
                    .map(|id| (key.clone(), id))
            })
            .collect();

        for (key, id) in candidates {
            match self.stores.media.attachment(id).await {
                Ok(Some(attachment)) => {
                    map.insert(
                        key,
                        json!({ "id": id, "url": attachment.url, "alt": attachment.alt }),
                    );
                }
                Ok(None) => {}
                Err(error) => {
                    tracing::warn!(field = %key, id, %error, "attachment lookup failed");
                }
            }
        }
    }

    async fn social_items(&self) -> Value {
        match self.stores.settings.options().await {
            Ok(options) => options
                .get("social_items")
                .cloned()
                .unwrap_or(Value::Array(Vec::new())),
            Err(error) => {
                tracing::warn!(%error, "settings read failed, social list empty");
                Value::Array(Vec::new())
            }
        }
    }

    /// Merge the staged ad into the post list as typed entries, then drop
    /// the staging fields.
    fn interleave_section(&self, map: &mut Map<String, Value>) {
        let config = &*self.config;

        let ad = config
            .ad_slot_keys
            .iter()
            .find_map(|key| map.get(key).filter(|v| !v.is_null()).cloned());

        let position = position_value(map, &config.ad_position_key)
            .or_else(|| position_value(map, &config.ad_position_fallback_key))
            .unwrap_or(0);

        let posts = match map.remove("section_posts") {
            Some(Value::Array(posts)) => posts,
            _ => Vec::new(),
        };
        map.insert(
            "section_items".to_string(),
            Value::Array(interleave(posts, ad, position)),
        );

        for key in &config.ad_slot_keys {
            map.remove(key);
        }
    }

    /// Final pass: nested string leaves lose all markup; unresolved
    /// containers recurse unless their key blocks it.
    async fn finish_map(&self, map: Map<String, Value>, depth: usize) -> Map<String, Value> {
        let config = &*self.config;
        let mut finished = Map::with_capacity(map.len());
        for (key, value) in map {
            let value = match value {
                Value::String(s) if !config.preserves_html(&key) => Value::String(strip_all(&s)),
                Value::Object(inner) if is_resolved_reference(&inner) => Value::Object(inner),
                container @ (Value::Array(_) | Value::Object(_))
                    if !config.blocks_recursion(&key) =>
                {
                    self.resolve_value(container, depth + 1).await
                }
                other => other,
            };
            finished.insert(key, value);
        }
        finished
    }
}

/// First present, non-null layout marker decides; the node is a layout only
/// when that marker holds a non-empty string.
fn layout_name(config: &ResolverConfig, map: &Map<String, Value>) -> Option<String> {
    let marker = config
        .layout_marker_keys
        .iter()
        .find_map(|key| map.get(key).filter(|v| !v.is_null()))?;
    match marker {
        Value::String(name) if !name.is_empty() => Some(name.clone()),
        _ => None,
    }
}

/// Attachment objects carry both `url` and `id`; the walk never re-enters
/// them.
fn is_resolved_reference(map: &Map<String, Value>) -> bool {
    map.contains_key("url") && map.contains_key("id")
}

/// Which staged slot an ad-reference key feeds.
fn slot_suffix(key: &str) -> &'static str {
    if key.contains("top") {
        "_top"
    } else if key.contains("bottom") {
        "_bottom"
    } else {
        ""
    }
}

/// Position selector value, honoring "present and neither null nor empty
/// string".
fn position_value(map: &Map<String, Value>, key: &str) -> Option<usize> {
    let value = map.get(key)?;
    if value.is_null() || matches!(value, Value::String(s) if s.is_empty()) {
        return None;
    }
    Some(to_integer(value).max(0) as usize)
}

/// Wrap posts as typed entries and splice the ad in before the post at the
/// 1-based `position`. A position of 0 or past the end appends the ad.
pub(crate) fn interleave(posts: Vec<Value>, mut ad: Option<Value>, position: usize) -> Vec<Value> {
    let mut entries = Vec::with_capacity(posts.len() + 1);
    for (index, post) in posts.into_iter().enumerate() {
        if position > 0 && index + 1 == position {
            if let Some(ad) = ad.take() {
                entries.push(json!({ "type": ENTRY_AD, "data": ad }));
            }
        }
        entries.push(json!({ "type": ENTRY_POST, "data": post }));
    }
    if let Some(ad) = ad.take() {
        entries.push(json!({ "type": ENTRY_AD, "data": ad }));
    }
    entries
}
