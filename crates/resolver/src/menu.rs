//! Navigation menu trees.
//!
//! Menu stores hand back a flat, ordered item list with parent pointers.
//! Slugs for linked objects are prefetched in one pass, then the tree is
//! assembled purely from the parent linkage, preserving store order.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ResolveResult;
use crate::sanitize::decode_entities;
use crate::stores::{MenuItemRecord, Stores};

/// One node in a resolved menu tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuEntry {
    /// Linked object id (post, page, or term); 0 for custom links.
    pub id: i64,
    pub menu_item_id: i64,
    pub title: String,
    pub url: String,
    /// Linked object kind, e.g. `"page"` or `"category"`; `"custom"` for
    /// free links.
    pub post_type: String,
    /// Slug of the linked object; empty for custom links.
    pub slug: String,
    pub children: Vec<MenuEntry>,
}

/// Resolve a named menu into its nested tree.
pub async fn menu_tree(stores: &Stores, menu: &str) -> ResolveResult<Vec<MenuEntry>> {
    let items = stores.menus.menu_items(menu).await?;
    let slugs = prefetch_slugs(stores, &items).await?;
    Ok(build_tree(&items, &slugs))
}

/// Slug lookups for every linked object, keyed by menu item id. Custom
/// links and dangling references get an empty slug.
async fn prefetch_slugs(
    stores: &Stores,
    items: &[MenuItemRecord],
) -> ResolveResult<HashMap<i64, String>> {
    let mut slugs = HashMap::with_capacity(items.len());
    for item in items {
        let slug = match item.item_type.as_str() {
            "post_type" => stores
                .posts
                .by_id(item.object_id)
                .await?
                .map(|p| p.slug)
                .unwrap_or_default(),
            "taxonomy" => stores
                .terms
                .category(item.object_id)
                .await?
                .map(|t| t.slug)
                .unwrap_or_default(),
            _ => String::new(),
        };
        slugs.insert(item.menu_item_id, slug);
    }
    Ok(slugs)
}

/// Assemble the tree from parent pointers. Items keep the store's order at
/// every level; items pointing at a missing parent are dropped.
fn build_tree(items: &[MenuItemRecord], slugs: &HashMap<i64, String>) -> Vec<MenuEntry> {
    children_of(0, items, slugs)
}

fn children_of(
    parent: i64,
    items: &[MenuItemRecord],
    slugs: &HashMap<i64, String>,
) -> Vec<MenuEntry> {
    items
        .iter()
        .filter(|item| item.parent == parent)
        .map(|item| MenuEntry {
            id: item.object_id,
            menu_item_id: item.menu_item_id,
            title: decode_entities(&item.title),
            url: item.url.clone(),
            post_type: item.object.clone(),
            slug: slugs.get(&item.menu_item_id).cloned().unwrap_or_default(),
            children: children_of(item.menu_item_id, items, slugs),
        })
        .collect()
}

/// Serialize a resolved menu for embedding in a response document.
pub fn menu_value(entries: &[MenuEntry]) -> Value {
    serde_json::to_value(entries).unwrap_or(Value::Array(Vec::new()))
}
