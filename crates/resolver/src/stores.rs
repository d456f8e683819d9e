//! Collaborator store contracts.
//!
//! The resolver never talks to a database or a remote service directly; it
//! consumes these narrow trait interfaces. Every method is a single read
//! with no retry and no timeout; a failed read degrades the affected field
//! and resolution of siblings continues.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ResolveResult;

/// Category reference carried on post records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: i64,
    pub name: String,
}

/// Raw content-store record for a post or page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostRecord {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub link: String,
    pub date: DateTime<Utc>,
    /// Full body markup; the formatter derives the excerpt from it.
    pub content: String,
    pub thumbnail: Option<String>,
    pub categories: Vec<CategoryRef>,
    /// `"post"` or `"page"`.
    pub post_type: String,
    /// Parent page id, for page hierarchies.
    pub parent: Option<i64>,
}

/// Taxonomy term (category) record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermRecord {
    pub id: i64,
    pub name: String,
    pub slug: String,
    /// 0 for root terms.
    pub parent: i64,
    pub link: String,
}

/// Resolved media attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub url: String,
    pub alt: String,
}

/// Advertising group metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdGroupRecord {
    pub id: i64,
    pub name: String,
    pub modus: i64,
    pub adspeed: i64,
    pub repeat_impressions: String,
    pub gridrows: i64,
    pub gridcolumns: i64,
}

/// Single advertising creative as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdRecord {
    pub id: i64,
    pub title: String,
    /// Raw creative markup.
    pub bannercode: String,
    /// Stored image path; may carry a `%folder%` placeholder, may be empty.
    pub image: String,
    pub tracker: String,
}

/// Flat menu item as the menu store returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItemRecord {
    pub menu_item_id: i64,
    /// Parent menu item id; 0 for roots.
    pub parent: i64,
    /// Id of the linked object (post, page, or term).
    pub object_id: i64,
    /// Linked object kind, e.g. `"page"`, `"post"`, `"category"`, `"custom"`.
    pub object: String,
    /// Link class: `"post_type"`, `"taxonomy"`, or `"custom"`.
    pub item_type: String,
    pub title: String,
    pub url: String,
}

/// Content/post store: date-descending queries, sticky posts ignored.
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Published posts, newest first. An empty `categories` slice means no
    /// category scope.
    async fn query(
        &self,
        categories: &[i64],
        count: usize,
        offset: usize,
    ) -> ResolveResult<Vec<PostRecord>>;

    async fn by_id(&self, id: i64) -> ResolveResult<Option<PostRecord>>;

    /// Map a permalink back to a post id.
    async fn id_by_permalink(&self, url: &str) -> ResolveResult<Option<i64>>;
}

/// Global options/settings store.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// All global options as a JSON mapping.
    async fn options(&self) -> ResolveResult<Value>;
}

/// Menu/taxonomy store for terms.
#[async_trait]
pub trait TermStore: Send + Sync {
    async fn category(&self, id: i64) -> ResolveResult<Option<TermRecord>>;

    /// Ancestor term ids, closest parent first.
    async fn ancestors(&self, id: i64) -> ResolveResult<Vec<i64>>;
}

/// Media store resolving attachment ids.
#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn attachment(&self, id: i64) -> ResolveResult<Option<Attachment>>;
}

/// Advertising inventory store.
#[async_trait]
pub trait AdStore: Send + Sync {
    async fn group(&self, id: i64) -> ResolveResult<Option<AdGroupRecord>>;

    /// Single creative, active ones only.
    async fn active_ad(&self, id: i64) -> ResolveResult<Option<AdRecord>>;

    /// Active creatives linked to a group, in the store's natural order.
    async fn group_ads(&self, group_id: i64) -> ResolveResult<Vec<AdRecord>>;

    /// Banner folder under the content root, for `%folder%` substitution.
    async fn banner_folder(&self) -> ResolveResult<String> {
        Ok("banners".to_string())
    }
}

/// View-statistics integration.
#[async_trait]
pub trait StatsService: Send + Sync {
    /// Per-day view counts keyed by time bucket, as the integration caches
    /// them. `None` when the cache is absent.
    async fn view_cache(&self) -> ResolveResult<Option<Value>>;

    /// Fallback: permalinks of the most-viewed posts over the last `days`.
    async fn top_permalinks(&self, days: u32, limit: usize) -> ResolveResult<Vec<String>>;
}

/// Widget store: sidebar areas and widget instance options.
#[async_trait]
pub trait WidgetStore: Send + Sync {
    /// Ordered widget tokens (`"base-instanceId"`) placed in an area, or
    /// `None` when the area does not exist.
    async fn area_widgets(&self, area: &str) -> ResolveResult<Option<Vec<String>>>;

    /// Stored options for one widget instance.
    async fn instance(&self, base: &str, instance_id: &str) -> ResolveResult<Option<Value>>;
}

/// Menu store resolving a named menu to its flat item list.
#[async_trait]
pub trait MenuStore: Send + Sync {
    async fn menu_items(&self, menu: &str) -> ResolveResult<Vec<MenuItemRecord>>;
}

/// Bundle of collaborator handles the resolver is constructed with.
#[derive(Clone)]
pub struct Stores {
    pub posts: Arc<dyn PostStore>,
    pub settings: Arc<dyn SettingsStore>,
    pub terms: Arc<dyn TermStore>,
    pub media: Arc<dyn MediaStore>,
    pub ads: Arc<dyn AdStore>,
    pub stats: Arc<dyn StatsService>,
    pub widgets: Arc<dyn WidgetStore>,
    pub menus: Arc<dyn MenuStore>,
}
