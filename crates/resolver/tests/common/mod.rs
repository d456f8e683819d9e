//! In-memory store fixtures shared by the integration tests.
#![allow(dead_code)]
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::{Value, json};

use redazione_resolver::error::ResolveResult;
use redazione_resolver::stores::{
    AdGroupRecord, AdRecord, AdStore, Attachment, CategoryRef, MediaStore, MenuItemRecord,
    MenuStore, PostRecord, PostStore, SettingsStore, StatsService, Stores, TermRecord, TermStore,
    WidgetStore,
};

/// Everything the in-memory stores serve, declared up front per test.
#[derive(Default, Clone)]
pub struct Fixture {
    pub posts: Vec<PostRecord>,
    pub permalinks: HashMap<String, i64>,
    pub options: Value,
    pub terms: Vec<TermRecord>,
    pub attachments: HashMap<i64, Attachment>,
    pub ad_groups: Vec<AdGroupRecord>,
    pub ads: HashMap<i64, AdRecord>,
    /// Group id to member ad ids, in display order.
    pub group_members: HashMap<i64, Vec<i64>>,
    pub view_cache: Option<Value>,
    pub top_permalinks: Vec<String>,
    pub areas: HashMap<String, Vec<String>>,
    /// Keyed by `"base-instanceId"`.
    pub widget_instances: HashMap<String, Value>,
    pub menus: HashMap<String, Vec<MenuItemRecord>>,
}

struct InMemory(Fixture);

/// Wrap a fixture as the store bundle the resolver consumes.
pub fn stores(fixture: Fixture) -> Stores {
    let shared = Arc::new(InMemory(fixture));
    Stores {
        posts: shared.clone(),
        settings: shared.clone(),
        terms: shared.clone(),
        media: shared.clone(),
        ads: shared.clone(),
        stats: shared.clone(),
        widgets: shared.clone(),
        menus: shared,
    }
}

pub fn date(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
}

/// A published article with one category.
pub fn post(id: i64, title: &str, published: DateTime<Utc>, category: i64) -> PostRecord {
    PostRecord {
        id,
        title: title.to_string(),
        slug: title.to_lowercase().replace(' ', "-"),
        link: format!("https://news.example/{id}/"),
        date: published,
        content: format!("<p>Body of {title}.</p>"),
        thumbnail: None,
        categories: vec![CategoryRef {
            id: category,
            name: format!("Category {category}"),
        }],
        post_type: "post".to_string(),
        parent: None,
    }
}

pub fn page(id: i64, title: &str, parent: Option<i64>) -> PostRecord {
    PostRecord {
        id,
        title: title.to_string(),
        slug: title.to_lowercase().replace(' ', "-"),
        link: format!("https://news.example/{id}/"),
        date: date(2026, 1, 1),
        content: String::new(),
        thumbnail: None,
        categories: Vec::new(),
        post_type: "page".to_string(),
        parent,
    }
}

pub fn term(id: i64, name: &str, parent: i64) -> TermRecord {
    TermRecord {
        id,
        name: name.to_string(),
        slug: name.to_lowercase().replace(' ', "-"),
        parent,
        link: format!("https://news.example/category/{id}/"),
    }
}

pub fn ad(id: i64, title: &str, bannercode: &str) -> AdRecord {
    AdRecord {
        id,
        title: title.to_string(),
        bannercode: bannercode.to_string(),
        image: String::new(),
        tracker: "N".to_string(),
    }
}

#[async_trait]
impl PostStore for InMemory {
    async fn query(
        &self,
        categories: &[i64],
        count: usize,
        offset: usize,
    ) -> ResolveResult<Vec<PostRecord>> {
        let mut matched: Vec<PostRecord> = self
            .0
            .posts
            .iter()
            .filter(|p| p.post_type == "post")
            .filter(|p| {
                categories.is_empty()
                    || p.categories.iter().any(|c| categories.contains(&c.id))
            })
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(matched.into_iter().skip(offset).take(count).collect())
    }

    async fn by_id(&self, id: i64) -> ResolveResult<Option<PostRecord>> {
        Ok(self.0.posts.iter().find(|p| p.id == id).cloned())
    }

    async fn id_by_permalink(&self, url: &str) -> ResolveResult<Option<i64>> {
        Ok(self.0.permalinks.get(url).copied())
    }
}

#[async_trait]
impl SettingsStore for InMemory {
    async fn options(&self) -> ResolveResult<Value> {
        Ok(match &self.0.options {
            Value::Null => json!({}),
            other => other.clone(),
        })
    }
}

#[async_trait]
impl TermStore for InMemory {
    async fn category(&self, id: i64) -> ResolveResult<Option<TermRecord>> {
        Ok(self.0.terms.iter().find(|t| t.id == id).cloned())
    }

    async fn ancestors(&self, id: i64) -> ResolveResult<Vec<i64>> {
        let mut chain = Vec::new();
        let mut cursor = self
            .0
            .terms
            .iter()
            .find(|t| t.id == id)
            .map(|t| t.parent)
            .unwrap_or(0);
        while cursor != 0 {
            chain.push(cursor);
            cursor = self
                .0
                .terms
                .iter()
                .find(|t| t.id == cursor)
                .map(|t| t.parent)
                .unwrap_or(0);
        }
        Ok(chain)
    }
}

#[async_trait]
impl MediaStore for InMemory {
    async fn attachment(&self, id: i64) -> ResolveResult<Option<Attachment>> {
        Ok(self.0.attachments.get(&id).cloned())
    }
}

#[async_trait]
impl AdStore for InMemory {
    async fn group(&self, id: i64) -> ResolveResult<Option<AdGroupRecord>> {
        Ok(self.0.ad_groups.iter().find(|g| g.id == id).cloned())
    }

    async fn active_ad(&self, id: i64) -> ResolveResult<Option<AdRecord>> {
        Ok(self.0.ads.get(&id).cloned())
    }

    async fn group_ads(&self, group_id: i64) -> ResolveResult<Vec<AdRecord>> {
        let Some(member_ids) = self.0.group_members.get(&group_id) else {
            return Ok(Vec::new());
        };
        Ok(member_ids
            .iter()
            .filter_map(|id| self.0.ads.get(id).cloned())
            .collect())
    }
}

#[async_trait]
impl StatsService for InMemory {
    async fn view_cache(&self) -> ResolveResult<Option<Value>> {
        Ok(self.0.view_cache.clone())
    }

    async fn top_permalinks(&self, _days: u32, limit: usize) -> ResolveResult<Vec<String>> {
        Ok(self.0.top_permalinks.iter().take(limit).cloned().collect())
    }
}

#[async_trait]
impl WidgetStore for InMemory {
    async fn area_widgets(&self, area: &str) -> ResolveResult<Option<Vec<String>>> {
        Ok(self.0.areas.get(area).cloned())
    }

    async fn instance(&self, base: &str, instance_id: &str) -> ResolveResult<Option<Value>> {
        Ok(self.0.widget_instances.get(&format!("{base}-{instance_id}")).cloned())
    }
}

#[async_trait]
impl MenuStore for InMemory {
    async fn menu_items(&self, menu: &str) -> ResolveResult<Vec<MenuItemRecord>> {
        Ok(self.0.menus.get(menu).cloned().unwrap_or_default())
    }
}
