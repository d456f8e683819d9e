//! Breadcrumb derivation.
//!
//! Ordered ancestor chain ending at the entity itself, always starting with
//! a "Home" entry. Pages climb their parent-page chain; posts climb their
//! primary category's term ancestry; categories climb term ancestry.

use serde::{Deserialize, Serialize};

use crate::config::ResolverConfig;
use crate::error::ResolveResult;
use crate::sanitize::decode_entities;
use crate::stores::Stores;

/// Pages deeper than this are treated as having no further ancestors.
/// Guards against parent-pointer cycles in imported content.
const MAX_ANCESTOR_DEPTH: usize = 32;

/// One breadcrumb link, root-to-leaf ordered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreadcrumbEntry {
    pub title: String,
    pub url: String,
}

fn home_entry(config: &ResolverConfig) -> BreadcrumbEntry {
    BreadcrumbEntry {
        title: "Home".to_string(),
        url: format!("{}/", config.home_url.trim_end_matches('/')),
    }
}

/// Breadcrumbs for a post or page id. Unknown ids yield just the Home entry.
pub async fn content_breadcrumbs(
    stores: &Stores,
    config: &ResolverConfig,
    id: i64,
) -> ResolveResult<Vec<BreadcrumbEntry>> {
    let mut trail = vec![home_entry(config)];

    let Some(record) = stores.posts.by_id(id).await? else {
        return Ok(trail);
    };

    match record.post_type.as_str() {
        "page" => {
            // Walk the parent chain leaf-to-root, then reverse.
            let mut ancestors = Vec::new();
            let mut cursor = record.parent;
            while let Some(parent_id) = cursor {
                if ancestors.len() >= MAX_ANCESTOR_DEPTH {
                    tracing::warn!(page_id = id, "page ancestor chain too deep, truncating");
                    break;
                }
                let Some(parent) = stores.posts.by_id(parent_id).await? else {
                    break;
                };
                cursor = parent.parent;
                ancestors.push(BreadcrumbEntry {
                    title: decode_entities(&parent.title),
                    url: parent.link,
                });
            }
            ancestors.reverse();
            trail.extend(ancestors);
        }
        "post" => {
            if let Some(primary) = record.categories.first() {
                trail.extend(term_trail(stores, primary.id).await?);
            }
        }
        _ => {}
    }

    trail.push(BreadcrumbEntry {
        title: decode_entities(&record.title),
        url: record.link,
    });
    Ok(trail)
}

/// Breadcrumbs for a category id, ending at the category itself.
pub async fn category_breadcrumbs(
    stores: &Stores,
    config: &ResolverConfig,
    term_id: i64,
) -> ResolveResult<Vec<BreadcrumbEntry>> {
    let mut trail = vec![home_entry(config)];
    trail.extend(term_trail(stores, term_id).await?);
    Ok(trail)
}

/// Ancestor categories root-first, then the term itself. A missing term
/// contributes nothing; missing ancestors are skipped.
async fn term_trail(stores: &Stores, term_id: i64) -> ResolveResult<Vec<BreadcrumbEntry>> {
    let Some(term) = stores.terms.category(term_id).await? else {
        return Ok(Vec::new());
    };

    let mut trail = Vec::new();
    if term.parent != 0 {
        // Store returns closest parent first; breadcrumbs read root first.
        let mut ancestor_ids = stores.terms.ancestors(term_id).await?;
        ancestor_ids.reverse();
        for ancestor_id in ancestor_ids {
            if let Some(ancestor) = stores.terms.category(ancestor_id).await? {
                trail.push(BreadcrumbEntry {
                    title: decode_entities(&ancestor.name),
                    url: ancestor.link,
                });
            }
        }
    }
    trail.push(BreadcrumbEntry {
        title: decode_entities(&term.name),
        url: term.link,
    });
    Ok(trail)
}
