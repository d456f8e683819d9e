//! Trending post resolution.
//!
//! Primary source is the view-statistics integration's per-day cache;
//! when that yields nothing, a most-viewed query over the last 7 days is
//! used instead. Both paths end in the same ranking: dedup by post id,
//! article-type posts only, newest publish date first.

use std::collections::HashSet;

use chrono::{DateTime, Months, Utc};

use crate::error::ResolveResult;
use crate::post::{PostSummary, format_post};
use crate::stores::Stores;
use crate::value::numeric_id;

/// Fallback window, in days, for the most-viewed query.
const FALLBACK_DAYS: u32 = 7;

/// Resolve the trending post list.
///
/// `offset`/`limit` slicing is applied after ranking; surviving ids are
/// re-read through the post store and silently dropped when no longer live.
pub async fn trending(
    stores: &Stores,
    limit: usize,
    offset: usize,
) -> ResolveResult<Vec<PostSummary>> {
    let mut ranked = ranked_from_cache(stores).await?;

    if ranked.is_empty() {
        ranked = ranked_from_fallback(stores, limit + offset).await?;
    }

    let mut results = Vec::new();
    for (post_id, _) in ranked.into_iter().skip(offset).take(limit) {
        if let Some(record) = stores.posts.by_id(post_id).await? {
            results.push(format_post(&record));
        }
    }
    Ok(results)
}

/// Rank from the earliest cache bucket: flatten per-day entries in order,
/// dedup by post id (first occurrence wins), keep articles published in
/// the last two months, stable-sort newest first.
async fn ranked_from_cache(stores: &Stores) -> ResolveResult<Vec<(i64, DateTime<Utc>)>> {
    let Some(cache) = stores.stats.view_cache().await? else {
        return Ok(Vec::new());
    };
    let Some(bucket) = cache.as_object().and_then(|b| b.values().next()) else {
        return Ok(Vec::new());
    };
    let Some(days) = bucket.as_object() else {
        return Ok(Vec::new());
    };

    let cutoff = two_months_ago();
    let mut seen = HashSet::new();
    let mut ranked: Vec<(i64, DateTime<Utc>)> = Vec::new();

    for daily in days.values() {
        let Some(entries) = daily.as_array() else {
            continue;
        };
        for entry in entries {
            let Some(post_id) = entry.get("post_id").and_then(numeric_id) else {
                continue;
            };
            if !seen.insert(post_id) {
                continue;
            }
            let Some(record) = stores.posts.by_id(post_id).await? else {
                continue;
            };
            if record.post_type == "post" && record.date >= cutoff {
                ranked.push((post_id, record.date));
            }
        }
    }

    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    Ok(ranked)
}

/// Rank from the most-viewed fallback: permalinks map back to post ids,
/// same type filter, same ordering. No recency cutoff here since the
/// service already scopes to the last 7 days.
async fn ranked_from_fallback(
    stores: &Stores,
    want: usize,
) -> ResolveResult<Vec<(i64, DateTime<Utc>)>> {
    let permalinks = stores.stats.top_permalinks(FALLBACK_DAYS, want).await?;

    let mut seen = HashSet::new();
    let mut ranked: Vec<(i64, DateTime<Utc>)> = Vec::new();
    for permalink in permalinks {
        let Some(post_id) = stores.posts.id_by_permalink(&permalink).await? else {
            continue;
        };
        if !seen.insert(post_id) {
            continue;
        }
        let Some(record) = stores.posts.by_id(post_id).await? else {
            continue;
        };
        if record.post_type == "post" {
            ranked.push((post_id, record.date));
        }
    }

    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    Ok(ranked)
}

fn two_months_ago() -> DateTime<Utc> {
    let now = Utc::now();
    now.checked_sub_months(Months::new(2)).unwrap_or(now)
}
