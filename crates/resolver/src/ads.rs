//! Advertising resolution.
//!
//! One numeric identifier may name either an ad group or a single ad; both
//! normalize to the same group+ads bundle so callers have one shape. Image
//! and click URLs are derived from the stored creative markup when not
//! explicitly stored.

use std::sync::LazyLock;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::ResolverConfig;
use crate::error::ResolveResult;
use crate::sanitize::decode_entities;
use crate::stores::{AdGroupRecord, AdRecord, Stores};
use crate::value::numeric_id;

// Hard-coded literals; invalid patterns are impossible in practice.
#[allow(clippy::expect_used)]
static IMG_SRC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<img[^>]+src=['"]([^'"]+)['"]"#).expect("valid regex literal")
});
#[allow(clippy::expect_used)]
static A_HREF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<a[^>]+href=['"]([^'"]+)['"]"#).expect("valid regex literal")
});

/// Group metadata in a resolved bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdGroup {
    pub id: i64,
    pub name: String,
    pub modus: i64,
    pub adspeed: i64,
    pub repeat_impressions: String,
    pub gridrows: i64,
    pub gridcolumns: i64,
}

/// One resolved creative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdCreative {
    pub id: i64,
    pub title: String,
    pub image_url: String,
    pub click_url: String,
    pub tracker_status: String,
    pub tracking_data: String,
    pub bannercode: String,
}

/// Normalized group+ads structure for one ad reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdBundle {
    pub group: AdGroup,
    pub ads: Vec<AdCreative>,
}

/// Resolve an ad reference held in an arbitrary field value.
///
/// Accepts numbers and numeric strings; anything else (or an id <= 0)
/// resolves to `None`, never an error. Lookup tries the group table first,
/// then falls back to a single active ad wrapped in a synthetic group with
/// id 0.
pub async fn resolve_ad(
    stores: &Stores,
    config: &ResolverConfig,
    reference: &Value,
) -> ResolveResult<Option<AdBundle>> {
    let Some(id) = numeric_id(reference) else {
        return Ok(None);
    };
    if id <= 0 {
        return Ok(None);
    }

    let (group, ads) = if let Some(group) = stores.ads.group(id).await? {
        let ads = stores.ads.group_ads(id).await?;
        (group, ads)
    } else if let Some(ad) = stores.ads.active_ad(id).await? {
        (synthetic_group(), vec![ad])
    } else {
        tracing::debug!(ad_id = id, "ad reference matched no group or ad");
        return Ok(None);
    };

    let banner_folder = stores.ads.banner_folder().await?;
    let banner_base = format!("{}/wp-content/{}", config.home_url, banner_folder);

    let ads = ads
        .iter()
        .map(|ad| process_ad(ad, id, &banner_base, &config.home_url))
        .collect();

    Ok(Some(AdBundle {
        group: AdGroup {
            id: group.id,
            name: group.name,
            modus: group.modus,
            adspeed: group.adspeed,
            repeat_impressions: group.repeat_impressions,
            gridrows: group.gridrows,
            gridcolumns: group.gridcolumns,
        },
        ads,
    }))
}

/// Synthetic wrapper so single-ad references share the group shape.
fn synthetic_group() -> AdGroupRecord {
    AdGroupRecord {
        id: 0,
        name: "Single Advertisement".to_string(),
        modus: 0,
        adspeed: 0,
        repeat_impressions: "N".to_string(),
        gridrows: 1,
        gridcolumns: 1,
    }
}

fn process_ad(ad: &AdRecord, lookup_id: i64, banner_base: &str, home_url: &str) -> AdCreative {
    let html = decode_entities(&ad.bannercode);

    let mut image_url = String::new();
    if !ad.image.is_empty() {
        image_url = ad.image.replace("%folder%", banner_base);
    }
    if image_url.is_empty() {
        if let Some(caps) = IMG_SRC.captures(&html) {
            image_url = caps[1].to_string();
            if !image_url.contains("http") {
                image_url = format!("{}/{}", home_url, image_url.trim_start_matches('/'));
            }
        }
    }

    let click_url = A_HREF
        .captures(&html)
        .map(|caps| caps[1].to_string())
        .unwrap_or_default();

    AdCreative {
        id: ad.id,
        title: decode_entities(&ad.title),
        image_url,
        click_url,
        tracker_status: ad.tracker.clone(),
        tracking_data: BASE64.encode(format!("{},{},0", ad.id, lookup_id)),
        bannercode: ad.bannercode.clone(),
    }
}
