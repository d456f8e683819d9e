//! Ad reference resolution through the in-memory inventory.
#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::json;

use common::{Fixture, ad, stores};
use redazione_resolver::stores::AdGroupRecord;
use redazione_resolver::{FieldResolver, ResolverConfig, resolve_ad};

fn group_fixture() -> Fixture {
    let mut fixture = Fixture::default();
    fixture.ad_groups.push(AdGroupRecord {
        id: 4,
        name: "Leaderboard".to_string(),
        modus: 1,
        adspeed: 5000,
        repeat_impressions: "Y".to_string(),
        gridrows: 1,
        gridcolumns: 2,
    });
    fixture.ads.insert(70, ad(70, "First", "<img src=\"https://cdn.example/a.png\">"));
    fixture.ads.insert(71, ad(71, "Second", "<img src=\"https://cdn.example/b.png\">"));
    fixture.group_members.insert(4, vec![70, 71]);
    fixture
}

#[tokio::test]
async fn group_references_bundle_every_member() {
    let bundle = resolve_ad(&stores(group_fixture()), &ResolverConfig::default(), &json!(4))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(bundle.group.id, 4);
    assert_eq!(bundle.group.name, "Leaderboard");
    assert_eq!(bundle.ads.len(), 2);
    // Tracking encodes the creative id and the looked-up id.
    assert_eq!(bundle.ads[0].tracking_data, BASE64.encode("70,4,0"));
    assert_eq!(bundle.ads[1].tracking_data, BASE64.encode("71,4,0"));
}

#[tokio::test]
async fn string_references_resolve_like_numbers() {
    let bundle = resolve_ad(
        &stores(group_fixture()),
        &ResolverConfig::default(),
        &json!(" 4 "),
    )
    .await
    .unwrap();
    assert!(bundle.is_some());
}

#[tokio::test]
async fn non_numeric_and_non_positive_references_resolve_to_none() {
    let stores = stores(group_fixture());
    let config = ResolverConfig::default();
    assert!(resolve_ad(&stores, &config, &json!("soon")).await.unwrap().is_none());
    assert!(resolve_ad(&stores, &config, &json!(0)).await.unwrap().is_none());
    assert!(resolve_ad(&stores, &config, &json!(-3)).await.unwrap().is_none());
}

#[tokio::test]
async fn top_and_bottom_references_stage_suffixed_slots() {
    let engine = FieldResolver::new(stores(group_fixture()), ResolverConfig::default());
    let resolved = engine
        .resolve(json!({
            "advert_select_top": 4,
            "bottom_advert_select": "70"
        }))
        .await;

    assert_eq!(resolved["advert_code_top"]["group"]["id"], 4);
    // The single-ad path wraps the creative in the synthetic group.
    assert_eq!(resolved["advert_code_bottom"]["group"]["id"], 0);
    // Original reference fields survive staging.
    assert_eq!(resolved["advert_select_top"], 4);
}
