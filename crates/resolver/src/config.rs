//! Resolver configuration.
//!
//! The theme conventions the resolver honors (which key names reference
//! ads, which layouts are premium, where sidebars live) are data, not
//! code. [`ResolverConfig::default`] reproduces the production theme's
//! conventions exactly; deployments with different field groups override
//! the relevant sets.

use std::collections::BTreeMap;

use serde::Deserialize;

/// Declarative configuration for the field-resolution engine.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Absolute site root, used for breadcrumb "Home" and for rewriting
    /// relative creative URLs to absolute ones.
    pub home_url: String,

    /// Key-name fragments that mark a field as an ad reference.
    pub ad_reference_markers: Vec<String>,

    /// The position-selector key, excluded from ad-reference matching.
    /// Checked first when computing the interleave position.
    pub ad_position_key: String,

    /// Fallback position-selector key.
    pub ad_position_fallback_key: String,

    /// Ad staging slots probed when interleaving, in fallback order.
    pub ad_slot_keys: Vec<String>,

    /// Key-name fragments (matched case-insensitively) that mark a field
    /// as a media reference eligible for id -> `{id, url, alt}` expansion.
    pub image_key_markers: Vec<String>,

    /// The boolean toggle replaced by the site's social-links list.
    pub social_toggle_key: String,

    /// Keys whose string/subtree content keeps its raw HTML.
    pub preserve_html_keys: Vec<String>,

    /// Keys holding fully resolved subtrees the walk must not re-enter.
    pub no_redescend_keys: Vec<String>,

    /// Marker fields checked (in order) for a layout/type tag.
    pub layout_marker_keys: Vec<String>,

    /// The grouped-section layout whose effective name comes from a nested
    /// sub-layout choice.
    pub grouped_layout: String,

    /// Field holding the chosen sub-layout inside a grouped section.
    pub grouped_sublayout_key: String,

    /// Layout-name fragment that triggers a recent-post list.
    pub recent_marker: String,

    /// Layout-name fragments marking premium placements, eligible for the
    /// over-fetch compensation when no ad is configured.
    pub premium_markers: Vec<String>,

    /// Ad-reference fields a layout may carry; all empty means "no ad" for
    /// the premium over-fetch rule.
    pub layout_ad_keys: Vec<String>,

    /// Layout-name fragment that triggers a trending list.
    pub trending_marker: String,

    /// The hero/banner layout, which embeds a trending list in the theme.
    pub hero_layout: String,

    /// The layout that attaches the specialized video sidebar.
    pub youtube_layout: String,

    /// Key-name fragments matched when inferring a post count.
    pub count_key_markers: Vec<String>,

    /// Key-name fragment matched when inferring an offset.
    pub offset_key_marker: String,

    /// Category selector field on layout nodes.
    pub category_key: String,

    /// Toggle field that attaches the generic sidebar to a layout.
    pub show_sidebar_key: String,

    /// Widget area backing `sidebar_data`.
    pub generic_sidebar: String,

    /// Widget area backing `youtube_data`.
    pub youtube_sidebar: String,

    /// Settings keys probed (in order) for the trending default limit.
    pub trending_limit_settings_keys: Vec<String>,

    /// Built-in post count when nothing else matches.
    pub default_count: i64,

    /// Built-in trending limit when settings are silent.
    pub default_trending_limit: i64,

    /// Declared per-field default values, keyed by field name. Stands in
    /// for the field-schema collaborator: an empty count/offset field falls
    /// back to its declared default before the built-in one.
    pub field_defaults: BTreeMap<String, i64>,

    /// Defensive recursion ceiling; deeper subtrees pass through unresolved.
    pub max_depth: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            home_url: "http://localhost".to_string(),
            ad_reference_markers: vec![
                "advert_select".to_string(),
                "adrotate_ad".to_string(),
                "_advert".to_string(),
            ],
            ad_position_key: "select_advert_position".to_string(),
            ad_position_fallback_key: "advert_position".to_string(),
            ad_slot_keys: vec![
                "advert_code_top".to_string(),
                "advert_code_bottom".to_string(),
                "advert_code".to_string(),
            ],
            image_key_markers: vec![
                "image".to_string(),
                "logo".to_string(),
                "icon".to_string(),
                "thumb".to_string(),
            ],
            social_toggle_key: "social_icons".to_string(),
            preserve_html_keys: vec![
                "bannercode".to_string(),
                "advert_code".to_string(),
                "advert_code_top".to_string(),
                "advert_code_bottom".to_string(),
                "audio_player_html".to_string(),
            ],
            no_redescend_keys: vec![
                "section_posts".to_string(),
                "trending_posts".to_string(),
                "global_options".to_string(),
                "sidebar_data".to_string(),
                "section_items".to_string(),
            ],
            layout_marker_keys: vec!["acf_fc_layout".to_string(), "type".to_string()],
            grouped_layout: "category_news_section".to_string(),
            grouped_sublayout_key: "news_layout".to_string(),
            recent_marker: "recent".to_string(),
            premium_markers: vec![
                "politics".to_string(),
                "sports".to_string(),
                "feature".to_string(),
            ],
            layout_ad_keys: vec![
                "adrotate_ad_select".to_string(),
                "advert_select".to_string(),
                "select_advert".to_string(),
            ],
            trending_marker: "trending".to_string(),
            hero_layout: "hero_banner_section".to_string(),
            youtube_layout: "youtube_section".to_string(),
            count_key_markers: vec!["per_page".to_string(), "limit".to_string()],
            offset_key_marker: "offset".to_string(),
            category_key: "select_category".to_string(),
            show_sidebar_key: "show_sidebar".to_string(),
            generic_sidebar: "sidebar-1".to_string(),
            youtube_sidebar: "custom-youtube-sidebar".to_string(),
            trending_limit_settings_keys: vec![
                "post_per_page".to_string(),
                "trending_posts_per_page".to_string(),
            ],
            default_count: 5,
            default_trending_limit: 10,
            field_defaults: BTreeMap::new(),
            max_depth: 32,
        }
    }
}

impl ResolverConfig {
    /// Whether `key` references an ad, honoring the position-key exclusion.
    pub fn is_ad_reference_key(&self, key: &str) -> bool {
        key != self.ad_position_key && self.ad_reference_markers.iter().any(|m| key.contains(m))
    }

    /// Whether `key` looks like a media reference (image/logo/icon/thumb).
    pub fn is_image_key(&self, key: &str) -> bool {
        let lower = key.to_lowercase();
        self.image_key_markers.iter().any(|m| lower.contains(m))
    }

    /// Whether `key` infers a post count on a layout node.
    pub fn is_count_key(&self, key: &str) -> bool {
        self.count_key_markers.iter().any(|m| key.contains(m))
    }

    /// Whether string content under `key` keeps its raw HTML.
    pub fn preserves_html(&self, key: &str) -> bool {
        self.preserve_html_keys.iter().any(|k| k == key)
    }

    /// Whether the subtree under `key` is already fully resolved.
    pub fn blocks_recursion(&self, key: &str) -> bool {
        self.preserves_html(key) || self.no_redescend_keys.iter().any(|k| k == key)
    }

    /// Declared default for a count/offset field, when the schema has one.
    pub fn field_default(&self, key: &str) -> Option<i64> {
        self.field_defaults.get(key).copied()
    }
}
