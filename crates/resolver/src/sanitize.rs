//! Text leaf sanitization.
//!
//! Every string leaf that reaches the client goes through here: entities are
//! decoded, markup outside the allow-list is stripped, and surrounding
//! whitespace is trimmed. Uses `ammonia` for allow-list tag filtering and
//! `html-escape` for entity decoding.

use std::collections::HashSet;
use std::sync::LazyLock;

/// Tags kept by the default allow-list. Headless clients render these
/// directly, so embeds and basic formatting survive sanitization.
pub const DEFAULT_ALLOWED_TAGS: &[&str] = &[
    "img", "iframe", "div", "p", "a", "span", "strong", "em", "b", "i", "ul", "li", "ol", "br",
    "h1", "h2", "h3", "h4", "h5", "h6",
];

// Pre-built cleaners (building an ammonia Builder per call is wasteful).
static DEFAULT_CLEANER: LazyLock<ammonia::Builder<'static>> =
    LazyLock::new(|| builder_for(DEFAULT_ALLOWED_TAGS));
static STRIP_ALL_CLEANER: LazyLock<ammonia::Builder<'static>> = LazyLock::new(|| {
    let mut builder = ammonia::Builder::default();
    builder.tags(HashSet::new());
    builder
});

fn builder_for(tags: &[&'static str]) -> ammonia::Builder<'static> {
    let mut builder = ammonia::Builder::default();
    builder.tags(tags.iter().copied().collect::<HashSet<_>>());
    builder.add_tag_attributes(
        "iframe",
        ["src", "width", "height", "frameborder", "allowfullscreen"],
    );
    builder
}

/// Decode HTML entities (named and numeric) in `input`.
pub fn decode_entities(input: &str) -> String {
    html_escape::decode_html_entities(input).into_owned()
}

/// Sanitize a text leaf with the default allow-list.
pub fn sanitize(input: &str) -> String {
    clean_decoded(&DEFAULT_CLEANER, input)
}

/// Sanitize a text leaf keeping only the given tags.
pub fn sanitize_with(input: &str, allowed: &[&str]) -> String {
    let mut builder = ammonia::Builder::default();
    builder.tags(allowed.iter().copied().collect::<HashSet<_>>());
    builder.add_tag_attributes(
        "iframe",
        ["src", "width", "height", "frameborder", "allowfullscreen"],
    );
    clean_decoded(&builder, input)
}

/// Strip all markup from a text leaf, decode entities, and trim.
pub fn strip_all(input: &str) -> String {
    clean_decoded(&STRIP_ALL_CLEANER, input)
}

/// Decode before cleaning so pre-escaped markup is filtered rather than
/// surviving as entities, and decode again after because the cleaner
/// re-escapes text content.
fn clean_decoded(cleaner: &ammonia::Builder<'_>, input: &str) -> String {
    let decoded = decode_entities(input);
    decode_entities(&cleaner.clean(&decoded).to_string())
        .trim()
        .to_string()
}

/// Collapse runs of whitespace into single spaces.
pub fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}
