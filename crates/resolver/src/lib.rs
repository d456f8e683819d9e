//! Recursive field-tree enrichment for headless newsroom front ends.
//!
//! Page-builder field trees come out of content storage as raw references:
//! layout names, ad ids, attachment ids, widget area names. The resolver
//! walks a tree once and returns the fully enriched document the API serves.

pub mod ads;
pub mod breadcrumb;
pub mod config;
pub mod error;
pub mod layout;
pub mod menu;
pub mod post;
pub mod resolver;
pub mod sanitize;
pub mod sidebar;
pub mod stores;
pub mod trending;
mod value;

pub use ads::{AdBundle, AdCreative, AdGroup, resolve_ad};
pub use breadcrumb::{BreadcrumbEntry, category_breadcrumbs, content_breadcrumbs};
pub use config::ResolverConfig;
pub use error::{ResolveError, ResolveResult};
pub use layout::LayoutKind;
pub use menu::{MenuEntry, menu_tree};
pub use post::PostSummary;
pub use resolver::FieldResolver;
pub use sidebar::{WidgetPayload, sidebar_data};
pub use stores::{
    AdStore, MediaStore, MenuStore, PostStore, SettingsStore, StatsService, Stores, TermStore,
    WidgetStore,
};
pub use trending::trending;
