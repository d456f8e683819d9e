//! Resolver error types.
//!
//! Inside the tree walk there are no fatal errors: a failed store read
//! degrades the affected field to `null`/empty and is logged. These types
//! exist for the crate boundary, where callers invoke components directly.

use thiserror::Error;

/// Errors surfaced by direct component calls.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// A dependent integration is not installed or not reachable. The
    /// corresponding enrichment is skipped; the rest of the tree resolves.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// Any other failure from a backing store.
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// Result type alias using ResolveError.
pub type ResolveResult<T> = Result<T, ResolveError>;
