//! Error types for graph mutations and host synchronisation.
//!
//! Lookup misses (dangling targets, unknown pages) are not errors: they show
//! up as `None` from queries or as [`Change::Ignored`](crate::graph::Change::Ignored)
//! from mutations. Errors are reserved for requests the store refuses.

use crate::graph::ValidationError;
use thiserror::Error;

/// Reasons a [`GraphStore`](crate::graph::GraphStore) mutation was refused.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    /// The home page anchors navigation and cannot be removed.
    #[error("page {0} is the home page and cannot be deleted")]
    HomePage(String),
    /// The graph must always hold at least one page.
    #[error("cannot delete the last remaining page")]
    LastPage,
    /// A link index taken before a deletion no longer points at a link.
    #[error("link index {index} out of range for page {page} ({len} links)")]
    LinkIndexOutOfRange {
        page: String,
        index: usize,
        len: usize,
    },
    /// The link (or the merged result of a patch) is not well-formed.
    #[error("invalid link: {0}")]
    InvalidLink(#[from] ValidationError),
}

/// Failures at the host boundary.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("malformed host state: {0}")]
    HostState(#[source] serde_json::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[source] serde_json::Error),
}
