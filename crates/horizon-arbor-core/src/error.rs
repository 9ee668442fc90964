//! Error types for Horizon Arbor.
//!
//! Lookup misses and invalid state transitions are recoverable: the public
//! tree view API turns them into `bool`/`Option` returns. A data source that
//! contradicts itself is not recoverable; see [`provider_contract_violation`].

use crate::logging::targets;

/// Result type alias for Horizon Arbor operations.
pub type Result<T> = std::result::Result<T, ArborError>;

/// The main error type for Horizon Arbor operations.
#[derive(Debug, thiserror::Error)]
pub enum ArborError {
    /// No record with the identifier is materialized in the section.
    #[error("node '{identifier}' not found in section {section}")]
    NodeNotFound { identifier: String, section: usize },

    /// The node cannot be expanded.
    #[error("node '{identifier}' is not expandable")]
    NotExpandable { identifier: String },

    /// A child was requested under a parent that cannot have children.
    #[error("parent node '{identifier}' is not expandable")]
    ParentNotExpandable { identifier: String },

    /// A tree-relative index lies outside the parent's children.
    #[error("index {index} out of range for {count} children")]
    IndexOutOfRange { index: usize, count: usize },

    /// The section has not been loaded from the data source yet.
    #[error("section {0} has not been loaded")]
    SectionNotLoaded(usize),

    /// The tree view has no data source installed.
    #[error("no data source installed")]
    NoDataSource,

    /// The connection ID is invalid or has already been disconnected.
    #[error("invalid or disconnected connection ID")]
    InvalidConnection,

    /// View options could not be parsed.
    #[error("invalid tree view options: {0}")]
    InvalidOptions(#[from] serde_json::Error),
}

impl ArborError {
    /// Create a not-found error.
    pub fn node_not_found(identifier: impl Into<String>, section: usize) -> Self {
        Self::NodeNotFound {
            identifier: identifier.into(),
            section,
        }
    }

    /// Create a not-expandable error.
    pub fn not_expandable(identifier: impl Into<String>) -> Self {
        Self::NotExpandable {
            identifier: identifier.into(),
        }
    }

    /// Returns `true` for lookup misses.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NodeNotFound { .. } | Self::SectionNotLoaded(_))
    }
}

/// Halt on a data source that broke its contract.
///
/// Called when the data source returns nothing for an index it has already
/// reported as in range. The flattened rows can no longer be kept consistent
/// with the tree, so the process is stopped instead of corrupting them.
#[cold]
#[track_caller]
pub fn provider_contract_violation(detail: std::fmt::Arguments<'_>) -> ! {
    tracing::error!(target: targets::FLATTEN, %detail, "data source contract violated");
    panic!("invalid data source for tree view: {detail}");
}
