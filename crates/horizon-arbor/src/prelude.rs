//! Prelude module for Horizon Arbor.
//!
//! ```ignore
//! use horizon_arbor::prelude::*;
//! ```

// ============================================================================
// Signals and Errors
// ============================================================================

pub use crate::{ArborError, ConnectionId, Result, Signal};

// ============================================================================
// Model
// ============================================================================

pub use crate::model::{
    IndexPath, NodeInsertion, NodeRecord, TreeDataSource, TreeNode, TreeStore, TreeViewDelegate,
};

// ============================================================================
// View
// ============================================================================

pub use crate::view::{
    RowAnimation, RowsChanged, ScrollPosition, ScrollRequest, TreeCell, TreeView, TreeViewOptions,
};
