//! Data model for Horizon Arbor.
//!
//! This module holds everything between the caller's data and the rows a
//! tree view shows:
//!
//! - Lazy loading: roots load when a section is first shown, children
//!   load when their parent expands
//! - Incremental updates: every change reports the contiguous rows it touched
//! - Identity-based addressing: nodes are found again by identifier
//!
//! # Core Types
//!
//! - `IndexPath`: A `(section, row)` position, absolute or tree-relative
//! - `TreeNode`: What a node must expose (identifier, expandability)
//! - `NodeRecord`: The engine's shadow of one visible row
//! - `TreeDataSource`: The trait data sources implement
//! - `TreeViewDelegate`: Optional observer of view events
//! - `FlatTree`: The flattened, per-section visible rows
//!
//! # Data Sources
//!
//! - `TreeStore`: In-memory tree with sections, usable directly as a data source
//!
//! # Architecture Overview
//!
//! ```text
//! ┌────────────────┐  child_count   ┌─────────────┐  rows_inserted  ┌──────────┐
//! │ TreeDataSource │<───────────────│  TreeView   │────────────────>│ Surface  │
//! │                │  node_at       │  (FlatTree) │  rows_removed   │          │
//! └────────────────┘                └─────────────┘                 └──────────┘
//!                                          │
//!                                          │ did_expand_node ...
//!                                          v
//!                                  ┌──────────────────┐
//!                                  │ TreeViewDelegate │
//!                                  └──────────────────┘
//! ```

mod flatten;
mod index;
mod node;
mod traits;
mod tree_store;

pub use flatten::{FlatSection, FlatTree, NodeInsertion};
pub use index::IndexPath;
pub use node::{NodeRecord, TreeNode};
pub use traits::{NoDelegate, TreeDataSource, TreeViewDelegate};
pub use tree_store::{NodeId, StoreNode, TreeStore};
