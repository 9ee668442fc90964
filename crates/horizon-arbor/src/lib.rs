//! Horizon Arbor - a lazily materialized tree view engine.
//!
//! This is the main crate. It re-exports the core systems from
//! `horizon-arbor-core` and adds the data model and the tree view.
//!
//! A tree view shows a hierarchical data source on a surface that can only
//! draw a flat list of rows. Roots are fetched when a section is first
//! shown and children when their parent expands, so even very large trees
//! cost only what is on screen.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use horizon_arbor::model::{TreeNode, TreeStore};
//! use horizon_arbor::view::TreeView;
//!
//! #[derive(Clone)]
//! struct Item {
//!     name: &'static str,
//!     folder: bool,
//! }
//!
//! impl TreeNode for Item {
//!     fn identifier(&self) -> &str {
//!         self.name
//!     }
//!
//!     fn is_expandable(&self) -> bool {
//!         self.folder
//!     }
//! }
//!
//! let store = Arc::new(TreeStore::new());
//! let docs = store.add_root(0, Item { name: "docs", folder: true }).unwrap();
//! store.add_child(docs, Item { name: "notes.txt", folder: false });
//!
//! let mut view = TreeView::new().with_data_source(store.clone());
//! assert_eq!(view.row_count(0), 1);
//!
//! let handle = store.handle(docs).unwrap();
//! assert!(view.expand(&handle, 0));
//! assert_eq!(view.row_count(0), 2);
//! ```

pub use horizon_arbor_core::*;

pub mod model;
pub mod prelude;
pub mod view;
