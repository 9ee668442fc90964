//! The tree view and its configuration.
//!
//! - `TreeView`: Flattens a data source into rows and applies structural changes
//! - `TreeViewOptions`: Indentation, row height, animation and editing settings
//! - `RowsChanged`, `ScrollRequest`: Payloads of the view's signals

mod options;
mod tree_view;

pub use options::{RowAnimation, TreeViewOptions};
pub use tree_view::{RowsChanged, ScrollPosition, ScrollRequest, TreeCell, TreeView};
