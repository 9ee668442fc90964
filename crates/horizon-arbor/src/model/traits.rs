//! Core traits connecting the tree view to caller-supplied data.
//!
//! The tree view pulls everything it shows from a [`TreeDataSource`] and
//! reports what happened to an optional [`TreeViewDelegate`].

use super::index::IndexPath;
use super::node::TreeNode;

/// The data source a tree view pulls its tree from.
///
/// The tree is never handed over as a whole. The view asks for the roots of
/// a section when the section is first displayed, and for the children of a
/// node only when that node expands.
///
/// Every `index` passed to these methods is tree-relative: the row is the
/// position among the children of `parent`, or among the section's roots
/// when `parent` is `None`.
///
/// # Contract
///
/// Child counts and node identities must stay stable between the moment a
/// node is expanded and any later query for its children. Changing them
/// without first collapsing the node (or resetting the tree) breaks the
/// flattened rows. Returning `None` from [`node_at`](TreeDataSource::node_at)
/// for an index below [`child_count`](TreeDataSource::child_count) is treated
/// as a fatal programming error.
///
/// # Example
///
/// ```ignore
/// use horizon_arbor::model::{IndexPath, TreeDataSource, TreeNode};
///
/// struct Folders {
///     roots: Vec<Folder>,
/// }
///
/// impl TreeDataSource for Folders {
///     type Node = Folder;
///     type Cell = String;
///
///     fn section_count(&self) -> usize {
///         1
///     }
///
///     fn child_count(&self, _section: usize, parent: Option<&Folder>) -> usize {
///         parent.map_or(self.roots.len(), |folder| folder.children.len())
///     }
///
///     fn node_at(&self, index: IndexPath, parent: Option<&Folder>) -> Option<Folder> {
///         match parent {
///             Some(folder) => folder.children.get(index.row()).cloned(),
///             None => self.roots.get(index.row()).cloned(),
///         }
///     }
///
///     fn cell_for_node(&self, index: IndexPath, parent: Option<&Folder>, _expanded: bool) -> String {
///         self.node_at(index, parent).map(|f| f.name).unwrap_or_default()
///     }
/// }
/// ```
pub trait TreeDataSource: Send + Sync {
    /// The node handle handed out by this data source.
    type Node: TreeNode;

    /// The rendering content produced for a row.
    type Cell;

    /// Returns the number of sections.
    fn section_count(&self) -> usize;

    /// Returns the number of children of `parent` in `section`.
    ///
    /// `None` asks for the number of roots of the section.
    fn child_count(&self, section: usize, parent: Option<&Self::Node>) -> usize;

    /// Returns the child of `parent` at `index`.
    fn node_at(&self, index: IndexPath, parent: Option<&Self::Node>) -> Option<Self::Node>;

    /// Returns the rendering content for the node at `index` under `parent`.
    ///
    /// The tree view passes the result straight through to the presentation
    /// surface.
    fn cell_for_node(
        &self,
        index: IndexPath,
        parent: Option<&Self::Node>,
        is_expanded: bool,
    ) -> Self::Cell;
}

/// Observer for tree view events and per-row presentation queries.
///
/// Every method has a default, so implementors override only what they need.
/// Indices are tree-relative, the same coordinates used by
/// [`TreeDataSource::node_at`].
///
/// Lifecycle callbacks (`did_expand_node`, `did_collapse_node`,
/// `did_select_node`) run after the flattened rows and every paired
/// structural signal have been committed.
pub trait TreeViewDelegate<N>: Send + Sync {
    /// Returns a custom height for the node's row, or `None` for the default.
    fn height_for_node(&self, _index: IndexPath, _parent: Option<&N>) -> Option<f32> {
        None
    }

    /// Returns whether the node's row may be edited (deleted).
    fn can_edit_node(&self, _index: IndexPath, _parent: Option<&N>) -> bool {
        false
    }

    /// Called when the user confirms deleting the node's row.
    ///
    /// The delegate is expected to update its data and then call
    /// `TreeView::remove_node`.
    fn commit_delete(&self, _index: IndexPath, _parent: Option<&N>) {}

    /// Called after a node expanded.
    fn did_expand_node(&self, _index: IndexPath, _parent: Option<&N>) {}

    /// Called after a node collapsed.
    fn did_collapse_node(&self, _index: IndexPath, _parent: Option<&N>) {}

    /// Called after a non-expandable node was selected.
    fn did_select_node(&self, _index: IndexPath, _parent: Option<&N>) {}
}

/// The delegate installed when none is set. Ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelegate;

impl<N> TreeViewDelegate<N> for NoDelegate {}
