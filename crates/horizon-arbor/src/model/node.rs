//! Tree nodes and the per-row records the engine keeps for them.

use std::rc::Rc;
use std::sync::Arc;

/// The minimum a data source's node must expose to the tree view.
///
/// Identifiers must be unique among the children of one parent within a
/// section. Lookups by identifier resolve to the first matching row, so
/// duplicated identifiers make those lookups ambiguous.
pub trait TreeNode {
    /// The node's identifier.
    fn identifier(&self) -> &str;

    /// Whether the node can have children.
    fn is_expandable(&self) -> bool;
}

impl<T: TreeNode + ?Sized> TreeNode for &T {
    fn identifier(&self) -> &str {
        (**self).identifier()
    }

    fn is_expandable(&self) -> bool {
        (**self).is_expandable()
    }
}

impl<T: TreeNode + ?Sized> TreeNode for Box<T> {
    fn identifier(&self) -> &str {
        (**self).identifier()
    }

    fn is_expandable(&self) -> bool {
        (**self).is_expandable()
    }
}

impl<T: TreeNode + ?Sized> TreeNode for Arc<T> {
    fn identifier(&self) -> &str {
        (**self).identifier()
    }

    fn is_expandable(&self) -> bool {
        (**self).is_expandable()
    }
}

impl<T: TreeNode + ?Sized> TreeNode for Rc<T> {
    fn identifier(&self) -> &str {
        (**self).identifier()
    }

    fn is_expandable(&self) -> bool {
        (**self).is_expandable()
    }
}

/// The engine's shadow of one visible row.
///
/// A record never owns domain data. Its parent is referenced by identifier
/// only; the full parent node is re-resolved from the data source when it is
/// needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRecord {
    identifier: String,
    indentation_level: usize,
    is_expandable: bool,
    is_expanded: bool,
    parent: Option<String>,
}

impl NodeRecord {
    /// Creates a collapsed root record for `node`.
    pub fn root<N: TreeNode + ?Sized>(node: &N) -> Self {
        Self {
            identifier: node.identifier().to_owned(),
            indentation_level: 0,
            is_expandable: node.is_expandable(),
            is_expanded: false,
            parent: None,
        }
    }

    /// Creates a collapsed record for `node` one level below `parent`.
    ///
    /// `parent_level` is the indentation level of the parent's record.
    pub fn child<N, P>(node: &N, parent: &P, parent_level: usize) -> Self
    where
        N: TreeNode + ?Sized,
        P: TreeNode + ?Sized,
    {
        Self {
            identifier: node.identifier().to_owned(),
            indentation_level: parent_level + 1,
            is_expandable: node.is_expandable(),
            is_expanded: false,
            parent: Some(parent.identifier().to_owned()),
        }
    }

    /// The identifier of the node this record shadows.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// The depth of the row; 0 for roots.
    pub fn indentation_level(&self) -> usize {
        self.indentation_level
    }

    /// Whether the node can have children.
    pub fn is_expandable(&self) -> bool {
        self.is_expandable
    }

    /// Whether the node's children are currently materialized.
    pub fn is_expanded(&self) -> bool {
        self.is_expanded
    }

    /// The identifier of the parent node, `None` for roots.
    pub fn parent_identifier(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// Whether this record is a root of its section.
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub(crate) fn set_expanded(&mut self, expanded: bool) {
        self.is_expanded = expanded;
    }
}
