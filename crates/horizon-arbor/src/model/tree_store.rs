//! In-memory hierarchical data source.
//!
//! `TreeStore` keeps a whole tree in memory and serves it to a tree view
//! through [`TreeDataSource`]. It is the simplest way to get rows on screen
//! when the data is already at hand.

use parking_lot::RwLock;
use slotmap::SlotMap;

use horizon_arbor_core::logging::targets;

use super::index::IndexPath;
use super::node::TreeNode;
use super::traits::TreeDataSource;

slotmap::new_key_type! {
    /// Stable key of a node stored in a [`TreeStore`].
    pub struct NodeId;
}

/// A node stored in the tree.
struct Entry<T> {
    data: T,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
    section: usize,
}

/// Internal storage for tree nodes.
struct Storage<T> {
    nodes: SlotMap<NodeId, Entry<T>>,
    sections: Vec<Vec<NodeId>>,
}

impl<T> Storage<T> {
    fn children_of(&self, section: usize, parent: Option<NodeId>) -> &[NodeId] {
        match parent {
            None => self
                .sections
                .get(section)
                .map(Vec::as_slice)
                .unwrap_or(&[]),
            Some(id) => self
                .nodes
                .get(id)
                .filter(|entry| entry.section == section)
                .map(|entry| entry.children.as_slice())
                .unwrap_or(&[]),
        }
    }

    fn siblings_mut(&mut self, section: usize, parent: Option<NodeId>) -> Option<&mut Vec<NodeId>> {
        match parent {
            None => self.sections.get_mut(section),
            Some(id) => self.nodes.get_mut(id).map(|entry| &mut entry.children),
        }
    }

    fn insert(&mut self, section: usize, parent: Option<NodeId>, index: Option<usize>, data: T) -> Option<NodeId> {
        let len = self.children_of(section, parent).len();
        let index = index.unwrap_or(len);
        if index > len || section >= self.sections.len() {
            return None;
        }
        if let Some(parent) = parent {
            self.nodes.get(parent).filter(|entry| entry.section == section)?;
        }

        let id = self.nodes.insert(Entry {
            data,
            children: Vec::new(),
            parent,
            section,
        });
        self.siblings_mut(section, parent)?.insert(index, id);
        Some(id)
    }

    fn remove_subtree(&mut self, id: NodeId) -> Option<T> {
        let entry = self.nodes.remove(id)?;
        for child in entry.children {
            self.remove_subtree(child);
        }
        Some(entry.data)
    }

    fn index_of(&self, id: NodeId) -> Option<IndexPath> {
        let entry = self.nodes.get(id)?;
        let row = self
            .children_of(entry.section, entry.parent)
            .iter()
            .position(|&sibling| sibling == id)?;
        Some(IndexPath::new(row, entry.section))
    }
}

impl<T: TreeNode> Storage<T> {
    fn handle(&self, id: NodeId) -> Option<StoreNode> {
        let entry = self.nodes.get(id)?;
        Some(StoreNode {
            id,
            identifier: entry.data.identifier().to_owned(),
            expandable: entry.data.is_expandable(),
        })
    }
}

/// The node handle a [`TreeStore`] hands to the tree view.
///
/// Carries the store key alongside the node's identifier and expandability,
/// so the store can find children without searching.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoreNode {
    id: NodeId,
    identifier: String,
    expandable: bool,
}

impl StoreNode {
    /// Returns the store key of the node.
    pub fn id(&self) -> NodeId {
        self.id
    }
}

impl TreeNode for StoreNode {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn is_expandable(&self) -> bool {
        self.expandable
    }
}

/// A thread-safe in-memory tree, split into sections.
///
/// Mutating the store does not update a tree view showing it. After a
/// change, tell the view with `TreeView::insert_node` or
/// `TreeView::remove_node`, or reset it.
///
/// # Example
///
/// ```ignore
/// use horizon_arbor::model::{TreeNode, TreeStore};
///
/// #[derive(Clone)]
/// struct File {
///     name: String,
///     is_directory: bool,
/// }
///
/// impl TreeNode for File {
///     fn identifier(&self) -> &str {
///         &self.name
///     }
///
///     fn is_expandable(&self) -> bool {
///         self.is_directory
///     }
/// }
///
/// let store = TreeStore::new();
/// let docs = store.add_root(0, File { name: "Documents".into(), is_directory: true }).unwrap();
/// store.add_child(docs, File { name: "notes.txt".into(), is_directory: false });
/// ```
pub struct TreeStore<T> {
    storage: RwLock<Storage<T>>,
}

impl<T> TreeStore<T> {
    /// Creates a store with one empty section.
    pub fn new() -> Self {
        Self::with_sections(1)
    }

    /// Creates a store with `count` empty sections.
    pub fn with_sections(count: usize) -> Self {
        Self {
            storage: RwLock::new(Storage {
                nodes: SlotMap::with_key(),
                sections: vec![Vec::new(); count],
            }),
        }
    }

    /// Appends an empty section and returns its index.
    pub fn add_section(&self) -> usize {
        let mut storage = self.storage.write();
        storage.sections.push(Vec::new());
        storage.sections.len() - 1
    }

    /// Returns the number of sections.
    pub fn section_count(&self) -> usize {
        self.storage.read().sections.len()
    }

    /// Appends a root node to `section`.
    ///
    /// Returns `None` if the section doesn't exist.
    pub fn add_root(&self, section: usize, data: T) -> Option<NodeId> {
        self.storage.write().insert(section, None, None, data)
    }

    /// Inserts a root node at `index` among the roots of `section`.
    ///
    /// Returns `None` if the section doesn't exist or `index` is past the end.
    pub fn insert_root(&self, section: usize, index: usize, data: T) -> Option<NodeId> {
        self.storage.write().insert(section, None, Some(index), data)
    }

    /// Appends a child to `parent`.
    ///
    /// Returns `None` if the parent doesn't exist.
    pub fn add_child(&self, parent: NodeId, data: T) -> Option<NodeId> {
        let mut storage = self.storage.write();
        let section = storage.nodes.get(parent)?.section;
        storage.insert(section, Some(parent), None, data)
    }

    /// Inserts a child at `index` among the children of `parent`.
    ///
    /// Returns `None` if the parent doesn't exist or `index` is past the end.
    pub fn insert_child(&self, parent: NodeId, index: usize, data: T) -> Option<NodeId> {
        let mut storage = self.storage.write();
        let section = storage.nodes.get(parent)?.section;
        storage.insert(section, Some(parent), Some(index), data)
    }

    /// Removes a node and all its descendants.
    ///
    /// Returns the removed node's data, or `None` if the node doesn't exist.
    pub fn remove(&self, id: NodeId) -> Option<T> {
        let mut storage = self.storage.write();
        let entry = storage.nodes.get(id)?;
        let (section, parent) = (entry.section, entry.parent);
        if let Some(siblings) = storage.siblings_mut(section, parent) {
            siblings.retain(|&sibling| sibling != id);
        }
        let removed = storage.remove_subtree(id);
        tracing::trace!(target: targets::STORE, section, remaining = storage.nodes.len(), "removed subtree");
        removed
    }

    /// Removes every node. Sections are kept, empty.
    pub fn clear(&self) {
        let mut storage = self.storage.write();
        storage.nodes.clear();
        storage.sections.iter_mut().for_each(Vec::clear);
    }

    /// Returns the total number of stored nodes.
    pub fn len(&self) -> usize {
        self.storage.read().nodes.len()
    }

    /// Returns `true` if no node is stored.
    pub fn is_empty(&self) -> bool {
        self.storage.read().nodes.is_empty()
    }

    /// Returns the tree-relative index of a node.
    pub fn index_of(&self, id: NodeId) -> Option<IndexPath> {
        self.storage.read().index_of(id)
    }

    /// Returns the key of the node's parent, `None` for roots and unknown keys.
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.storage.read().nodes.get(id)?.parent
    }

    /// Provides read access to a node's data.
    pub fn with_node<F, R>(&self, id: NodeId, f: F) -> Option<R>
    where
        F: FnOnce(&T) -> R,
    {
        let storage = self.storage.read();
        storage.nodes.get(id).map(|entry| f(&entry.data))
    }
}

impl<T: TreeNode> TreeStore<T> {
    /// Returns the handle the tree view sees for a node.
    pub fn handle(&self, id: NodeId) -> Option<StoreNode> {
        self.storage.read().handle(id)
    }
}

impl<T> Default for TreeStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TreeDataSource for TreeStore<T>
where
    T: TreeNode + Clone + Send + Sync,
{
    type Node = StoreNode;
    type Cell = Option<T>;

    fn section_count(&self) -> usize {
        TreeStore::section_count(self)
    }

    fn child_count(&self, section: usize, parent: Option<&StoreNode>) -> usize {
        self.storage
            .read()
            .children_of(section, parent.map(StoreNode::id))
            .len()
    }

    fn node_at(&self, index: IndexPath, parent: Option<&StoreNode>) -> Option<StoreNode> {
        let storage = self.storage.read();
        let id = *storage
            .children_of(index.section(), parent.map(StoreNode::id))
            .get(index.row())?;
        storage.handle(id)
    }

    fn cell_for_node(&self, index: IndexPath, parent: Option<&StoreNode>, _is_expanded: bool) -> Option<T> {
        let storage = self.storage.read();
        let id = *storage
            .children_of(index.section(), parent.map(StoreNode::id))
            .get(index.row())?;
        storage.nodes.get(id).map(|entry| entry.data.clone())
    }
}

static_assertions::assert_impl_all!(TreeStore<String>: Send, Sync);
