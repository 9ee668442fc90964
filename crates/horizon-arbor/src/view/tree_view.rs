//! Lazily materialized tree view.
//!
//! `TreeView` sits between a [`TreeDataSource`] and a presentation surface
//! that can only draw a flat, sectioned list of rows. It flattens the
//! expanded part of the tree, loading children only when their parent
//! expands, and reports every structural change as a contiguous row range.
//!
//! # Coordinates
//!
//! The row-facing methods (`row_count`, `cell_for_row`, `did_select_row`, ...)
//! take absolute index paths, the position in the flattened list. Everything
//! forwarded to the data source and delegate uses tree-relative index paths.
//!
//! # Notification order
//!
//! Every structural operation first updates the flattened rows, then emits
//! its structural signals (`rows_reloaded` for a toggled row, then
//! `rows_inserted` or `rows_removed`), then `selection_changed` if the
//! selected row moved, and only then calls the delegate.

use std::ops::RangeInclusive;
use std::sync::Arc;

use horizon_arbor_core::logging::targets;
use horizon_arbor_core::{DebugRow, FlatTreeDebug, Signal, TreeFormatOptions};

use crate::model::{
    FlatTree, IndexPath, NoDelegate, NodeInsertion, NodeRecord, TreeDataSource, TreeNode,
    TreeViewDelegate,
};

use super::options::{RowAnimation, TreeViewOptions};

/// A contiguous run of rows inserted into or removed from one section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowsChanged {
    /// The section the rows belong to.
    pub section: usize,
    /// The first affected row.
    pub first: usize,
    /// The last affected row (inclusive).
    pub last: usize,
    /// How the surface should animate the change.
    pub animation: RowAnimation,
}

impl RowsChanged {
    /// Creates a change covering `rows` in `section`.
    pub fn new(section: usize, rows: RangeInclusive<usize>, animation: RowAnimation) -> Self {
        Self {
            section,
            first: *rows.start(),
            last: *rows.end(),
            animation,
        }
    }

    /// Returns the affected rows.
    pub fn rows(&self) -> RangeInclusive<usize> {
        self.first..=self.last
    }

    /// Returns the number of affected rows.
    pub fn len(&self) -> usize {
        self.last + 1 - self.first
    }

    /// Always `false`: a change covers at least one row.
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Where a row should end up when scrolled to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScrollPosition {
    /// Scroll as little as possible to make the row visible.
    None,
    /// Align the row with the top of the viewport.
    Top,
    /// Center the row in the viewport.
    #[default]
    Middle,
    /// Align the row with the bottom of the viewport.
    Bottom,
}

/// A request for the presentation surface to scroll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollRequest {
    /// The absolute row to scroll to.
    pub path: IndexPath,
    /// Where the row should end up.
    pub position: ScrollPosition,
}

/// Rendering content for one row, with its indentation applied.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeCell<C> {
    /// The content produced by the data source.
    pub content: C,
    /// Depth of the row; 0 for roots.
    pub indentation_level: usize,
    /// Horizontal offset of the content.
    pub indentation: f32,
}

/// Everything needed to talk about a displayed row in tree coordinates.
struct RowContext<N> {
    index: IndexPath,
    parent: Option<N>,
    is_expandable: bool,
    is_expanded: bool,
}

/// A tree view that materializes rows lazily.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use horizon_arbor::model::TreeStore;
/// use horizon_arbor::view::TreeView;
///
/// let store = Arc::new(TreeStore::new());
/// let docs = store.add_root(0, Folder::new("Documents")).unwrap();
/// store.add_child(docs, Folder::file("notes.txt"));
///
/// let mut view = TreeView::new().with_data_source(store.clone());
/// view.rows_inserted.connect(|change| println!("inserted {:?}", change.rows()));
///
/// assert_eq!(view.row_count(0), 1);
/// view.expand(&store.handle(docs).unwrap(), 0);
/// assert_eq!(view.row_count(0), 2);
/// ```
///
/// # Signals
///
/// - `rows_inserted(RowsChanged)`: Rows were inserted
/// - `rows_removed(RowsChanged)`: Rows were removed
/// - `rows_reloaded(IndexPath)`: A row's content changed and must be redrawn
/// - `tree_reset(())`: Every row must be reloaded
/// - `selection_changed(Option<IndexPath>)`: The selected row changed or moved
/// - `scroll_requested(ScrollRequest)`: A row should be scrolled into view
pub struct TreeView<S: TreeDataSource> {
    data_source: Option<Arc<S>>,
    delegate: Arc<dyn TreeViewDelegate<S::Node>>,
    flat: FlatTree,
    options: TreeViewOptions,
    selected_row: Option<IndexPath>,

    // Signals
    /// Emitted after rows were inserted.
    pub rows_inserted: Signal<RowsChanged>,
    /// Emitted after rows were removed. Rows are in the coordinates from
    /// before the removal.
    pub rows_removed: Signal<RowsChanged>,
    /// Emitted when a toggled row must be redrawn.
    pub rows_reloaded: Signal<IndexPath>,
    /// Emitted when every row must be reloaded.
    pub tree_reset: Signal<()>,
    /// Emitted when the selected row changes or moves.
    pub selection_changed: Signal<Option<IndexPath>>,
    /// Emitted when a row should be scrolled into view.
    pub scroll_requested: Signal<ScrollRequest>,
}

impl<S: TreeDataSource> Default for TreeView<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: TreeDataSource> TreeView<S> {
    /// Creates a tree view with no data source.
    pub fn new() -> Self {
        Self {
            data_source: None,
            delegate: Arc::new(NoDelegate),
            flat: FlatTree::new(),
            options: TreeViewOptions::default(),
            selected_row: None,
            rows_inserted: Signal::new(),
            rows_removed: Signal::new(),
            rows_reloaded: Signal::new(),
            tree_reset: Signal::new(),
            selection_changed: Signal::new(),
            scroll_requested: Signal::new(),
        }
    }

    // =========================================================================
    // Builder Methods
    // =========================================================================

    /// Creates a tree view showing the given data source.
    pub fn with_data_source(mut self, source: Arc<S>) -> Self {
        self.data_source = Some(source);
        self
    }

    /// Creates a tree view reporting to the given delegate.
    pub fn with_delegate(mut self, delegate: Arc<dyn TreeViewDelegate<S::Node>>) -> Self {
        self.delegate = delegate;
        self
    }

    /// Creates a tree view with the given options.
    pub fn with_options(mut self, options: TreeViewOptions) -> Self {
        self.options = options;
        self
    }

    // =========================================================================
    // Collaborators
    // =========================================================================

    /// Returns the data source, if one is installed.
    pub fn data_source(&self) -> Option<&Arc<S>> {
        self.data_source.as_ref()
    }

    /// Replaces the data source and resets the tree.
    pub fn set_data_source(&mut self, source: Option<Arc<S>>) {
        self.data_source = source;
        self.reset_tree();
    }

    /// Returns the delegate.
    pub fn delegate(&self) -> &Arc<dyn TreeViewDelegate<S::Node>> {
        &self.delegate
    }

    /// Replaces the delegate.
    pub fn set_delegate(&mut self, delegate: Arc<dyn TreeViewDelegate<S::Node>>) {
        self.delegate = delegate;
    }

    /// Removes the delegate. Events are ignored afterwards.
    pub fn clear_delegate(&mut self) {
        self.delegate = Arc::new(NoDelegate);
    }

    // =========================================================================
    // Options
    // =========================================================================

    /// Returns the options.
    pub fn options(&self) -> &TreeViewOptions {
        &self.options
    }

    /// Replaces the options.
    pub fn set_options(&mut self, options: TreeViewOptions) {
        self.options = options;
    }

    /// Gets the indentation amount per level.
    pub fn indentation_width(&self) -> f32 {
        self.options.indentation_width
    }

    /// Sets the indentation amount per level.
    pub fn set_indentation_width(&mut self, width: f32) {
        self.options.indentation_width = width;
    }

    /// Returns whether the view is in editing mode.
    pub fn is_editing(&self) -> bool {
        self.options.editing
    }

    /// Enters or leaves editing mode.
    pub fn set_editing(&mut self, editing: bool) {
        if self.options.editing != editing {
            tracing::debug!(target: targets::VIEW, editing, "editing mode changed");
            self.options.editing = editing;
        }
    }

    // =========================================================================
    // Reset
    // =========================================================================

    /// Forgets every materialized row.
    ///
    /// Sections reload lazily from the data source the next time they are
    /// queried, with every node collapsed.
    pub fn reset_tree(&mut self) {
        self.flat.clear();
        self.set_selected(None);
        self.tree_reset.emit(());
    }

    /// Loads the roots of every section the data source reports and asks the
    /// surface to reload.
    pub fn reload_data(&mut self) {
        for section in 0..self.number_of_sections() {
            self.ensure_loaded(section);
        }
        self.tree_reset.emit(());
    }

    // =========================================================================
    // Expand/Collapse/Select
    // =========================================================================

    /// Expands a node.
    ///
    /// Returns `true` if the node is expanded afterwards, including when it
    /// already was. Returns `false` if the node is not expandable or not
    /// displayed in `section`.
    pub fn expand(&mut self, node: &S::Node, section: usize) -> bool {
        self.set_node_expanded(node, section, true)
    }

    /// Collapses a node, removing its whole displayed subtree.
    ///
    /// Returns `true` if the node is collapsed afterwards, including when it
    /// already was. Returns `false` if the node is not expandable or not
    /// displayed in `section`.
    pub fn collapse(&mut self, node: &S::Node, section: usize) -> bool {
        self.set_node_expanded(node, section, false)
    }

    fn set_node_expanded(&mut self, node: &S::Node, section: usize, expanded: bool) -> bool {
        if !node.is_expandable() {
            tracing::debug!(target: targets::VIEW, identifier = node.identifier(), "node is not expandable");
            return false;
        }

        self.ensure_loaded(section);
        let Some(path) = self.flat.path_of(node.identifier(), section) else {
            tracing::debug!(target: targets::VIEW, identifier = node.identifier(), section, "node not displayed");
            return false;
        };

        if self.record_at(path).is_some_and(|record| record.is_expanded() == expanded) {
            return true;
        }

        self.toggle_row(path);
        self.record_at(path)
            .is_some_and(|record| record.is_expanded() == expanded)
    }

    /// Selects a node.
    ///
    /// An expandable node toggles between expanded and collapsed. Any other
    /// node is reported to the delegate through `did_select_node` without
    /// structural changes. Returns `false` if the node is not displayed.
    pub fn select(&mut self, node: &S::Node, section: usize) -> bool {
        self.ensure_loaded(section);
        let Some(path) = self.flat.path_of(node.identifier(), section) else {
            tracing::debug!(target: targets::VIEW, identifier = node.identifier(), section, "cannot select missing node");
            return false;
        };

        self.set_selected(Some(path));
        self.toggle_row(path)
    }

    /// Clears the selection.
    pub fn clear_selection(&mut self) {
        self.set_selected(None);
    }

    /// Returns the selected row.
    pub fn selected_row(&self) -> Option<IndexPath> {
        self.selected_row
    }

    /// Returns the data source node of the selected row.
    pub fn node_for_selected_row(&self) -> Option<S::Node> {
        let source = self.data_source.as_deref()?;
        self.flat.resolve_node(source, self.selected_row?)
    }

    /// Asks the surface to scroll a node into view.
    ///
    /// Returns `false` if the node is not displayed.
    pub fn scroll_to_node(&self, node: &S::Node, section: usize, position: ScrollPosition) -> bool {
        let Some(path) = self.flat.path_of(node.identifier(), section) else {
            return false;
        };
        self.scroll_requested.emit(ScrollRequest { path, position });
        true
    }

    // =========================================================================
    // Insert/Remove
    // =========================================================================

    /// Shows a node the data source has just gained.
    ///
    /// `index` is tree-relative to `parent` (`None` for a root). The data
    /// source must already return the new node at that index.
    ///
    /// Returns [`NodeInsertion::Inserted`] when a row was added, and
    /// [`NodeInsertion::Deferred`] when the parent is collapsed or the
    /// section has not been loaded; the node then shows up once the parent
    /// expands or the section loads. Returns `None` if there is no data
    /// source, the parent is not displayed or cannot have children, or
    /// `index` is out of range.
    pub fn insert_node(&mut self, index: IndexPath, parent: Option<&S::Node>) -> Option<NodeInsertion> {
        let source = self.data_source.clone()?;
        let insertion = match self.flat.insert(&*source, index, parent) {
            Ok(insertion) => insertion,
            Err(err) => {
                tracing::debug!(target: targets::VIEW, %err, ?index, "insert rejected");
                return None;
            }
        };

        if let NodeInsertion::Inserted { row } = insertion {
            let section = index.section();
            let moved = self.shift_selection_for_insert(section, row, 1);
            self.rows_inserted
                .emit(RowsChanged::new(section, row..=row, self.options.row_animation));
            if moved {
                self.selection_changed.emit(self.selected_row);
            }
        }
        Some(insertion)
    }

    /// Removes the first displayed node with `identifier`, together with
    /// its displayed descendants.
    ///
    /// Returns the removed rows (in coordinates from before the removal), or
    /// `None` if no such node is displayed.
    pub fn remove_node(&mut self, identifier: &str, section: usize) -> Option<RangeInclusive<usize>> {
        let removed = match self.flat.remove(identifier, section) {
            Ok(removed) => removed,
            Err(err) => {
                tracing::debug!(target: targets::VIEW, %err, "remove rejected");
                return None;
            }
        };

        let moved = self.shift_selection_for_removal(section, removed.clone());
        self.rows_removed
            .emit(RowsChanged::new(section, removed.clone(), self.options.row_animation));
        if moved {
            self.selection_changed.emit(self.selected_row);
        }
        Some(removed)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Returns the number of sections the data source reports, 0 without one.
    pub fn number_of_sections(&self) -> usize {
        self.data_source
            .as_deref()
            .map_or(0, TreeDataSource::section_count)
    }

    /// Returns the number of displayed rows in a section, 0 if it has not
    /// been loaded.
    pub fn total_rows(&self, section: usize) -> usize {
        self.flat.total_rows(section)
    }

    /// Returns the number of displayed children of `parent` (roots for
    /// `None`). A collapsed or missing parent has none.
    pub fn visible_children_count(&self, parent: Option<&S::Node>, section: usize) -> usize {
        let Some(flat) = self.flat.section(section) else {
            return 0;
        };
        match parent {
            None => flat.visible_children_count(None),
            Some(parent) => flat
                .row_of(parent.identifier())
                .map_or(0, |row| flat.visible_children_count(Some(row))),
        }
    }

    /// Returns whether a node is displayed expanded.
    pub fn is_expanded(&self, node: &S::Node, section: usize) -> bool {
        node.is_expandable()
            && self
                .flat
                .path_of(node.identifier(), section)
                .and_then(|path| self.record_at(path))
                .is_some_and(NodeRecord::is_expanded)
    }

    /// Returns the absolute path of a displayed node.
    pub fn index_path_of(&self, node: &S::Node, section: usize) -> Option<IndexPath> {
        self.index_path_of_identifier(node.identifier(), section)
    }

    /// Returns the absolute path of the first displayed node with
    /// `identifier`.
    pub fn index_path_of_identifier(&self, identifier: &str, section: usize) -> Option<IndexPath> {
        self.flat.path_of(identifier, section)
    }

    /// Returns the displayed records of a section, empty if it has not been
    /// loaded.
    pub fn records(&self, section: usize) -> &[NodeRecord] {
        self.flat
            .section(section)
            .map(|flat| flat.records())
            .unwrap_or(&[])
    }

    /// Renders a section's rows as an indented tree for diagnostics.
    pub fn debug_section(&self, section: usize, options: &TreeFormatOptions) -> String {
        let rows = self.records(section).iter().map(|record| {
            let row = DebugRow::new(record.indentation_level(), record.identifier());
            if record.is_expandable() {
                row.expanded(record.is_expanded())
            } else {
                row
            }
        });
        FlatTreeDebug::with_options(options.clone()).format_rows(rows)
    }

    // =========================================================================
    // Presentation Surface
    // =========================================================================

    /// Returns the number of rows in a section, loading its roots on first
    /// use.
    pub fn row_count(&mut self, section: usize) -> usize {
        self.ensure_loaded(section);
        self.flat.total_rows(section)
    }

    /// Returns the content of a row with its indentation.
    ///
    /// Returns `None` if the row is not displayed or there is no data source.
    pub fn cell_for_row(&self, path: IndexPath) -> Option<TreeCell<S::Cell>> {
        let source = self.data_source.as_deref()?;
        let record = self.record_at(path)?;
        let context = self.row_context(path)?;
        let level = record.indentation_level();

        Some(TreeCell {
            content: source.cell_for_node(context.index, context.parent.as_ref(), context.is_expanded),
            indentation_level: level,
            indentation: level as f32 * self.options.indentation_width,
        })
    }

    /// Returns the height of a row: the delegate's choice, or the default
    /// row height.
    pub fn height_for_row(&self, path: IndexPath) -> f32 {
        self.row_context(path)
            .and_then(|context| {
                self.delegate
                    .height_for_node(context.index, context.parent.as_ref())
            })
            .unwrap_or(self.options.row_height)
    }

    /// Returns whether a row may be deleted, as decided by the delegate.
    pub fn can_edit_row(&self, path: IndexPath) -> bool {
        self.row_context(path).is_some_and(|context| {
            self.delegate
                .can_edit_node(context.index, context.parent.as_ref())
        })
    }

    /// Forwards a confirmed delete gesture to the delegate.
    ///
    /// The delegate updates its data; the caller then removes the row with
    /// [`remove_node`](Self::remove_node). Returns `false` if the row is not
    /// displayed.
    pub fn commit_delete_row(&self, path: IndexPath) -> bool {
        let Some(context) = self.row_context(path) else {
            return false;
        };
        self.delegate
            .commit_delete(context.index, context.parent.as_ref());
        true
    }

    /// Handles a tap on a row.
    ///
    /// Selects the row, then toggles it if it is expandable. Taps are ignored
    /// while editing unless selection during editing is allowed. Returns
    /// whether the tap was handled.
    pub fn did_select_row(&mut self, path: IndexPath) -> bool {
        if self.options.editing && !self.options.allows_selection_during_editing {
            return false;
        }
        if self.record_at(path).is_none() {
            return false;
        }
        self.set_selected(Some(path));
        self.toggle_row(path)
    }

    // =========================================================================
    // Internal
    // =========================================================================

    fn ensure_loaded(&mut self, section: usize) -> bool {
        let Some(source) = self.data_source.as_deref() else {
            return false;
        };
        if section >= source.section_count() {
            return false;
        }
        self.flat.load_roots(source, section);
        true
    }

    fn record_at(&self, path: IndexPath) -> Option<&NodeRecord> {
        self.flat.record(path)
    }

    fn row_context(&self, path: IndexPath) -> Option<RowContext<S::Node>> {
        let source = self.data_source.as_deref()?;
        let record = self.record_at(path)?;
        Some(RowContext {
            index: self.flat.tree_index(path)?,
            parent: self.flat.resolve_parent(source, path)?,
            is_expandable: record.is_expandable(),
            is_expanded: record.is_expanded(),
        })
    }

    /// Expands or collapses the row, or reports a plain selection for rows
    /// that cannot expand.
    fn toggle_row(&mut self, path: IndexPath) -> bool {
        let Some(source) = self.data_source.clone() else {
            return false;
        };
        let Some(context) = self.row_context(path) else {
            return false;
        };

        if !context.is_expandable {
            self.delegate
                .did_select_node(context.index, context.parent.as_ref());
            return true;
        }

        let section = path.section();
        let animation = self.options.row_animation;

        if context.is_expanded {
            let removed = match self.flat.collapse(path) {
                Ok(removed) => removed,
                Err(err) => {
                    tracing::debug!(target: targets::VIEW, %err, "collapse failed");
                    return false;
                }
            };
            let moved = removed
                .clone()
                .is_some_and(|rows| self.shift_selection_for_removal(section, rows));

            self.rows_reloaded.emit(path);
            if let Some(rows) = removed {
                self.rows_removed.emit(RowsChanged::new(section, rows, animation));
            }
            if moved {
                self.selection_changed.emit(self.selected_row);
            }
            self.delegate
                .did_collapse_node(context.index, context.parent.as_ref());
        } else {
            let inserted = match self.flat.expand(&*source, path) {
                Ok(inserted) => inserted,
                Err(err) => {
                    tracing::debug!(target: targets::VIEW, %err, "expand failed");
                    return false;
                }
            };
            let moved = inserted.clone().is_some_and(|rows| {
                let count = rows.clone().count();
                self.shift_selection_for_insert(section, *rows.start(), count)
            });

            self.rows_reloaded.emit(path);
            if let Some(rows) = inserted {
                self.rows_inserted.emit(RowsChanged::new(section, rows, animation));
            }
            if moved {
                self.selection_changed.emit(self.selected_row);
            }
            self.delegate
                .did_expand_node(context.index, context.parent.as_ref());
        }
        true
    }

    fn set_selected(&mut self, selected: Option<IndexPath>) {
        if self.selected_row != selected {
            self.selected_row = selected;
            self.selection_changed.emit(selected);
        }
    }

    /// Moves the selection down past rows inserted at or before it.
    fn shift_selection_for_insert(&mut self, section: usize, first: usize, count: usize) -> bool {
        match self.selected_row {
            Some(selected) if selected.section() == section && selected.row() >= first => {
                self.selected_row = Some(selected.with_row(selected.row() + count));
                true
            }
            _ => false,
        }
    }

    /// Moves the selection up past removed rows, or clears it when its own
    /// row went away.
    fn shift_selection_for_removal(&mut self, section: usize, rows: RangeInclusive<usize>) -> bool {
        let Some(selected) = self.selected_row.filter(|s| s.section() == section) else {
            return false;
        };
        if rows.contains(&selected.row()) {
            self.selected_row = None;
            true
        } else if selected.row() > *rows.end() {
            let count = rows.end() - rows.start() + 1;
            self.selected_row = Some(selected.with_row(selected.row() - count));
            true
        } else {
            false
        }
    }
}
