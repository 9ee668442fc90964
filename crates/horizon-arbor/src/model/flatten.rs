//! The flattening engine.
//!
//! [`FlatTree`] keeps, per section, the ordered list of [`NodeRecord`]s that
//! are currently visible. Each list is the pre-order flattening of the
//! expanded part of the tree:
//!
//! - an expanded record is immediately followed by its children, one level
//!   deeper, each child followed by its own expanded descendants;
//! - a collapsed record has no descendants in the list at all.
//!
//! Structural changes only ever insert or remove one contiguous run of rows,
//! and every operation reports that run so a view can update incrementally.
//!
//! ```text
//! row  level  record
//!  0     0    Documents   (expanded)
//!  1     1      Reports   (expanded)
//!  2     2        q1.pdf
//!  3     2        q2.pdf
//!  4     1      notes.txt
//!  5     0    Pictures    (collapsed)
//! ```
//!
//! Collapsing `Documents` removes rows `1..=4` in one pass: every record
//! after it with a deeper level belongs to its subtree.

use std::collections::HashMap;
use std::ops::RangeInclusive;

use horizon_arbor_core::logging::{span_names, targets};
use horizon_arbor_core::{ArborError, PerfSpan, Result, provider_contract_violation};

use super::index::IndexPath;
use super::node::{NodeRecord, TreeNode};
use super::traits::TreeDataSource;

/// Outcome of inserting a node through [`FlatTree::insert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeInsertion {
    /// A record was inserted at this absolute row.
    Inserted {
        /// The absolute row of the new record.
        row: usize,
    },
    /// The node is not visible yet: its parent is collapsed or its section
    /// has not been loaded. It is picked up from the data source when the
    /// parent expands or the section loads.
    Deferred,
}

/// The visible rows of one section.
#[derive(Debug, Clone, Default)]
pub struct FlatSection {
    records: Vec<NodeRecord>,
}

impl FlatSection {
    /// Returns the visible records in row order.
    pub fn records(&self) -> &[NodeRecord] {
        &self.records
    }

    /// Returns the number of visible rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the section shows no rows.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the record at an absolute row.
    pub fn get(&self, row: usize) -> Option<&NodeRecord> {
        self.records.get(row)
    }

    /// Returns the first row whose record has `identifier`.
    pub fn row_of(&self, identifier: &str) -> Option<usize> {
        self.records
            .iter()
            .position(|record| record.identifier() == identifier)
    }

    /// Returns the row of the record's parent, `None` for roots.
    ///
    /// The parent is the nearest preceding row with a lower level.
    pub fn parent_row(&self, row: usize) -> Option<usize> {
        let level = self.records.get(row)?.indentation_level();
        self.records[..row]
            .iter()
            .rposition(|record| record.indentation_level() < level)
    }

    /// Returns the record's position among its siblings.
    ///
    /// This is the tree-relative row a data source understands, as opposed
    /// to the absolute row in the flattened list.
    pub fn index_in_parent(&self, row: usize) -> Option<usize> {
        let level = self.records.get(row)?.indentation_level();
        let start = self.parent_row(row).map_or(0, |parent| parent + 1);
        Some(
            self.records[start..row]
                .iter()
                .filter(|record| record.indentation_level() == level)
                .count(),
        )
    }

    /// Returns the exclusive end of the record's materialized subtree.
    pub fn subtree_end(&self, row: usize) -> usize {
        let Some(record) = self.records.get(row) else {
            return row;
        };
        let level = record.indentation_level();
        self.records[row + 1..]
            .iter()
            .position(|next| next.indentation_level() <= level)
            .map_or(self.records.len(), |offset| row + 1 + offset)
    }

    /// Returns the number of visible children under `parent_row`, or the
    /// number of roots when `parent_row` is `None`.
    pub fn visible_children_count(&self, parent_row: Option<usize>) -> usize {
        match parent_row {
            None => self
                .records
                .iter()
                .filter(|record| record.indentation_level() == 0)
                .count(),
            Some(parent) => {
                let Some(record) = self.records.get(parent) else {
                    return 0;
                };
                if !record.is_expanded() {
                    return 0;
                }
                let child_level = record.indentation_level() + 1;
                self.records[parent + 1..self.subtree_end(parent)]
                    .iter()
                    .filter(|record| record.indentation_level() == child_level)
                    .count()
            }
        }
    }

    /// Translates a tree-relative index under `parent_row` into the absolute
    /// row a new record must be inserted at.
    ///
    /// Walks forward from the first row after the parent (or the section
    /// start), counting only records at the children's level. Deeper rows
    /// belong to expanded siblings and are stepped over without counting.
    /// Returns `None` when `index` is past the end of the visible children.
    pub fn insertion_row(&self, parent_row: Option<usize>, index: usize) -> Option<usize> {
        let (start, level) = match parent_row {
            Some(parent) => (parent + 1, self.records.get(parent)?.indentation_level() + 1),
            None => (0, 0),
        };

        let mut skipped = 0;
        let mut row = start;
        while let Some(record) = self.records.get(row) {
            let current = record.indentation_level();
            if current < level {
                break;
            }
            if current == level {
                if skipped == index {
                    return Some(row);
                }
                skipped += 1;
            }
            row += 1;
        }

        (skipped == index).then_some(row)
    }

    /// Removes the materialized descendants of an expanded record.
    fn collapse(&mut self, row: usize) -> Option<RangeInclusive<usize>> {
        let record = self.records.get_mut(row)?;
        if !record.is_expanded() {
            return None;
        }
        record.set_expanded(false);

        let end = self.subtree_end(row);
        if end == row + 1 {
            return None;
        }
        self.records.drain(row + 1..end);
        Some(row + 1..=end - 1)
    }
}

/// Per-section flattened rows of a lazily loaded tree.
#[derive(Debug, Default)]
pub struct FlatTree {
    sections: HashMap<usize, FlatSection>,
}

impl FlatTree {
    /// Creates an engine with no sections loaded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every loaded section. Sections reload lazily afterwards.
    pub fn clear(&mut self) {
        tracing::debug!(target: targets::FLATTEN, sections = self.sections.len(), "clearing flattened tree");
        self.sections.clear();
    }

    /// Returns `true` if the section's roots have been loaded.
    pub fn is_loaded(&self, section: usize) -> bool {
        self.sections.contains_key(&section)
    }

    /// Returns a loaded section.
    pub fn section(&self, section: usize) -> Option<&FlatSection> {
        self.sections.get(&section)
    }

    /// Returns the number of visible rows in a section, 0 if it is not loaded.
    pub fn total_rows(&self, section: usize) -> usize {
        self.sections.get(&section).map_or(0, FlatSection::len)
    }

    /// Returns the record at an absolute path.
    pub fn record(&self, path: IndexPath) -> Option<&NodeRecord> {
        self.sections.get(&path.section())?.get(path.row())
    }

    /// Returns the absolute path of the first record with `identifier`.
    pub fn path_of(&self, identifier: &str, section: usize) -> Option<IndexPath> {
        let row = self.sections.get(&section)?.row_of(identifier)?;
        Some(IndexPath::new(row, section))
    }

    /// Returns the tree-relative index of the record at an absolute path.
    pub fn tree_index(&self, path: IndexPath) -> Option<IndexPath> {
        let row = self
            .sections
            .get(&path.section())?
            .index_in_parent(path.row())?;
        Some(path.with_row(row))
    }

    /// Loads the roots of `section` from the data source.
    ///
    /// Does nothing if the section is already loaded. Returns the number of
    /// visible rows in the section.
    pub fn load_roots<S>(&mut self, source: &S, section: usize) -> usize
    where
        S: TreeDataSource + ?Sized,
    {
        if let Some(loaded) = self.sections.get(&section) {
            return loaded.len();
        }

        let _span = PerfSpan::new(span_names::LOAD_ROOTS);
        let count = source.child_count(section, None);
        let records = (0..count)
            .map(|row| {
                let node = source
                    .node_at(IndexPath::new(row, section), None)
                    .unwrap_or_else(|| {
                        provider_contract_violation(format_args!(
                            "root {row} of section {section} missing ({count} reported)"
                        ))
                    });
                NodeRecord::root(&node)
            })
            .collect();

        tracing::debug!(target: targets::FLATTEN, section, roots = count, "loaded section roots");
        self.sections.insert(section, FlatSection { records });
        count
    }

    /// Re-resolves the full data source node shown at an absolute path.
    ///
    /// Walks up through the parent rows and asks the data source for each
    /// level by its tree-relative index.
    ///
    /// # Panics
    ///
    /// Panics if the data source no longer returns a node the view is
    /// displaying, which means it changed without notifying the view.
    pub fn resolve_node<S>(&self, source: &S, path: IndexPath) -> Option<S::Node>
    where
        S: TreeDataSource + ?Sized,
    {
        let section = self.sections.get(&path.section())?;
        let index = section.index_in_parent(path.row())?;
        let parent = self.resolve_parent(source, path)?;
        let node = source
            .node_at(path.with_row(index), parent.as_ref())
            .unwrap_or_else(|| {
                provider_contract_violation(format_args!(
                    "node {index} under {:?} missing for displayed row {path:?}",
                    parent.as_ref().map(TreeNode::identifier)
                ))
            });
        Some(node)
    }

    /// Re-resolves the parent node of the record at an absolute path.
    ///
    /// Returns `Some(None)` for roots and `None` if the path is not loaded.
    pub fn resolve_parent<S>(&self, source: &S, path: IndexPath) -> Option<Option<S::Node>>
    where
        S: TreeDataSource + ?Sized,
    {
        let section = self.sections.get(&path.section())?;
        section.get(path.row())?;
        match section.parent_row(path.row()) {
            None => Some(None),
            Some(parent_row) => self.resolve_node(source, path.with_row(parent_row)).map(Some),
        }
    }

    /// Expands the record at an absolute path.
    ///
    /// Inserts one record per child reported by the data source right after
    /// the expanded record and returns the inserted rows. Returns `Ok(None)`
    /// when the record was already expanded or has no children; in the
    /// latter case the record still becomes expanded.
    #[tracing::instrument(skip(self, source), target = "horizon_arbor::flatten", level = "trace")]
    pub fn expand<S>(&mut self, source: &S, path: IndexPath) -> Result<Option<RangeInclusive<usize>>>
    where
        S: TreeDataSource + ?Sized,
    {
        let section = path.section();
        let row = path.row();
        let flat = self
            .sections
            .get(&section)
            .ok_or(ArborError::SectionNotLoaded(section))?;
        let record = flat.get(row).ok_or(ArborError::IndexOutOfRange {
            index: row,
            count: flat.len(),
        })?;

        if !record.is_expandable() {
            return Err(ArborError::not_expandable(record.identifier()));
        }
        if record.is_expanded() {
            return Ok(None);
        }

        let _span = PerfSpan::new(span_names::EXPAND);
        let level = record.indentation_level();
        let Some(node) = self.resolve_node(source, path) else {
            return Err(ArborError::node_not_found(record.identifier(), section));
        };

        let count = source.child_count(section, Some(&node));
        let children: Vec<NodeRecord> = (0..count)
            .map(|index| {
                let child = source
                    .node_at(IndexPath::new(index, section), Some(&node))
                    .unwrap_or_else(|| {
                        provider_contract_violation(format_args!(
                            "child {index} of '{}' missing ({count} reported)",
                            node.identifier()
                        ))
                    });
                NodeRecord::child(&child, &node, level)
            })
            .collect();

        let flat = self
            .sections
            .get_mut(&section)
            .ok_or(ArborError::SectionNotLoaded(section))?;
        flat.records.splice(row + 1..row + 1, children);
        flat.records[row].set_expanded(true);

        tracing::debug!(target: targets::FLATTEN, section, row, children = count, "expanded node");
        Ok((count > 0).then(|| row + 1..=row + count))
    }

    /// Collapses the record at an absolute path.
    ///
    /// Removes its whole materialized subtree and returns the removed rows.
    /// Returns `Ok(None)` when the record was not expanded or had nothing to
    /// remove.
    #[tracing::instrument(skip(self), target = "horizon_arbor::flatten", level = "trace")]
    pub fn collapse(&mut self, path: IndexPath) -> Result<Option<RangeInclusive<usize>>> {
        let section = path.section();
        let flat = self
            .sections
            .get_mut(&section)
            .ok_or(ArborError::SectionNotLoaded(section))?;
        if path.row() >= flat.len() {
            return Err(ArborError::IndexOutOfRange {
                index: path.row(),
                count: flat.len(),
            });
        }

        let _span = PerfSpan::new(span_names::COLLAPSE);
        let removed = flat.collapse(path.row());
        tracing::debug!(
            target: targets::FLATTEN,
            section,
            row = path.row(),
            removed = removed.as_ref().map_or(0, |range| range.clone().count()),
            "collapsed node"
        );
        Ok(removed)
    }

    /// Inserts the data source's node at a tree-relative `index` under
    /// `parent` (`None` for the section's roots).
    ///
    /// The data source must already contain the new node. When the parent
    /// is collapsed, or the section has not been loaded, nothing changes in
    /// the flattened rows and [`NodeInsertion::Deferred`] is returned.
    pub fn insert<S>(
        &mut self,
        source: &S,
        index: IndexPath,
        parent: Option<&S::Node>,
    ) -> Result<NodeInsertion>
    where
        S: TreeDataSource + ?Sized,
    {
        let section = index.section();
        if let Some(parent) = parent
            && !parent.is_expandable()
        {
            return Err(ArborError::ParentNotExpandable {
                identifier: parent.identifier().to_owned(),
            });
        }

        let count = source.child_count(section, parent);
        if index.row() >= count {
            return Err(ArborError::IndexOutOfRange {
                index: index.row(),
                count,
            });
        }

        let Some(flat) = self.sections.get_mut(&section) else {
            return Ok(NodeInsertion::Deferred);
        };

        let (parent_row, parent_level) = match parent {
            None => (None, 0),
            Some(parent) => {
                let parent_row = flat
                    .row_of(parent.identifier())
                    .ok_or_else(|| ArborError::node_not_found(parent.identifier(), section))?;
                let record = &flat.records[parent_row];
                if !record.is_expanded() {
                    return Ok(NodeInsertion::Deferred);
                }
                (Some(parent_row), record.indentation_level())
            }
        };

        let row = flat
            .insertion_row(parent_row, index.row())
            .ok_or(ArborError::IndexOutOfRange {
                index: index.row(),
                count: flat.visible_children_count(parent_row) + 1,
            })?;

        let node = source.node_at(index, parent).unwrap_or_else(|| {
            provider_contract_violation(format_args!("inserted node {index:?} missing"))
        });
        let record = match parent {
            Some(parent) => NodeRecord::child(&node, parent, parent_level),
            None => NodeRecord::root(&node),
        };
        flat.records.insert(row, record);

        tracing::debug!(target: targets::FLATTEN, section, row, identifier = node.identifier(), "inserted node");
        Ok(NodeInsertion::Inserted { row })
    }

    /// Removes the first record with `identifier` together with its
    /// materialized descendants.
    ///
    /// Returns every removed row, the record's own row first, in the
    /// coordinates from before the removal.
    pub fn remove(&mut self, identifier: &str, section: usize) -> Result<RangeInclusive<usize>> {
        let flat = self
            .sections
            .get_mut(&section)
            .ok_or(ArborError::SectionNotLoaded(section))?;
        let row = flat
            .row_of(identifier)
            .ok_or_else(|| ArborError::node_not_found(identifier, section))?;

        let descendants = flat.collapse(row).map_or(0, |range| range.count());
        flat.records.remove(row);

        tracing::debug!(target: targets::FLATTEN, section, row, descendants, identifier, "removed node");
        Ok(row..=row + descendants)
    }
}
