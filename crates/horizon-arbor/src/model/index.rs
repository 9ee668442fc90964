//! Index paths for addressing rows and tree positions.
//!
//! An [`IndexPath`] is a `(section, row)` pair. The same type carries two
//! different coordinate systems, and every API says which one it expects:
//!
//! - **Absolute**: the row's position in the section's flattened list, the
//!   coordinate the presentation surface works in.
//! - **Tree-relative**: the position among the children of one parent (or
//!   among the roots of the section), the coordinate the data source works in.

use std::fmt;

/// A position within a sectioned list.
///
/// Index paths order by section first, then by row.
///
/// # Example
///
/// ```
/// use horizon_arbor::model::IndexPath;
///
/// let path = IndexPath::new(3, 0);
/// assert_eq!(path.row(), 3);
/// assert_eq!(path.section(), 0);
/// assert_eq!(path.with_row(4), IndexPath::new(4, 0));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct IndexPath {
    // Field order drives the derived ordering.
    section: usize,
    row: usize,
}

impl IndexPath {
    /// Creates an index path for `row` in `section`.
    #[inline]
    pub const fn new(row: usize, section: usize) -> Self {
        Self { section, row }
    }

    /// Returns the row.
    #[inline]
    pub const fn row(&self) -> usize {
        self.row
    }

    /// Returns the section.
    #[inline]
    pub const fn section(&self) -> usize {
        self.section
    }

    /// Returns a path in the same section at a different row.
    #[inline]
    pub const fn with_row(&self, row: usize) -> Self {
        Self::new(row, self.section)
    }

    /// Returns a path with the row moved by `delta`, or `None` on underflow.
    pub fn offset(&self, delta: isize) -> Option<Self> {
        self.row
            .checked_add_signed(delta)
            .map(|row| self.with_row(row))
    }
}

impl fmt::Debug for IndexPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IndexPath({}:{})", self.section, self.row)
    }
}

impl From<(usize, usize)> for IndexPath {
    /// Converts a `(row, section)` pair.
    fn from((row, section): (usize, usize)) -> Self {
        Self::new(row, section)
    }
}
