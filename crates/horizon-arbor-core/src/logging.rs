//! Logging and debugging facilities for Horizon Arbor.
//!
//! This module provides:
//! - Target names for filtering the `tracing` output of each subsystem
//! - Debug visualization of flattened trees
//! - A performance span guard for timing expensive operations
//!
//! # Tracing Integration
//!
//! Horizon Arbor uses the `tracing` crate for instrumentation. To see logs,
//! install a subscriber in your application:
//!
//! ```
//! tracing_subscriber::fmt()
//!     .with_env_filter("horizon_arbor::flatten=debug")
//!     .init();
//! ```
//!
//! # Debug Visualization
//!
//! ```
//! use horizon_arbor_core::logging::{DebugRow, FlatTreeDebug, TreeFormatOptions};
//!
//! let rows = [
//!     DebugRow::new(0, "Documents").expanded(true),
//!     DebugRow::new(1, "notes.txt"),
//!     DebugRow::new(0, "Pictures").expanded(false),
//! ];
//! let text = FlatTreeDebug::with_options(TreeFormatOptions::minimal()).format_rows(rows);
//! assert!(text.contains("notes.txt"));
//! ```

use std::fmt::Write as FmtWrite;

/// Span names used throughout Horizon Arbor for tracing.
pub mod span_names {
    /// Lazy root loading span.
    pub const LOAD_ROOTS: &str = "horizon_arbor::load_roots";
    /// Expansion span.
    pub const EXPAND: &str = "horizon_arbor::expand";
    /// Collapse span.
    pub const COLLAPSE: &str = "horizon_arbor::collapse";
}

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core crate target.
    pub const CORE: &str = "horizon_arbor_core";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "horizon_arbor_core::signal";
    /// Flattening engine target.
    pub const FLATTEN: &str = "horizon_arbor::flatten";
    /// Tree view mutation API target.
    pub const VIEW: &str = "horizon_arbor::view";
    /// In-memory tree store target.
    pub const STORE: &str = "horizon_arbor::store";
}

/// Style options for tree visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
    /// Compact representation with dashes.
    Compact,
}

/// Configuration for flattened tree debug output.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    /// The style of tree visualization.
    pub style: TreeStyle,
    /// Whether to show each row's absolute position.
    pub show_rows: bool,
    /// Whether to mark expandable rows with their expansion state.
    pub show_state: bool,
    /// Maximum depth to print (None for unlimited).
    pub max_depth: Option<usize>,
    /// Indent size for each level.
    pub indent_size: usize,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_rows: true,
            show_state: true,
            max_depth: None,
            indent_size: 2,
        }
    }
}

impl TreeFormatOptions {
    /// Create options for minimal output.
    pub fn minimal() -> Self {
        Self {
            show_rows: false,
            show_state: false,
            ..Default::default()
        }
    }

    /// Sets the visualization style.
    pub fn with_style(mut self, style: TreeStyle) -> Self {
        self.style = style;
        self
    }
}

/// One row of a flattened tree, as seen by [`FlatTreeDebug`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebugRow<'a> {
    /// Indentation level of the row.
    pub depth: usize,
    /// Text printed for the row.
    pub label: &'a str,
    /// `Some(expanded)` for expandable rows, `None` for leaves.
    pub expanded: Option<bool>,
}

impl<'a> DebugRow<'a> {
    /// Creates a leaf row.
    pub fn new(depth: usize, label: &'a str) -> Self {
        Self {
            depth,
            label,
            expanded: None,
        }
    }

    /// Marks the row as expandable with the given state.
    pub fn expanded(mut self, expanded: bool) -> Self {
        self.expanded = Some(expanded);
        self
    }
}

/// Debug utility for visualizing flattened trees.
///
/// Rows are expected in pre-order, the way a tree view lays them out.
#[derive(Debug, Clone, Default)]
pub struct FlatTreeDebug {
    options: TreeFormatOptions,
}

impl FlatTreeDebug {
    /// Create a new debug visualizer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a debug visualizer with custom options.
    pub fn with_options(options: TreeFormatOptions) -> Self {
        Self { options }
    }

    /// Format pre-ordered rows, one line per row.
    pub fn format_rows<'a>(&self, rows: impl IntoIterator<Item = DebugRow<'a>>) -> String {
        let rows: Vec<DebugRow<'a>> = rows.into_iter().collect();
        let mut output = String::new();

        if rows.is_empty() {
            output.push_str("(empty)\n");
            return output;
        }

        for (position, row) in rows.iter().enumerate() {
            if self.options.max_depth.is_some_and(|max| row.depth > max) {
                continue;
            }

            output.push_str(&self.build_prefix(row.depth, is_last_sibling(&rows, position)));
            output.push_str(row.label);

            if self.options.show_state {
                match row.expanded {
                    Some(true) => output.push_str(" [-]"),
                    Some(false) => output.push_str(" [+]"),
                    None => {}
                }
            }
            if self.options.show_rows {
                let _ = write!(output, " #{position}");
            }
            output.push('\n');
        }

        output
    }

    /// Build the prefix string for a row.
    fn build_prefix(&self, depth: usize, is_last: bool) -> String {
        if depth == 0 {
            return String::new();
        }

        let (branch, corner, last) = match self.options.style {
            TreeStyle::Ascii => ("|", "+--", "`--"),
            TreeStyle::Unicode => (
                "\u{2502}",
                "\u{251c}\u{2500}\u{2500}",
                "\u{2514}\u{2500}\u{2500}",
            ),
            TreeStyle::Compact => ("", "-", "-"),
        };

        let mut prefix = String::new();
        for _ in 0..(depth - 1) {
            prefix.push_str(branch);
            for _ in 0..self.options.indent_size {
                prefix.push(' ');
            }
        }
        prefix.push_str(if is_last { last } else { corner });
        prefix.push(' ');
        prefix
    }
}

/// A row is its parent's last child when no later sibling follows before the
/// parent's subtree ends.
fn is_last_sibling(rows: &[DebugRow<'_>], position: usize) -> bool {
    let depth = rows[position].depth;
    rows[position + 1..]
        .iter()
        .find(|row| row.depth <= depth)
        .is_none_or(|row| row.depth < depth)
}

/// A guard that keeps a tracing span entered until it is dropped.
///
/// This is useful for tracking the duration of operations.
#[derive(Debug)]
pub struct PerfSpan {
    _span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::debug_span!(target: "horizon_arbor::perf", "perf", operation = name);
        Self {
            _span: span.entered(),
        }
    }
}
