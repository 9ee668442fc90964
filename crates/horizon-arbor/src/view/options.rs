//! Tree view configuration.

use serde::{Deserialize, Serialize};

use horizon_arbor_core::Result;

/// How inserted and removed rows should be animated by the presentation
/// surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowAnimation {
    /// Rows fade in or out.
    Fade,
    /// Rows slide in from or out to the right.
    #[default]
    Right,
    /// Rows slide in from or out to the left.
    Left,
    /// Rows slide in from or out to the top.
    Top,
    /// Rows slide in from or out to the bottom.
    Bottom,
    /// Rows appear or disappear without animation.
    None,
    /// Rows expand from or collapse to the middle.
    Middle,
    /// The surface picks a suitable animation.
    Automatic,
}

/// Options controlling how a tree view lays out and reports rows.
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```
/// use horizon_arbor::view::{RowAnimation, TreeViewOptions};
///
/// let options = TreeViewOptions::from_json(r#"{ "indentation_width": 16.0 }"#).unwrap();
/// assert_eq!(options.indentation_width, 16.0);
/// assert_eq!(options.row_animation, RowAnimation::Right);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeViewOptions {
    /// Horizontal offset per indentation level.
    pub indentation_width: f32,
    /// Row height used when the delegate does not supply one.
    pub row_height: f32,
    /// Animation attached to structural change events.
    pub row_animation: RowAnimation,
    /// Whether the view starts in editing mode.
    pub editing: bool,
    /// Whether rows can still be selected while editing.
    pub allows_selection_during_editing: bool,
}

impl Default for TreeViewOptions {
    fn default() -> Self {
        Self {
            indentation_width: 10.0,
            row_height: 44.0,
            row_animation: RowAnimation::Right,
            editing: false,
            allows_selection_during_editing: false,
        }
    }
}

impl TreeViewOptions {
    /// Creates the default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses options from a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes the options to a JSON document.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Set the indentation width.
    pub fn with_indentation_width(mut self, width: f32) -> Self {
        self.indentation_width = width;
        self
    }

    /// Set the default row height.
    pub fn with_row_height(mut self, height: f32) -> Self {
        self.row_height = height;
        self
    }

    /// Set the row animation.
    pub fn with_row_animation(mut self, animation: RowAnimation) -> Self {
        self.row_animation = animation;
        self
    }

    /// Set whether the view starts in editing mode.
    pub fn with_editing(mut self, editing: bool) -> Self {
        self.editing = editing;
        self
    }

    /// Set whether rows can be selected while editing.
    pub fn with_selection_during_editing(mut self, allowed: bool) -> Self {
        self.allows_selection_during_editing = allowed;
        self
    }
}
