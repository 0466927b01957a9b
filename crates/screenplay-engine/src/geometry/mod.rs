//! Screen geometry shared by the anchor resolver, the popup placement rules
//! and the frontends.
//!
//! Frontends expose their live layout through [`CaretGeometry`] and accept
//! focus requests through [`FocusTarget`]. Tests implement both with
//! synthetic numbers.

pub mod anchor;
pub mod placement;

use serde::{Deserialize, Serialize};

use crate::editing::document::BlockId;

pub use anchor::{AnchorSettings, resolve_anchor};
pub use placement::{PlacementSettings, place_popup};

/// Screen-space rectangle with the same fields as a DOM `DOMRect`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AnchorRect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub width: f64,
    pub height: f64,
    pub x: f64,
    pub y: f64,
}

impl AnchorRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            left: x,
            top: y,
            right: x + width,
            bottom: y + height,
            width,
            height,
            x,
            y,
        }
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    pub fn has_area(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    /// All coordinates zero, what browsers report for a caret they cannot lay out
    pub fn is_zero_at_origin(&self) -> bool {
        self.left == 0.0 && self.top == 0.0 && self.width == 0.0 && self.height == 0.0
    }

    /// Euclidean distance from this rectangle's top-left corner to `other`,
    /// zero when the corner lies inside it
    pub fn distance_to(&self, other: &AnchorRect) -> f64 {
        let dx = (other.left - self.left).max(0.0).max(self.left - other.right);
        let dy = (other.top - self.top).max(0.0).max(self.top - other.bottom);
        (dx * dx + dy * dy).sqrt()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Caret position as reported by the current text selection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Caret {
    pub rect: AnchorRect,
    /// Character offset of the caret inside the focused block
    pub offset: usize,
    pub collapsed: bool,
}

/// Read access to the layout of the editing surface
pub trait CaretGeometry {
    /// Bounding box of the block's editable element, if it is mounted
    fn element_rect(&self, block: BlockId) -> Option<AnchorRect>;

    /// Current caret, if the selection sits inside `block`
    fn caret(&self, block: BlockId) -> Option<Caret>;

    /// Bounding box of the character right before `offset`
    fn preceding_char_rect(&self, block: BlockId, offset: usize) -> Option<AnchorRect>;

    /// Rendered line height of the block, when the surface knows it
    fn line_height(&self, _block: BlockId) -> Option<f64> {
        None
    }
}

/// Write access for the two-step focus transfer
pub trait FocusTarget {
    /// Give input focus to the block's element. False when it is not mounted.
    fn focus_block(&mut self, block: BlockId) -> bool;

    /// Collapse the caret to `offset` characters into the block
    fn set_cursor(&mut self, block: BlockId, offset: usize) -> bool;
}

/// Layout of one block captured at a single instant.
///
/// Frontends that measure asynchronously (a script round trip) or cheaply
/// (terminal cells) capture everything the resolver may ask for up front and
/// hand this snapshot to the controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometrySample {
    pub block: BlockId,
    pub element: Option<AnchorRect>,
    pub caret: Option<Caret>,
    /// Rect of the character before the caret, if the caret is past offset zero
    pub preceding_char: Option<AnchorRect>,
    pub line_height: Option<f64>,
}

impl GeometrySample {
    /// A sample for a block that is not laid out
    pub fn unmounted(block: BlockId) -> Self {
        Self {
            block,
            element: None,
            caret: None,
            preceding_char: None,
            line_height: None,
        }
    }
}

impl CaretGeometry for GeometrySample {
    fn element_rect(&self, block: BlockId) -> Option<AnchorRect> {
        (block == self.block).then_some(self.element).flatten()
    }

    fn caret(&self, block: BlockId) -> Option<Caret> {
        (block == self.block).then_some(self.caret).flatten()
    }

    fn preceding_char_rect(&self, block: BlockId, offset: usize) -> Option<AnchorRect> {
        let caret = self.caret(block)?;
        if offset == 0 || caret.offset != offset {
            return None;
        }
        self.preceding_char
    }

    fn line_height(&self, block: BlockId) -> Option<f64> {
        (block == self.block).then_some(self.line_height).flatten()
    }
}
