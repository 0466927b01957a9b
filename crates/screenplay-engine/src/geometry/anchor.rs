//! Anchor rectangle for the suggestion popup.
//!
//! Caret rectangles are unreliable: an empty or freshly created text position
//! can report a zero-height caret, and a selection that still belongs to a
//! previous focus target reports a rectangle somewhere else entirely. The
//! resolver therefore works in two tiers. The caret rectangle is used when it
//! passes validation; otherwise the popup anchors to a one-line caret at the
//! block's top-left corner, which always exists while the block is mounted.

use crate::editing::document::BlockId;
use crate::geometry::{AnchorRect, CaretGeometry};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnchorSettings {
    /// Maximum distance between the caret rect and the block rect
    pub tolerance: f64,
    /// Line height used when the surface does not report one
    pub line_height: f64,
}

impl Default for AnchorSettings {
    fn default() -> Self {
        Self {
            tolerance: 48.0,
            line_height: 20.0,
        }
    }
}

/// Fallback anchor: 1 unit wide, one line tall, at the block's top-left
pub fn line_anchor(
    geometry: &impl CaretGeometry,
    block: BlockId,
    settings: &AnchorSettings,
) -> Option<AnchorRect> {
    let element = geometry.element_rect(block)?;
    let line_height = geometry
        .line_height(block)
        .filter(|height| *height > 0.0)
        .unwrap_or(settings.line_height);
    Some(AnchorRect::new(element.left, element.top, 1.0, line_height))
}

/// Anchor for a popup attached to `block`.
///
/// `None` only when the block has no layout at all.
pub fn resolve_anchor(
    geometry: &impl CaretGeometry,
    block: BlockId,
    settings: &AnchorSettings,
) -> Option<AnchorRect> {
    let fallback = line_anchor(geometry, block, settings)?;
    let element = geometry.element_rect(block)?;

    match caret_rect(geometry, block) {
        Some(rect) if is_plausible(&rect, &element, settings) => Some(rect),
        Some(rect) => {
            log::debug!("Caret rect {rect:?} rejected for block {block}, using line anchor");
            Some(fallback)
        }
        None => Some(fallback),
    }
}

/// Caret rect from the selection, re-measured from the preceding character
/// when the caret has no height
fn caret_rect(geometry: &impl CaretGeometry, block: BlockId) -> Option<AnchorRect> {
    let caret = geometry.caret(block)?;
    let degenerate = caret.rect.height <= 0.0;
    if caret.collapsed && caret.offset > 0 && degenerate {
        let previous = geometry.preceding_char_rect(block, caret.offset)?;
        if previous.is_zero_at_origin() || previous.height <= 0.0 {
            return None;
        }
        return Some(AnchorRect::new(previous.right, previous.top, 1.0, previous.height));
    }
    Some(caret.rect)
}

fn is_plausible(rect: &AnchorRect, element: &AnchorRect, settings: &AnchorSettings) -> bool {
    !rect.is_zero_at_origin() && rect.distance_to(element) <= settings.tolerance
}
