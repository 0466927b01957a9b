use crate::geometry::{AnchorRect, Point, Size};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementSettings {
    /// Space between the anchor and the popup
    pub gap: f64,
    /// Minimum distance kept from every viewport edge
    pub viewport_inset: f64,
}

impl Default for PlacementSettings {
    fn default() -> Self {
        Self {
            gap: 4.0,
            viewport_inset: 8.0,
        }
    }
}

/// Top-left corner for a popup of `popup` size attached to `anchor`.
///
/// Below the anchor by default, flipped above when it would cross the bottom
/// inset, then clamped into the inset viewport on both axes.
pub fn place_popup(
    anchor: &AnchorRect,
    popup: Size,
    viewport: Size,
    settings: &PlacementSettings,
) -> Point {
    let inset = settings.viewport_inset;

    let below = anchor.bottom + settings.gap;
    let top = if below + popup.height > viewport.height - inset {
        anchor.top - settings.gap - popup.height
    } else {
        below
    };

    Point {
        x: clamp_axis(anchor.left, popup.width, viewport.width, inset),
        y: clamp_axis(top, popup.height, viewport.height, inset),
    }
}

/// Keep `[start, start + extent]` inside `[inset, limit - inset]`, preferring
/// the leading edge when it cannot fit at all. A NaN bound is ignored.
fn clamp_axis(start: f64, extent: f64, limit: f64, inset: f64) -> f64 {
    let max = (limit - inset - extent).max(inset);
    start.min(max).max(inset)
}
