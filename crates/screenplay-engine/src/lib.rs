pub mod editing;
pub mod geometry;

// Re-export key types for easier usage
pub use editing::*;
pub use geometry::{
    AnchorRect, AnchorSettings, Caret, CaretGeometry, FocusTarget, GeometrySample,
    PlacementSettings, Point, Size, place_popup, resolve_anchor,
};
