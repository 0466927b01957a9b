/*!
 * # Block Editing
 *
 * A screenplay is an ordered list of typed blocks. This module holds the
 * document model and the state machine that edits it.
 *
 * ## Pieces
 *
 * - **`document`**: `Document`, `Block`, `BlockType` and the `KnownLocations`
 *   projection. The document is never empty and block ids are never reused.
 * - **`autocomplete`**: pure scene-heading suggestion rules.
 * - **`popup`**: open/closed suggestion state and keyboard highlight.
 * - **`controller`**: `EditorState`, the single record of focus, pending
 *   focus and popup state, with one transition per input event.
 * - **`view`**: per-block render data (class name, placeholder label).
 *
 * ## Event Loop
 *
 * ```rust
 * use screenplay_engine::editing::*;
 * use screenplay_engine::geometry::{AnchorRect, GeometrySample};
 *
 * let mut editor = EditorState::new(Document::new());
 * let id = editor.document().get(0).unwrap().id;
 * editor.focus(id);
 *
 * // A keystroke landed natively; report the new text, caret and layout
 * let geometry = GeometrySample {
 *     element: Some(AnchorRect::new(0.0, 0.0, 600.0, 20.0)),
 *     ..GeometrySample::unmounted(id)
 * };
 * editor.content_changed(id, "E", 1, &geometry);
 * assert_eq!(editor.popup().options(), ["EXT. "]);
 *
 * editor.popup_key(PopupKey::Select);
 * assert_eq!(editor.document().get(0).unwrap().content, "EXT. ");
 * ```
 */

pub mod autocomplete;
pub mod controller;
pub mod document;
pub mod popup;
pub mod view;

pub use autocomplete::{MatchRange, Stage, Suggestions, apply_suggestion, suggest};
pub use controller::{EditorKey, EditorState, KeyOutcome};
pub use document::{
    Block, BlockId, BlockType, Document, DocumentError, KnownLocations, ParseBlockTypeError,
};
pub use popup::{PopupKey, PopupState, PopupView};
pub use view::BlockView;
