pub mod block_editor;
pub mod suggestion_popup;

pub use block_editor::BlockEditor;
pub use suggestion_popup::SuggestionPopup;
