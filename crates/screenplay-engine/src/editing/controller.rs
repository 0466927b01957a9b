use crate::editing::autocomplete::{apply_suggestion, suggest};
use crate::editing::document::{Block, BlockId, Document};
use crate::editing::popup::{PopupKey, PopupState, PopupView};
use crate::geometry::{AnchorSettings, CaretGeometry, FocusTarget, resolve_anchor};

/// Keys the controller may intercept
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorKey {
    Enter,
    Tab,
    Backspace,
    Other,
}

/// Whether the frontend must suppress the key's native behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Consumed,
    PassThrough,
}

impl KeyOutcome {
    pub fn is_consumed(self) -> bool {
        self == KeyOutcome::Consumed
    }
}

/// Complete state of one editing session.
///
/// Every input event maps to exactly one transition method. Focus moves in
/// two steps: a transition records `pending_focus`, and the frontend calls
/// [`EditorState::apply_pending_focus`] once the target element exists.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorState {
    document: Document,
    focused: Option<BlockId>,
    pending_focus: Option<BlockId>,
    popup: PopupState,
    anchor_settings: AnchorSettings,
}

impl EditorState {
    pub fn new(document: Document) -> Self {
        Self {
            document,
            focused: None,
            pending_focus: None,
            popup: PopupState::default(),
            anchor_settings: AnchorSettings::default(),
        }
    }

    pub fn with_anchor_settings(mut self, anchor_settings: AnchorSettings) -> Self {
        self.anchor_settings = anchor_settings;
        self
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn focused(&self) -> Option<BlockId> {
        self.focused
    }

    pub fn pending_focus(&self) -> Option<BlockId> {
        self.pending_focus
    }

    pub fn popup(&self) -> &PopupState {
        &self.popup
    }

    pub fn popup_view(&self) -> PopupView {
        self.popup.view()
    }

    /// The focused block's element received input focus
    pub fn focus(&mut self, id: BlockId) {
        if !self.document.contains(id) {
            return;
        }
        if self.popup.block().is_some_and(|block| block != id) {
            self.popup.close();
        }
        self.focused = Some(id);
    }

    /// The block's element lost input focus
    pub fn blur(&mut self, id: BlockId) {
        if self.focused == Some(id) {
            self.focused = None;
            self.popup.close();
        }
    }

    /// Ask for `id` to be focused with the caret at the end of its content
    pub fn request_focus(&mut self, id: BlockId) {
        if self.document.contains(id) {
            self.pending_focus = Some(id);
        }
    }

    pub fn handle_key(&mut self, key: EditorKey) -> KeyOutcome {
        let Some(focused) = self.focused else {
            return KeyOutcome::PassThrough;
        };

        match key {
            EditorKey::Enter => {
                // The popup owns Enter while it is open on this block
                if self.popup.block() != Some(focused) {
                    self.insert_block_after(focused);
                }
                KeyOutcome::Consumed
            }
            EditorKey::Tab => {
                self.cycle_type(focused);
                KeyOutcome::Consumed
            }
            EditorKey::Backspace => self.remove_if_empty(focused),
            EditorKey::Other => KeyOutcome::PassThrough,
        }
    }

    /// Route a navigation key to the open popup
    pub fn popup_key(&mut self, key: PopupKey) -> KeyOutcome {
        if !self.popup.is_open() {
            return KeyOutcome::PassThrough;
        }
        match key {
            PopupKey::Up => self.popup.move_highlight(-1),
            PopupKey::Down => self.popup.move_highlight(1),
            PopupKey::Select => {
                if let Some(option) = self.popup.highlighted_option().map(str::to_string) {
                    self.select_suggestion(&option);
                }
            }
            PopupKey::Dismiss => self.close_suggestions(),
        }
        KeyOutcome::Consumed
    }

    /// A native edit changed the block's text. Stores it, then recomputes
    /// suggestions and their anchor when the block still has focus.
    pub fn content_changed(
        &mut self,
        id: BlockId,
        text: impl Into<String>,
        cursor: usize,
        geometry: &impl CaretGeometry,
    ) {
        let Some(index) = self.document.index_of(id) else {
            log::debug!("Content change for unknown block {id} ignored");
            return;
        };
        self.document.set_content(index, text);

        if self.focused != Some(id) {
            // Late report for a block focus already left
            if self.popup.block() == Some(id) {
                self.popup.close();
            }
            return;
        }

        let Some(block) = self.document.get(index) else {
            return;
        };
        let known_locations = self.document.known_locations();
        let suggestions = suggest(block.block_type, &block.content, cursor, &known_locations);

        match suggestions {
            Some(suggestions) => match resolve_anchor(geometry, id, &self.anchor_settings) {
                Some(anchor) => {
                    log::debug!(
                        "Suggestions for {id}: {:?} at {:?}",
                        suggestions.options,
                        anchor
                    );
                    self.popup.open(id, suggestions, anchor);
                }
                None => {
                    log::debug!("Block {id} has no layout, suggestions not shown");
                    self.popup.close();
                }
            },
            None => self.popup.close(),
        }
    }

    /// Replace the matched span with `option` and refocus the block
    pub fn select_suggestion(&mut self, option: &str) -> bool {
        let (Some(id), Some(range)) = (self.popup.block(), self.popup.range()) else {
            return false;
        };
        self.popup.close();
        let Some(index) = self.document.index_of(id) else {
            return false;
        };
        let Some(block) = self.document.get(index) else {
            return false;
        };
        let completed = apply_suggestion(&block.content, range, option);
        log::debug!("Completed block {id} to {completed:?}");
        self.document.set_content(index, completed);
        self.pending_focus = Some(id);
        true
    }

    pub fn close_suggestions(&mut self) {
        self.popup.close();
    }

    /// Second half of the focus transfer. Returns true once focus landed.
    ///
    /// A request for a block that no longer exists is dropped; a block whose
    /// element is not mounted yet keeps the request for the next pass.
    pub fn apply_pending_focus(&mut self, target: &mut impl FocusTarget) -> bool {
        let Some(id) = self.pending_focus else {
            return false;
        };
        let Some(block) = self.document.block(id) else {
            log::debug!("Dropping focus request for removed block {id}");
            self.pending_focus = None;
            return false;
        };
        if !target.focus_block(id) {
            return false;
        }
        target.set_cursor(id, block.char_len());
        self.pending_focus = None;
        self.focused = Some(id);
        true
    }

    fn insert_block_after(&mut self, current: BlockId) {
        let Some(index) = self.document.index_of(current) else {
            return;
        };
        let Some(block_type) = self.document.get(index).map(|block| block.block_type) else {
            return;
        };
        let block = Block::empty(block_type.next_on_enter());
        let id = block.id;
        if self.document.insert_after(index, block) {
            log::debug!("Inserted {} block {id} after {current}", block_type.next_on_enter());
            self.popup.close();
            self.pending_focus = Some(id);
        }
    }

    fn cycle_type(&mut self, current: BlockId) {
        let Some(index) = self.document.index_of(current) else {
            return;
        };
        let Some(next) = self.document.get(index).map(|block| block.block_type.cycle()) else {
            return;
        };
        self.document.set_type(index, next);
        log::debug!("Block {current} is now {next}");
        if self.popup.block() == Some(current) {
            self.popup.close();
        }
    }

    fn remove_if_empty(&mut self, current: BlockId) -> KeyOutcome {
        let Some(index) = self.document.index_of(current) else {
            return KeyOutcome::PassThrough;
        };
        let is_empty = self
            .document
            .get(index)
            .is_some_and(|block| block.content.is_empty());
        if !is_empty || index == 0 {
            return KeyOutcome::PassThrough;
        }
        let Some(previous) = self.document.get(index - 1).map(|block| block.id) else {
            return KeyOutcome::PassThrough;
        };
        if self.document.remove_at(index).is_none() {
            return KeyOutcome::PassThrough;
        }
        log::debug!("Removed empty block {current}, focusing {previous}");
        if self.popup.block() == Some(current) {
            self.popup.close();
        }
        self.focused = None;
        self.pending_focus = Some(previous);
        KeyOutcome::Consumed
    }
}
