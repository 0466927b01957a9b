use crate::editing::autocomplete::{MatchRange, Suggestions};
use crate::editing::document::BlockId;
use crate::geometry::AnchorRect;

/// Keys the suggestion popup owns while it is open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupKey {
    Up,
    Down,
    Select,
    Dismiss,
}

/// What a popup shell needs to draw itself
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PopupView {
    pub is_open: bool,
    pub options: Vec<String>,
    pub highlighted: usize,
    pub anchor: Option<AnchorRect>,
}

/// Live suggestion state. At most one block has suggestions at a time; a new
/// computation replaces whatever was there.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PopupState {
    block: Option<BlockId>,
    options: Vec<String>,
    range: Option<MatchRange>,
    anchor: Option<AnchorRect>,
    highlighted: usize,
}

impl PopupState {
    pub fn is_open(&self) -> bool {
        self.block.is_some() && !self.options.is_empty()
    }

    /// Block the current suggestions were computed for
    pub fn block(&self) -> Option<BlockId> {
        self.block
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn range(&self) -> Option<MatchRange> {
        self.range
    }

    pub fn anchor(&self) -> Option<AnchorRect> {
        self.anchor
    }

    pub fn highlighted(&self) -> usize {
        self.highlighted
    }

    pub fn highlighted_option(&self) -> Option<&str> {
        self.options.get(self.highlighted).map(String::as_str)
    }

    /// Move the highlight by `delta` rows, wrapping at both ends
    pub fn move_highlight(&mut self, delta: isize) {
        if self.options.is_empty() {
            return;
        }
        let len = self.options.len() as isize;
        self.highlighted = (self.highlighted as isize + delta).rem_euclid(len) as usize;
    }

    pub fn view(&self) -> PopupView {
        PopupView {
            is_open: self.is_open(),
            options: self.options.clone(),
            highlighted: self.highlighted,
            anchor: self.anchor,
        }
    }

    pub(crate) fn open(&mut self, block: BlockId, suggestions: Suggestions, anchor: AnchorRect) {
        // Keep the highlighted option when it survives the narrowing
        let previous = self
            .highlighted_option()
            .filter(|_| self.block == Some(block))
            .map(str::to_string);
        self.highlighted = previous
            .and_then(|option| suggestions.options.iter().position(|o| *o == option))
            .unwrap_or(0);
        self.block = Some(block);
        self.options = suggestions.options;
        self.range = Some(suggestions.range);
        self.anchor = Some(anchor);
    }

    pub(crate) fn close(&mut self) {
        *self = Self::default();
    }
}
