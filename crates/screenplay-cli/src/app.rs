use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::Rect;
use std::collections::HashMap;

use screenplay_config::Config;
use screenplay_engine::{
    AnchorRect, AnchorSettings, BlockId, BlockType, Caret, Document, EditorKey, EditorState,
    FocusTarget, GeometrySample, KeyOutcome, PlacementSettings, PopupKey, PopupView, Size,
    place_popup,
};

/// Popup directly under the caret row, allowed to touch the screen edge
pub const TERMINAL_PLACEMENT: PlacementSettings = PlacementSettings {
    gap: 0.0,
    viewport_inset: 0.0,
};

/// Terminal carets are exact cells, so a caret more than a couple of cells
/// away from its block can only be stale
const TERMINAL_ANCHOR: AnchorSettings = AnchorSettings {
    tolerance: 2.0,
    line_height: 1.0,
};

/// Indent and maximum width of a block type's column, in cells
fn column(block_type: BlockType) -> (u16, u16) {
    match block_type {
        BlockType::SceneHeading | BlockType::Action => (0, 60),
        BlockType::Character => (22, 38),
        BlockType::Parenthetical => (16, 28),
        BlockType::Dialogue => (10, 36),
        BlockType::Transition => (45, 15),
    }
}

/// Screen position of one block. Text wraps at exactly `width` characters
/// and there is always room for the caret after the last character.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockLayout {
    pub id: BlockId,
    pub block_type: BlockType,
    pub x: u16,
    /// Row of the first line; negative when scrolled above the area
    pub y: i32,
    pub width: u16,
    pub lines: u16,
}

impl BlockLayout {
    pub fn rect(&self) -> AnchorRect {
        AnchorRect::new(
            f64::from(self.x),
            f64::from(self.y),
            f64::from(self.width),
            f64::from(self.lines),
        )
    }

    /// (column, line) of the caret after `offset` characters
    pub fn caret_cell(&self, offset: usize) -> (u16, u16) {
        let width = usize::from(self.width.max(1));
        ((offset % width) as u16, (offset / width) as u16)
    }

    fn cell_rect(&self, offset: usize) -> AnchorRect {
        let (col, line) = self.caret_cell(offset);
        AnchorRect::new(
            f64::from(self.x + col),
            f64::from(self.y) + f64::from(line),
            1.0,
            1.0,
        )
    }

    pub fn sample(&self, offset: usize) -> GeometrySample {
        GeometrySample {
            block: self.id,
            element: Some(self.rect()),
            caret: Some(Caret {
                rect: self.cell_rect(offset),
                offset,
                collapsed: true,
            }),
            preceding_char: (offset > 0).then(|| self.cell_rect(offset - 1)),
            line_height: Some(1.0),
        }
    }
}

fn lines_for(chars: usize, width: u16) -> u16 {
    (chars / usize::from(width.max(1)) + 1) as u16
}

/// Split `text` into rows of at most `width` characters
pub fn wrap_chars(text: &str, width: u16) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return vec![String::new()];
    }
    chars
        .chunks(usize::from(width.max(1)))
        .map(|row| row.iter().collect())
        .collect()
}

fn byte_index(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map_or(text.len(), |(index, _)| index)
}

fn popup_key_for(code: KeyCode) -> Option<PopupKey> {
    match code {
        KeyCode::Up => Some(PopupKey::Up),
        KeyCode::Down => Some(PopupKey::Down),
        KeyCode::Enter => Some(PopupKey::Select),
        KeyCode::Esc => Some(PopupKey::Dismiss),
        _ => None,
    }
}

/// Focus in the terminal is the engine's own focused block; a block can take
/// it once it has been laid out
struct TerminalFocus<'a> {
    layout: &'a [BlockLayout],
    cursors: &'a mut HashMap<BlockId, usize>,
}

impl FocusTarget for TerminalFocus<'_> {
    fn focus_block(&mut self, block: BlockId) -> bool {
        self.layout.iter().any(|layout| layout.id == block)
    }

    fn set_cursor(&mut self, block: BlockId, offset: usize) -> bool {
        self.cursors.insert(block, offset);
        true
    }
}

pub struct App {
    editor: EditorState,
    /// Caret per block, in characters
    cursors: HashMap<BlockId, usize>,
    layout: Vec<BlockLayout>,
    scroll: u16,
    viewport: Size,
    pub should_quit: bool,
}

impl App {
    pub fn new(config: &Config) -> Self {
        let document = Document::with_opening_block(config.editor.opening_block);
        let first = document.get(0).map(|block| block.id);
        let mut editor = EditorState::new(document).with_anchor_settings(TERMINAL_ANCHOR);
        if let Some(first) = first {
            editor.request_focus(first);
        }

        Self {
            editor,
            cursors: HashMap::new(),
            layout: Vec::new(),
            scroll: 0,
            viewport: Size::default(),
            should_quit: false,
        }
    }

    pub fn editor(&self) -> &EditorState {
        &self.editor
    }

    pub fn layout(&self) -> &[BlockLayout] {
        &self.layout
    }

    pub fn cursor(&self, id: BlockId) -> usize {
        self.cursors.get(&id).copied().unwrap_or(0)
    }

    /// Lay the blocks out top to bottom inside `area` with a blank row
    /// between them, scrolling so the block about to hold focus is visible
    pub fn relayout(&mut self, area: Rect, viewport: Size) {
        self.viewport = viewport;

        let mut row = 0i32;
        let mut layout = Vec::with_capacity(self.editor.document().len());
        for block in self.editor.document() {
            let (indent, max_width) = column(block.block_type);
            let indent = indent.min(area.width.saturating_sub(1));
            let width = max_width.min(area.width.saturating_sub(indent)).max(1);
            let lines = lines_for(block.char_len(), width);
            layout.push(BlockLayout {
                id: block.id,
                block_type: block.block_type,
                x: area.x + indent,
                y: row,
                width,
                lines,
            });
            row += i32::from(lines) + 1;
        }

        let target = self.editor.pending_focus().or(self.editor.focused());
        if let Some(block) = target.and_then(|id| layout.iter().find(|l| l.id == id)) {
            let height = i32::from(area.height);
            let scroll = i32::from(self.scroll);
            let bottom = block.y + i32::from(block.lines);
            if block.y < scroll {
                self.scroll = block.y as u16;
            } else if bottom > scroll + height {
                self.scroll = (bottom - height).max(0) as u16;
            }
        }

        let offset = i32::from(area.y) - i32::from(self.scroll);
        for block in &mut layout {
            block.y += offset;
        }
        self.layout = layout;
    }

    /// Land a pending focus request. True when focus moved.
    pub fn settle_focus(&mut self) -> bool {
        let mut target = TerminalFocus {
            layout: &self.layout,
            cursors: &mut self.cursors,
        };
        self.editor.apply_pending_focus(&mut target)
    }

    pub fn handle_key_event(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl && matches!(key.code, KeyCode::Char('q') | KeyCode::Char('c')) {
            self.should_quit = true;
            return;
        }

        if let Some(popup_key) = popup_key_for(key.code)
            && self.editor.popup_key(popup_key).is_consumed()
        {
            self.settle_focus();
            return;
        }

        match key.code {
            KeyCode::Enter => {
                self.editor.handle_key(EditorKey::Enter);
            }
            KeyCode::Tab => {
                self.editor.handle_key(EditorKey::Tab);
            }
            KeyCode::Backspace => {
                if self.editor.handle_key(EditorKey::Backspace) == KeyOutcome::PassThrough {
                    self.delete_before_cursor();
                }
            }
            KeyCode::Char(c) if !ctrl => self.insert_char(c),
            KeyCode::Left => self.move_cursor(-1),
            KeyCode::Right => self.move_cursor(1),
            KeyCode::Home => self.move_cursor(isize::MIN),
            KeyCode::End => self.move_cursor(isize::MAX),
            KeyCode::Up => self.move_focus(-1),
            KeyCode::Down => self.move_focus(1),
            _ => {}
        }
        self.settle_focus();
    }

    /// Measurements of a laid-out block with the caret at `offset`
    pub fn sample(&self, id: BlockId, offset: usize) -> GeometrySample {
        self.layout
            .iter()
            .find(|layout| layout.id == id)
            .map_or_else(|| GeometrySample::unmounted(id), |layout| layout.sample(offset))
    }

    /// Screen area and contents of the open popup
    pub fn popup_area(&self) -> Option<(Rect, PopupView)> {
        let view = self.editor.popup_view();
        if !view.is_open {
            return None;
        }
        let anchor = view.anchor?;
        let longest = view
            .options
            .iter()
            .map(|option| option.chars().count())
            .max()
            .unwrap_or(0);
        let width = longest as u16 + 4;
        let height = view.options.len() as u16 + 2;
        let point = place_popup(
            &anchor,
            Size::new(f64::from(width), f64::from(height)),
            self.viewport,
            &TERMINAL_PLACEMENT,
        );
        let area = Rect::new(point.x.max(0.0) as u16, point.y.max(0.0) as u16, width, height);
        Some((area, view))
    }

    /// Terminal cell for the hardware cursor, when the focused block is on
    /// screen within `area`
    pub fn screen_cursor(&self, area: Rect) -> Option<(u16, u16)> {
        let id = self.editor.focused()?;
        let layout = self.layout.iter().find(|layout| layout.id == id)?;
        let (col, line) = layout.caret_cell(self.cursor(id));
        let y = layout.y + i32::from(line);
        if y < i32::from(area.y) || y >= i32::from(area.bottom()) {
            return None;
        }
        Some((layout.x + col, y as u16))
    }

    fn focused_block(&self) -> Option<(BlockId, String, usize)> {
        let id = self.editor.focused()?;
        let block = self.editor.document().block(id)?;
        let cursor = self.cursor(id).min(block.char_len());
        Some((id, block.content.clone(), cursor))
    }

    fn insert_char(&mut self, c: char) {
        let Some((id, mut text, cursor)) = self.focused_block() else {
            return;
        };
        text.insert(byte_index(&text, cursor), c);
        self.content_edited(id, text, cursor + 1);
    }

    fn delete_before_cursor(&mut self) {
        let Some((id, mut text, cursor)) = self.focused_block() else {
            return;
        };
        if cursor == 0 {
            return;
        }
        text.remove(byte_index(&text, cursor - 1));
        self.content_edited(id, text, cursor - 1);
    }

    fn content_edited(&mut self, id: BlockId, text: String, cursor: usize) {
        self.cursors.insert(id, cursor);
        let sample = self.sample(id, cursor);
        self.editor.content_changed(id, text, cursor, &sample);
    }

    fn move_cursor(&mut self, delta: isize) {
        let Some((id, text, cursor)) = self.focused_block() else {
            return;
        };
        let len = text.chars().count();
        let moved = cursor.saturating_add_signed(delta).min(len);
        self.cursors.insert(id, moved);
    }

    fn move_focus(&mut self, delta: isize) {
        let document = self.editor.document();
        let Some(current) = self.editor.focused() else {
            if let Some(first) = document.get(0).map(|block| block.id) {
                self.editor.request_focus(first);
            }
            return;
        };
        let target = document
            .index_of(current)
            .and_then(|index| index.checked_add_signed(delta))
            .and_then(|index| document.get(index))
            .map(|block| block.id);
        if let Some(target) = target {
            self.editor.blur(current);
            self.editor.request_focus(target);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    const AREA: Rect = Rect {
        x: 1,
        y: 1,
        width: 78,
        height: 20,
    };

    fn laid_out_app() -> App {
        let mut app = App::new(&Config::default());
        redraw(&mut app);
        app
    }

    fn redraw(app: &mut App) {
        app.relayout(AREA, Size::new(80.0, 24.0));
        app.settle_focus();
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key_event(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn content(app: &App, index: usize) -> String {
        app.editor().document().get(index).unwrap().content.clone()
    }

    #[test]
    fn test_opening_block_takes_focus_after_first_layout() {
        let mut app = App::new(&Config::default());
        assert_eq!(app.editor().focused(), None);

        redraw(&mut app);
        let first = app.editor().document().get(0).unwrap().id;
        assert_eq!(app.editor().focused(), Some(first));
        assert_eq!(app.screen_cursor(AREA), Some((1, 1)));
    }

    #[test]
    fn test_typing_opens_popup_at_caret_cell() {
        let mut app = laid_out_app();
        type_text(&mut app, "I");

        let view = app.editor().popup_view();
        assert_eq!(view.options, vec!["INT. ", "INT./EXT. "]);
        assert_eq!(view.anchor, Some(AnchorRect::new(2.0, 1.0, 1.0, 1.0)));

        let (area, _) = app.popup_area().unwrap();
        assert_eq!(area, Rect::new(2, 2, 14, 4));
    }

    #[test]
    fn test_popup_selection_moves_cursor_to_end() {
        let mut app = laid_out_app();
        type_text(&mut app, "i");
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);

        assert_eq!(content(&app, 0), "INT./EXT. ");
        assert_eq!(app.editor().document().len(), 1);
        let id = app.editor().focused().unwrap();
        assert_eq!(app.cursor(id), 10);
    }

    #[test]
    fn test_escape_dismisses_popup() {
        let mut app = laid_out_app();
        type_text(&mut app, "E");
        press(&mut app, KeyCode::Esc);
        assert!(app.popup_area().is_none());
        assert_eq!(content(&app, 0), "E");
    }

    #[test]
    fn test_enter_on_action_creates_focused_action() {
        let mut app = laid_out_app();
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "He walks in.");
        press(&mut app, KeyCode::Enter);
        redraw(&mut app);

        let document = app.editor().document();
        assert_eq!(document.len(), 2);
        let second = document.get(1).unwrap();
        assert_eq!(second.block_type, BlockType::Action);
        assert_eq!(second.content, "");
        assert_eq!(app.editor().focused(), Some(second.id));
        assert_eq!(app.cursor(second.id), 0);
    }

    #[test]
    fn test_backspace_removes_empty_block_and_returns_to_end_of_previous() {
        let mut app = laid_out_app();
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "The door creaks.");
        press(&mut app, KeyCode::Enter);
        redraw(&mut app);

        press(&mut app, KeyCode::Backspace);
        let first = app.editor().document().get(0).unwrap().id;
        assert_eq!(app.editor().document().len(), 1);
        assert_eq!(app.editor().focused(), Some(first));
        assert_eq!(app.cursor(first), 16);
    }

    #[test]
    fn test_backspace_deletes_before_cursor() {
        let mut app = laid_out_app();
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "abc");
        press(&mut app, KeyCode::Left);
        press(&mut app, KeyCode::Backspace);
        assert_eq!(content(&app, 0), "ac");
    }

    #[test]
    fn test_insert_in_middle_of_text() {
        let mut app = laid_out_app();
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "ab");
        press(&mut app, KeyCode::Left);
        type_text(&mut app, "X");
        assert_eq!(content(&app, 0), "aXb");

        press(&mut app, KeyCode::Home);
        type_text(&mut app, "é");
        assert_eq!(content(&app, 0), "éaXb");
    }

    #[test]
    fn test_arrow_keys_move_focus_between_blocks() {
        let mut app = laid_out_app();
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "First.");
        press(&mut app, KeyCode::Enter);
        redraw(&mut app);
        let second = app.editor().focused().unwrap();

        press(&mut app, KeyCode::Up);
        let first = app.editor().document().get(0).unwrap().id;
        assert_eq!(app.editor().focused(), Some(first));
        assert_eq!(app.cursor(first), 6);

        press(&mut app, KeyCode::Down);
        assert_eq!(app.editor().focused(), Some(second));
        press(&mut app, KeyCode::Down);
        assert_eq!(app.editor().focused(), Some(second));
    }

    #[test]
    fn test_ctrl_q_quits() {
        let mut app = laid_out_app();
        app.handle_key_event(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
        assert_eq!(content(&app, 0), "");
    }

    #[test]
    fn test_layout_scrolls_to_keep_focus_visible() {
        let mut app = laid_out_app();
        press(&mut app, KeyCode::Tab);
        for _ in 0..15 {
            type_text(&mut app, "x");
            press(&mut app, KeyCode::Enter);
            redraw(&mut app);
        }

        let focused = app.editor().focused().unwrap();
        let layout = app.layout().iter().find(|l| l.id == focused).unwrap();
        assert!(layout.y >= i32::from(AREA.y));
        assert!(layout.y < i32::from(AREA.bottom()));
        assert!(app.layout()[0].y < i32::from(AREA.y));
    }

    #[test]
    fn test_block_columns_follow_type() {
        let mut app = laid_out_app();
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Tab);
        redraw(&mut app);
        let layout = &app.layout()[0];
        assert_eq!(layout.block_type, BlockType::Character);
        assert_eq!(layout.x, 23);
        assert_eq!(layout.width, 38);
    }

    #[rstest]
    #[case(0, (0, 0))]
    #[case(9, (9, 0))]
    #[case(10, (0, 1))]
    #[case(25, (5, 2))]
    fn test_caret_cell_wraps_at_width(#[case] offset: usize, #[case] expected: (u16, u16)) {
        let layout = BlockLayout {
            id: BlockId::new(),
            block_type: BlockType::Action,
            x: 0,
            y: 0,
            width: 10,
            lines: 3,
        };
        assert_eq!(layout.caret_cell(offset), expected);
    }

    #[test]
    fn test_sample_reports_preceding_cell() {
        let layout = BlockLayout {
            id: BlockId::new(),
            block_type: BlockType::Action,
            x: 4,
            y: 2,
            width: 10,
            lines: 2,
        };
        let sample = layout.sample(10);
        assert_eq!(
            sample.caret.map(|caret| caret.rect),
            Some(AnchorRect::new(4.0, 3.0, 1.0, 1.0))
        );
        assert_eq!(
            sample.preceding_char,
            Some(AnchorRect::new(13.0, 2.0, 1.0, 1.0))
        );
        assert_eq!(layout.sample(0).preceding_char, None);
    }

    #[rstest]
    #[case("", 4, &[""])]
    #[case("abcdef", 4, &["abcd", "ef"])]
    #[case("abcd", 4, &["abcd"])]
    fn test_wrap_chars(#[case] text: &str, #[case] width: u16, #[case] expected: &[&str]) {
        assert_eq!(wrap_chars(text, width), expected);
    }
}
