//! Bridge between the webview DOM and the engine's geometry traits.
//!
//! Everything the anchor resolver may ask about a block is measured in one
//! script round trip ([`probe_block`]) and frozen into a [`GeometrySample`].
//! Focus and caret placement go the other way as fire-and-forget scripts.
//!
//! JavaScript strings count UTF-16 code units while the engine counts
//! characters, so every offset crossing the bridge is converted here.

use dioxus::prelude::*;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};

use screenplay_engine::{AnchorRect, BlockId, Caret, Document, FocusTarget, GeometrySample, Size};

const BLOCK_ID_PLACEHOLDER: &str = "__BLOCK_ID__";

const PROBE_SCRIPT: &str = r#"
(function() {
const el = document.getElementById("__BLOCK_ID__");
if (!el) {
    dioxus.send(null);
    return;
}
const text = el.textContent ?? "";
const locate = (index) => {
    const walker = document.createTreeWalker(el, NodeFilter.SHOW_TEXT);
    let seen = 0;
    let node;
    while ((node = walker.nextNode())) {
        const len = node.textContent.length;
        if (index < seen + len) {
            return [node, index - seen];
        }
        seen += len;
    }
    return null;
};
let cursor = text.length;
let caret = null;
let preceding = null;
const selection = window.getSelection();
if (selection && selection.rangeCount > 0 && el.contains(selection.focusNode)) {
    const range = selection.getRangeAt(0);
    const before = document.createRange();
    before.selectNodeContents(el);
    before.setEnd(range.endContainer, range.endOffset);
    cursor = before.toString().length;
    caret = { rect: range.getBoundingClientRect().toJSON(), collapsed: range.collapsed };
    if (cursor > 0) {
        const found = locate(cursor - 1);
        if (found) {
            const ch = document.createRange();
            ch.setStart(found[0], found[1]);
            ch.setEnd(found[0], found[1] + 1);
            preceding = ch.getBoundingClientRect().toJSON();
        }
    }
}
const lineHeight = parseFloat(getComputedStyle(el).lineHeight);
dioxus.send({
    text,
    cursor,
    element: el.getBoundingClientRect().toJSON(),
    caret,
    preceding,
    line_height: Number.isFinite(lineHeight) ? lineHeight : null,
    viewport: { width: window.innerWidth, height: window.innerHeight },
});
})();
"#;

const FOCUS_SCRIPT: &str = r#"
(function() {
const el = document.getElementById("__BLOCK_ID__");
if (el && document.activeElement !== el) {
    el.focus();
}
})();
"#;

/// Receives `[text, caret]`; caret is null to leave the selection alone
const WRITE_TEXT_SCRIPT: &str = r#"
(async function() {
const [text, caret] = await dioxus.recv();
const el = document.getElementById("__BLOCK_ID__");
if (!el) {
    return;
}
if (el.textContent !== text) {
    el.textContent = text;
}
if (caret === null) {
    return;
}
const range = document.createRange();
const walker = document.createTreeWalker(el, NodeFilter.SHOW_TEXT);
let seen = 0;
let placed = false;
let node;
while ((node = walker.nextNode())) {
    const len = node.textContent.length;
    if (caret <= seen + len) {
        range.setStart(node, caret - seen);
        placed = true;
        break;
    }
    seen += len;
}
if (!placed) {
    range.selectNodeContents(el);
    range.collapse(false);
}
range.collapse(true);
const selection = window.getSelection();
selection.removeAllRanges();
selection.addRange(range);
})();
"#;

/// DOM id of a block's editable element
pub fn element_id(block: BlockId) -> String {
    format!("block-{block}")
}

fn script_for(template: &str, block: BlockId) -> String {
    template.replace(BLOCK_ID_PLACEHOLDER, &element_id(block))
}

/// Count of characters covering the first `units` UTF-16 code units. A unit
/// count that lands inside a surrogate pair rounds down.
pub fn char_offset_from_utf16(text: &str, units: usize) -> usize {
    let mut seen = 0;
    for (index, ch) in text.chars().enumerate() {
        seen += ch.len_utf16();
        if seen > units {
            return index;
        }
    }
    text.chars().count()
}

/// UTF-16 length of the first `chars` characters of `text`
pub fn utf16_offset(text: &str, chars: usize) -> usize {
    text.chars().take(chars).map(char::len_utf16).sum()
}

#[derive(Debug, Clone, Deserialize)]
pub struct CaretProbe {
    pub rect: AnchorRect,
    pub collapsed: bool,
}

/// Raw measurements of one block, as returned by the probe script
#[derive(Debug, Clone, Deserialize)]
pub struct BlockProbe {
    pub text: String,
    /// Caret position in UTF-16 code units
    pub cursor: usize,
    pub element: AnchorRect,
    pub caret: Option<CaretProbe>,
    pub preceding: Option<AnchorRect>,
    pub line_height: Option<f64>,
    pub viewport: Size,
}

impl BlockProbe {
    /// Caret position in characters
    pub fn cursor_chars(&self) -> usize {
        char_offset_from_utf16(&self.text, self.cursor)
    }

    pub fn sample(&self, block: BlockId) -> GeometrySample {
        let offset = self.cursor_chars();
        GeometrySample {
            block,
            element: Some(self.element),
            caret: self.caret.as_ref().map(|caret| Caret {
                rect: caret.rect,
                offset,
                collapsed: caret.collapsed,
            }),
            preceding_char: self.preceding,
            line_height: self.line_height,
        }
    }
}

/// Measure `block` in the live document. `Ok(None)` when it is not mounted.
pub async fn probe_block(block: BlockId) -> Result<Option<BlockProbe>, document::EvalError> {
    let mut eval = document::eval(&script_for(PROBE_SCRIPT, block));
    eval.recv::<Option<BlockProbe>>().await
}

/// Replace the element's text when it differs, optionally collapsing the
/// caret to `caret` characters in
pub fn write_text(block: BlockId, text: &str, caret: Option<usize>) {
    let eval = document::eval(&script_for(WRITE_TEXT_SCRIPT, block));
    let caret = caret.map(|chars| utf16_offset(text, chars));
    if let Err(e) = eval.send((text, caret)) {
        log::warn!("Failed to sync text of block {block}: {e:?}");
    }
}

/// [`FocusTarget`] over the webview. Only blocks whose elements reported
/// `onmounted` and that are still in the document can receive focus.
pub struct DomFocus {
    mounted: HashSet<BlockId>,
    contents: HashMap<BlockId, String>,
}

impl DomFocus {
    pub fn new(mut mounted: HashSet<BlockId>, document: &Document) -> Self {
        mounted.retain(|id| document.contains(*id));
        let contents = document
            .iter()
            .map(|block| (block.id, block.content.clone()))
            .collect();
        Self { mounted, contents }
    }
}

impl FocusTarget for DomFocus {
    fn focus_block(&mut self, block: BlockId) -> bool {
        if !self.mounted.contains(&block) {
            return false;
        }
        document::eval(&script_for(FOCUS_SCRIPT, block));
        true
    }

    fn set_cursor(&mut self, block: BlockId, offset: usize) -> bool {
        let Some(text) = self.contents.get(&block) else {
            return false;
        };
        // The engine may have rewritten the content, so sync it with the caret
        write_text(block, text, Some(offset));
        true
    }
}
