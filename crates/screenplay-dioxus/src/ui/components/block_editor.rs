use dioxus::events::Key;
use dioxus::prelude::*;
use std::collections::HashSet;

use screenplay_engine::{BlockId, BlockView, EditorKey, EditorState, KeyOutcome, PopupKey, Size};

use crate::ui::dom;

/// One screenplay block as a `contenteditable` element.
///
/// The element owns its text while the user types: the text is written once
/// on mount and afterwards only when the engine rewrites it (see
/// [`dom::DomFocus`]). Every input event re-measures the block and feeds the
/// result to the controller as a single content change.
#[component]
pub fn BlockEditor(
    view: BlockView,
    editor: Signal<EditorState>,
    mounted: Signal<HashSet<BlockId>>,
    viewport: Signal<Size>,
) -> Element {
    let mut editor = editor;
    let mut mounted = mounted;
    let mut viewport = viewport;
    let id = view.id;
    let initial_text = view.content.clone();

    // Removed blocks stop being focus targets
    use_drop(move || {
        if let Ok(mut mounted) = mounted.try_write() {
            mounted.remove(&id);
        }
    });

    rsx! {
        div {
            id: dom::element_id(id),
            class: "{view.class}",
            contenteditable: "true",
            spellcheck: "false",
            "data-placeholder": "{view.placeholder}",

            onmounted: move |_| {
                dom::write_text(id, &initial_text, None);
                mounted.write().insert(id);
            },

            onfocus: move |_| editor.write().focus(id),

            onblur: move |_| editor.write().blur(id),

            onkeydown: move |event: Event<KeyboardData>| {
                let shift = event.modifiers().shift();
                let outcome = handle_keydown(&mut editor.write(), &event.key(), shift);
                if outcome.is_consumed() {
                    event.prevent_default();
                }
            },

            oninput: move |_| {
                spawn(async move {
                    match dom::probe_block(id).await {
                        Ok(Some(probe)) => {
                            let sample = probe.sample(id);
                            let cursor = probe.cursor_chars();
                            viewport.set(probe.viewport);
                            editor.write().content_changed(id, probe.text, cursor, &sample);
                        }
                        Ok(None) => log::debug!("Block {id} unmounted before it was measured"),
                        Err(e) => log::warn!("Failed to measure block {id}: {e:?}"),
                    }
                });
            },
        }
    }
}

/// Route a key press: the open popup gets first refusal, the controller the
/// rest. Blocks hold a single paragraph, so Shift+Enter is swallowed.
pub fn handle_keydown(editor: &mut EditorState, key: &Key, shift: bool) -> KeyOutcome {
    if shift && *key == Key::Enter {
        return KeyOutcome::Consumed;
    }
    if let Some(popup_key) = popup_key_for(key)
        && editor.popup_key(popup_key).is_consumed()
    {
        return KeyOutcome::Consumed;
    }
    editor.handle_key(editor_key_for(key))
}

pub fn popup_key_for(key: &Key) -> Option<PopupKey> {
    match key {
        Key::ArrowUp => Some(PopupKey::Up),
        Key::ArrowDown => Some(PopupKey::Down),
        Key::Enter => Some(PopupKey::Select),
        Key::Escape => Some(PopupKey::Dismiss),
        _ => None,
    }
}

pub fn editor_key_for(key: &Key) -> EditorKey {
    match key {
        Key::Enter => EditorKey::Enter,
        Key::Tab => EditorKey::Tab,
        Key::Backspace => EditorKey::Backspace,
        _ => EditorKey::Other,
    }
}
