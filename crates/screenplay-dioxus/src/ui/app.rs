use dioxus::prelude::*;
use std::collections::HashSet;

use screenplay_config::Config;
use screenplay_engine::{BlockId, Document, EditorState, Size};

use super::components::{BlockEditor, SuggestionPopup};
use super::dom::DomFocus;

const SCREENPLAY_CSS: &str = include_str!("../assets/screenplay.css");

/// Fresh session with the first block waiting for focus
pub fn new_editor(config: &Config) -> EditorState {
    let document = Document::with_opening_block(config.editor.opening_block);
    let first = document.get(0).map(|block| block.id);
    let mut editor = EditorState::new(document).with_anchor_settings(config.anchor.settings());
    if let Some(first) = first {
        editor.request_focus(first);
    }
    editor
}

#[component]
pub fn App(config: Config) -> Element {
    let mut editor = use_signal(|| new_editor(&config));
    let mounted = use_signal(HashSet::<BlockId>::new);
    let viewport = use_signal(|| Size::new(1024.0, 768.0));

    // Second half of every focus transfer. Re-runs when a block mounts, so a
    // request for a block rendered this pass lands once its element exists.
    use_effect(move || {
        let Some(pending) = editor.read().pending_focus() else {
            return;
        };
        let mounted = mounted.read();
        let ready = mounted.contains(&pending) || !editor.peek().document().contains(pending);
        if !ready {
            return;
        }
        let mut target = DomFocus::new(mounted.clone(), editor.peek().document());
        drop(mounted);
        editor.write().apply_pending_focus(&mut target);
    });

    let blocks = editor.read().block_views();
    let popup = editor.read().popup_view();

    rsx! {
        style { {SCREENPLAY_CSS} }
        div {
            class: "app-container",
            div {
                class: "screenplay-page",
                for view in blocks {
                    BlockEditor {
                        key: "{view.id}",
                        view: view.clone(),
                        editor,
                        mounted,
                        viewport,
                    }
                }
            }
            SuggestionPopup {
                view: popup,
                viewport: *viewport.read(),
                config: config.popup.clone(),
                on_select: move |option: String| {
                    editor.write().select_suggestion(&option);
                },
            }
        }
    }
}
