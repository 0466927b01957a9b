use dioxus::prelude::*;

use screenplay_config::PopupConfig;
use screenplay_engine::{Point, PopupView, Size, place_popup};

/// Floating option list attached to the anchor of the open popup.
///
/// Options react to `mousedown` by cancelling it so the block keeps its focus
/// and selection while the click lands.
#[component]
pub fn SuggestionPopup(
    view: PopupView,
    viewport: Size,
    config: PopupConfig,
    on_select: EventHandler<String>,
) -> Element {
    let Some(position) = popup_position(&view, viewport, &config) else {
        return rsx! {};
    };

    rsx! {
        div {
            class: "suggestion-popup",
            role: "listbox",
            style: "left: {position.x}px; top: {position.y}px; width: {config.width}px;",
            for (index, option) in view.options.iter().enumerate() {
                div {
                    key: "{option}",
                    class: if index == view.highlighted { "suggestion highlighted" } else { "suggestion" },
                    role: "option",
                    onmousedown: move |event: Event<MouseData>| event.prevent_default(),
                    onclick: {
                        let option = option.clone();
                        move |_| on_select.call(option.clone())
                    },
                    "{option}"
                }
            }
        }
    }
}

/// Viewport position of the popup's top-left corner, `None` when closed
pub fn popup_position(view: &PopupView, viewport: Size, config: &PopupConfig) -> Option<Point> {
    if !view.is_open {
        return None;
    }
    let anchor = view.anchor?;
    let size = Size::new(config.width, config.height_for(view.options.len()));
    Some(place_popup(&anchor, size, viewport, &config.placement()))
}
