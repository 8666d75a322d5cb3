use dioxus::events::Key;
use dioxus::prelude::*;

use crate::components::call_control_state::{CallAction, CallControlState};

#[component]
pub fn CallControls(
    control_state: CallControlState,
    mut peer: Signal<String>,
    mut video: Signal<bool>,
    on_call: EventHandler<()>,
    on_hangup: EventHandler<()>
) -> Element {
    let action = control_state.call_action;
    let call_enabled = control_state.call_enabled;
    let video_enabled = control_state.video_enabled;

    let press = move || {
        if !call_enabled {
            return;
        }
        match action {
            CallAction::Call => on_call.call(()),
            CallAction::Hangup => on_hangup.call(()),
        }
    };

    rsx! {
        div {
            class: "card",
            style: "padding: 20px;",

            div {
                style: "display: flex; gap: 8px;",
                input {
                    r#type: "text",
                    style: "flex: 1; padding: 10px 12px; border: 1px solid #CBD5E1; border-radius: 6px; font-size: 14px;",
                    placeholder: "SIP URI to call (e.g., sip:1000@example.com)",
                    disabled: !control_state.peer_enabled,
                    value: "{peer}",
                    oninput: move |evt| peer.set(evt.value()),
                    onkeypress: move |evt| {
                        if evt.key() == Key::Enter && action == CallAction::Call {
                            press();
                        }
                    }
                }
                button {
                    class: control_state.get_button_class(&control_state.call_style),
                    disabled: !call_enabled,
                    onclick: move |_| press(),
                    "{control_state.call_label}"
                }
            }

            label {
                style: "display: flex; align-items: center; gap: 6px; margin-top: 10px; font-size: 13px; color: #475569;",
                input {
                    r#type: "checkbox",
                    checked: *video.read(),
                    disabled: !video_enabled,
                    onclick: move |_| {
                        if video_enabled {
                            let current = *video.read();
                            video.set(!current);
                        }
                    }
                }
                "Use video"
            }
        }
    }
}
