use dioxus::prelude::*;

use crate::components::call_control_state::CallControlState;
use crate::components::{CallControls, CallStatus, MediaPanelView, UserInfoBar};
use crate::state::PhoneView;

#[component]
pub fn CallInterfaceScreen(
    view: PhoneView,
    peer: Signal<String>,
    video: Signal<bool>,
    on_call: EventHandler<()>,
    on_hangup: EventHandler<()>,
    on_dtmf: EventHandler<char>
) -> Element {
    let control_state = CallControlState::from_view(&view);
    let peer_text = peer.read().clone();

    rsx! {
        div {
            style: "display: flex; flex-direction: column; gap: 16px;",

            UserInfoBar {
                registered_label: view.registered_label(),
                registration: view.registration,
            }

            CallStatus {
                call: view.call,
                peer: peer_text,
                in_call_since: view.in_call_since,
            }

            CallControls {
                control_state: control_state,
                peer: peer,
                video: video,
                on_call: on_call,
                on_hangup: on_hangup,
            }

            MediaPanelView {
                media: view.media.clone(),
                on_dtmf: on_dtmf,
            }
        }
    }
}
