use dioxus::prelude::*;

use super::DtmfPad;
use crate::state::MediaPanel;

#[component]
pub fn MediaPanelView(media: MediaPanel, on_dtmf: EventHandler<char>) -> Element {
    if !media.visible {
        return rsx! {};
    }

    let local_text = match media.local_video {
        Some(true) => "Local video",
        Some(false) => "No webcam available",
        None => "",
    };

    let remote_text = match (media.remote_waiting, media.remote_video) {
        (true, _) => "Waiting for remote video...",
        (false, Some(true)) => "Remote video",
        (false, Some(false)) => "No remote video available",
        (false, None) => "",
    };

    rsx! {
        div {
            class: "media-grid",

            div {
                class: "card",
                h3 { class: "media-title", "Local UA" }
                div {
                    class: "video-box",
                    "{local_text}"
                }
            }

            div {
                class: "card",
                h3 {
                    class: "media-title",
                    if media.dtmf_pad { "Remote UA · Send DTMF:" } else { "Remote UA" }
                }
                div {
                    class: "video-box",
                    if media.remote_waiting {
                        div { class: "spinner" }
                    }
                    "{remote_text}"
                }
                if media.dtmf_pad {
                    DtmfPad { on_digit: move |digit| on_dtmf.call(digit) }
                }
            }
        }
    }
}
