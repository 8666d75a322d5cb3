use dioxus::prelude::*;

use crate::validation::DTMF_DIGITS;

#[component]
pub fn DtmfPad(on_digit: EventHandler<char>) -> Element {
    rsx! {
        div {
            class: "dtmf-pad",
            for digit in DTMF_DIGITS {
                button {
                    key: "{digit}",
                    class: "btn btn-light",
                    onclick: move |_| on_digit.call(digit),
                    "{digit}"
                }
            }
        }
    }
}
