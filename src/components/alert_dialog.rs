use dioxus::prelude::*;

#[component]
pub fn AlertDialog(message: String, on_close: EventHandler<()>) -> Element {
    rsx! {
        // Backdrop
        div {
            class: "overlay",
            onclick: move |_| on_close.call(()),

            // Dialog
            div {
                class: "dialog",
                onclick: move |e| e.stop_propagation(),

                p {
                    style: "color: #1E293B; margin: 0 0 24px 0; white-space: pre-wrap; word-break: break-word;",
                    "{message}"
                }

                div {
                    style: "display: flex; justify-content: flex-end;",
                    button {
                        class: "btn btn-primary",
                        onclick: move |_| on_close.call(()),
                        "OK"
                    }
                }
            }
        }
    }
}

/// Yes/no question; closing the backdrop counts as "no".
#[component]
pub fn ConfirmDialog(message: String, on_answer: EventHandler<bool>) -> Element {
    rsx! {
        div {
            class: "overlay",
            onclick: move |_| on_answer.call(false),

            div {
                class: "dialog",
                onclick: move |e| e.stop_propagation(),

                p {
                    style: "color: #1E293B; margin: 0 0 24px 0; white-space: pre-wrap;",
                    "{message}"
                }

                div {
                    style: "display: flex; gap: 12px; justify-content: flex-end;",
                    button {
                        class: "btn btn-light",
                        onclick: move |_| on_answer.call(false),
                        "Cancel"
                    }
                    button {
                        class: "btn btn-primary",
                        onclick: move |_| on_answer.call(true),
                        "OK"
                    }
                }
            }
        }
    }
}
