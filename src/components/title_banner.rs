use dioxus::prelude::*;

#[component]
pub fn TitleBanner(start_label: String, start_enabled: bool, on_toggle: EventHandler<()>) -> Element {
    rsx! {
        div {
            class: "banner",
            span { "SIP Gateway Phone" }
            button {
                class: if start_enabled { "btn btn-light" } else { "btn btn-disabled" },
                disabled: !start_enabled,
                onclick: move |_| if start_enabled { on_toggle.call(()) },
                "{start_label}"
            }
        }
    }
}
