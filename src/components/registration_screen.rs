use dioxus::events::Key;
use dioxus::prelude::*;

use crate::registration::RegistrationApproach;
use crate::state::{LoginForm, RegistrationState};

#[component]
pub fn RegistrationScreen(
    mut server: Signal<String>,
    mut username: Signal<String>,
    mut display_name: Signal<String>,
    mut secret: Signal<String>,
    login: LoginForm,
    registration: RegistrationState,
    on_select_approach: EventHandler<RegistrationApproach>,
    on_register: EventHandler<()>,
) -> Element {
    let enabled = login.enabled;
    let secret_enabled = login.secret_enabled();

    let description = login
        .approach
        .map(|approach| approach.description())
        .unwrap_or("Pick how to authenticate with your SIP server");

    let (status_text, status_color, status_bg) = match registration {
        RegistrationState::Unregistered => ("Not registered", "#64748B", "#F8FAFC"),
        RegistrationState::Registering => ("Registering with server...", "#D97706", "#FFFBEB"),
        RegistrationState::Registered => ("Registered", "#059669", "#F0FDF4"),
        RegistrationState::Failed => ("Registration failed", "#DC2626", "#FEF2F2"),
    };

    let submit = move |evt: KeyboardEvent| {
        if evt.key() == Key::Enter && enabled {
            on_register.call(());
        }
    };

    let input_style = "width: 100%; padding: 10px 12px; border: 1px solid #CBD5E1; border-radius: 6px; font-size: 14px; box-sizing: border-box;";

    rsx! {
        div {
            class: "card",
            style: "padding: 20px;",

            h2 {
                style: "margin: 0 0 12px 0; font-size: 18px; color: #1E293B;",
                "SIP Registration"
            }

            div {
                style: "margin-bottom: 12px;",
                select {
                    style: "{input_style}",
                    disabled: !enabled,
                    oninput: move |evt| {
                        if let Ok(approach) = evt.value().parse::<RegistrationApproach>() {
                            on_select_approach.call(approach);
                        }
                    },
                    option {
                        value: "",
                        selected: login.approach.is_none(),
                        "Registration approach"
                    }
                    for approach in RegistrationApproach::ALL {
                        option {
                            key: "{approach.id()}",
                            value: approach.id(),
                            selected: login.approach == Some(approach),
                            "{approach.label()}"
                        }
                    }
                }
                p {
                    style: "margin: 6px 0 0 0; font-size: 12px; color: #64748B;",
                    "{description}"
                }
            }

            div {
                style: "display: flex; flex-direction: column; gap: 10px;",
                input {
                    style: "{input_style}",
                    placeholder: "SIP registrar (e.g., sip:host:port)",
                    disabled: !enabled,
                    value: "{server}",
                    oninput: move |evt| server.set(evt.value()),
                    onkeypress: submit,
                }
                input {
                    style: "{input_style}",
                    placeholder: "SIP identity (e.g., sip:goofy@example.com)",
                    disabled: !enabled,
                    value: "{username}",
                    oninput: move |evt| username.set(evt.value()),
                    onkeypress: submit,
                }
                input {
                    style: "{input_style}",
                    r#type: "password",
                    placeholder: "Secret (e.g., mysecret)",
                    disabled: !secret_enabled,
                    value: "{secret}",
                    oninput: move |evt| secret.set(evt.value()),
                    onkeypress: submit,
                }
                input {
                    style: "{input_style}",
                    placeholder: "Display name (e.g., Alice Smith)",
                    disabled: !enabled,
                    value: "{display_name}",
                    oninput: move |evt| display_name.set(evt.value()),
                    onkeypress: submit,
                }
            }

            div {
                style: "margin-top: 12px; padding: 8px 12px; border-radius: 6px; font-size: 13px; color: {status_color}; background: {status_bg};",
                "{status_text}"
            }

            button {
                class: if enabled { "btn btn-success" } else { "btn btn-disabled" },
                style: "margin-top: 12px; width: 100%;",
                disabled: !enabled,
                onclick: move |_| on_register.call(()),
                if registration == RegistrationState::Registering { "Registering..." } else { "Register" }
            }
        }
    }
}
