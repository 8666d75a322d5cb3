use dioxus::prelude::*;

use crate::state::RegistrationState;

#[component]
pub fn UserInfoBar(
    #[props(!optional)] registered_label: Option<String>,
    registration: RegistrationState
) -> Element {
    let status_text = match registration {
        RegistrationState::Unregistered => "Not registered",
        RegistrationState::Registering => "Registering...",
        RegistrationState::Registered => "Registered",
        RegistrationState::Failed => "Registration failed",
    };

    rsx! {
        div {
            class: "card info-bar",
            div {
                class: "info-title",
                {registered_label.unwrap_or_else(|| "Not registered yet".to_string())}
            }
            div {
                class: "info-status",
                "{status_text}"
            }
        }
    }
}
