use std::time::Duration;

use chrono::{DateTime, Utc};
use dioxus::prelude::*;

use crate::state::CallState;

fn format_elapsed(since: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - since).num_seconds().max(0);
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[component]
pub fn CallStatus(
    call: CallState,
    peer: String,
    #[props(!optional)] in_call_since: Option<DateTime<Utc>>
) -> Element {
    // Re-render once a second while the call is up
    let mut tick = use_signal(|| 0u64);
    use_future(move || async move {
        loop {
            tokio::time::sleep(Duration::from_secs(1)).await;
            tick += 1;
        }
    });

    // Subscribes this component to the ticker
    let _tick = tick();
    let status_text = match call {
        CallState::Idle => return rsx! { div {} },
        CallState::Calling => "Calling...".to_string(),
        CallState::IncomingPending => "Incoming call...".to_string(),
        CallState::InCall => match in_call_since {
            Some(since) => format!("Connected • {}", format_elapsed(since, Utc::now())),
            None => "Connected".to_string(),
        },
        CallState::HungUp => "Call ended".to_string(),
    };

    let status_icon = match call {
        CallState::Calling => "🔄",
        CallState::IncomingPending => "🔔",
        _ => "",
    };

    rsx! {
        div {
            class: "card",
            style: "padding: 24px; text-align: center;",

            if !peer.is_empty() {
                h2 {
                    style: "margin: 0 0 8px 0; font-size: 20px; color: #1E293B; word-break: break-all;",
                    "{peer}"
                }
            }

            div {
                style: "display: flex; align-items: center; justify-content: center; gap: 8px; color: #64748B;",
                if !status_icon.is_empty() {
                    span { "{status_icon}" }
                }
                span { "{status_text}" }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_elapsed() {
        let since = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 2, 5).unwrap();
        assert_eq!(format_elapsed(since, now), "02:05");
        // Clock skew never shows a negative timer
        assert_eq!(format_elapsed(now, since), "00:00");
    }
}
