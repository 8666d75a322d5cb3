use dioxus::prelude::*;

use crate::state::IncomingCallPrompt;

#[component]
pub fn IncomingCallScreen(
    prompt: IncomingCallPrompt,
    on_answer: EventHandler<()>,
    on_decline: EventHandler<()>
) -> Element {
    let media_text = match (prompt.audio, prompt.video) {
        (true, true) => "Audio and video",
        (true, false) => "Audio only",
        (false, true) => "Video only",
        (false, false) => "No media offered",
    };

    rsx! {
        div {
            class: "overlay",

            div {
                style: "
                    background: white;
                    border-radius: 12px;
                    padding: 48px 32px;
                    box-shadow: 0 4px 12px rgba(0, 0, 0, 0.15);
                    border: 1px solid #E2E8F0;
                    text-align: center;
                    animation: pulse 2s infinite;
                    max-width: 420px;
                ",

                div {
                    style: "margin-bottom: 32px;",

                    h2 {
                        style: "
                            font-size: 1.75rem;
                            font-weight: 500;
                            color: #1E293B;
                            margin: 0 0 16px 0;
                        ",
                        "Incoming call"
                    }

                    p {
                        style: "
                            font-size: 1.125rem;
                            color: #059669;
                            margin: 0 0 8px 0;
                            font-weight: 500;
                            word-break: break-all;
                        ",
                        "{prompt.message()}"
                    }

                    p {
                        style: "font-size: 0.875rem; color: #64748B; margin: 0;",
                        "{media_text}"
                    }
                }

                div {
                    style: "display: flex; gap: 16px; justify-content: center;",

                    button {
                        class: "btn btn-success",
                        style: "min-width: 120px;",
                        onclick: move |_| on_answer.call(()),
                        "Answer"
                    }

                    button {
                        class: "btn btn-danger",
                        style: "min-width: 120px;",
                        onclick: move |_| on_decline.call(()),
                        "Decline"
                    }
                }
            }
        }
    }
}
