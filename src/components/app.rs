use std::sync::Arc;

use dioxus::prelude::*;
use futures_util::StreamExt;
use log::{debug, error, info, warn};

use super::{AlertDialog, CallInterfaceScreen, ConfirmDialog, IncomingCallScreen, RegistrationScreen, TitleBanner};
use crate::call_controller::CallController;
use crate::commands::PhoneCommand;
use crate::config::PhoneConfig;
use crate::event_channel::EventChannel;
use crate::gateway::HttpGateway;
use crate::media::NoWebRtc;
use crate::registration::RegistrationForm;
use crate::state::{Notice, PhoneView, SessionPhase};

const PROXY_LOOKUP_QUESTION: &str = "You didn't specify a SIP Registrar to use: this will cause the plugin to try and conduct a standard (RFC 3263) lookup. If this is not what you want or you don't know what this means, hit Cancel and provide a SIP Registrar instead.";

#[component]
pub fn App() -> Element {
    let mut view = use_signal(PhoneView::default);
    let mut alert = use_signal(|| None::<String>);

    // Form fields
    let server = use_signal(String::new);
    let username = use_signal(String::new);
    let display_name = use_signal(String::new);
    let secret = use_signal(String::new);
    let peer = use_signal(String::new);
    let video = use_signal(|| false);

    // The coroutine owns the CallController and serializes commands and events
    let phone = use_coroutine({
        let mut server = server.clone();
        let mut username = username.clone();
        let mut display_name = display_name.clone();
        let mut secret = secret.clone();
        let mut peer = peer.clone();
        let mut video = video.clone();

        move |mut rx: UnboundedReceiver<PhoneCommand>| async move {
            let config = match PhoneConfig::from_env() {
                Ok(config) => config,
                Err(e) => {
                    error!("Invalid configuration: {:#}", e);
                    alert.set(Some(format!("Invalid configuration: {:#}", e)));
                    PhoneConfig::default()
                }
            };

            let gateway = match HttpGateway::new(&config) {
                Ok(gateway) => gateway,
                Err(e) => {
                    error!("Failed to build the HTTP client: {}", e);
                    alert.set(Some(e.to_string()));
                    return;
                }
            };

            let channel = EventChannel::new();
            let forwarder = channel.forwarder();
            let mut event_receiver = channel.receiver;

            let (mut controller, mut notices) =
                CallController::new(config, Arc::new(gateway), Arc::new(NoWebRtc), forwarder);
            info!("Phone controller ready, servers: {:?}", controller.config().servers);

            loop {
                tokio::select! {
                    command = rx.next() => {
                        let Some(command) = command else {
                            info!("UI closed, stopping phone controller");
                            break;
                        };
                        if let Err(e) = controller.execute(command).await {
                            warn!("Command failed: {}", e);
                        }
                    }
                    Some(event) = event_receiver.recv() => {
                        if let Err(e) = controller.handle_event(event).await {
                            warn!("Event handling failed: {}", e);
                        }
                    }
                }

                while let Ok(notice) = notices.try_recv() {
                    match notice {
                        Notice::Alert(message) => alert.set(Some(message)),
                        Notice::ClearSecret => secret.set(String::new()),
                        Notice::FillPeer(caller) => peer.set(caller),
                        Notice::ResetCallForm => {
                            peer.set(String::new());
                            video.set(false);
                        }
                        Notice::SessionClosed => {
                            server.set(String::new());
                            username.set(String::new());
                            display_name.set(String::new());
                            secret.set(String::new());
                            peer.set(String::new());
                            video.set(false);
                        }
                        Notice::PhoneRevealed => info!("Registered, call controls available"),
                        Notice::Focus(field) => debug!("Focus moved to {:?}", field),
                        Notice::IncomingDismissed => debug!("Incoming call prompt dismissed"),
                    }
                }

                view.set(controller.view().clone());
            }

            if controller.is_started() {
                if let Err(e) = controller.stop().await {
                    error!("Failed to stop session: {}", e);
                }
            }
        }
    });

    let on_register = move |_| {
        let form = RegistrationForm {
            server: server.read().clone(),
            username: username.read().clone(),
            display_name: display_name.read().clone(),
            secret: secret.read().clone(),
        };
        phone.send(PhoneCommand::Register(form));
    };

    let on_call = move |_| {
        phone.send(PhoneCommand::Call {
            peer: peer.read().clone(),
            video: *video.read(),
        });
    };

    let current = view.read().clone();
    let started = current.phase != SessionPhase::Stopped;
    let incoming = current.incoming.clone();
    let alert_message = alert.read().clone();

    rsx! {
        style {
            {include_str!("../../assets/phone.css")}
        }

        div {
            class: "phone-app",

            TitleBanner {
                start_label: current.start_label().to_string(),
                start_enabled: current.start_enabled,
                on_toggle: move |_| phone.send(if started { PhoneCommand::Stop } else { PhoneCommand::Start }),
            }

            div {
                class: "phone-body",

                if current.login.visible {
                    RegistrationScreen {
                        server: server,
                        username: username,
                        display_name: display_name,
                        secret: secret,
                        login: current.login.clone(),
                        registration: current.registration,
                        on_select_approach: move |approach| phone.send(PhoneCommand::SelectApproach(approach)),
                        on_register: on_register,
                    }
                }

                if current.phone_visible {
                    CallInterfaceScreen {
                        view: current.clone(),
                        peer: peer,
                        video: video,
                        on_call: on_call,
                        on_hangup: move |_| phone.send(PhoneCommand::Hangup),
                        on_dtmf: move |digit| phone.send(PhoneCommand::Dtmf(digit)),
                    }
                }
            }

            if current.consent_pending {
                div {
                    class: "overlay",
                    div {
                        style: "color: white; font-size: 18px; text-align: center; max-width: 360px;",
                        "Allow access to your microphone and camera to continue"
                    }
                }
            }

            {incoming.map(|prompt| rsx! {
                IncomingCallScreen {
                    prompt: prompt,
                    on_answer: move |_| phone.send(PhoneCommand::Accept),
                    on_decline: move |_| phone.send(PhoneCommand::Decline),
                }
            })}

            if current.confirm_proxy_lookup {
                ConfirmDialog {
                    message: PROXY_LOOKUP_QUESTION.to_string(),
                    on_answer: move |proceed| phone.send(PhoneCommand::ConfirmProxyLookup(proceed)),
                }
            }

            {alert_message.map(|message| rsx! {
                AlertDialog {
                    message: message,
                    on_close: move |_| alert.set(None),
                }
            })}
        }
    }
}
