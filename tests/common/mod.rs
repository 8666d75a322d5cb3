#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::mpsc::UnboundedReceiver;

use janus_sip_phone::call_controller::CallController;
use janus_sip_phone::config::PhoneConfig;
use janus_sip_phone::error::PhoneError;
use janus_sip_phone::event_channel::EventChannel;
use janus_sip_phone::event_handler::{EventForwarder, PhoneEvent};
use janus_sip_phone::gateway::{Gateway, GatewayError, GatewayEvent, GatewaySession, PluginHandle};
use janus_sip_phone::media::{Jsep, MediaEngine, MediaError, MediaRequest};
use janus_sip_phone::registration::{RegistrationApproach, RegistrationForm};
use janus_sip_phone::state::Notice;
use janus_sip_phone::PhoneCommand;

pub const SESSION_ID: u64 = 4242;
pub const HANDLE_ID: u64 = 77;

pub const AUDIO_OFFER: &str = "v=0\r\nm=audio 9 UDP/TLS/RTP/SAVPF 111\r\n";
pub const AUDIO_VIDEO_OFFER: &str = "v=0\r\nm=audio 9 UDP/TLS/RTP/SAVPF 111\r\nm=video 9 UDP/TLS/RTP/SAVPF 96\r\n";

/// Everything the fake gateway saw.
#[derive(Default)]
pub struct Recorder {
    pub messages: Mutex<Vec<(Value, Option<Jsep>)>>,
    pub webrtc_hangups: AtomicUsize,
    pub sessions_created: AtomicUsize,
    pub destroyed: AtomicBool,
    pub fail_create: AtomicBool,
    pub fail_attach: AtomicBool,
    pub fail_sends: AtomicBool,
}

impl Recorder {
    pub fn bodies(&self) -> Vec<Value> {
        self.messages.lock().unwrap().iter().map(|(body, _)| body.clone()).collect()
    }

    pub fn requests(&self) -> Vec<String> {
        self.bodies()
            .iter()
            .map(|body| body["request"].as_str().unwrap_or_default().to_string())
            .collect()
    }

    pub fn last(&self) -> (Value, Option<Jsep>) {
        self.messages.lock().unwrap().last().cloned().expect("no message sent")
    }
}

pub struct FakeGateway {
    pub recorder: Arc<Recorder>,
}

#[async_trait]
impl Gateway for FakeGateway {
    async fn create_session(&self, _events: EventForwarder) -> Result<Arc<dyn GatewaySession>, GatewayError> {
        if self.recorder.fail_create.load(Ordering::SeqCst) {
            return Err(GatewayError::Unreachable("Lost connection to the server (is it down?)".into()));
        }
        self.recorder.sessions_created.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(FakeSession { recorder: self.recorder.clone() }))
    }
}

pub struct FakeSession {
    recorder: Arc<Recorder>,
}

#[async_trait]
impl GatewaySession for FakeSession {
    fn id(&self) -> u64 {
        SESSION_ID
    }

    async fn attach(&self, plugin: &str, _opaque_id: &str) -> Result<Arc<dyn PluginHandle>, GatewayError> {
        if self.recorder.fail_attach.load(Ordering::SeqCst) {
            return Err(GatewayError::Janus { code: 460, reason: format!("No such plugin '{}'", plugin) });
        }
        Ok(Arc::new(FakePlugin { recorder: self.recorder.clone(), plugin: plugin.to_string() }))
    }

    async fn destroy(&self) -> Result<(), GatewayError> {
        self.recorder.destroyed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

pub struct FakePlugin {
    recorder: Arc<Recorder>,
    plugin: String,
}

#[async_trait]
impl PluginHandle for FakePlugin {
    fn id(&self) -> u64 {
        HANDLE_ID
    }

    fn plugin(&self) -> &str {
        &self.plugin
    }

    async fn send_message(&self, body: Value, jsep: Option<Jsep>) -> Result<(), GatewayError> {
        if self.recorder.fail_sends.load(Ordering::SeqCst) {
            return Err(GatewayError::UnexpectedResponse("connection reset".into()));
        }
        self.recorder.messages.lock().unwrap().push((body, jsep));
        Ok(())
    }

    async fn hangup(&self) -> Result<(), GatewayError> {
        self.recorder.webrtc_hangups.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn detach(&self) -> Result<(), GatewayError> {
        Ok(())
    }
}

/// Media engine that produces canned descriptions.
#[derive(Default)]
pub struct FakeMedia {
    pub unsupported: AtomicBool,
    pub fail_offer: AtomicBool,
    pub fail_answer: AtomicBool,
    pub fail_remote: AtomicBool,
    pub inband_dtmf: AtomicBool,
    pub offers: Mutex<Vec<MediaRequest>>,
    pub answers: Mutex<Vec<MediaRequest>>,
    pub tones: Mutex<Vec<String>>,
    pub closes: AtomicUsize,
}

#[async_trait]
impl MediaEngine for FakeMedia {
    fn is_supported(&self) -> bool {
        !self.unsupported.load(Ordering::SeqCst)
    }

    async fn create_offer(&self, media: MediaRequest) -> Result<Jsep, MediaError> {
        if self.fail_offer.load(Ordering::SeqCst) {
            return Err(MediaError::PermissionDenied("NotAllowedError".into()));
        }
        self.offers.lock().unwrap().push(media);
        Ok(Jsep::offer(if media.wants_video() { AUDIO_VIDEO_OFFER } else { AUDIO_OFFER }))
    }

    async fn create_answer(&self, _offer: &Jsep, media: MediaRequest) -> Result<Jsep, MediaError> {
        if self.fail_answer.load(Ordering::SeqCst) {
            return Err(MediaError::PermissionDenied("NotAllowedError".into()));
        }
        self.answers.lock().unwrap().push(media);
        Ok(Jsep::answer(AUDIO_OFFER))
    }

    async fn handle_remote_jsep(&self, _jsep: &Jsep) -> Result<(), MediaError> {
        if self.fail_remote.load(Ordering::SeqCst) {
            return Err(MediaError::Negotiation("bad answer".into()));
        }
        Ok(())
    }

    async fn insert_dtmf(&self, tones: &str) -> Result<bool, MediaError> {
        if !self.inband_dtmf.load(Ordering::SeqCst) {
            return Ok(false);
        }
        self.tones.lock().unwrap().push(tones.to_string());
        Ok(true)
    }

    async fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

/// A controller wired to the fakes.
pub struct Phone {
    pub controller: CallController,
    pub notices: UnboundedReceiver<Notice>,
    pub recorder: Arc<Recorder>,
    pub media: Arc<FakeMedia>,
    pub channel: EventChannel,
}

pub fn phone() -> Phone {
    let recorder = Arc::new(Recorder::default());
    let media = Arc::new(FakeMedia::default());
    let channel = EventChannel::new();
    let (controller, notices) = CallController::new(
        PhoneConfig::default(),
        Arc::new(FakeGateway { recorder: recorder.clone() }),
        media.clone(),
        channel.forwarder(),
    );
    Phone { controller, notices, recorder, media, channel }
}

pub fn form(server: &str, username: &str, secret: &str) -> RegistrationForm {
    RegistrationForm {
        server: server.to_string(),
        username: username.to_string(),
        display_name: String::new(),
        secret: secret.to_string(),
    }
}

impl Phone {
    pub fn drain(&mut self) -> Vec<Notice> {
        let mut notices = Vec::new();
        while let Ok(notice) = self.notices.try_recv() {
            notices.push(notice);
        }
        notices
    }

    pub fn alerts(&mut self) -> Vec<String> {
        self.drain()
            .into_iter()
            .filter_map(|notice| match notice {
                Notice::Alert(message) => Some(message),
                _ => None,
            })
            .collect()
    }

    pub async fn run(&mut self, command: PhoneCommand) -> Result<(), PhoneError> {
        self.controller.execute(command).await
    }

    pub async fn plugin_event(&mut self, result: Value, jsep: Option<Jsep>) -> Result<(), PhoneError> {
        self.controller
            .handle_event(PhoneEvent::Gateway(GatewayEvent::PluginMessage {
                handle_id: HANDLE_ID,
                data: json!({ "sip": "event", "result": result }),
                jsep,
            }))
            .await
    }

    pub async fn started(mut self) -> Self {
        self.run(PhoneCommand::Start).await.expect("start");
        self.drain();
        self
    }

    /// Started, registered as alice, notices drained.
    pub async fn registered(mut self) -> Self {
        self = self.started().await;
        self.run(PhoneCommand::SelectApproach(RegistrationApproach::Secret)).await.expect("approach");
        self.run(PhoneCommand::Register(form("sip:10.0.0.1:5060", "sip:alice@example.com", "pw")))
            .await
            .expect("register");
        self.plugin_event(json!({ "event": "registered", "username": "alice" }), None)
            .await
            .expect("registered");
        self.recorder.messages.lock().unwrap().clear();
        self.drain();
        self
    }

    /// Registered with an incoming call waiting to be answered.
    pub async fn ringing(mut self, sdp: &str) -> Self {
        self = self.registered().await;
        self.plugin_event(
            json!({ "event": "incomingcall", "username": "sip:bob@example.com" }),
            Some(Jsep::offer(sdp)),
        )
        .await
        .expect("incomingcall");
        self.drain();
        self
    }
}
