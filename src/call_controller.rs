use std::sync::Arc;

use log::{debug, error, info, warn};
use tokio::sync::mpsc;

use crate::commands::PhoneCommand;
use crate::config::PhoneConfig;
use crate::error::PhoneError;
use crate::event_handler::{EventForwarder, PhoneEvent};
use crate::gateway::{Gateway, GatewayError, GatewayEvent, GatewaySession, PluginHandle};
use crate::media::{Jsep, MediaEngine, MediaError, MediaEvent, MediaRequest};
use crate::registration::{RegistrationApproach, RegistrationForm, RegistrationPlan};
use crate::sip_messages::{PluginMessage, SipEvent, SipRequest};
use crate::state::{
    CallButton, CallState, Field, IncomingCallPrompt, MediaPanel, Notice, PhoneView, RegistrationState, SessionPhase,
};
use crate::validation::{validate_dtmf_digit, validate_peer};

/// Drives the SIP plugin on behalf of the UI.
///
/// One task owns the controller and feeds it user commands and queued
/// gateway/media events one at a time. State only moves when the plugin
/// confirms it; every failure is alerted and leaves the controls usable.
pub struct CallController {
    config: PhoneConfig,
    gateway: Arc<dyn Gateway>,
    media: Arc<dyn MediaEngine>,
    events: EventForwarder,
    notices: mpsc::UnboundedSender<Notice>,
    session: Option<Arc<dyn GatewaySession>>,
    plugin: Option<Arc<dyn PluginHandle>>,
    view: PhoneView,
    approach: Option<RegistrationApproach>,
    pending_registration: Option<SipRequest>,
    incoming_offer: Option<Jsep>,
    // Sticky: the phone is revealed only once per session
    registered: bool,
}

impl CallController {
    pub fn new(
        config: PhoneConfig,
        gateway: Arc<dyn Gateway>,
        media: Arc<dyn MediaEngine>,
        events: EventForwarder,
    ) -> (Self, mpsc::UnboundedReceiver<Notice>) {
        let (notices, notice_receiver) = mpsc::unbounded_channel();
        let controller = Self {
            config,
            gateway,
            media,
            events,
            notices,
            session: None,
            plugin: None,
            view: PhoneView::default(),
            approach: None,
            pending_registration: None,
            incoming_offer: None,
            registered: false,
        };
        (controller, notice_receiver)
    }

    pub fn view(&self) -> &PhoneView {
        &self.view
    }

    pub fn config(&self) -> &PhoneConfig {
        &self.config
    }

    pub fn is_started(&self) -> bool {
        self.session.is_some()
    }

    pub async fn execute(&mut self, command: PhoneCommand) -> Result<(), PhoneError> {
        debug!("Executing {:?}", command);
        match command {
            PhoneCommand::Start => self.start().await,
            PhoneCommand::Stop => self.stop().await,
            PhoneCommand::SelectApproach(approach) => {
                self.select_approach(approach);
                Ok(())
            }
            PhoneCommand::Register(form) => self.register(form).await,
            PhoneCommand::ConfirmProxyLookup(proceed) => self.confirm_proxy_lookup(proceed).await,
            PhoneCommand::Call { peer, video } => self.call(&peer, video).await,
            PhoneCommand::Accept => self.accept().await,
            PhoneCommand::Decline => self.decline().await,
            PhoneCommand::Hangup => self.hangup().await,
            PhoneCommand::Dtmf(digit) => self.send_dtmf(digit).await,
        }
    }

    pub async fn start(&mut self) -> Result<(), PhoneError> {
        if self.view.phase != SessionPhase::Stopped {
            debug!("Start ignored, session phase is {:?}", self.view.phase);
            return Ok(());
        }
        self.view.phase = SessionPhase::Starting;
        self.view.start_enabled = false;

        if !self.media.is_supported() {
            return Err(self.fail_start(PhoneError::WebRtcUnsupported));
        }

        let session = match self.gateway.create_session(self.events.clone()).await {
            Ok(session) => session,
            Err(e) => {
                error!("Failed to create session: {}", e);
                return Err(self.fail_start(e.into()));
            }
        };

        let plugin = match session.attach(&self.config.plugin, &self.config.opaque_id).await {
            Ok(plugin) => plugin,
            Err(e) => {
                error!("  -- Error attaching plugin... {}", e);
                if let Err(e) = session.destroy().await {
                    warn!("Failed to destroy session {}: {}", session.id(), e);
                }
                return Err(self.fail_start(PhoneError::Attach(e)));
            }
        };

        info!("Plugin attached! ({}, id={})", plugin.plugin(), plugin.id());
        self.session = Some(session);
        self.plugin = Some(plugin);

        self.view.phase = SessionPhase::Ready;
        self.view.start_enabled = true;
        self.view.login.visible = true;
        self.view.login.enabled = true;
        self.notify(Notice::Focus(Field::Server));
        Ok(())
    }

    pub async fn stop(&mut self) -> Result<(), PhoneError> {
        let Some(session) = self.session.clone() else {
            debug!("Stop ignored, no session");
            return Ok(());
        };
        self.view.phase = SessionPhase::Stopping;
        self.view.start_enabled = false;

        self.media.close().await;
        let result = session.destroy().await;
        self.reset();
        self.notify(Notice::SessionClosed);

        result.map_err(|e| {
            error!("Failed to destroy session {}: {}", session.id(), e);
            let error = PhoneError::from(e);
            self.alert(error.to_string());
            error
        })
    }

    pub fn select_approach(&mut self, approach: RegistrationApproach) {
        info!("Registration approach: {}", approach);
        self.approach = Some(approach);
        self.view.login.approach = Some(approach);
        if !approach.uses_secret() {
            self.notify(Notice::ClearSecret);
        }
    }

    pub async fn register(&mut self, form: RegistrationForm) -> Result<(), PhoneError> {
        self.require_attached()?;
        if !self.view.login.enabled {
            debug!("Registration already outstanding");
            return Ok(());
        }

        let plan = match form.plan(self.approach) {
            Ok(plan) => plan,
            Err(e) => {
                warn!("Registration rejected: {}", e);
                self.alert(e.to_string());
                return Err(e.into());
            }
        };

        self.view.login.enabled = false;
        match plan {
            RegistrationPlan::Send(request) => self.send_registration(request).await,
            RegistrationPlan::ConfirmProxyLookup(request) => {
                self.pending_registration = Some(request);
                self.view.confirm_proxy_lookup = true;
                Ok(())
            }
        }
    }

    pub async fn confirm_proxy_lookup(&mut self, proceed: bool) -> Result<(), PhoneError> {
        self.view.confirm_proxy_lookup = false;
        let Some(request) = self.pending_registration.take() else {
            return Ok(());
        };

        if proceed {
            self.send_registration(request).await
        } else {
            self.view.login.enabled = true;
            Ok(())
        }
    }

    async fn send_registration(&mut self, request: SipRequest) -> Result<(), PhoneError> {
        match self.send(&request, None).await {
            Ok(()) => {
                self.view.registration = RegistrationState::Registering;
                Ok(())
            }
            Err(e) => {
                error!("Failed to send registration: {}", e);
                self.view.login.enabled = true;
                self.alert(e.to_string());
                Err(e)
            }
        }
    }

    pub async fn call(&mut self, peer: &str, video: bool) -> Result<(), PhoneError> {
        self.require_attached()?;
        if !self.registered {
            return Err(self.refuse(PhoneError::NotRegistered));
        }
        if !self.view.call.is_free() || !self.view.call_enabled {
            return Err(self.refuse(PhoneError::CallInProgress));
        }

        self.view.call_enabled = false;
        self.view.peer_enabled = false;
        self.view.video_enabled = false;

        let uri = match validate_peer(peer) {
            Ok(uri) => uri,
            Err(e) => {
                self.restore_call_controls();
                if !peer.trim().is_empty() {
                    self.notify(Notice::ResetCallForm);
                }
                self.alert(e.to_string());
                return Err(e.into());
            }
        };

        info!("This is a SIP {} call (dovideo={})", if video { "video" } else { "audio" }, video);
        let offer = match self.media.create_offer(MediaRequest::outgoing(video)).await {
            Ok(offer) => offer,
            Err(e) => {
                error!("WebRTC error... {}", e);
                self.restore_call_controls();
                let error = PhoneError::from(e);
                self.alert(error.to_string());
                return Err(error);
            }
        };

        let request = SipRequest::Call {
            uri,
            srtp: self.config.call_srtp,
            headers: self.config.call_headers.clone(),
        };
        if let Err(e) = self.send(&request, Some(offer)).await {
            error!("Failed to send call: {}", e);
            self.media.close().await;
            self.restore_call_controls();
            self.alert(e.to_string());
            return Err(e);
        }
        Ok(())
    }

    pub async fn accept(&mut self) -> Result<(), PhoneError> {
        self.require_attached()?;
        let Some(prompt) = self.view.incoming.take() else {
            return Err(self.refuse(PhoneError::NoIncomingCall));
        };
        let offer = self.incoming_offer.take();

        self.notify(Notice::FillPeer(prompt.caller.clone()));
        self.view.peer_enabled = false;

        let answer = match offer {
            Some(offer) => {
                self.media
                    .create_answer(&offer, MediaRequest::answering(prompt.audio, prompt.video))
                    .await
            }
            None => Err(MediaError::Negotiation("the incoming call carried no offer".to_string())),
        };

        let answer = match answer {
            Ok(answer) => answer,
            Err(e) => {
                error!("WebRTC error: {}", e);
                let error = PhoneError::from(e);
                self.alert(error.to_string());
                // 480 rather than the default 486 tells the caller why
                if let Err(e) = self.send(&SipRequest::Decline { code: Some(480) }, None).await {
                    warn!("Failed to decline call: {}", e);
                }
                self.view.call = CallState::Idle;
                self.reset_call_controls();
                return Err(error);
            }
        };

        debug!("Got SDP! audio={}, video={}", prompt.audio, prompt.video);
        let request = SipRequest::Accept { srtp: self.config.accept_srtp };
        if let Err(e) = self.send(&request, Some(answer)).await {
            error!("Failed to accept call: {}", e);
            self.hangup_webrtc().await;
            self.view.call = CallState::Idle;
            self.reset_call_controls();
            self.alert(e.to_string());
            return Err(e);
        }

        self.view.call_button = CallButton::Hangup;
        self.view.call_enabled = true;
        Ok(())
    }

    pub async fn decline(&mut self) -> Result<(), PhoneError> {
        self.require_attached()?;
        if self.view.incoming.take().is_none() {
            return Err(self.refuse(PhoneError::NoIncomingCall));
        }
        self.incoming_offer = None;
        self.view.call = CallState::Idle;

        self.send(&SipRequest::Decline { code: None }, None).await.map_err(|e| {
            error!("Failed to decline call: {}", e);
            self.alert(e.to_string());
            e
        })
    }

    pub async fn hangup(&mut self) -> Result<(), PhoneError> {
        self.require_attached()?;
        self.view.call_enabled = false;

        let result = self.send(&SipRequest::Hangup, None).await;
        self.hangup_webrtc().await;

        // The button comes back with the plugin's hangup event
        if let Err(e) = &result {
            error!("Failed to send hangup: {}", e);
            self.view.call = CallState::Idle;
            self.reset_call_controls();
            self.alert(e.to_string());
        }
        result
    }

    pub async fn send_dtmf(&mut self, digit: char) -> Result<(), PhoneError> {
        self.require_attached()?;
        let digit = validate_dtmf_digit(digit).map_err(|e| self.refuse(e.into()))?;
        if !self.view.media.dtmf_pad {
            return Err(self.refuse(PhoneError::NoActiveCall));
        }

        let tones = digit.to_string();
        match self.media.insert_dtmf(&tones).await {
            Ok(true) => {
                debug!("Sent inband DTMF {}", digit);
                return Ok(());
            }
            Ok(false) => debug!("Inband DTMF unavailable, using SIP INFO"),
            Err(e) => warn!("Inband DTMF failed ({}), using SIP INFO", e),
        }

        self.send(&SipRequest::DtmfInfo { digit: tones }, None).await.map_err(|e| {
            self.alert(e.to_string());
            e
        })
    }

    /// Single dispatch point for everything arriving asynchronously.
    pub async fn handle_event(&mut self, event: PhoneEvent) -> Result<(), PhoneError> {
        match event {
            PhoneEvent::Gateway(event) => self.handle_gateway_event(event).await,
            PhoneEvent::Media(event) => {
                self.handle_media_event(event);
                Ok(())
            }
        }
    }

    async fn handle_gateway_event(&mut self, event: GatewayEvent) -> Result<(), PhoneError> {
        if self.session.is_none() {
            debug!("Dropping event without a session: {:?}", event);
            return Ok(());
        }

        match event {
            GatewayEvent::PluginMessage { handle_id, data, jsep } => {
                if !self.is_own_handle(handle_id) {
                    debug!("Ignoring message for handle {}", handle_id);
                    return Ok(());
                }
                self.handle_plugin_message(data, jsep).await
            }
            GatewayEvent::WebrtcUp { handle_id } => {
                info!("WebRTC PeerConnection is up for handle {}", handle_id);
                Ok(())
            }
            GatewayEvent::Media { kind, receiving, .. } => {
                info!("Gateway {} receiving our {}", if receiving { "started" } else { "stopped" }, kind);
                Ok(())
            }
            GatewayEvent::PeerHangup { handle_id, reason } => {
                if self.is_own_handle(handle_id) {
                    info!("PeerConnection closed by the gateway ({})", reason);
                    self.media.close().await;
                    self.view.media = MediaPanel::default();
                }
                Ok(())
            }
            GatewayEvent::Detached { handle_id } => {
                if !self.is_own_handle(handle_id) {
                    return Ok(());
                }
                warn!("Plugin handle {} detached", handle_id);
                self.media.close().await;
                // Without the plugin the session is useless
                if let Some(session) = self.session.take() {
                    if let Err(e) = session.destroy().await {
                        warn!("Failed to destroy session {}: {}", session.id(), e);
                    }
                }
                self.reset();
                self.alert("The SIP plugin was detached, press Start to reconnect".to_string());
                self.notify(Notice::SessionClosed);
                Ok(())
            }
            GatewayEvent::SessionError(reason) => {
                error!("Session error: {}", reason);
                let session_id = self.session.as_ref().map(|s| s.id()).unwrap_or_default();
                self.media.close().await;
                self.reset();
                self.alert(reason);
                self.notify(Notice::SessionClosed);
                Err(GatewayError::SessionClosed(session_id).into())
            }
            GatewayEvent::SessionDestroyed => {
                info!("Session destroyed by the gateway");
                self.media.close().await;
                self.reset();
                self.notify(Notice::SessionClosed);
                Ok(())
            }
        }
    }

    async fn handle_plugin_message(&mut self, data: serde_json::Value, jsep: Option<Jsep>) -> Result<(), PhoneError> {
        debug!(" ::: Got a message ::: {}", data);
        let message = match PluginMessage::from_data(&data) {
            Ok(message) => message,
            Err(e) => {
                warn!("Ignoring malformed plugin message: {}", e);
                return Ok(());
            }
        };

        if let Some(reason) = message.error.clone() {
            return Err(self.handle_plugin_error(message.error_code, reason).await);
        }

        let Some(event) = message.event() else {
            return Ok(());
        };

        match event {
            SipEvent::RegistrationFailed { code, reason } => {
                warn!("Registration failed: {} {}", code, reason);
                self.view.registration = RegistrationState::Failed;
                self.view.login.enabled = true;
                let error = PhoneError::Plugin { code: Some(u32::from(code)), reason };
                self.alert(error.to_string());
                return Err(error);
            }
            SipEvent::Registered { username } => {
                info!("Successfully registered as {}!", username);
                self.view.registration = RegistrationState::Registered;
                self.view.registered_as = Some(username);
                if !self.registered {
                    self.registered = true;
                    self.view.phone_visible = true;
                    self.restore_call_controls();
                    self.notify(Notice::PhoneRevealed);
                    self.notify(Notice::Focus(Field::Peer));
                }
            }
            SipEvent::Calling => {
                info!("Waiting for the peer to answer...");
                self.view.call = CallState::Calling;
                self.view.call_button = CallButton::Hangup;
                self.view.call_enabled = true;
            }
            SipEvent::IncomingCall { username, srtp } => {
                info!("Incoming call from {}!", username);
                let (audio, video) = jsep
                    .as_ref()
                    .map(|offer| (offer.has_audio(), offer.has_video()))
                    .unwrap_or((true, true));
                debug!("Audio {} been negotiated", if audio { "has" } else { "has NOT" });
                debug!("Video {} been negotiated", if video { "has" } else { "has NOT" });

                if self.view.incoming.is_some() {
                    self.notify(Notice::IncomingDismissed);
                }
                self.view.incoming = Some(IncomingCallPrompt { caller: username, srtp, audio, video });
                self.incoming_offer = jsep;
                self.view.call = CallState::IncomingPending;
            }
            SipEvent::Accepted { username } => {
                info!("{} accepted the call!", username.as_deref().unwrap_or("The peer"));
                if let Some(answer) = jsep {
                    if let Err(e) = self.media.handle_remote_jsep(&answer).await {
                        error!("Failed to apply the remote description: {}", e);
                        let error = PhoneError::from(e);
                        self.alert(error.to_string());
                        if let Err(e) = self.hangup().await {
                            warn!("Hangup after negotiation failure failed: {}", e);
                        }
                        return Err(error);
                    }
                }
                self.view.call = CallState::InCall;
                self.view.call_button = CallButton::Hangup;
                self.view.call_enabled = true;
                self.view.in_call_since = Some(chrono::Utc::now());
            }
            SipEvent::Hangup { code, reason } => {
                if self.view.incoming.take().is_some() {
                    self.incoming_offer = None;
                    self.notify(Notice::IncomingDismissed);
                }
                info!("Call hung up ({} {})!", code, reason);
                self.alert(format!("{} {}", code, reason));
                self.hangup_webrtc().await;
                self.view.call = CallState::HungUp;
                self.reset_call_controls();
            }
            SipEvent::Other => debug!("Unhandled SIP event: {:?}", message.result),
        }
        Ok(())
    }

    async fn handle_plugin_error(&mut self, code: Option<u32>, reason: String) -> PhoneError {
        error!("Plugin error: {}", reason);
        if !self.registered {
            if self.view.registration == RegistrationState::Registering {
                self.view.registration = RegistrationState::Failed;
            }
            self.view.login.enabled = true;
        } else {
            self.hangup_webrtc().await;
            if self.view.incoming.take().is_some() {
                self.incoming_offer = None;
                self.notify(Notice::IncomingDismissed);
            }
            self.view.call = CallState::Idle;
            self.reset_call_controls();
        }
        self.alert(reason.clone());
        PhoneError::Plugin { code, reason }
    }

    fn handle_media_event(&mut self, event: MediaEvent) {
        match event {
            MediaEvent::ConsentDialog(on) => {
                debug!("Consent dialog should be {} now", if on { "on" } else { "off" });
                self.view.consent_pending = on;
            }
            MediaEvent::LocalStream { video_tracks } => {
                debug!(" ::: Got a local stream ::: ({} video tracks)", video_tracks);
                self.view.media.visible = true;
                self.view.media.local_video = Some(video_tracks > 0);
                self.view.media.remote_waiting = true;
            }
            MediaEvent::RemoteStream { video_tracks, video_muted } => {
                debug!(" ::: Got a remote stream ::: ({} video tracks, muted={})", video_tracks, video_muted);
                self.view.media.dtmf_pad = true;
                self.view.media.remote_video = Some(video_tracks > 0 && !video_muted);
            }
            MediaEvent::RemotePlaying => {
                self.view.media.remote_waiting = false;
            }
            MediaEvent::Cleanup => {
                info!(" ::: Got a cleanup notification :::");
                self.view.media = MediaPanel::default();
            }
        }
    }

    async fn send(&self, request: &SipRequest, jsep: Option<Jsep>) -> Result<(), PhoneError> {
        let plugin = self.attached()?;
        let body = request.to_body()?;
        debug!("Sending {} request: {}", request.name(), body);
        plugin.send_message(body, jsep).await?;
        Ok(())
    }

    /// Closes local media and the gateway-side PeerConnection.
    async fn hangup_webrtc(&mut self) {
        self.media.close().await;
        if let Some(plugin) = &self.plugin {
            if let Err(e) = plugin.hangup().await {
                warn!("WebRTC hangup failed: {}", e);
            }
        }
        self.view.media = MediaPanel::default();
        self.view.in_call_since = None;
    }

    fn attached(&self) -> Result<Arc<dyn PluginHandle>, PhoneError> {
        self.plugin.clone().ok_or(PhoneError::NotAttached)
    }

    /// Like `attached`, for user commands: a refusal is alerted.
    fn require_attached(&self) -> Result<Arc<dyn PluginHandle>, PhoneError> {
        self.attached().map_err(|e| self.refuse(e))
    }

    fn refuse(&self, error: PhoneError) -> PhoneError {
        warn!("Refused: {}", error);
        self.alert(error.to_string());
        error
    }

    fn is_own_handle(&self, handle_id: u64) -> bool {
        self.plugin.as_ref().is_some_and(|plugin| plugin.id() == handle_id)
    }

    fn fail_start(&mut self, error: PhoneError) -> PhoneError {
        self.reset();
        self.alert(error.to_string());
        error
    }

    fn restore_call_controls(&mut self) {
        self.view.call_enabled = true;
        self.view.peer_enabled = true;
        self.view.video_enabled = true;
    }

    fn reset_call_controls(&mut self) {
        self.view.call_button = CallButton::Call;
        self.restore_call_controls();
        self.notify(Notice::ResetCallForm);
    }

    /// Back to the state before `start`.
    fn reset(&mut self) {
        self.session = None;
        self.plugin = None;
        self.approach = None;
        self.pending_registration = None;
        self.incoming_offer = None;
        self.registered = false;
        self.view = PhoneView::default();
    }

    fn alert(&self, message: String) {
        self.notify(Notice::Alert(message));
    }

    fn notify(&self, notice: Notice) {
        if self.notices.send(notice).is_err() {
            debug!("No UI listening for notices");
        }
    }
}
