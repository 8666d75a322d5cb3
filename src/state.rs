//! Snapshot of everything the UI shows, plus one-shot notices.
//!
//! The controller owns a [`PhoneView`] and mutates it in response to user
//! commands and gateway/media events; the rendering layer only reads it.

use chrono::{DateTime, Utc};

use crate::registration::RegistrationApproach;
use crate::sip_messages::SrtpMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Stopped,
    Starting,
    Ready,
    Stopping,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegistrationState {
    #[default]
    Unregistered,
    Registering,
    Registered,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CallState {
    #[default]
    Idle,
    Calling,
    IncomingPending,
    InCall,
    HungUp,
}

impl CallState {
    /// Whether a new outgoing call may be placed.
    pub fn is_free(&self) -> bool {
        matches!(self, CallState::Idle | CallState::HungUp)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CallButton {
    #[default]
    Call,
    Hangup,
}

impl CallButton {
    pub fn label(&self) -> &'static str {
        match self {
            CallButton::Call => "Call",
            CallButton::Hangup => "Hangup",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingCallPrompt {
    pub caller: String,
    pub srtp: Option<SrtpMode>,
    /// Media lines found in the caller's offer.
    pub audio: bool,
    pub video: bool,
}

impl IncomingCallPrompt {
    pub fn message(&self) -> String {
        format!(
            "Incoming call from {}!{}",
            self.caller,
            self.srtp.map(|mode| mode.describe()).unwrap_or("")
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub visible: bool,
    pub enabled: bool,
    pub approach: Option<RegistrationApproach>,
}

impl LoginForm {
    pub fn secret_enabled(&self) -> bool {
        self.enabled && self.approach.map_or(true, |a| a.uses_secret())
    }
}

/// Local and remote video area, with the DTMF keypad.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaPanel {
    pub visible: bool,
    /// `Some(false)` renders "No webcam available".
    pub local_video: Option<bool>,
    /// Spinner shown until the remote stream starts playing.
    pub remote_waiting: bool,
    /// `Some(false)` renders "No remote video available".
    pub remote_video: Option<bool>,
    pub dtmf_pad: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PhoneView {
    pub phase: SessionPhase,
    pub start_enabled: bool,
    pub login: LoginForm,
    pub registration: RegistrationState,
    pub registered_as: Option<String>,
    pub phone_visible: bool,
    pub call: CallState,
    pub call_button: CallButton,
    pub call_enabled: bool,
    pub peer_enabled: bool,
    pub video_enabled: bool,
    pub incoming: Option<IncomingCallPrompt>,
    pub confirm_proxy_lookup: bool,
    /// Screen darkened while the user is asked for device access.
    pub consent_pending: bool,
    pub media: MediaPanel,
    pub in_call_since: Option<DateTime<Utc>>,
}

impl Default for PhoneView {
    fn default() -> Self {
        Self {
            phase: SessionPhase::Stopped,
            start_enabled: true,
            login: LoginForm::default(),
            registration: RegistrationState::Unregistered,
            registered_as: None,
            phone_visible: false,
            call: CallState::Idle,
            call_button: CallButton::Call,
            call_enabled: true,
            peer_enabled: true,
            video_enabled: true,
            incoming: None,
            confirm_proxy_lookup: false,
            consent_pending: false,
            media: MediaPanel::default(),
            in_call_since: None,
        }
    }
}

impl PhoneView {
    pub fn start_label(&self) -> &'static str {
        match self.phase {
            SessionPhase::Stopped | SessionPhase::Starting => "Start",
            SessionPhase::Ready | SessionPhase::Stopping => "Stop",
        }
    }

    pub fn registered_label(&self) -> Option<String> {
        self.registered_as.as_ref().map(|name| format!("Registered as '{}'", name))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Server,
    Peer,
}

/// One-shot effects the rendering layer applies once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Modal alert.
    Alert(String),
    Focus(Field),
    /// The call controls were shown after the first successful registration.
    PhoneRevealed,
    ClearSecret,
    /// Put the caller's address in the peer field.
    FillPeer(String),
    /// Empty the peer field and untick video.
    ResetCallForm,
    IncomingDismissed,
    SessionClosed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incoming_prompt_text() {
        let mut prompt = IncomingCallPrompt {
            caller: "sip:bob@example.com".into(),
            srtp: None,
            audio: true,
            video: false,
        };
        assert_eq!(prompt.message(), "Incoming call from sip:bob@example.com!");

        prompt.srtp = Some(SrtpMode::SdesOptional);
        assert_eq!(prompt.message(), "Incoming call from sip:bob@example.com! (SDES-SRTP offered)");
    }

    #[test]
    fn test_secret_disabled_for_guest() {
        let mut login = LoginForm { visible: true, enabled: true, approach: None };
        assert!(login.secret_enabled());
        login.approach = Some(RegistrationApproach::Guest);
        assert!(!login.secret_enabled());
        login.approach = Some(RegistrationApproach::Secret);
        login.enabled = false;
        assert!(!login.secret_enabled());
    }

    #[test]
    fn test_initial_view() {
        let view = PhoneView::default();
        assert_eq!(view.start_label(), "Start");
        assert_eq!(view.call_button.label(), "Call");
        assert!(!view.phone_visible);
        assert_eq!(view.registered_label(), None);
    }
}
