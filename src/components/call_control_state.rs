use crate::state::{CallButton, CallState, PhoneView};

#[derive(Debug, Clone, PartialEq)]
pub enum ButtonStyle {
    Success,
    Danger,
    Disabled,
}

/// What the call button does when clicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallAction {
    Call,
    Hangup,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallControlState {
    pub call_label: &'static str,
    pub call_action: CallAction,
    pub call_enabled: bool,
    pub call_style: ButtonStyle,
    pub peer_enabled: bool,
    pub video_enabled: bool,
    pub status_text: Option<&'static str>,
}

impl CallControlState {
    pub fn from_view(view: &PhoneView) -> Self {
        let call_action = match view.call_button {
            CallButton::Call => CallAction::Call,
            CallButton::Hangup => CallAction::Hangup,
        };

        let call_style = match (view.call_enabled, call_action) {
            (false, _) => ButtonStyle::Disabled,
            (true, CallAction::Call) => ButtonStyle::Success,
            (true, CallAction::Hangup) => ButtonStyle::Danger,
        };

        // Peer and video stay locked for as long as a call is up
        let idle = call_action == CallAction::Call;

        let status_text = match view.call {
            CallState::Idle => None,
            CallState::Calling => Some("Calling..."),
            CallState::IncomingPending => Some("Incoming call"),
            CallState::InCall => Some("In call"),
            CallState::HungUp => Some("Call ended"),
        };

        Self {
            call_label: view.call_button.label(),
            call_action,
            call_enabled: view.call_enabled,
            call_style,
            peer_enabled: view.peer_enabled && idle,
            video_enabled: view.video_enabled && idle,
            status_text,
        }
    }

    pub fn get_button_class(&self, style: &ButtonStyle) -> &'static str {
        match style {
            ButtonStyle::Success => "btn btn-success",
            ButtonStyle::Danger => "btn btn-danger",
            ButtonStyle::Disabled => "btn btn-disabled",
        }
    }
}
