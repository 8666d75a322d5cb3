use crate::registration::{RegistrationApproach, RegistrationForm};

/// Commands sent from UI to the controller coroutine
#[derive(Debug, Clone, PartialEq)]
pub enum PhoneCommand {
    /// Open a gateway session and attach the SIP plugin
    Start,

    /// Destroy the session
    Stop,

    /// Choose how to authenticate the registration
    SelectApproach(RegistrationApproach),

    /// Validate the login form and register
    Register(RegistrationForm),

    /// Answer to the "no proxy, do an RFC 3263 lookup?" question
    ConfirmProxyLookup(bool),

    /// Place an outgoing call
    Call {
        peer: String,
        video: bool,
    },

    /// Answer the pending incoming call
    Accept,

    /// Reject the pending incoming call
    Decline,

    /// Hang up the current call
    Hangup,

    /// Send a keypad tone
    Dtmf(char),
}
