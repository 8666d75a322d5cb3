use thiserror::Error;

use crate::gateway::GatewayError;
use crate::media::MediaError;
use crate::validation::ValidationError;

/// Errors surfaced by controller operations.
///
/// Every one of these is also shown to the user as an alert; the `Display`
/// text is what the alert says.
#[derive(Debug, Error)]
pub enum PhoneError {
    #[error("No WebRTC support... ")]
    WebRtcUnsupported,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Reported by the SIP plugin, either as an error or a failure event.
    #[error("{}", plugin_error_text(.code, .reason))]
    Plugin { code: Option<u32>, reason: String },

    #[error("{0}")]
    Gateway(#[from] GatewayError),

    #[error("  -- Error attaching plugin... {0}")]
    Attach(GatewayError),

    #[error("WebRTC error... {0}")]
    Media(#[from] MediaError),

    #[error("could not encode plugin request: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Not attached to the SIP plugin")]
    NotAttached,

    #[error("Register before placing a call")]
    NotRegistered,

    #[error("A call is already in progress")]
    CallInProgress,

    #[error("There is no incoming call to answer")]
    NoIncomingCall,

    #[error("There is no call to send DTMF on")]
    NoActiveCall,
}

fn plugin_error_text(code: &Option<u32>, reason: &str) -> String {
    match code {
        Some(code) => format!("{} {}", code, reason),
        None => reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_texts() {
        let error = PhoneError::Plugin { code: Some(403), reason: "Forbidden".into() };
        assert_eq!(error.to_string(), "403 Forbidden");

        let error = PhoneError::Plugin { code: None, reason: "Invalid request".into() };
        assert_eq!(error.to_string(), "Invalid request");

        let error: PhoneError = ValidationError::InvalidPeer.into();
        assert_eq!(error.to_string(), "Please insert a valid SIP address (e.g., sip:pluto@example.com)");

        let error: PhoneError = MediaError::Unsupported.into();
        assert!(error.to_string().starts_with("WebRTC error... "));
    }
}
