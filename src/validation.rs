use thiserror::Error;

/// Local form errors. Nothing is sent to the plugin when one of these fires.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please select a registration approach from the dropdown menu")]
    MissingApproach,

    #[error("Please insert a valid SIP server (e.g., sip:192.168.0.1:5060)")]
    InvalidServer,

    #[error("Please insert a valid SIP identity address (e.g., sip:goofy@example.com)")]
    InvalidIdentity,

    #[error("Please insert a valid SIP address (e.g., sip:goofy@example.com): this doesn't need to exist for guests, but is required")]
    InvalidGuestIdentity,

    #[error("Insert the username secret (e.g., mypassword)")]
    MissingSecret,

    #[error("Please insert a valid SIP address (e.g., sip:pluto@example.com)")]
    InvalidPeer,

    #[error("'{0}' is not a DTMF digit (use 0-9, # or *)")]
    InvalidDtmfDigit(char),
}

/// `sip:` scheme followed by something containing `@`.
pub fn is_sip_address(value: &str) -> bool {
    value.starts_with("sip:") && value.contains('@')
}

/// Splits `sip:user@domain` into `(user, domain)` at the first `@`.
pub fn split_sip_address(value: &str) -> Option<(&str, &str)> {
    value.strip_prefix("sip:")?.split_once('@')
}

/// An empty server means "let the plugin do an RFC 3263 lookup".
pub fn validate_server(server: &str) -> Result<Option<String>, ValidationError> {
    let server = server.trim();
    if server.is_empty() {
        return Ok(None);
    }
    if server.starts_with("sip:") || server.starts_with("sips:") {
        Ok(Some(server.to_string()))
    } else {
        Err(ValidationError::InvalidServer)
    }
}

pub fn validate_peer(peer: &str) -> Result<String, ValidationError> {
    let peer = peer.trim();
    if is_sip_address(peer) {
        Ok(peer.to_string())
    } else {
        Err(ValidationError::InvalidPeer)
    }
}

pub const DTMF_DIGITS: [char; 12] = ['1', '2', '3', '4', '5', '6', '7', '8', '9', '*', '0', '#'];

pub fn validate_dtmf_digit(digit: char) -> Result<char, ValidationError> {
    if DTMF_DIGITS.contains(&digit) {
        Ok(digit)
    } else {
        Err(ValidationError::InvalidDtmfDigit(digit))
    }
}
