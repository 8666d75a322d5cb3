//! Request bodies sent to the SIP plugin and the events it sends back.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use log::warn;
use serde::{Deserialize, Serialize};

/// SDES-SRTP negotiation preference. No value means plain RTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SrtpMode {
    SdesOptional,
    SdesMandatory,
}

impl SrtpMode {
    /// Suffix shown next to an incoming call.
    pub fn describe(&self) -> &'static str {
        match self {
            SrtpMode::SdesOptional => " (SDES-SRTP offered)",
            SrtpMode::SdesMandatory => " (SDES-SRTP mandatory)",
        }
    }
}

impl fmt::Display for SrtpMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SrtpMode::SdesOptional => write!(f, "sdes_optional"),
            SrtpMode::SdesMandatory => write!(f, "sdes_mandatory"),
        }
    }
}

impl FromStr for SrtpMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sdes_optional" => Ok(SrtpMode::SdesOptional),
            "sdes_mandatory" => Ok(SrtpMode::SdesMandatory),
            other => Err(format!("unknown SRTP mode '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RegisterType {
    Guest,
}

/// Outbound plugin requests.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "request", rename_all = "snake_case")]
pub enum SipRequest {
    Register {
        #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
        kind: Option<RegisterType>,
        username: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        display_name: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        secret: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        ha1_secret: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        proxy: Option<String>,
    },
    Call {
        uri: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        srtp: Option<SrtpMode>,
        /// Extra headers the plugin adds to the INVITE.
        #[serde(skip_serializing_if = "BTreeMap::is_empty")]
        headers: BTreeMap<String, String>,
    },
    Accept {
        #[serde(skip_serializing_if = "Option::is_none")]
        srtp: Option<SrtpMode>,
    },
    Decline {
        #[serde(skip_serializing_if = "Option::is_none")]
        code: Option<u16>,
    },
    Hangup,
    DtmfInfo {
        digit: String,
    },
}

impl SipRequest {
    pub fn name(&self) -> &'static str {
        match self {
            SipRequest::Register { .. } => "register",
            SipRequest::Call { .. } => "call",
            SipRequest::Accept { .. } => "accept",
            SipRequest::Decline { .. } => "decline",
            SipRequest::Hangup => "hangup",
            SipRequest::DtmfInfo { .. } => "dtmf_info",
        }
    }

    pub fn to_body(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

/// Events found under `result.event` in plugin messages.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event")]
pub enum SipEvent {
    #[serde(rename = "registration_failed")]
    RegistrationFailed {
        #[serde(default)]
        code: u16,
        #[serde(default)]
        reason: String,
    },
    #[serde(rename = "registered")]
    Registered {
        #[serde(default)]
        username: String,
    },
    #[serde(rename = "calling")]
    Calling,
    #[serde(rename = "incomingcall")]
    IncomingCall {
        #[serde(default)]
        username: String,
        #[serde(default)]
        srtp: Option<SrtpMode>,
    },
    #[serde(rename = "accepted")]
    Accepted {
        #[serde(default)]
        username: Option<String>,
    },
    #[serde(rename = "hangup")]
    Hangup {
        #[serde(default)]
        code: u16,
        #[serde(default)]
        reason: String,
    },
    #[serde(other)]
    Other,
}

/// Payload of a SIP plugin message (`plugindata.data`).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PluginMessage {
    #[serde(default)]
    pub sip: Option<String>,
    #[serde(default)]
    pub error_code: Option<u32>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
}

impl PluginMessage {
    pub fn from_data(data: &serde_json::Value) -> Result<Self, serde_json::Error> {
        PluginMessage::deserialize(data)
    }

    /// The tagged event, if the message carries one.
    pub fn event(&self) -> Option<SipEvent> {
        let result = self.result.as_ref()?;
        result.get("event")?;

        match SipEvent::deserialize(result) {
            Ok(event) => Some(event),
            Err(e) => {
                warn!("Malformed SIP event {}: {}", result, e);
                None
            }
        }
    }
}
