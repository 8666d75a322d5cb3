//! Janus API envelopes.

use log::debug;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{GatewayError, GatewayEvent};
use crate::media::Jsep;

/// Random alphanumeric string, used for transactions and opaque ids.
pub fn random_string(len: usize) -> String {
    let mut out = String::with_capacity(len);
    while out.len() < len {
        let chunk = Uuid::new_v4().simple().to_string();
        out.extend(chunk.chars().take(len - out.len()));
    }
    out
}

#[derive(Debug, Clone, Serialize)]
pub struct JanusRequest {
    pub janus: &'static str,
    pub transaction: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opaque_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jsep: Option<Jsep>,
}

impl JanusRequest {
    pub fn new(janus: &'static str) -> Self {
        Self {
            janus,
            transaction: random_string(12),
            plugin: None,
            opaque_id: None,
            body: None,
            jsep: None,
        }
    }

    pub fn attach(plugin: &str, opaque_id: &str) -> Self {
        Self {
            plugin: Some(plugin.to_string()),
            opaque_id: Some(opaque_id.to_string()),
            ..Self::new("attach")
        }
    }

    pub fn message(body: serde_json::Value, jsep: Option<Jsep>) -> Self {
        Self {
            body: Some(body),
            jsep,
            ..Self::new("message")
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IdData {
    pub id: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PluginData {
    pub plugin: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JanusErrorBody {
    pub code: u32,
    #[serde(default)]
    pub reason: String,
}

/// Any message the gateway sends back: responses and long-poll events.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JanusMessage {
    pub janus: String,
    #[serde(default)]
    pub transaction: Option<String>,
    #[serde(default)]
    pub session_id: Option<u64>,
    #[serde(default)]
    pub sender: Option<u64>,
    #[serde(default)]
    pub data: Option<IdData>,
    #[serde(default)]
    pub plugindata: Option<PluginData>,
    #[serde(default)]
    pub jsep: Option<Jsep>,
    #[serde(default)]
    pub error: Option<JanusErrorBody>,
    #[serde(default, rename = "type")]
    pub media_type: Option<String>,
    #[serde(default)]
    pub receiving: Option<bool>,
    #[serde(default)]
    pub reason: Option<String>,
}

impl JanusMessage {
    /// Turns a `"janus": "error"` reply into an error.
    pub fn into_result(self) -> Result<Self, GatewayError> {
        if self.janus == "error" {
            let (code, reason) = self
                .error
                .map(|e| (e.code, e.reason))
                .unwrap_or((0, "unknown error".to_string()));
            return Err(GatewayError::Janus { code, reason });
        }
        Ok(self)
    }

    /// Id carried by a successful `create` or `attach`.
    pub fn created_id(&self) -> Result<u64, GatewayError> {
        match (&*self.janus, &self.data) {
            ("success", Some(data)) => Ok(data.id),
            _ => Err(GatewayError::UnexpectedResponse(format!("expected success with an id, got '{}'", self.janus))),
        }
    }

    /// Maps a long-poll message to an event. Acks and keepalives yield `None`.
    pub fn into_event(self) -> Option<GatewayEvent> {
        let handle_id = self.sender.unwrap_or_default();
        match self.janus.as_str() {
            "event" => {
                let data = self.plugindata.map(|p| p.data).unwrap_or_default();
                Some(GatewayEvent::PluginMessage { handle_id, data, jsep: self.jsep })
            }
            "webrtcup" => Some(GatewayEvent::WebrtcUp { handle_id }),
            "media" => Some(GatewayEvent::Media {
                handle_id,
                kind: self.media_type.unwrap_or_default(),
                receiving: self.receiving.unwrap_or(false),
            }),
            "hangup" => Some(GatewayEvent::PeerHangup {
                handle_id,
                reason: self.reason.unwrap_or_default(),
            }),
            "detached" => Some(GatewayEvent::Detached { handle_id }),
            "timeout" => Some(GatewayEvent::SessionDestroyed),
            "error" => {
                let reason = self
                    .error
                    .map(|e| format!("{} {}", e.code, e.reason))
                    .unwrap_or_else(|| "unknown error".to_string());
                Some(GatewayEvent::SessionError(reason))
            }
            other => {
                debug!("Ignoring '{}' message from gateway", other);
                None
            }
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<JanusMessage>),
    One(JanusMessage),
}

/// Long-poll responses are a single message, or an array when `maxev` is set.
pub fn parse_poll_body(body: &str) -> Result<Vec<JanusMessage>, serde_json::Error> {
    Ok(match serde_json::from_str(body)? {
        OneOrMany::Many(messages) => messages,
        OneOrMany::One(message) => vec![message],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_attach_request_shape() {
        let request = JanusRequest::attach("janus.plugin.sip", "siptest-abc");
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["janus"], "attach");
        assert_eq!(value["plugin"], "janus.plugin.sip");
        assert_eq!(value["opaque_id"], "siptest-abc");
        assert_eq!(value["transaction"].as_str().unwrap().len(), 12);
        assert!(value.get("body").is_none());
        assert!(value.get("jsep").is_none());
    }

    #[test]
    fn test_random_string_length() {
        assert_eq!(random_string(12).len(), 12);
        assert_eq!(random_string(40).len(), 40);
        assert_ne!(random_string(12), random_string(12));
    }

    #[test]
    fn test_success_carries_id() {
        let message: JanusMessage =
            serde_json::from_value(json!({"janus": "success", "transaction": "x", "data": {"id": 42}})).unwrap();
        assert_eq!(message.into_result().unwrap().created_id().unwrap(), 42);
    }

    #[test]
    fn test_error_reply_becomes_error() {
        let message: JanusMessage = serde_json::from_value(json!({
            "janus": "error",
            "error": {"code": 458, "reason": "No such session 1"}
        }))
        .unwrap();
        match message.into_result() {
            Err(GatewayError::Janus { code, reason }) => {
                assert_eq!(code, 458);
                assert_eq!(reason, "No such session 1");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_plugin_event_mapping() {
        let body = json!([
            {"janus": "keepalive"},
            {
                "janus": "event",
                "session_id": 1,
                "sender": 7,
                "plugindata": {"plugin": "janus.plugin.sip", "data": {"sip": "event", "result": {"event": "calling"}}},
                "jsep": {"type": "answer", "sdp": "v=0"}
            },
            {"janus": "media", "sender": 7, "type": "audio", "receiving": true},
            {"janus": "hangup", "sender": 7, "reason": "DTLS alert"}
        ])
        .to_string();

        let events: Vec<_> = parse_poll_body(&body)
            .unwrap()
            .into_iter()
            .filter_map(JanusMessage::into_event)
            .collect();

        assert_eq!(events.len(), 3);
        match &events[0] {
            GatewayEvent::PluginMessage { handle_id, data, jsep } => {
                assert_eq!(*handle_id, 7);
                assert_eq!(data["result"]["event"], "calling");
                assert_eq!(jsep.as_ref().unwrap().sdp, "v=0");
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(
            events[1],
            GatewayEvent::Media { handle_id: 7, kind: "audio".into(), receiving: true }
        );
        assert_eq!(
            events[2],
            GatewayEvent::PeerHangup { handle_id: 7, reason: "DTLS alert".into() }
        );
    }

    #[test]
    fn test_single_object_poll_body() {
        let messages = parse_poll_body(r#"{"janus": "timeout", "session_id": 3}"#).unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(
            messages.into_iter().next().and_then(JanusMessage::into_event),
            Some(GatewayEvent::SessionDestroyed)
        );
    }
}
