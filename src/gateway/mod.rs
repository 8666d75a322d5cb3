//! Connection to the WebRTC gateway hosting the SIP plugin.
//!
//! The controller only sees the three traits below. [`HttpGateway`] talks
//! to Janus over its REST API; tests swap in recording fakes.

pub mod http;
pub mod protocol;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::event_handler::EventForwarder;
use crate::media::Jsep;

pub use http::HttpGateway;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{code} {reason}")]
    Janus { code: u32, reason: String },

    #[error("unexpected gateway response: {0}")]
    UnexpectedResponse(String),

    #[error("no gateway server configured")]
    NoServers,

    #[error("could not reach any gateway server ({0})")]
    Unreachable(String),

    #[error("session {0} is closed")]
    SessionClosed(u64),
}

/// Asynchronous notifications delivered for a session.
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayEvent {
    /// Plugin payload (`plugindata.data`) with an optional negotiation payload.
    PluginMessage {
        handle_id: u64,
        data: serde_json::Value,
        jsep: Option<Jsep>,
    },
    WebrtcUp { handle_id: u64 },
    Media { handle_id: u64, kind: String, receiving: bool },
    /// The gateway closed the PeerConnection of a handle.
    PeerHangup { handle_id: u64, reason: String },
    Detached { handle_id: u64 },
    /// The session can no longer be used.
    SessionError(String),
    SessionDestroyed,
}

#[async_trait]
pub trait Gateway: Send + Sync {
    /// Opens a session. Events for it are pushed into `events` until it is
    /// destroyed.
    async fn create_session(&self, events: EventForwarder) -> Result<Arc<dyn GatewaySession>, GatewayError>;
}

#[async_trait]
pub trait GatewaySession: Send + Sync {
    fn id(&self) -> u64;

    async fn attach(&self, plugin: &str, opaque_id: &str) -> Result<Arc<dyn PluginHandle>, GatewayError>;

    async fn destroy(&self) -> Result<(), GatewayError>;
}

#[async_trait]
pub trait PluginHandle: Send + Sync {
    fn id(&self) -> u64;

    fn plugin(&self) -> &str;

    /// Sends a request body to the plugin. Responses arrive as events.
    async fn send_message(&self, body: serde_json::Value, jsep: Option<Jsep>) -> Result<(), GatewayError>;

    /// Tears down the WebRTC leg of this handle on the gateway.
    async fn hangup(&self) -> Result<(), GatewayError>;

    async fn detach(&self) -> Result<(), GatewayError>;
}
