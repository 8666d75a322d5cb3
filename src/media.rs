use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsepType {
    Offer,
    Answer,
}

/// Session description exchanged with the gateway.
///
/// The payload is passed through untouched; only the presence of media
/// lines is ever inspected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Jsep {
    #[serde(rename = "type")]
    pub kind: JsepType,
    pub sdp: String,
}

impl Jsep {
    pub fn offer(sdp: impl Into<String>) -> Self {
        Self { kind: JsepType::Offer, sdp: sdp.into() }
    }

    pub fn answer(sdp: impl Into<String>) -> Self {
        Self { kind: JsepType::Answer, sdp: sdp.into() }
    }

    pub fn has_audio(&self) -> bool {
        self.sdp.contains("m=audio ")
    }

    pub fn has_video(&self) -> bool {
        self.sdp.contains("m=video ")
    }
}

/// Which tracks to negotiate when creating an offer or an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaRequest {
    pub audio_send: bool,
    pub audio_recv: bool,
    pub video_send: bool,
    pub video_recv: bool,
}

impl MediaRequest {
    /// Outgoing calls always carry audio; video is optional.
    pub fn outgoing(video: bool) -> Self {
        Self {
            audio_send: true,
            audio_recv: true,
            video_send: video,
            video_recv: video,
        }
    }

    /// Answers mirror whatever the caller put in the offer.
    pub fn answering(audio: bool, video: bool) -> Self {
        Self {
            audio_send: audio,
            audio_recv: audio,
            video_send: video,
            video_recv: video,
        }
    }

    pub fn wants_video(&self) -> bool {
        self.video_send || self.video_recv
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediaError {
    #[error("WebRTC is not supported by this media engine")]
    Unsupported,

    #[error("media access denied: {0}")]
    PermissionDenied(String),

    #[error("negotiation failed: {0}")]
    Negotiation(String),
}

/// Callbacks raised by a media engine while it captures and plays streams.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaEvent {
    /// The engine is (or stopped) waiting for the user to grant device access.
    ConsentDialog(bool),
    LocalStream { video_tracks: usize },
    RemoteStream { video_tracks: usize, video_muted: bool },
    /// The remote stream started playing.
    RemotePlaying,
    /// All streams were released.
    Cleanup,
}

/// The WebRTC side of a call: offer/answer creation and local playback.
///
/// Implementations report stream changes through the event channel as
/// [`MediaEvent`]s.
#[async_trait]
pub trait MediaEngine: Send + Sync {
    fn is_supported(&self) -> bool;

    async fn create_offer(&self, media: MediaRequest) -> Result<Jsep, MediaError>;

    async fn create_answer(&self, offer: &Jsep, media: MediaRequest) -> Result<Jsep, MediaError>;

    async fn handle_remote_jsep(&self, jsep: &Jsep) -> Result<(), MediaError>;

    /// Sends tones inband. `Ok(false)` means the engine cannot, and the
    /// caller should fall back to SIP INFO.
    async fn insert_dtmf(&self, tones: &str) -> Result<bool, MediaError>;

    async fn close(&self);
}

/// Engine used when no WebRTC stack is linked in.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoWebRtc;

#[async_trait]
impl MediaEngine for NoWebRtc {
    fn is_supported(&self) -> bool {
        false
    }

    async fn create_offer(&self, _media: MediaRequest) -> Result<Jsep, MediaError> {
        Err(MediaError::Unsupported)
    }

    async fn create_answer(&self, _offer: &Jsep, _media: MediaRequest) -> Result<Jsep, MediaError> {
        Err(MediaError::Unsupported)
    }

    async fn handle_remote_jsep(&self, _jsep: &Jsep) -> Result<(), MediaError> {
        Err(MediaError::Unsupported)
    }

    async fn insert_dtmf(&self, _tones: &str) -> Result<bool, MediaError> {
        Ok(false)
    }

    async fn close(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    const AUDIO_ONLY: &str = "v=0\r\no=- 1 1 IN IP4 0.0.0.0\r\nm=audio 9 UDP/TLS/RTP/SAVPF 111\r\n";

    #[test]
    fn test_media_lines_detected() {
        let jsep = Jsep::offer(AUDIO_ONLY);
        assert!(jsep.has_audio());
        assert!(!jsep.has_video());

        let jsep = Jsep::offer(format!("{}m=video 9 UDP/TLS/RTP/SAVPF 96\r\n", AUDIO_ONLY));
        assert!(jsep.has_video());
    }

    #[test]
    fn test_jsep_wire_shape() {
        let value = serde_json::to_value(Jsep::answer("v=0")).unwrap();
        assert_eq!(value, serde_json::json!({"type": "answer", "sdp": "v=0"}));
    }

    #[test]
    fn test_outgoing_request_always_has_audio() {
        let request = MediaRequest::outgoing(false);
        assert!(request.audio_send && request.audio_recv);
        assert!(!request.wants_video());
        assert!(MediaRequest::outgoing(true).wants_video());
    }

    #[test]
    fn test_no_webrtc_refuses_media() {
        let engine = NoWebRtc;
        assert!(!engine.is_supported());
        tokio_test::assert_err!(tokio_test::block_on(engine.create_offer(MediaRequest::outgoing(false))));
        // No inband DTMF means SIP INFO
        assert_eq!(tokio_test::block_on(engine.insert_dtmf("1")), Ok(false));
    }
}
