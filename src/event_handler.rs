use tokio::sync::mpsc;
use log::{debug, error};

use crate::gateway::GatewayEvent;
use crate::media::MediaEvent;

/// Everything the controller can be told asynchronously.
#[derive(Debug, Clone, PartialEq)]
pub enum PhoneEvent {
    Gateway(GatewayEvent),
    Media(MediaEvent),
}

/// Bridges gateway and media callbacks into the controller's event queue.
///
/// Transports and media engines hold a clone of this and push whatever
/// they observe; the controller task drains the other end one event at a
/// time.
#[derive(Clone)]
pub struct EventForwarder {
    event_sender: mpsc::UnboundedSender<PhoneEvent>,
}

impl EventForwarder {
    pub fn new(event_sender: mpsc::UnboundedSender<PhoneEvent>) -> Self {
        Self { event_sender }
    }

    pub fn gateway(&self, event: GatewayEvent) {
        debug!("Gateway event: {:?}", event);

        if let Err(e) = self.event_sender.send(PhoneEvent::Gateway(event)) {
            error!("Failed to forward gateway event: {}", e);
        }
    }

    pub fn media(&self, event: MediaEvent) {
        debug!("Media event: {:?}", event);

        if let Err(e) = self.event_sender.send(PhoneEvent::Media(event)) {
            error!("Failed to forward media event: {}", e);
        }
    }

    /// True once the controller side has gone away.
    pub fn is_closed(&self) -> bool {
        self.event_sender.is_closed()
    }
}
