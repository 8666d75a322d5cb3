use tokio::sync::mpsc;

use crate::event_handler::{EventForwarder, PhoneEvent};

/// Channel for passing gateway and media events from background tasks to the controller
pub struct EventChannel {
    pub sender: mpsc::UnboundedSender<PhoneEvent>,
    pub receiver: mpsc::UnboundedReceiver<PhoneEvent>,
}

impl EventChannel {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self { sender, receiver }
    }

    pub fn forwarder(&self) -> EventForwarder {
        EventForwarder::new(self.sender.clone())
    }
}

impl Default for EventChannel {
    fn default() -> Self {
        Self::new()
    }
}
