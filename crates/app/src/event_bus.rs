//! In-process bus carrying everything the core sends outwards.

use tokio::sync::mpsc;

use pinhub_domain::event::DeviceEvent;
use pinhub_domain::platform::PlatformRequest;

use crate::ports::{EventSink, PlatformRequestSink};

/// One outbound message, in emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusMessage {
    DeviceEvent(DeviceEvent),
    PlatformRequest(PlatformRequest),
}

/// In-process event bus using an unbounded tokio [`mpsc`] channel.
///
/// Device events and platform requests share one channel so the receiver sees
/// them in the order the core produced them. Nothing is dropped while the
/// receiver is alive, however many devices start or stop in one call. Once
/// the receiver is gone, publishing is a silent no-op.
#[derive(Debug, Clone)]
pub struct InProcessEventBus {
    sender: mpsc::UnboundedSender<BusMessage>,
}

impl InProcessEventBus {
    /// Create a bus and the single receiver draining it.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<BusMessage>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    fn publish(&self, message: BusMessage) {
        // send only fails once the receiver is dropped
        let _ = self.sender.send(message);
    }
}

impl EventSink for InProcessEventBus {
    fn send_event(&self, event: DeviceEvent) {
        tracing::trace!(device_id = %event.device_id, "publishing device event");
        self.publish(BusMessage::DeviceEvent(event));
    }
}

impl PlatformRequestSink for InProcessEventBus {
    fn send_request(&self, request: PlatformRequest) {
        tracing::trace!(device_id = %request.device_id, "publishing platform request");
        self.publish(BusMessage::PlatformRequest(request));
    }
}
