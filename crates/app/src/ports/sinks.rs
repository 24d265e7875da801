//! Outbound sink ports: one-way channels towards the platform.
//!
//! Sends are fire-and-forget: retry and backoff belong to the transport.

use std::sync::Arc;

use pinhub_domain::event::DeviceEvent;
use pinhub_domain::platform::PlatformRequest;

/// Receives device-state and sensor events.
pub trait EventSink {
    fn send_event(&self, event: DeviceEvent);
}

/// Receives GPIO subscribe/unsubscribe/write requests.
pub trait PlatformRequestSink {
    fn send_request(&self, request: PlatformRequest);
}

impl<T: EventSink + ?Sized> EventSink for &T {
    fn send_event(&self, event: DeviceEvent) {
        (**self).send_event(event);
    }
}

impl<T: PlatformRequestSink + ?Sized> PlatformRequestSink for &T {
    fn send_request(&self, request: PlatformRequest) {
        (**self).send_request(request);
    }
}

impl<T: EventSink + ?Sized> EventSink for Arc<T> {
    fn send_event(&self, event: DeviceEvent) {
        (**self).send_event(event);
    }
}

impl<T: PlatformRequestSink + ?Sized> PlatformRequestSink for Arc<T> {
    fn send_request(&self, request: PlatformRequest) {
        (**self).send_request(request);
    }
}
