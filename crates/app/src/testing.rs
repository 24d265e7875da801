//! In-memory fakes shared by the unit tests of this crate.

use std::cell::{Cell, RefCell};

use serde_json::{Map, Value, json};

use pinhub_domain::error::PinHubError;
use pinhub_domain::event::DeviceEvent;
use pinhub_domain::platform::PlatformRequest;

use crate::codec::DEVICES_KEY;
use crate::ports::{ConfigStore, EventSink, PlatformRequestSink};

/// Records every event and platform request it receives.
#[derive(Debug, Default)]
pub struct Recorder {
    events: RefCell<Vec<DeviceEvent>>,
    requests: RefCell<Vec<PlatformRequest>>,
}

impl Recorder {
    pub fn events(&self) -> Vec<DeviceEvent> {
        self.events.borrow().clone()
    }

    pub fn requests(&self) -> Vec<PlatformRequest> {
        self.requests.borrow().clone()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
        self.requests.borrow_mut().clear();
    }
}

impl EventSink for Recorder {
    fn send_event(&self, event: DeviceEvent) {
        self.events.borrow_mut().push(event);
    }
}

impl PlatformRequestSink for Recorder {
    fn send_request(&self, request: PlatformRequest) {
        self.requests.borrow_mut().push(request);
    }
}

/// Config store backed by a JSON map, with a separate "durable" copy that
/// only changes on a successful flush.
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    values: Map<String, Value>,
    flushed: Map<String, Value>,
    flushes: usize,
    fail_flush: Cell<bool>,
}

impl MemoryConfigStore {
    pub fn with_devices(devices: Value) -> Self {
        let mut values = Map::new();
        values.insert(DEVICES_KEY.to_string(), devices);
        Self {
            flushed: values.clone(),
            values,
            ..Self::default()
        }
    }

    /// Make every following flush fail until reset.
    pub fn fail_flushes(&self, fail: bool) {
        self.fail_flush.set(fail);
    }

    /// The device list as of the last successful flush.
    pub fn flushed_devices(&self) -> Value {
        self.flushed.get(DEVICES_KEY).cloned().unwrap_or_else(|| json!([]))
    }

    pub fn flush_count(&self) -> usize {
        self.flushes
    }
}

impl ConfigStore for MemoryConfigStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_string(), value);
    }

    fn flush(&mut self) -> Result<(), PinHubError> {
        if self.fail_flush.get() {
            return Err(PinHubError::Storage(Box::new(std::io::Error::other(
                "flush refused",
            ))));
        }
        self.flushed = self.values.clone();
        self.flushes += 1;
        Ok(())
    }

    fn snapshot(&self) -> Value {
        Value::Object(self.values.clone())
    }
}
