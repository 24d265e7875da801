//! Device events: what devices announce to the outside world.
//!
//! Events are produced when a device comes online (with its metadata), goes
//! offline, or reports a sensor reading.

use serde::{Deserialize, Serialize};

use crate::device::{Capability, DeviceClass, DeviceConfig};
use crate::id::DeviceId;

/// Reachability of a device as seen by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DeviceStatus {
    Online,
    Offline,
}

/// Reading of a motion sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionState {
    MotionDetected,
    NoMotion,
}

/// A sensor reading attached to an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorReading {
    Motion(MotionState),
}

/// An outbound device/sensor event.
///
/// Only `device_id` is always present; the remaining fields depend on what
/// the event announces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceEvent {
    pub device_id: DeviceId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub friendly_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<DeviceStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<DeviceClass>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<Vec<Capability>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensor_reading: Option<SensorReading>,
}

impl DeviceEvent {
    fn bare(device_id: DeviceId) -> Self {
        Self {
            device_id,
            friendly_name: None,
            status: None,
            kind: None,
            capabilities: None,
            sensor_reading: None,
        }
    }

    /// Online announcement carrying the device's metadata and capabilities.
    #[must_use]
    pub fn online(config: &DeviceConfig) -> Self {
        Self {
            friendly_name: Some(config.name.clone()),
            status: Some(DeviceStatus::Online),
            kind: Some(config.kind.class()),
            capabilities: Some(config.kind.capabilities().to_vec()),
            ..Self::bare(config.id.clone())
        }
    }

    /// Offline announcement.
    #[must_use]
    pub fn offline(device_id: DeviceId) -> Self {
        Self {
            status: Some(DeviceStatus::Offline),
            ..Self::bare(device_id)
        }
    }

    /// Sensor reading.
    #[must_use]
    pub fn reading(device_id: DeviceId, reading: SensorReading) -> Self {
        Self {
            sensor_reading: Some(reading),
            ..Self::bare(device_id)
        }
    }
}
