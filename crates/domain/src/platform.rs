//! Platform requests: what the core asks of the remote GPIO capability.

use serde::{Deserialize, Serialize};

use crate::id::DeviceId;
use crate::pin::{EdgeType, Pin, PinValue};

/// A single GPIO operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum GpioOp {
    /// Start reporting edges of an input pin.
    Subscribe { pin_number: Pin, edge_type: EdgeType },
    /// Stop reporting edges of an input pin.
    Unsubscribe { pin_number: Pin, edge_type: EdgeType },
    /// Drive an output pin.
    Write { pin_number: Pin, value: PinValue },
}

/// A request sent to the platform on behalf of a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformRequest {
    pub device_id: DeviceId,
    #[serde(flatten)]
    pub gpio: GpioOp,
}

impl PlatformRequest {
    #[must_use]
    pub fn subscribe(device_id: DeviceId, pin_number: Pin) -> Self {
        Self {
            device_id,
            gpio: GpioOp::Subscribe {
                pin_number,
                edge_type: EdgeType::Both,
            },
        }
    }

    #[must_use]
    pub fn unsubscribe(device_id: DeviceId, pin_number: Pin) -> Self {
        Self {
            device_id,
            gpio: GpioOp::Unsubscribe {
                pin_number,
                edge_type: EdgeType::Both,
            },
        }
    }

    #[must_use]
    pub fn write(device_id: DeviceId, pin_number: Pin, value: PinValue) -> Self {
        Self {
            device_id,
            gpio: GpioOp::Write { pin_number, value },
        }
    }
}
