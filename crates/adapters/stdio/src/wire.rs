//! Line envelopes exchanged with the platform.
//!
//! Every line is one JSON object discriminated by its `type` field.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use pinhub_app::commands::ActionResponse;
use pinhub_app::event_bus::BusMessage;
use pinhub_domain::error::PinHubError;
use pinhub_domain::event::DeviceEvent;
use pinhub_domain::id::DeviceId;
use pinhub_domain::instruction::Instruction;
use pinhub_domain::pin::{Pin, PinValue};
use pinhub_domain::platform::PlatformRequest;

/// A line sent by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Inbound {
    /// The level of a subscribed pin changed.
    GpioEvent { pin: Pin, value: PinValue },
    /// A command addressed to one device.
    Instruction {
        device_id: DeviceId,
        instruction: Instruction,
    },
    /// An application request, answered with an `action_response` line.
    Action {
        #[serde(default)]
        request_id: Value,
        action: String,
        #[serde(default)]
        payload: Value,
    },
}

/// A line written towards the platform.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Outbound {
    DeviceEvent(DeviceEvent),
    PlatformRequest(PlatformRequest),
    ActionResponse { request_id: Value, response: Reply },
}

impl From<BusMessage> for Outbound {
    fn from(message: BusMessage) -> Self {
        match message {
            BusMessage::DeviceEvent(event) => Self::DeviceEvent(event),
            BusMessage::PlatformRequest(request) => Self::PlatformRequest(request),
        }
    }
}

/// Body of an action response: the result, or an error description.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Reply {
    Success(ActionResponse),
    Failure(Failure),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum Failure {
    Error { kind: &'static str, message: String },
}

impl From<Result<ActionResponse, PinHubError>> for Reply {
    fn from(result: Result<ActionResponse, PinHubError>) -> Self {
        match result {
            Ok(response) => Self::Success(response),
            Err(err) => Self::Failure(Failure::Error {
                kind: err.kind(),
                message: err.to_string(),
            }),
        }
    }
}
