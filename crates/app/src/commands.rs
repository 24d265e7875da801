//! Application actions: the enumerated command table.
//!
//! Each [`Action`] maps to exactly one handler function. The table is built
//! and checked once at startup; requests are then resolved by name with a
//! single map lookup.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use pinhub_domain::device::{Capability, DeviceConfig, DeviceKind};
use pinhub_domain::error::{ConflictError, PinHubError, ValidationError};
use pinhub_domain::id::DeviceId;
use pinhub_domain::pin::Pin;

use crate::ports::{ConfigStore, EventSink, PlatformRequestSink};
use crate::registry::DeviceRegistry;

/// Every action a caller may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    GetAllDevices,
    GetAvailablePins,
    GetSupportedDeviceTypes,
    GetAllSettings,
    AddDevice,
    DeviceDelete,
    UpdateDeviceName,
    ChangePin,
}

impl Action {
    pub const ALL: [Self; 8] = [
        Self::GetAllDevices,
        Self::GetAvailablePins,
        Self::GetSupportedDeviceTypes,
        Self::GetAllSettings,
        Self::AddDevice,
        Self::DeviceDelete,
        Self::UpdateDeviceName,
        Self::ChangePin,
    ];

    /// Name used on the wire.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::GetAllDevices => "get_all_devices",
            Self::GetAvailablePins => "get_available_pins",
            Self::GetSupportedDeviceTypes => "get_supported_device_types",
            Self::GetAllSettings => "get_all_settings",
            Self::AddDevice => "add_device",
            Self::DeviceDelete => "device_delete",
            Self::UpdateDeviceName => "update_device_name",
            Self::ChangePin => "change_pin",
        }
    }

    /// Whether the action changes devices or persisted settings.
    #[must_use]
    pub fn is_mutating(self) -> bool {
        matches!(
            self,
            Self::AddDevice | Self::DeviceDelete | Self::UpdateDeviceName | Self::ChangePin
        )
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Action {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|action| action.name() == s)
            .ok_or_else(|| ValidationError::UnknownAction(s.to_string()))
    }
}

/// Successful result of an action.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ActionResponse {
    Devices(Vec<DeviceConfig>),
    Pins(Vec<Pin>),
    DeviceTypes(Vec<DeviceTypeInfo>),
    Settings(Value),
}

/// Description of one supported device kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceTypeInfo {
    pub kind: DeviceKind,
    pub name: &'static str,
    pub capabilities: &'static [Capability],
}

impl From<DeviceKind> for DeviceTypeInfo {
    fn from(kind: DeviceKind) -> Self {
        Self {
            kind,
            name: kind.default_name(),
            capabilities: kind.capabilities(),
        }
    }
}

/// Signature shared by every action handler.
pub type Handler<S, E, P> =
    fn(&mut DeviceRegistry<S, E, P>, &Value) -> Result<ActionResponse, PinHubError>;

/// Lookup table from action name to handler.
pub struct CommandTable<S, E, P> {
    handlers: HashMap<&'static str, (Action, Handler<S, E, P>)>,
}

impl<S, E, P> CommandTable<S, E, P>
where
    S: ConfigStore,
    E: EventSink,
    P: PlatformRequestSink,
{
    /// Build the table, registering one handler per [`Action`].
    ///
    /// # Errors
    ///
    /// Returns [`ConflictError::DuplicateAction`] if two actions share a name.
    pub fn new() -> Result<Self, PinHubError> {
        let mut handlers = HashMap::with_capacity(Action::ALL.len());
        for action in Action::ALL {
            if handlers
                .insert(action.name(), (action, handler_for(action)))
                .is_some()
            {
                return Err(ConflictError::DuplicateAction(action.name()).into());
            }
        }
        tracing::debug!(actions = handlers.len(), "command table ready");
        Ok(Self { handlers })
    }

    /// Run the handler registered under `action`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnknownAction`] for an unregistered name,
    /// [`ValidationError::MalformedPayload`] when the payload does not fit
    /// the action, or whatever the registry operation reports.
    #[tracing::instrument(skip(self, registry, payload))]
    pub fn dispatch(
        &self,
        registry: &mut DeviceRegistry<S, E, P>,
        action: &str,
        payload: &Value,
    ) -> Result<ActionResponse, PinHubError> {
        let (action, handler) = self
            .handlers
            .get(action)
            .ok_or_else(|| ValidationError::UnknownAction(action.to_string()))?;
        tracing::debug!(%action, mutating = action.is_mutating(), "dispatching action");
        handler(registry, payload)
    }
}

fn handler_for<S, E, P>(action: Action) -> Handler<S, E, P>
where
    S: ConfigStore,
    E: EventSink,
    P: PlatformRequestSink,
{
    match action {
        Action::GetAllDevices => get_all_devices,
        Action::GetAvailablePins => get_available_pins,
        Action::GetSupportedDeviceTypes => get_supported_device_types,
        Action::GetAllSettings => get_all_settings,
        Action::AddDevice => add_device,
        Action::DeviceDelete => device_delete,
        Action::UpdateDeviceName => update_device_name,
        Action::ChangePin => change_pin,
    }
}

#[derive(Deserialize)]
struct AddDevicePayload {
    kind: String,
}

#[derive(Deserialize)]
struct DeviceDeletePayload {
    device_id: String,
}

#[derive(Deserialize)]
struct UpdateDeviceNamePayload {
    device_id: String,
    new_name: String,
}

#[derive(Deserialize)]
struct ChangePinPayload {
    device_id: String,
    new_pin: Value,
}

fn parse<T: DeserializeOwned>(payload: &Value) -> Result<T, PinHubError> {
    T::deserialize(payload)
        .map_err(|err| ValidationError::MalformedPayload(err.to_string()).into())
}

#[allow(clippy::unnecessary_wraps)]
fn get_all_devices<S, E, P>(
    registry: &mut DeviceRegistry<S, E, P>,
    _payload: &Value,
) -> Result<ActionResponse, PinHubError>
where
    S: ConfigStore,
    E: EventSink,
    P: PlatformRequestSink,
{
    Ok(ActionResponse::Devices(registry.get_devices()))
}

#[allow(clippy::unnecessary_wraps)]
fn get_available_pins<S, E, P>(
    registry: &mut DeviceRegistry<S, E, P>,
    _payload: &Value,
) -> Result<ActionResponse, PinHubError>
where
    S: ConfigStore,
    E: EventSink,
    P: PlatformRequestSink,
{
    Ok(ActionResponse::Pins(registry.available_pins()))
}

#[allow(clippy::unnecessary_wraps)]
fn get_supported_device_types<S, E, P>(
    _registry: &mut DeviceRegistry<S, E, P>,
    _payload: &Value,
) -> Result<ActionResponse, PinHubError> {
    Ok(ActionResponse::DeviceTypes(
        DeviceKind::ALL.into_iter().map(DeviceTypeInfo::from).collect(),
    ))
}

#[allow(clippy::unnecessary_wraps)]
fn get_all_settings<S, E, P>(
    registry: &mut DeviceRegistry<S, E, P>,
    _payload: &Value,
) -> Result<ActionResponse, PinHubError>
where
    S: ConfigStore,
    E: EventSink,
    P: PlatformRequestSink,
{
    Ok(ActionResponse::Settings(registry.settings()))
}

fn add_device<S, E, P>(
    registry: &mut DeviceRegistry<S, E, P>,
    payload: &Value,
) -> Result<ActionResponse, PinHubError>
where
    S: ConfigStore,
    E: EventSink,
    P: PlatformRequestSink,
{
    let AddDevicePayload { kind } = parse(payload)?;
    registry.add_device(kind.parse()?)?;
    Ok(ActionResponse::Devices(registry.get_devices()))
}

fn device_delete<S, E, P>(
    registry: &mut DeviceRegistry<S, E, P>,
    payload: &Value,
) -> Result<ActionResponse, PinHubError>
where
    S: ConfigStore,
    E: EventSink,
    P: PlatformRequestSink,
{
    let DeviceDeletePayload { device_id } = parse(payload)?;
    registry.remove_device(&device_id.parse::<DeviceId>()?)?;
    Ok(ActionResponse::Devices(registry.get_devices()))
}

fn update_device_name<S, E, P>(
    registry: &mut DeviceRegistry<S, E, P>,
    payload: &Value,
) -> Result<ActionResponse, PinHubError>
where
    S: ConfigStore,
    E: EventSink,
    P: PlatformRequestSink,
{
    let UpdateDeviceNamePayload {
        device_id,
        new_name,
    } = parse(payload)?;
    registry.update_name(&device_id.parse::<DeviceId>()?, &new_name)?;
    Ok(ActionResponse::Devices(registry.get_devices()))
}

fn change_pin<S, E, P>(
    registry: &mut DeviceRegistry<S, E, P>,
    payload: &Value,
) -> Result<ActionResponse, PinHubError>
where
    S: ConfigStore,
    E: EventSink,
    P: PlatformRequestSink,
{
    let ChangePinPayload { device_id, new_pin } = parse(payload)?;
    let device_id: DeviceId = device_id.parse()?;
    let new_pin = Pin::from_value(&new_pin)?;
    registry.change_pin(&device_id, new_pin)?;
    Ok(ActionResponse::Devices(registry.get_devices()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MemoryConfigStore, Recorder};
    use serde_json::json;

    type Table<'a> = CommandTable<MemoryConfigStore, &'a Recorder, &'a Recorder>;
    type Registry<'a> = DeviceRegistry<MemoryConfigStore, &'a Recorder, &'a Recorder>;

    fn setup(recorder: &Recorder) -> (Table<'_>, Registry<'_>) {
        let mut registry = DeviceRegistry::new(
            MemoryConfigStore::with_devices(json!([
                {"id": "a", "kind": "MotionSensorDevice", "pin": 4, "name": "Hall"}
            ])),
            recorder,
            recorder,
        )
        .with_board_pins((0..6).map(Pin::new));
        registry.start().unwrap();
        (CommandTable::new().unwrap(), registry)
    }

    #[test]
    fn should_register_every_action_once() {
        let table: CommandTable<MemoryConfigStore, Recorder, Recorder> =
            CommandTable::new().unwrap();
        for action in Action::ALL {
            assert_eq!(table.handlers[action.name()].0, action);
        }
        assert_eq!(table.handlers.len(), Action::ALL.len());
    }

    #[test]
    fn should_round_trip_action_names() {
        for action in Action::ALL {
            assert_eq!(action.name().parse::<Action>().unwrap(), action);
        }
    }

    #[test]
    fn should_reject_unknown_action() {
        let recorder = Recorder::default();
        let (table, mut registry) = setup(&recorder);
        let result = table.dispatch(&mut registry, "reboot", &Value::Null);
        assert!(matches!(
            result,
            Err(PinHubError::Validation(ValidationError::UnknownAction(_)))
        ));
    }

    #[test]
    fn should_list_devices_in_wire_shape() {
        let recorder = Recorder::default();
        let (table, mut registry) = setup(&recorder);

        let response = table
            .dispatch(&mut registry, "get_all_devices", &Value::Null)
            .unwrap();

        assert_eq!(
            serde_json::to_value(response).unwrap(),
            json!({
                "type": "devices",
                "payload": [{"id": "a", "name": "Hall", "kind": "MotionSensorDevice", "pin": 4}]
            })
        );
    }

    #[test]
    fn should_list_free_board_pins() {
        let recorder = Recorder::default();
        let (table, mut registry) = setup(&recorder);
        let response = table
            .dispatch(&mut registry, "get_available_pins", &Value::Null)
            .unwrap();
        assert_eq!(
            serde_json::to_value(response).unwrap(),
            json!({"type": "pins", "payload": [0, 1, 2, 3, 5]})
        );
    }

    #[test]
    fn should_describe_supported_device_types() {
        let recorder = Recorder::default();
        let (table, mut registry) = setup(&recorder);
        let response = table
            .dispatch(&mut registry, "get_supported_device_types", &Value::Null)
            .unwrap();
        let value = serde_json::to_value(response).unwrap();
        assert_eq!(value["type"], json!("device_types"));
        assert_eq!(
            value["payload"][0],
            json!({
                "kind": "MotionSensorDevice",
                "name": "Motion Sensor",
                "capabilities": ["motion_sensing"]
            })
        );
        assert_eq!(value["payload"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn should_return_settings_snapshot() {
        let recorder = Recorder::default();
        let (table, mut registry) = setup(&recorder);
        let response = table
            .dispatch(&mut registry, "get_all_settings", &Value::Null)
            .unwrap();
        let ActionResponse::Settings(settings) = response else {
            panic!("expected settings");
        };
        assert_eq!(settings["devices"][0]["id"], json!("a"));
    }

    #[test]
    fn should_add_device_and_return_refreshed_list() {
        let recorder = Recorder::default();
        let (table, mut registry) = setup(&recorder);

        let response = table
            .dispatch(&mut registry, "add_device", &json!({"kind": "SimpleActuatorDevice"}))
            .unwrap();

        let ActionResponse::Devices(devices) = response else {
            panic!("expected devices");
        };
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[1].kind, DeviceKind::Actuator);
    }

    #[test]
    fn should_reject_add_with_unknown_kind() {
        let recorder = Recorder::default();
        let (table, mut registry) = setup(&recorder);
        let result = table.dispatch(&mut registry, "add_device", &json!({"kind": "Toaster"}));
        assert!(matches!(
            result,
            Err(PinHubError::Validation(ValidationError::UnknownKind(_)))
        ));
        assert_eq!(registry.get_devices().len(), 1);
    }

    #[test]
    fn should_reject_malformed_payload() {
        let recorder = Recorder::default();
        let (table, mut registry) = setup(&recorder);
        let result = table.dispatch(&mut registry, "change_pin", &json!({"device_id": "a"}));
        assert!(matches!(
            result,
            Err(PinHubError::Validation(ValidationError::MalformedPayload(_)))
        ));
    }

    #[test]
    fn should_accept_string_pin_when_changing_pin() {
        let recorder = Recorder::default();
        let (table, mut registry) = setup(&recorder);
        table
            .dispatch(
                &mut registry,
                "change_pin",
                &json!({"device_id": "a", "new_pin": "5"}),
            )
            .unwrap();
        assert_eq!(registry.get_devices()[0].pin, Some(Pin::new(5)));
    }

    #[test]
    fn should_reject_malformed_pin_when_changing_pin() {
        let recorder = Recorder::default();
        let (table, mut registry) = setup(&recorder);
        let result = table.dispatch(
            &mut registry,
            "change_pin",
            &json!({"device_id": "a", "new_pin": "five"}),
        );
        assert!(matches!(
            result,
            Err(PinHubError::Validation(ValidationError::MalformedPin(_)))
        ));
        assert!(registry.device(&DeviceId::from("a")).unwrap().is_running());
    }

    #[test]
    fn should_rename_then_delete_device() {
        let recorder = Recorder::default();
        let (table, mut registry) = setup(&recorder);

        table
            .dispatch(
                &mut registry,
                "update_device_name",
                &json!({"device_id": "a", "new_name": "Porch"}),
            )
            .unwrap();
        assert_eq!(registry.get_devices()[0].name, "Porch");

        let response = table
            .dispatch(&mut registry, "device_delete", &json!({"device_id": "a"}))
            .unwrap();
        assert_eq!(response, ActionResponse::Devices(Vec::new()));
    }

    #[test]
    fn should_treat_delete_of_unknown_device_as_success() {
        let recorder = Recorder::default();
        let (table, mut registry) = setup(&recorder);
        let response = table
            .dispatch(&mut registry, "device_delete", &json!({"device_id": "nope"}))
            .unwrap();
        let ActionResponse::Devices(devices) = response else {
            panic!("expected devices");
        };
        assert_eq!(devices.len(), 1);
    }
}
