//! Persisted device records: decoding, encoding and list rewrites.
//!
//! The device list lives under [`DEVICES_KEY`] in the [`ConfigStore`] as a
//! JSON array. Rewrites operate on the raw records so that entries the
//! registry could not decode survive untouched.

use serde_json::{Map, Value};

use pinhub_domain::device::{DeviceConfig, DeviceKind};
use pinhub_domain::error::{PinHubError, ValidationError};
use pinhub_domain::id::DeviceId;
use pinhub_domain::pin::Pin;

use crate::ports::ConfigStore;

/// Settings key holding the device list.
pub const DEVICES_KEY: &str = "devices";

/// Errors raised when the stored device list itself is unusable.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The value under [`DEVICES_KEY`] is not a JSON array.
    #[error("stored device list is not an array")]
    NotAList,

    /// A config could not be turned into JSON.
    #[error("failed to encode device record")]
    Encode(#[from] serde_json::Error),
}

impl From<CodecError> for PinHubError {
    fn from(err: CodecError) -> Self {
        Self::Storage(Box::new(err))
    }
}

/// Read the raw device records. A missing key is an empty list.
///
/// # Errors
///
/// Returns [`CodecError::NotAList`] (as [`PinHubError::Storage`]) when the
/// stored value has the wrong shape.
pub fn read_records(store: &impl ConfigStore) -> Result<Vec<Value>, PinHubError> {
    match store.get(DEVICES_KEY) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(records)) => Ok(records),
        Some(_) => Err(CodecError::NotAList.into()),
    }
}

/// Decode one persisted record into a validated [`DeviceConfig`].
///
/// The kind is read from `kind`, falling back to the legacy `type` key.
/// The pin may be an integer or a numeric string. A missing or blank name
/// falls back to the kind's default name.
///
/// # Errors
///
/// Returns [`PinHubError::Validation`] for a non-object record, a missing
/// id or kind, an unknown kind or a malformed pin.
pub fn decode(record: &Value) -> Result<DeviceConfig, PinHubError> {
    let object = record
        .as_object()
        .ok_or_else(|| ValidationError::MalformedRecord(record.to_string()))?;

    let id: DeviceId = text(object, "id")?.parse()?;
    let kind: DeviceKind = object
        .get("kind")
        .or_else(|| object.get("type"))
        .and_then(Value::as_str)
        .ok_or(ValidationError::MissingField("kind"))?
        .parse()?;
    let name = match object.get("name").and_then(Value::as_str) {
        Some(name) if !name.trim().is_empty() => name.to_string(),
        _ => kind.default_name().to_string(),
    };
    let pin = match object.get("pin") {
        None | Some(Value::Null) => None,
        Some(value) => Some(Pin::from_value(value)?),
    };

    let config = DeviceConfig {
        id,
        name,
        kind,
        pin,
    };
    config.validate()?;
    Ok(config)
}

/// Encode a config into its persisted layout.
///
/// # Errors
///
/// Returns [`CodecError::Encode`] (as [`PinHubError::Storage`]) if
/// serialization fails.
pub fn encode(config: &DeviceConfig) -> Result<Value, PinHubError> {
    serde_json::to_value(config).map_err(|err| CodecError::from(err).into())
}

/// Id of a raw record, if it has one.
#[must_use]
pub fn record_id(record: &Value) -> Option<&str> {
    record.get("id").and_then(Value::as_str)
}

/// Drop the record backing the live device `id`. Other records carrying the
/// same id are kept.
#[must_use]
pub fn remove_record(mut records: Vec<Value>, id: &DeviceId) -> Vec<Value> {
    if let Some(index) = locate(&records, id) {
        records.remove(index);
    }
    records
}

/// Replace the record backing the live device `id`, keeping its position.
/// Appends when no record matches.
#[must_use]
pub fn replace_record(mut records: Vec<Value>, id: &DeviceId, updated: Value) -> Vec<Value> {
    match locate(&records, id) {
        Some(index) => records[index] = updated,
        None => records.push(updated),
    }
    records
}

/// Startup keeps the first decodable record per id, so that is the one a
/// rewrite targets. Falls back to the first record with a matching id.
fn locate(records: &[Value], id: &DeviceId) -> Option<usize> {
    let matches = |record: &Value| record_id(record) == Some(id.as_str());
    records
        .iter()
        .position(|record| matches(record) && decode(record).is_ok())
        .or_else(|| records.iter().position(matches))
}

fn text<'a>(object: &'a Map<String, Value>, field: &'static str) -> Result<&'a str, ValidationError> {
    object
        .get(field)
        .and_then(Value::as_str)
        .ok_or(ValidationError::MissingField(field))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryConfigStore;
    use serde_json::json;

    #[test]
    fn should_decode_motion_sensor_record() {
        let config =
            decode(&json!({"id": "a", "kind": "MotionSensorDevice", "pin": 4, "name": "Hall"}))
                .unwrap();
        assert_eq!(config.id.as_str(), "a");
        assert_eq!(config.kind, DeviceKind::MotionSensor);
        assert_eq!(config.pin, Some(Pin::new(4)));
        assert_eq!(config.name, "Hall");
    }

    #[test]
    fn should_decode_legacy_type_key_and_string_pin() {
        let config =
            decode(&json!({"id": "b", "type": "SimpleActuatorDevice", "pin": "17", "name": "Fan"}))
                .unwrap();
        assert_eq!(config.kind, DeviceKind::Actuator);
        assert_eq!(config.pin, Some(Pin::new(17)));
    }

    #[test]
    fn should_fall_back_to_default_name() {
        let config = decode(&json!({"id": "c", "kind": "SimpleSensorDevice", "pin": 5})).unwrap();
        assert_eq!(config.name, "Simple Sensor Device");
    }

    #[test]
    fn should_reject_unknown_kind() {
        let result = decode(&json!({"id": "a", "kind": "Thermostat", "pin": 4, "name": "x"}));
        assert!(matches!(
            result,
            Err(PinHubError::Validation(ValidationError::UnknownKind(_)))
        ));
    }

    #[test]
    fn should_reject_malformed_pin() {
        let result = decode(&json!({"id": "a", "kind": "MotionSensorDevice", "pin": "four"}));
        assert!(matches!(
            result,
            Err(PinHubError::Validation(ValidationError::MalformedPin(_)))
        ));
    }

    #[test]
    fn should_reject_missing_pin_for_pin_bound_kind() {
        let result = decode(&json!({"id": "a", "kind": "MotionSensorDevice"}));
        assert!(matches!(
            result,
            Err(PinHubError::Validation(ValidationError::MissingPin(_)))
        ));
    }

    #[test]
    fn should_reject_record_without_id() {
        let result = decode(&json!({"kind": "MotionSensorDevice", "pin": 4}));
        assert!(matches!(
            result,
            Err(PinHubError::Validation(ValidationError::MissingField("id")))
        ));
    }

    #[test]
    fn should_reject_non_object_record() {
        assert!(matches!(
            decode(&json!("MotionSensorDevice")),
            Err(PinHubError::Validation(ValidationError::MalformedRecord(_)))
        ));
    }

    #[test]
    fn should_treat_missing_list_as_empty() {
        let store = MemoryConfigStore::default();
        assert!(read_records(&store).unwrap().is_empty());
    }

    #[test]
    fn should_reject_list_of_wrong_shape() {
        let store = MemoryConfigStore::with_devices(json!({"a": 1}));
        assert!(matches!(read_records(&store), Err(PinHubError::Storage(_))));
    }

    #[test]
    fn should_replace_record_in_place() {
        let records = vec![json!({"id": "a"}), json!({"id": "b"}), json!({"id": "c"})];
        let updated = replace_record(records, &DeviceId::from("b"), json!({"id": "b", "name": "x"}));
        assert_eq!(updated[1], json!({"id": "b", "name": "x"}));
        assert_eq!(updated.len(), 3);
    }

    #[test]
    fn should_keep_unrelated_records_when_removing() {
        let records = vec![json!({"id": "a"}), json!("garbage"), json!({"id": "b"})];
        let remaining = remove_record(records, &DeviceId::from("a"));
        assert_eq!(remaining, vec![json!("garbage"), json!({"id": "b"})]);
    }

    #[test]
    fn should_remove_only_the_live_record_of_a_duplicated_id() {
        let records = vec![
            json!({"id": "a", "kind": "Thermostat"}),
            json!({"id": "a", "kind": "SimpleSensorDevice", "pin": 4, "name": "First"}),
            json!({"id": "a", "kind": "SimpleSensorDevice", "pin": 5, "name": "Second"}),
        ];
        let remaining = remove_record(records, &DeviceId::from("a"));
        assert_eq!(
            remaining,
            vec![
                json!({"id": "a", "kind": "Thermostat"}),
                json!({"id": "a", "kind": "SimpleSensorDevice", "pin": 5, "name": "Second"}),
            ]
        );
    }

    #[test]
    fn should_replace_and_remove_the_same_record() {
        let records = vec![
            json!({"id": "a", "kind": "SimpleSensorDevice", "pin": 4, "name": "First"}),
            json!({"id": "a", "kind": "SimpleSensorDevice", "pin": 5, "name": "Second"}),
        ];
        let id = DeviceId::from("a");
        let replaced = replace_record(records.clone(), &id, json!({"id": "a", "name": "x"}));
        let removed = remove_record(records, &id);
        assert_eq!(replaced[0], json!({"id": "a", "name": "x"}));
        assert_eq!(replaced[1], removed[0]);
        assert_eq!(removed.len(), 1);
    }
}
