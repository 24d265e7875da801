//! Device configuration: the persisted record describing one logical device.
//!
//! A [`DeviceConfig`] says *what* a device is (its [`DeviceKind`]) and *where*
//! it lives (its [`Pin`]). The runtime behaviour of each kind is implemented
//! in the `app` crate; this module only carries the static, total mapping from
//! kind to tag, default name, event class and capabilities.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PinHubError, ValidationError};
use crate::id::DeviceId;
use crate::pin::Pin;

/// Closed set of supported device kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceKind {
    #[serde(rename = "SimpleSensorDevice", alias = "SensorDevice")]
    Sensor,
    #[serde(rename = "MotionSensorDevice")]
    MotionSensor,
    #[serde(rename = "SimpleActuatorDevice", alias = "ActuatorDevice")]
    Actuator,
}

impl DeviceKind {
    /// Every supported kind, in the order they are offered to users.
    pub const ALL: [Self; 3] = [Self::MotionSensor, Self::Sensor, Self::Actuator];

    /// Tag written to the settings file.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sensor => "SimpleSensorDevice",
            Self::MotionSensor => "MotionSensorDevice",
            Self::Actuator => "SimpleActuatorDevice",
        }
    }

    /// Human-readable name of the kind.
    #[must_use]
    pub fn default_name(self) -> &'static str {
        match self {
            Self::Sensor => "Simple Sensor Device",
            Self::MotionSensor => "Motion Sensor",
            Self::Actuator => "Simple Actuator Device",
        }
    }

    /// Device class announced in online events.
    #[must_use]
    pub fn class(self) -> DeviceClass {
        match self {
            Self::Sensor => DeviceClass::Sensor,
            Self::MotionSensor => DeviceClass::MotionSensor,
            Self::Actuator => DeviceClass::Actuator,
        }
    }

    /// Capabilities announced in online events.
    #[must_use]
    pub fn capabilities(self) -> &'static [Capability] {
        match self {
            Self::Sensor => &[],
            Self::MotionSensor => &[Capability::MotionSensing],
            Self::Actuator => &[Capability::OnOffPower],
        }
    }

    /// Whether records of this kind must carry a pin.
    #[must_use]
    pub fn requires_pin(self) -> bool {
        match self {
            Self::Sensor | Self::MotionSensor | Self::Actuator => true,
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SimpleSensorDevice" | "SensorDevice" => Ok(Self::Sensor),
            "MotionSensorDevice" => Ok(Self::MotionSensor),
            "SimpleActuatorDevice" | "ActuatorDevice" => Ok(Self::Actuator),
            other => Err(ValidationError::UnknownKind(other.to_string())),
        }
    }
}

/// Platform-facing device class carried by online events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeviceClass {
    Sensor,
    MotionSensor,
    Actuator,
}

/// A feature a device declares when it comes online.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Reports motion-detected / no-motion readings.
    MotionSensing,
    /// Accepts on/off power-state instructions.
    OnOffPower,
}

/// Persisted configuration of a single device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceConfig {
    pub id: DeviceId,
    pub name: String,
    pub kind: DeviceKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pin: Option<Pin>,
}

impl DeviceConfig {
    /// Create a builder for constructing a [`DeviceConfig`].
    #[must_use]
    pub fn builder() -> DeviceConfigBuilder {
        DeviceConfigBuilder::default()
    }

    /// Default configuration for a freshly added device of `kind`.
    ///
    /// The device gets a fresh id, a placeholder name and pin 0 when the
    /// kind is pin-bound.
    #[must_use]
    pub fn new_default(kind: DeviceKind) -> Self {
        Self {
            id: DeviceId::generate(),
            name: format!("New {}", kind.default_name()),
            kind,
            pin: kind.requires_pin().then_some(Pin::new(0)),
        }
    }

    /// The pin this device is bound to.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingPin`] if the record carries none.
    pub fn required_pin(&self) -> Result<Pin, ValidationError> {
        self.pin
            .ok_or(ValidationError::MissingPin(self.kind.as_str()))
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`PinHubError::Validation`] when:
    /// - `id` is empty ([`ValidationError::EmptyId`])
    /// - `name` is empty ([`ValidationError::EmptyName`])
    /// - a pin-bound kind has no pin ([`ValidationError::MissingPin`])
    pub fn validate(&self) -> Result<(), PinHubError> {
        if self.id.as_str().trim().is_empty() {
            return Err(ValidationError::EmptyId.into());
        }
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if self.kind.requires_pin() {
            self.required_pin()?;
        }
        Ok(())
    }
}

/// Step-by-step builder for [`DeviceConfig`].
#[derive(Debug, Default)]
pub struct DeviceConfigBuilder {
    id: Option<DeviceId>,
    name: Option<String>,
    kind: Option<DeviceKind>,
    pin: Option<Pin>,
}

impl DeviceConfigBuilder {
    #[must_use]
    pub fn id(mut self, id: impl Into<DeviceId>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn kind(mut self, kind: DeviceKind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn pin(mut self, pin: Pin) -> Self {
        self.pin = Some(pin);
        self
    }

    /// Consume the builder, validate, and return a [`DeviceConfig`].
    ///
    /// A missing id is generated; a missing name falls back to the kind's
    /// default name.
    ///
    /// # Errors
    ///
    /// Returns [`PinHubError::Validation`] if `kind` is missing or the
    /// resulting record violates an invariant.
    pub fn build(self) -> Result<DeviceConfig, PinHubError> {
        let kind = self.kind.ok_or(ValidationError::MissingField("kind"))?;
        let config = DeviceConfig {
            id: self.id.unwrap_or_else(DeviceId::generate),
            name: self
                .name
                .unwrap_or_else(|| kind.default_name().to_string()),
            kind,
            pin: self.pin,
        };
        config.validate()?;
        Ok(config)
    }
}
