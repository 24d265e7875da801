//! Device runtime: the three device variants behind one closed enum.
//!
//! A [`Device`] is built from a [`DeviceConfig`] in the stopped state.
//! `start` registers it with the [`PinRouter`] and announces it online;
//! `stop` deregisters it and announces it offline. Edges and instructions are
//! only acted upon while the device is running.

mod actuator;
mod motion;
mod sensor;

pub use actuator::ActuatorDevice;
pub use motion::MotionSensorDevice;
pub use sensor::SensorDevice;

use pinhub_domain::device::{DeviceConfig, DeviceKind};
use pinhub_domain::error::{ConflictError, PinHubError};
use pinhub_domain::event::DeviceEvent;
use pinhub_domain::id::DeviceId;
use pinhub_domain::instruction::Instruction;
use pinhub_domain::pin::{Pin, PinValue};
use pinhub_domain::platform::PlatformRequest;

use crate::ports::{EventSink, PlatformRequestSink};
use crate::router::{Delivery, PinRouter};

/// Lifecycle state of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Stopped,
    Running,
}

/// Everything a device may touch while starting, stopping or reacting:
/// the routing table and the two outbound sinks.
pub struct DeviceContext<'a> {
    router: &'a mut PinRouter,
    events: &'a dyn EventSink,
    platform: &'a dyn PlatformRequestSink,
}

impl<'a> DeviceContext<'a> {
    pub fn new(
        router: &'a mut PinRouter,
        events: &'a dyn EventSink,
        platform: &'a dyn PlatformRequestSink,
    ) -> Self {
        Self {
            router,
            events,
            platform,
        }
    }

    pub fn emit(&self, event: DeviceEvent) {
        self.events.send_event(event);
    }

    /// Claim `pin` for edge delivery and ask the platform to report both edges.
    ///
    /// # Errors
    ///
    /// Returns [`ConflictError::PinClaimed`] if another device holds the pin.
    /// Nothing is sent in that case.
    pub fn subscribe_pin(&mut self, device_id: &DeviceId, pin: Pin) -> Result<(), ConflictError> {
        self.router.claim(pin, device_id, Delivery::Edges)?;
        self.platform
            .send_request(PlatformRequest::subscribe(device_id.clone(), pin));
        Ok(())
    }

    pub fn unsubscribe_pin(&mut self, device_id: &DeviceId, pin: Pin) {
        if self.router.release(pin, device_id) {
            self.platform
                .send_request(PlatformRequest::unsubscribe(device_id.clone(), pin));
        }
    }

    /// Claim `pin` as an output and route instructions for `device_id`.
    ///
    /// # Errors
    ///
    /// Returns [`ConflictError::PinClaimed`] if another device holds the pin.
    pub fn subscribe_instructions(
        &mut self,
        device_id: &DeviceId,
        pin: Pin,
    ) -> Result<(), ConflictError> {
        self.router.claim(pin, device_id, Delivery::Writes)?;
        self.router.route_instructions(device_id);
        Ok(())
    }

    pub fn unsubscribe_instructions(&mut self, device_id: &DeviceId, pin: Pin) {
        self.router.unroute_instructions(device_id);
        self.router.release(pin, device_id);
    }

    pub fn write_pin(&self, device_id: &DeviceId, pin: Pin, value: PinValue) {
        self.platform
            .send_request(PlatformRequest::write(device_id.clone(), pin, value));
    }
}

/// A live device of one of the supported kinds.
#[derive(Debug)]
pub enum Device {
    Sensor(SensorDevice),
    MotionSensor(MotionSensorDevice),
    Actuator(ActuatorDevice),
}

impl Device {
    /// Build the variant selected by `config.kind`, in the stopped state.
    ///
    /// # Errors
    ///
    /// Returns [`PinHubError::Validation`] if the config violates an invariant
    /// (for instance a pin-bound kind without a pin).
    pub fn from_config(config: DeviceConfig) -> Result<Self, PinHubError> {
        config.validate()?;
        Ok(match config.kind {
            DeviceKind::Sensor => Self::Sensor(SensorDevice::new(config)?),
            DeviceKind::MotionSensor => Self::MotionSensor(MotionSensorDevice::new(config)?),
            DeviceKind::Actuator => Self::Actuator(ActuatorDevice::new(config)?),
        })
    }

    #[must_use]
    pub fn config(&self) -> &DeviceConfig {
        match self {
            Self::Sensor(d) => d.config(),
            Self::MotionSensor(d) => d.config(),
            Self::Actuator(d) => d.config(),
        }
    }

    #[must_use]
    pub fn id(&self) -> &DeviceId {
        &self.config().id
    }

    #[must_use]
    pub fn state(&self) -> RunState {
        match self {
            Self::Sensor(d) => d.state(),
            Self::MotionSensor(d) => d.state(),
            Self::Actuator(d) => d.state(),
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state() == RunState::Running
    }

    /// Register with the router and announce the device online.
    ///
    /// The pin claim (and for input pins the subscribe request) comes first
    /// and the online event last, so a device that loses a pin conflict
    /// emits nothing. Starting a running device is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`PinHubError::Conflict`] if the device's pin is held by
    /// another device; the device stays stopped and nothing is emitted.
    pub fn start(&mut self, ctx: &mut DeviceContext<'_>) -> Result<(), PinHubError> {
        if self.is_running() {
            tracing::debug!(device_id = %self.id(), "device already running");
            return Ok(());
        }
        match self {
            Self::Sensor(d) => d.start(ctx)?,
            Self::MotionSensor(d) => d.start(ctx)?,
            Self::Actuator(d) => d.start(ctx)?,
        }
        tracing::debug!(device_id = %self.id(), kind = %self.config().kind, "device started");
        Ok(())
    }

    /// Deregister from the router and announce the device offline.
    ///
    /// The unsubscribe request goes out before the offline event. Stopping a
    /// stopped device is a no-op.
    pub fn stop(&mut self, ctx: &mut DeviceContext<'_>) {
        if !self.is_running() {
            return;
        }
        match self {
            Self::Sensor(d) => d.stop(ctx),
            Self::MotionSensor(d) => d.stop(ctx),
            Self::Actuator(d) => d.stop(ctx),
        }
        tracing::debug!(device_id = %self.id(), "device stopped");
    }

    /// React to an edge on the device's pin.
    pub fn on_change(&self, pin: Pin, value: PinValue, ctx: &DeviceContext<'_>) {
        if !self.is_running() {
            tracing::debug!(device_id = %self.id(), %pin, "ignoring edge for stopped device");
            return;
        }
        match self {
            Self::Sensor(d) => d.on_change(pin, value, ctx),
            Self::MotionSensor(d) => d.on_change(pin, value, ctx),
            Self::Actuator(_) => {
                tracing::debug!(device_id = %self.id(), %pin, "actuators do not consume edges");
            }
        }
    }

    /// React to an instruction addressed to this device.
    pub fn on_instruction(&self, instruction: &Instruction, ctx: &DeviceContext<'_>) {
        if !self.is_running() {
            tracing::debug!(device_id = %self.id(), "ignoring instruction for stopped device");
            return;
        }
        match self {
            Self::Actuator(d) => d.on_instruction(instruction, ctx),
            Self::Sensor(_) | Self::MotionSensor(_) => {
                tracing::debug!(device_id = %self.id(), "sensors do not accept instructions");
            }
        }
    }

    /// Rename the device. Only allowed while stopped.
    ///
    /// # Errors
    ///
    /// Returns [`ConflictError::DeviceRunning`] if the device is running.
    pub fn update_name(&mut self, name: impl Into<String>) -> Result<(), PinHubError> {
        self.ensure_stopped()?;
        let name = name.into();
        match self {
            Self::Sensor(d) => d.update_name(name),
            Self::MotionSensor(d) => d.update_name(name),
            Self::Actuator(d) => d.update_name(name),
        }
        Ok(())
    }

    /// Move the device to another pin. Only allowed while stopped.
    ///
    /// # Errors
    ///
    /// Returns [`ConflictError::DeviceRunning`] if the device is running.
    pub fn change_pin(&mut self, pin: Pin) -> Result<(), PinHubError> {
        self.ensure_stopped()?;
        match self {
            Self::Sensor(d) => d.change_pin(pin),
            Self::MotionSensor(d) => d.change_pin(pin),
            Self::Actuator(d) => d.change_pin(pin),
        }
        Ok(())
    }

    fn ensure_stopped(&self) -> Result<(), ConflictError> {
        if self.is_running() {
            return Err(ConflictError::DeviceRunning(self.id().clone()));
        }
        Ok(())
    }
}
