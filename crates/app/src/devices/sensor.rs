//! Plain input sensor: subscribes to both edges of its pin and reports nothing.
//!
//! Kinds that interpret pin levels (see [`MotionSensorDevice`](super::MotionSensorDevice))
//! build on this binding and override [`on_change`](SensorDevice::on_change).

use pinhub_domain::device::DeviceConfig;
use pinhub_domain::error::{ConflictError, PinHubError};
use pinhub_domain::event::DeviceEvent;
use pinhub_domain::pin::{Pin, PinValue};

use super::{DeviceContext, RunState};

/// An input pin bound to a logical device.
#[derive(Debug)]
pub struct SensorDevice {
    config: DeviceConfig,
    pin: Pin,
    state: RunState,
}

impl SensorDevice {
    /// # Errors
    ///
    /// Returns [`PinHubError::Validation`] if the config carries no pin.
    pub fn new(config: DeviceConfig) -> Result<Self, PinHubError> {
        let pin = config.required_pin()?;
        Ok(Self {
            config,
            pin,
            state: RunState::Stopped,
        })
    }

    #[must_use]
    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    #[must_use]
    pub fn pin(&self) -> Pin {
        self.pin
    }

    #[must_use]
    pub fn state(&self) -> RunState {
        self.state
    }

    pub(super) fn start(&mut self, ctx: &mut DeviceContext<'_>) -> Result<(), ConflictError> {
        ctx.subscribe_pin(&self.config.id, self.pin)?;
        ctx.emit(DeviceEvent::online(&self.config));
        self.state = RunState::Running;
        Ok(())
    }

    pub(super) fn stop(&mut self, ctx: &mut DeviceContext<'_>) {
        ctx.unsubscribe_pin(&self.config.id, self.pin);
        ctx.emit(DeviceEvent::offline(self.config.id.clone()));
        self.state = RunState::Stopped;
    }

    pub(super) fn on_change(&self, pin: Pin, value: PinValue, _ctx: &DeviceContext<'_>) {
        tracing::trace!(device_id = %self.config.id, %pin, ?value, "edge received");
    }

    pub(super) fn update_name(&mut self, name: String) {
        self.config.name = name;
    }

    pub(super) fn change_pin(&mut self, pin: Pin) {
        self.config.pin = Some(pin);
        self.pin = pin;
    }
}
