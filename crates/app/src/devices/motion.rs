//! Motion sensor: a sensor whose high level means motion.

use pinhub_domain::device::DeviceConfig;
use pinhub_domain::error::{ConflictError, PinHubError};
use pinhub_domain::event::{DeviceEvent, MotionState, SensorReading};
use pinhub_domain::pin::{Pin, PinValue};

use super::{DeviceContext, RunState, SensorDevice};

/// PIR-style motion sensor on an input pin.
#[derive(Debug)]
pub struct MotionSensorDevice {
    sensor: SensorDevice,
}

impl MotionSensorDevice {
    /// # Errors
    ///
    /// Returns [`PinHubError::Validation`] if the config carries no pin.
    pub fn new(config: DeviceConfig) -> Result<Self, PinHubError> {
        Ok(Self {
            sensor: SensorDevice::new(config)?,
        })
    }

    #[must_use]
    pub fn config(&self) -> &DeviceConfig {
        self.sensor.config()
    }

    #[must_use]
    pub fn state(&self) -> RunState {
        self.sensor.state()
    }

    pub(super) fn start(&mut self, ctx: &mut DeviceContext<'_>) -> Result<(), ConflictError> {
        self.sensor.start(ctx)
    }

    pub(super) fn stop(&mut self, ctx: &mut DeviceContext<'_>) {
        self.sensor.stop(ctx);
    }

    /// High means motion detected; any other level means no motion.
    pub(super) fn on_change(&self, _pin: Pin, value: PinValue, ctx: &DeviceContext<'_>) {
        let state = if value.is_high() {
            MotionState::MotionDetected
        } else {
            MotionState::NoMotion
        };
        ctx.emit(DeviceEvent::reading(
            self.config().id.clone(),
            SensorReading::Motion(state),
        ));
    }

    pub(super) fn update_name(&mut self, name: String) {
        self.sensor.update_name(name);
    }

    pub(super) fn change_pin(&mut self, pin: Pin) {
        self.sensor.change_pin(pin);
    }
}
