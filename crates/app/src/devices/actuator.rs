//! Binary actuator: drives an output pin from on/off power-state instructions.

use pinhub_domain::device::DeviceConfig;
use pinhub_domain::error::{ConflictError, PinHubError};
use pinhub_domain::event::DeviceEvent;
use pinhub_domain::instruction::{Instruction, PowerState};
use pinhub_domain::pin::{Pin, PinValue};

use super::{DeviceContext, RunState};

/// An output pin switched on and off by instructions.
#[derive(Debug)]
pub struct ActuatorDevice {
    config: DeviceConfig,
    pin: Pin,
    state: RunState,
}

impl ActuatorDevice {
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
        ctx.subscribe_instructions(&self.config.id, self.pin)?;
        ctx.emit(DeviceEvent::online(&self.config));
        self.state = RunState::Running;
        Ok(())
    }

    pub(super) fn stop(&mut self, ctx: &mut DeviceContext<'_>) {
        ctx.unsubscribe_instructions(&self.config.id, self.pin);
        ctx.emit(DeviceEvent::offline(self.config.id.clone()));
        self.state = RunState::Stopped;
    }

    pub(super) fn on_instruction(&self, instruction: &Instruction, ctx: &DeviceContext<'_>) {
        let Instruction::PowerState(requested) = instruction;
        let value = match requested {
            PowerState::On => PinValue::High,
            PowerState::Off => PinValue::Low,
            PowerState::Other(state) => {
                tracing::debug!(device_id = %self.config.id, %state, "unsupported power state");
                return;
            }
        };
        ctx.write_pin(&self.config.id, self.pin, value);
    }

    pub(super) fn update_name(&mut self, name: String) {
        self.config.name = name;
    }

    pub(super) fn change_pin(&mut self, pin: Pin) {
        self.config.pin = Some(pin);
        self.pin = pin;
    }
}
