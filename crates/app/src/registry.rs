//! Device registry: owns live devices, persists their configs and routes
//! inbound edges and instructions to them.
//!
//! Every configuration change runs the same bracket: stop the device, apply
//! the change, write the device list back to the [`ConfigStore`], rebuild the
//! device from its new config and start it again. A rejected change restarts
//! the device with its original config, so a device is never left stopped by
//! a failed request.

use serde_json::Value;

use pinhub_domain::device::{DeviceConfig, DeviceKind};
use pinhub_domain::error::{ConflictError, PinHubError, ValidationError};
use pinhub_domain::id::DeviceId;
use pinhub_domain::instruction::Instruction;
use pinhub_domain::pin::{Pin, PinValue};

use crate::codec::{self, DEVICES_KEY};
use crate::devices::{Device, DeviceContext};
use crate::ports::{ConfigStore, EventSink, PlatformRequestSink};
use crate::router::PinRouter;

/// Highest GPIO line exposed by the default board layout.
pub const DEFAULT_MAX_PIN: u16 = 27;

/// Router plus outbound sinks: what a device needs while it runs.
struct Wiring<E, P> {
    router: PinRouter,
    events: E,
    platform: P,
}

impl<E: EventSink, P: PlatformRequestSink> Wiring<E, P> {
    fn context(&mut self) -> DeviceContext<'_> {
        DeviceContext::new(&mut self.router, &self.events, &self.platform)
    }
}

/// Sole owner of live devices and sole writer of the persisted device list.
pub struct DeviceRegistry<S, E, P> {
    store: S,
    wiring: Wiring<E, P>,
    devices: Vec<Device>,
    board_pins: Vec<Pin>,
    started: bool,
}

impl<S, E, P> DeviceRegistry<S, E, P>
where
    S: ConfigStore,
    E: EventSink,
    P: PlatformRequestSink,
{
    /// Create a stopped registry over `store`, exposing pins `0..=27`.
    pub fn new(store: S, events: E, platform: P) -> Self {
        Self {
            store,
            wiring: Wiring {
                router: PinRouter::new(),
                events,
                platform,
            },
            devices: Vec::new(),
            board_pins: (0..=DEFAULT_MAX_PIN).map(Pin::new).collect(),
            started: false,
        }
    }

    /// Replace the set of GPIO lines the host board exposes.
    #[must_use]
    pub fn with_board_pins(mut self, pins: impl IntoIterator<Item = Pin>) -> Self {
        self.board_pins = pins.into_iter().collect();
        self.board_pins.sort_unstable();
        self.board_pins.dedup();
        self
    }

    /// Load the persisted device list and start every device it describes.
    ///
    /// A record that cannot be decoded, duplicates an earlier id or collides
    /// with an already claimed pin is logged and skipped; the remaining
    /// devices still start. Calling this on a started registry is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`PinHubError::Storage`] only when the stored device list is
    /// not a list at all.
    #[tracing::instrument(skip(self))]
    pub fn start(&mut self) -> Result<(), PinHubError> {
        if self.started {
            tracing::debug!("device registry already started");
            return Ok(());
        }
        let records = codec::read_records(&self.store)?;
        for record in &records {
            let config = match codec::decode(record) {
                Ok(config) => config,
                Err(err) => {
                    tracing::warn!(error = %err, %record, "skipping unusable device record");
                    continue;
                }
            };
            if self.position(&config.id).is_some() {
                tracing::warn!(device_id = %config.id, "skipping duplicate device id");
                continue;
            }
            let mut device = match Device::from_config(config) {
                Ok(device) => device,
                Err(err) => {
                    tracing::warn!(error = %err, %record, "skipping unusable device record");
                    continue;
                }
            };
            if let Err(err) = device.start(&mut self.wiring.context()) {
                tracing::warn!(device_id = %device.id(), error = %err, "device failed to start");
                continue;
            }
            self.devices.push(device);
        }
        self.started = true;
        tracing::info!(
            devices = self.devices.len(),
            records = records.len(),
            "device registry started"
        );
        Ok(())
    }

    /// Stop and drop every live device. Persisted configs are untouched.
    #[tracing::instrument(skip(self))]
    pub fn stop(&mut self) {
        for mut device in self.devices.drain(..) {
            device.stop(&mut self.wiring.context());
        }
        self.started = false;
        tracing::info!("device registry stopped");
    }

    /// Create, persist and start a device of `kind` with default settings.
    ///
    /// # Errors
    ///
    /// Returns [`PinHubError::Conflict`] if the default pin is already
    /// claimed, or [`PinHubError::Storage`] if persisting fails. Nothing is
    /// changed in either case.
    #[tracing::instrument(skip(self))]
    pub fn add_device(&mut self, kind: DeviceKind) -> Result<DeviceConfig, PinHubError> {
        let config = DeviceConfig::new_default(kind);
        if let Some(pin) = config.pin {
            self.wiring.router.check_available(pin, &config.id)?;
        }
        if self.position(&config.id).is_some() {
            return Err(ConflictError::DuplicateDevice(config.id).into());
        }
        let mut device = Device::from_config(config.clone())?;

        let mut records = codec::read_records(&self.store)?;
        records.push(codec::encode(&config)?);
        self.commit(records)?;

        device.start(&mut self.wiring.context())?;
        self.devices.push(device);
        tracing::info!(device_id = %config.id, %kind, "device added");
        Ok(config)
    }

    /// Stop, forget and unpersist a device. Returns whether it existed.
    ///
    /// An unknown id is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`PinHubError::Storage`] if persisting fails; the device is
    /// restarted and stays registered.
    #[tracing::instrument(skip(self))]
    pub fn remove_device(&mut self, id: &DeviceId) -> Result<bool, PinHubError> {
        let Some(index) = self.position(id) else {
            tracing::debug!("no such device, nothing to remove");
            return Ok(false);
        };
        let records = codec::remove_record(codec::read_records(&self.store)?, id);

        let mut device = self.devices.remove(index);
        device.stop(&mut self.wiring.context());

        if let Err(err) = self.commit(records) {
            if let Err(restart) = device.start(&mut self.wiring.context()) {
                tracing::warn!(error = %restart, "failed to restart device after rollback");
            }
            self.devices.insert(index, device);
            return Err(err);
        }
        tracing::info!("device removed");
        Ok(true)
    }

    /// Rename a device. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyName`] for a blank name, or
    /// [`PinHubError::Storage`] if persisting fails. The device keeps its
    /// original name and keeps running in either case.
    #[tracing::instrument(skip(self))]
    pub fn update_name(&mut self, id: &DeviceId, new_name: &str) -> Result<bool, PinHubError> {
        let name = new_name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        self.reconfigure(id, |device, _| device.update_name(name))
    }

    /// Move a device to another pin. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns [`PinHubError::Conflict`] if another device holds `new_pin`, or
    /// [`PinHubError::Storage`] if persisting fails. The device keeps its
    /// original pin and keeps running in either case.
    #[tracing::instrument(skip(self))]
    pub fn change_pin(&mut self, id: &DeviceId, new_pin: Pin) -> Result<bool, PinHubError> {
        self.reconfigure(id, |device, router| {
            router.check_available(new_pin, device.id())?;
            device.change_pin(new_pin)
        })
    }

    /// Deliver an edge to the device subscribed to `pin`, if any.
    pub fn on_pin_value_changed(&mut self, pin: Pin, value: PinValue) {
        let Some(owner) = self.wiring.router.edge_subscriber(pin).cloned() else {
            tracing::debug!(%pin, ?value, "edge on unsubscribed pin dropped");
            return;
        };
        let Some(device) = self.devices.iter().find(|device| device.id() == &owner) else {
            tracing::warn!(%pin, device_id = %owner, "pin routed to unknown device");
            return;
        };
        device.on_change(pin, value, &self.wiring.context());
    }

    /// Deliver an instruction to the device with `device_id`, if it takes any.
    pub fn on_instruction(&mut self, device_id: &DeviceId, instruction: &Instruction) {
        let Some(device) = self.devices.iter().find(|device| device.id() == device_id) else {
            tracing::warn!(%device_id, "instruction for unknown device dropped");
            return;
        };
        if !self.wiring.router.accepts_instructions(device_id) {
            tracing::warn!(%device_id, "device does not accept instructions");
            return;
        }
        device.on_instruction(instruction, &self.wiring.context());
    }

    /// Configs of every live device, in registry order.
    #[must_use]
    pub fn get_devices(&self) -> Vec<DeviceConfig> {
        self.devices
            .iter()
            .map(|device| device.config().clone())
            .collect()
    }

    #[must_use]
    pub fn device(&self, id: &DeviceId) -> Option<&Device> {
        self.devices.iter().find(|device| device.id() == id)
    }

    /// Board pins no live device currently claims, ascending.
    #[must_use]
    pub fn available_pins(&self) -> Vec<Pin> {
        self.board_pins
            .iter()
            .copied()
            .filter(|pin| self.wiring.router.owner(*pin).is_none())
            .collect()
    }

    #[must_use]
    pub fn router(&self) -> &PinRouter {
        &self.wiring.router
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Every stored setting, as the store reports it.
    #[must_use]
    pub fn settings(&self) -> Value {
        self.store.snapshot()
    }

    #[must_use]
    pub fn is_started(&self) -> bool {
        self.started
    }

    fn position(&self, id: &DeviceId) -> Option<usize> {
        self.devices.iter().position(|device| device.id() == id)
    }

    /// Write `records` and flush. On failure the previous list is put back.
    fn commit(&mut self, records: Vec<Value>) -> Result<(), PinHubError> {
        let previous = self.store.get(DEVICES_KEY);
        self.store.set(DEVICES_KEY, Value::Array(records));
        if let Err(err) = self.store.flush() {
            tracing::warn!(error = %err, "failed to persist device list");
            self.store
                .set(DEVICES_KEY, previous.unwrap_or_else(|| Value::Array(Vec::new())));
            return Err(err);
        }
        Ok(())
    }

    /// Stop, mutate, persist, rebuild, start. Restores the original config
    /// on any failure.
    fn reconfigure<F>(&mut self, id: &DeviceId, mutate: F) -> Result<bool, PinHubError>
    where
        F: FnOnce(&mut Device, &PinRouter) -> Result<(), PinHubError>,
    {
        let Some(index) = self.position(id) else {
            tracing::debug!(device_id = %id, "no such device, nothing to reconfigure");
            return Ok(false);
        };
        let records = codec::read_records(&self.store)?;
        let original = self.devices[index].config().clone();

        self.devices[index].stop(&mut self.wiring.context());
        match self.apply(index, records, mutate) {
            Ok(()) => {
                tracing::info!(device_id = %id, "device reconfigured");
                Ok(true)
            }
            Err(err) => {
                tracing::warn!(device_id = %id, error = %err, "reconfiguration rejected");
                self.restore(index, original);
                Err(err)
            }
        }
    }

    fn apply<F>(&mut self, index: usize, records: Vec<Value>, mutate: F) -> Result<(), PinHubError>
    where
        F: FnOnce(&mut Device, &PinRouter) -> Result<(), PinHubError>,
    {
        let device = &mut self.devices[index];
        mutate(device, &self.wiring.router)?;
        let config = device.config().clone();

        let updated = codec::encode(&config)?;
        self.commit(codec::replace_record(records, &config.id, updated))?;

        let mut reloaded = Device::from_config(config)?;
        reloaded.start(&mut self.wiring.context())?;
        self.devices[index] = reloaded;
        Ok(())
    }

    fn restore(&mut self, index: usize, original: DeviceConfig) {
        match Device::from_config(original) {
            Ok(mut device) => {
                if let Err(err) = device.start(&mut self.wiring.context()) {
                    tracing::warn!(device_id = %device.id(), error = %err, "failed to restart device");
                }
                self.devices[index] = device;
            }
            Err(err) => tracing::warn!(error = %err, "original config no longer valid"),
        }
    }
}
