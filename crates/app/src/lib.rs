//! # pinhub-app
//!
//! Application layer: device runtime, use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `ConfigStore`: key/value settings with get/set/flush semantics
//!   - `EventSink`: device-state and sensor events
//!   - `PlatformRequestSink`: GPIO subscribe/unsubscribe/write requests
//! - Run the **device variants** (sensor, motion sensor, actuator) behind one
//!   closed enum, and the **pin router** that maps pins to devices
//! - Provide the **driving/inbound** entry points:
//!   - `DeviceRegistry`: lifecycle, routing, mutate-persist-reload
//!   - `CommandTable`: application actions resolved by name
//! - Provide **in-process infrastructure** (event bus) that doesn't need IO
//!
//! ## Dependency rule
//! Depends on `pinhub-domain` only (plus `tokio::sync` for channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod codec;
pub mod commands;
pub mod devices;
pub mod event_bus;
pub mod ports;
pub mod registry;
pub mod router;

#[cfg(test)]
pub(crate) mod testing;
