//! # pinhub-adapter-settings-json
//!
//! File-backed settings adapter: implements the `ConfigStore` port defined in
//! `pinhub-app`.
//!
//! ## Responsibilities
//! - Open (or create) `settings.json` inside a data directory
//! - Keep the settings in memory between flushes
//! - Replace the file atomically on flush so a crash never leaves a
//!   half-written settings file behind
//!
//! ## Dependency rule
//! Depends on `pinhub-app` (for port traits) and `pinhub-domain`.

mod error;
mod store;

pub use error::SettingsError;
pub use store::{JsonSettingsStore, SETTINGS_FILE};
