//! # pinhub-domain
//!
//! Pure domain model for the pinhub GPIO device manager.
//!
//! ## Responsibilities
//! - Foundational types: device identifiers, pins, pin levels, error conventions
//! - Define **device configurations** (the persisted record of one logical device)
//! - Define **device kinds** and the capability set each kind declares
//! - Define **device events** (online/offline announcements, sensor readings)
//! - Define **platform requests** (GPIO subscribe/unsubscribe/write)
//! - Define **instructions** (commands addressed to a device id)
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod pin;

pub mod device;
pub mod event;
pub mod instruction;
pub mod platform;
