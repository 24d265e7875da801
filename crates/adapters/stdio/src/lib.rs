//! # pinhub-adapter-stdio
//!
//! Line-oriented JSON transport between the platform and the device core.
//!
//! ## Responsibilities
//! - Decode inbound lines: GPIO edges, device instructions, application actions
//! - Dispatch each line to completion before reading the next
//! - Encode outbound lines: device events, platform requests, action responses
//!
//! ## Dependency rule
//! Depends on `pinhub-app` (for the registry, command table and bus) and
//! `pinhub-domain`.

mod error;
mod session;
pub mod wire;

pub use error::StdioError;
pub use session::Session;
