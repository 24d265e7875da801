//! Instructions: commands addressed to a device id (not a pin).

use serde::{Deserialize, Serialize};

/// Power state requested by an instruction.
///
/// Unrecognised states are preserved verbatim so that the receiving device
/// can decide to ignore them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PowerState {
    On,
    Off,
    Other(String),
}

impl From<String> for PowerState {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "on" | "power_state_on" => Self::On,
            "off" | "power_state_off" => Self::Off,
            _ => Self::Other(value),
        }
    }
}

impl From<PowerState> for String {
    fn from(value: PowerState) -> Self {
        match value {
            PowerState::On => "on".to_string(),
            PowerState::Off => "off".to_string(),
            PowerState::Other(s) => s,
        }
    }
}

/// A capability change requested for one device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Instruction {
    PowerState(PowerState),
}
