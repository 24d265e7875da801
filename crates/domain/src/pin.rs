//! GPIO pins and pin levels.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Identifier of a physical GPIO line on the host board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pin(u16);

impl Pin {
    #[must_use]
    pub const fn new(number: u16) -> Self {
        Self(number)
    }

    #[must_use]
    pub const fn number(self) -> u16 {
        self.0
    }

    /// Parse a pin from a loosely typed JSON value.
    ///
    /// Accepts a non-negative integer or a string holding one (`4` or `"4"`),
    /// which is how pins have historically been written to settings files.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MalformedPin`] for anything else.
    pub fn from_value(value: &serde_json::Value) -> Result<Self, ValidationError> {
        match value {
            serde_json::Value::Number(n) => n
                .as_u64()
                .and_then(|n| u16::try_from(n).ok())
                .map(Self)
                .ok_or_else(|| ValidationError::MalformedPin(n.to_string())),
            serde_json::Value::String(s) => s.parse(),
            other => Err(ValidationError::MalformedPin(other.to_string())),
        }
    }
}

impl fmt::Display for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for Pin {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u16>()
            .map(Self)
            .map_err(|_| ValidationError::MalformedPin(s.to_string()))
    }
}

/// Logic level of a pin.
///
/// Inbound levels arrive in several spellings (`"high"`, `1`, `true`, …).
/// Only an explicit high reading maps to [`High`](Self::High); every other
/// value is treated as [`Low`](Self::Low). Outbound writes serialize as `1`/`0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawPinValue", into = "u8")]
pub enum PinValue {
    Low,
    High,
}

impl PinValue {
    #[must_use]
    pub fn is_high(self) -> bool {
        matches!(self, Self::High)
    }
}

impl From<PinValue> for u8 {
    fn from(value: PinValue) -> Self {
        match value {
            PinValue::Low => 0,
            PinValue::High => 1,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPinValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl From<RawPinValue> for PinValue {
    fn from(raw: RawPinValue) -> Self {
        let high = match raw {
            RawPinValue::Bool(b) => b,
            RawPinValue::Int(n) => n == 1,
            RawPinValue::Text(s) => {
                let s = s.trim();
                s.eq_ignore_ascii_case("high")
                    || s.eq_ignore_ascii_case("pin_value_high")
                    || s == "1"
            }
        };
        if high { Self::High } else { Self::Low }
    }
}

/// Which transitions of an input pin the platform should report.
///
/// Devices only ever ask for [`EdgeType::Both`]. `Rising` and `Falling` are
/// kept so the platform's full edge vocabulary round-trips on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeType {
    Rising,
    Falling,
    #[default]
    Both,
}
