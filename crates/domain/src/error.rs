//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`PinHubError`]
//! via `#[from]`. Adapter failures are boxed into [`PinHubError::Storage`].
//! An unknown device id is never an error: mutations on it are no-ops and
//! routing misses are logged.

use crate::id::DeviceId;
use crate::pin::Pin;

/// Top-level error shared by every crate in the workspace.
#[derive(Debug, thiserror::Error)]
pub enum PinHubError {
    /// A caller-supplied value was rejected before any state changed.
    #[error("invalid argument: {0}")]
    Validation(#[from] ValidationError),

    /// The request collides with state owned by another device.
    #[error("conflict: {0}")]
    Conflict(#[from] ConflictError),

    /// An adapter (settings file, transport) failed.
    #[error("storage error: {0}")]
    Storage(Box<dyn std::error::Error + Send + Sync>),
}

/// Reasons a value is rejected as an invalid argument.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("unknown device kind {0:?}")]
    UnknownKind(String),

    #[error("malformed pin value {0:?}")]
    MalformedPin(String),

    #[error("device kind {0} requires a pin")]
    MissingPin(&'static str),

    #[error("missing field {0:?}")]
    MissingField(&'static str),

    #[error("device id must not be empty")]
    EmptyId,

    #[error("name must not be empty")]
    EmptyName,

    #[error("malformed record: {0}")]
    MalformedRecord(String),

    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    #[error("unknown action {0:?}")]
    UnknownAction(String),
}

/// Reasons a request collides with existing state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConflictError {
    #[error("pin {pin} is already claimed by device {owner}")]
    PinClaimed { pin: Pin, owner: DeviceId },

    #[error("device id {0} is already registered")]
    DuplicateDevice(DeviceId),

    #[error("device {0} must be stopped before it is reconfigured")]
    DeviceRunning(DeviceId),

    #[error("action {0:?} is registered twice")]
    DuplicateAction(&'static str),
}

impl PinHubError {
    /// Short machine-readable label for the error class.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "invalid_argument",
            Self::Conflict(_) => "conflict",
            Self::Storage(_) => "storage",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_convert_validation_error_with_from() {
        let err: PinHubError = ValidationError::EmptyName.into();
        assert!(matches!(err, PinHubError::Validation(ValidationError::EmptyName)));
        assert_eq!(err.kind(), "invalid_argument");
    }

    #[test]
    fn should_display_pin_conflict_with_owner() {
        let err = ConflictError::PinClaimed {
            pin: Pin::new(4),
            owner: DeviceId::from("hall"),
        };
        assert_eq!(err.to_string(), "pin 4 is already claimed by device hall");
    }

    #[test]
    fn should_label_storage_errors() {
        let io = std::io::Error::other("disk full");
        let err = PinHubError::Storage(Box::new(io));
        assert_eq!(err.kind(), "storage");
    }
}
