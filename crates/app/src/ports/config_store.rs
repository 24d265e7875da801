//! Config store port: key/value persistence of plugin settings.

use pinhub_domain::error::PinHubError;

/// Key/value settings store.
///
/// `set` only changes the in-memory view; nothing reaches durable storage
/// until [`flush`](Self::flush) succeeds. Callers run a read-modify-write
/// cycle and flush only once every validation has passed.
pub trait ConfigStore {
    /// Current value stored under `key`.
    fn get(&self, key: &str) -> Option<serde_json::Value>;

    /// Replace the value stored under `key`.
    fn set(&mut self, key: &str, value: serde_json::Value);

    /// Write the in-memory settings to durable storage.
    ///
    /// # Errors
    ///
    /// Returns [`PinHubError::Storage`] when the write fails. Durable
    /// storage is left untouched in that case.
    fn flush(&mut self) -> Result<(), PinHubError>;

    /// Every stored setting as one JSON object.
    fn snapshot(&self) -> serde_json::Value;
}
