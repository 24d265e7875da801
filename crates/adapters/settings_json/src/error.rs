//! Settings-file error type wrapping IO and JSON errors.

use std::path::PathBuf;

use pinhub_domain::error::PinHubError;

/// Errors originating from the settings file.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// Reading, writing or renaming the file failed.
    #[error("settings file IO error")]
    Io(#[from] std::io::Error),

    /// The file is not valid JSON, or the settings could not be encoded.
    #[error("settings JSON error")]
    Json(#[from] serde_json::Error),

    /// The file holds valid JSON that is not an object.
    #[error("settings file {0} does not contain a JSON object")]
    NotAnObject(PathBuf),
}

impl From<SettingsError> for PinHubError {
    fn from(err: SettingsError) -> Self {
        Self::Storage(Box::new(err))
    }
}
