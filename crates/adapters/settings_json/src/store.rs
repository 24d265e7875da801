//! `ConfigStore` implementation over a single JSON file.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tempfile::NamedTempFile;

use pinhub_app::codec::DEVICES_KEY;
use pinhub_app::ports::ConfigStore;
use pinhub_domain::error::PinHubError;

use crate::error::SettingsError;

/// Name of the settings file inside the data directory.
pub const SETTINGS_FILE: &str = "settings.json";

/// Settings held in memory and written to `settings.json` on flush.
#[derive(Debug)]
pub struct JsonSettingsStore {
    path: PathBuf,
    values: Map<String, Value>,
}

impl JsonSettingsStore {
    /// Open the settings file in `data_dir`, creating the directory and a
    /// file holding an empty device list when missing.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] if the file cannot be read or created, is
    /// not valid JSON, or is not a JSON object.
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let data_dir = data_dir.as_ref();
        fs::create_dir_all(data_dir)?;
        let path = data_dir.join(SETTINGS_FILE);

        match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<Value>(&content)? {
                Value::Object(values) => {
                    tracing::debug!(path = %path.display(), "settings loaded");
                    Ok(Self { path, values })
                }
                _ => Err(SettingsError::NotAnObject(path)),
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                let mut values = Map::new();
                values.insert(DEVICES_KEY.to_string(), Value::Array(Vec::new()));
                let store = Self { path, values };
                store.write()?;
                tracing::info!(path = %store.path.display(), "created settings file");
                Ok(store)
            }
            Err(err) => Err(err.into()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write to a sibling temp file, then rename it over the settings file.
    fn write(&self) -> Result<(), SettingsError> {
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let mut file = NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut file, &self.values)?;
        file.write_all(b"\n")?;
        file.as_file().sync_all()?;
        file.persist(&self.path).map_err(|err| err.error)?;
        Ok(())
    }
}

impl ConfigStore for JsonSettingsStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_string(), value);
    }

    fn flush(&mut self) -> Result<(), PinHubError> {
        self.write()?;
        tracing::debug!(path = %self.path.display(), "settings flushed");
        Ok(())
    }

    fn snapshot(&self) -> Value {
        Value::Object(self.values.clone())
    }
}
