//! 设置持久化接口
//!
//! Settings are stored as JSON values under dotted names such as
//! `customer-window.width`. [`SettingsExt`] adds typed access on top of any store.

use serde::{de::DeserializeOwned, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Stored representation of a setting
pub type SettingValue = serde_json::Value;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to access settings file '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Settings file '{}' is malformed: {message}", .path.display())]
    Format { path: PathBuf, message: String },
    #[error("Setting '{name}' has an unexpected value: {source}")]
    InvalidValue {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Settings persistence collaborator
pub trait SettingsStore: Send + Sync {
    /// Raw value of a setting, pending writes included
    fn read_value(&self, name: &str) -> Option<SettingValue>;

    /// Buffer a write; it becomes durable on the next [`flush`](Self::flush)
    fn write_value(&self, name: &str, value: SettingValue);

    /// Persist all buffered writes
    fn flush(&self) -> Result<(), SettingsError>;

    fn has_pending_writes(&self) -> bool;
}

/// Typed helpers for every [`SettingsStore`]
pub trait SettingsExt {
    /// Read `name` as `T`, falling back to `default` when the setting is absent
    fn read_or<T: DeserializeOwned>(&self, name: &str, default: T) -> Result<T, SettingsError>;

    fn write<T: Serialize>(&self, name: &str, value: &T) -> Result<(), SettingsError>;
}

impl<S: SettingsStore + ?Sized> SettingsExt for S {
    fn read_or<T: DeserializeOwned>(&self, name: &str, default: T) -> Result<T, SettingsError> {
        match self.read_value(name) {
            Some(value) => serde_json::from_value(value).map_err(|source| SettingsError::InvalidValue {
                name: name.to_string(),
                source,
            }),
            None => Ok(default),
        }
    }

    fn write<T: Serialize>(&self, name: &str, value: &T) -> Result<(), SettingsError> {
        let value = serde_json::to_value(value).map_err(|source| SettingsError::InvalidValue {
            name: name.to_string(),
            source,
        })?;
        self.write_value(name, value);
        Ok(())
    }
}
