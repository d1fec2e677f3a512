//! 设置存储实现
//!
//! [`TomlSettingsStore`] keeps a flat table of dotted names in a TOML file.
//! Nested tables in a hand-written file are flattened on load, so
//! `[customer-window] width = 640` reads back as `customer-window.width`.

use crate::domain::interfaces::settings::{SettingValue, SettingsError, SettingsStore};
use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Default)]
struct SettingsState {
    values: BTreeMap<String, SettingValue>,
    pending: BTreeSet<String>,
}

/// File-backed settings; writes are buffered until [`flush`](SettingsStore::flush)
#[derive(Debug)]
pub struct TomlSettingsStore {
    path: PathBuf,
    state: RwLock<SettingsState>,
}

impl TomlSettingsStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SettingsError> {
        let path = path.into();
        let values = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|source| SettingsError::Io {
                path: path.clone(),
                source,
            })?;
            parse_settings(&path, &content)?
        } else {
            BTreeMap::new()
        };

        tracing::debug!(path = %path.display(), settings = values.len(), "Settings store opened");
        Ok(Self {
            path,
            state: RwLock::new(SettingsState {
                values,
                pending: BTreeSet::new(),
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for TomlSettingsStore {
    fn read_value(&self, name: &str) -> Option<SettingValue> {
        self.state.read().values.get(name).cloned()
    }

    fn write_value(&self, name: &str, value: SettingValue) {
        let mut state = self.state.write();
        state.values.insert(name.to_string(), value);
        state.pending.insert(name.to_string());
    }

    fn flush(&self) -> Result<(), SettingsError> {
        let mut state = self.state.write();
        if state.pending.is_empty() {
            return Ok(());
        }

        let mut table = toml::map::Map::new();
        for (name, value) in &state.values {
            let value = toml::Value::try_from(value).map_err(|e| SettingsError::Format {
                path: self.path.clone(),
                message: format!("setting '{}' cannot be stored: {}", name, e),
            })?;
            table.insert(name.clone(), value);
        }
        let content = toml::to_string(&toml::Value::Table(table)).map_err(|e| SettingsError::Format {
            path: self.path.clone(),
            message: e.to_string(),
        })?;

        write_atomically(&self.path, &content)?;
        tracing::debug!(
            path = %self.path.display(),
            written = state.pending.len(),
            "Settings flushed"
        );
        state.pending.clear();
        Ok(())
    }

    fn has_pending_writes(&self) -> bool {
        !self.state.read().pending.is_empty()
    }
}

fn parse_settings(path: &Path, content: &str) -> Result<BTreeMap<String, SettingValue>, SettingsError> {
    let table: toml::Table = toml::from_str(content).map_err(|e| SettingsError::Format {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut values = BTreeMap::new();
    flatten_into(&mut values, None, table, path)?;
    Ok(values)
}

fn flatten_into(
    values: &mut BTreeMap<String, SettingValue>,
    prefix: Option<&str>,
    table: toml::Table,
    path: &Path,
) -> Result<(), SettingsError> {
    for (name, value) in table {
        let full_name = match prefix {
            Some(prefix) => format!("{}.{}", prefix, name),
            None => name,
        };
        match value {
            toml::Value::Table(nested) => flatten_into(values, Some(&full_name), nested, path)?,
            other => {
                let value = serde_json::to_value(&other).map_err(|e| SettingsError::Format {
                    path: path.to_path_buf(),
                    message: format!("setting '{}': {}", full_name, e),
                })?;
                values.insert(full_name, value);
            }
        }
    }
    Ok(())
}

/// Write to a sibling temp file, then rename over the target
fn write_atomically(path: &Path, content: &str) -> Result<(), SettingsError> {
    let io_error = |source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error)?;
    }
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "settings.toml".to_string());
    let temp_path = path.with_file_name(format!(".{}.tmp", file_name));

    fs::write(&temp_path, content).map_err(io_error)?;
    fs::rename(&temp_path, path).map_err(io_error)
}

/// In-memory settings
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    state: Mutex<SettingsState>,
    flushes: AtomicUsize,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `values`; nothing is pending
    pub fn with_values<I, K>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, SettingValue)>,
        K: Into<String>,
    {
        let store = Self::new();
        store
            .state
            .lock()
            .values
            .extend(values.into_iter().map(|(name, value)| (name.into(), value)));
        store
    }

    /// Number of flushes that persisted pending writes
    pub fn flush_count(&self) -> usize {
        self.flushes.load(Ordering::SeqCst)
    }
}

impl SettingsStore for MemorySettingsStore {
    fn read_value(&self, name: &str) -> Option<SettingValue> {
        self.state.lock().values.get(name).cloned()
    }

    fn write_value(&self, name: &str, value: SettingValue) {
        let mut state = self.state.lock();
        state.values.insert(name.to_string(), value);
        state.pending.insert(name.to_string());
    }

    fn flush(&self) -> Result<(), SettingsError> {
        let mut state = self.state.lock();
        if !state.pending.is_empty() {
            state.pending.clear();
            self.flushes.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }

    fn has_pending_writes(&self) -> bool {
        !self.state.lock().pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::interfaces::settings::SettingsExt;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_empty_store() {
        let temp_dir = TempDir::new().unwrap();
        let store = TomlSettingsStore::open(temp_dir.path().join("settings.toml")).unwrap();

        assert_eq!(store.read_or("customer-window.width", 800i64).unwrap(), 800);
        assert!(!store.has_pending_writes());
    }

    #[test]
    fn test_nested_tables_are_flattened() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.toml");
        fs::write(&path, "[customer-window]\nwidth = 640\ntitle = \"Customers\"\n").unwrap();

        let store = TomlSettingsStore::open(&path).unwrap();
        assert_eq!(store.read_value("customer-window.width"), Some(json!(640)));
        assert_eq!(
            store.read_or("customer-window.title", String::new()).unwrap(),
            "Customers"
        );
    }

    #[test]
    fn test_malformed_file_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.toml");
        fs::write(&path, "width = = 3").unwrap();

        assert!(matches!(
            TomlSettingsStore::open(&path),
            Err(SettingsError::Format { .. })
        ));
    }

    #[test]
    fn test_flush_persists_and_leaves_no_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested/settings.toml");

        let store = TomlSettingsStore::open(&path).unwrap();
        store.write("customer-window.width", &1024).unwrap();
        assert!(store.has_pending_writes());
        assert!(!path.exists());

        store.flush().unwrap();
        assert!(!store.has_pending_writes());
        assert!(!temp_dir.path().join("nested/.settings.toml.tmp").exists());

        let reopened = TomlSettingsStore::open(&path).unwrap();
        assert_eq!(reopened.read_or("customer-window.width", 0i64).unwrap(), 1024);
    }

    #[test]
    fn test_null_value_cannot_be_flushed() {
        let temp_dir = TempDir::new().unwrap();
        let store = TomlSettingsStore::open(temp_dir.path().join("settings.toml")).unwrap();
        store.write_value("broken", SettingValue::Null);

        assert!(matches!(store.flush(), Err(SettingsError::Format { .. })));
        assert!(store.has_pending_writes());
    }

    #[test]
    fn test_memory_store_counts_flushes() {
        let store = MemorySettingsStore::with_values([("customer-window.width", json!(500))]);
        assert_eq!(store.read_or("customer-window.width", 0u32).unwrap(), 500);

        store.flush().unwrap();
        assert_eq!(store.flush_count(), 0);

        store.write("customer-window.width", &600u32).unwrap();
        store.flush().unwrap();
        assert_eq!(store.flush_count(), 1);
        assert!(!store.has_pending_writes());
    }

    #[test]
    fn test_wrong_type_is_invalid_value() {
        let store = MemorySettingsStore::with_values([("customer-window.width", json!("wide"))]);
        match store.read_or("customer-window.width", 0u32) {
            Err(SettingsError::InvalidValue { name, .. }) => assert_eq!(name, "customer-window.width"),
            other => panic!("expected InvalidValue, got {:?}", other),
        }
    }
}
