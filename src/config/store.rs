//! Key/value settings persistence
//!
//! Settings are string-keyed primitives. The production store keeps them in a
//! single JSON object file under the platform config directory.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// A primitive setting value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Text(String),
}

impl SettingValue {
    /// Interpret the value as a boolean flag
    ///
    /// Text is accepted when it spells `true`/`false` (any case, optionally
    /// quoted). Anything else is `None`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SettingValue::Bool(value) => Some(*value),
            SettingValue::Text(text) => {
                let text = text.trim().trim_matches('"');
                if text.eq_ignore_ascii_case("true") {
                    Some(true)
                } else if text.eq_ignore_ascii_case("false") {
                    Some(false)
                } else {
                    None
                }
            }
        }
    }

    /// Textual form of the value
    pub fn into_text(self) -> String {
        match self {
            SettingValue::Bool(value) => value.to_string(),
            SettingValue::Text(text) => text,
        }
    }
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        SettingValue::Bool(value)
    }
}

impl From<String> for SettingValue {
    fn from(value: String) -> Self {
        SettingValue::Text(value)
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        SettingValue::Text(value.to_string())
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Bool(value) => write!(f, "{value}"),
            SettingValue::Text(text) => f.write_str(text),
        }
    }
}

/// Asynchronous string-keyed settings persistence
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Read a setting, `None` when it has never been written
    async fn read(&self, key: &str) -> Result<Option<SettingValue>>;

    /// Overwrite a setting (last write wins)
    async fn write(&self, key: &str, value: SettingValue) -> Result<()>;
}

/// Settings stored as one JSON object file
pub struct JsonFileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles against the file
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Platform default settings file location
    pub fn default_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(crate::constants::config::APP_DIR);
        path.push(crate::constants::config::FILENAME);
        path
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File contents, or `None` when the file is missing or blank
    async fn read_contents(&self) -> Result<Option<String>> {
        if !fs::try_exists(&self.path)
            .await
            .with_context(|| format!("Failed to stat settings file {:?}", self.path))?
        {
            debug!(path = %self.path.display(), "Settings file not found, treating all keys as absent");
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read settings from {:?}", self.path))?;

        Ok(Some(contents).filter(|contents| !contents.trim().is_empty()))
    }

    async fn load_map(&self) -> Result<Map<String, Value>> {
        let Some(contents) = self.read_contents().await? else {
            return Ok(Map::new());
        };

        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse JSON from {:?}", self.path))
    }

    /// Like `load_map`, but an unparsable file is moved aside and replaced
    ///
    /// Keeps saves working once the file has been corrupted.
    async fn load_map_for_write(&self) -> Result<Map<String, Value>> {
        let Some(contents) = self.read_contents().await? else {
            return Ok(Map::new());
        };

        match serde_json::from_str(&contents) {
            Ok(map) => Ok(map),
            Err(err) => {
                let backup = self.corrupt_backup_path();
                warn!(
                    path = %self.path.display(),
                    backup = %backup.display(),
                    error = %err,
                    "Settings file is not a JSON object, starting from an empty one"
                );
                if let Err(err) = fs::rename(&self.path, &backup).await {
                    warn!(error = %err, "Failed to move corrupt settings file aside");
                }
                Ok(Map::new())
            }
        }
    }

    fn corrupt_backup_path(&self) -> PathBuf {
        self.path.with_extension("json.corrupt")
    }
}

fn value_from_json(value: Value) -> Option<SettingValue> {
    match value {
        Value::Null => None,
        Value::Bool(flag) => Some(SettingValue::Bool(flag)),
        Value::String(text) => Some(SettingValue::Text(text)),
        other => Some(SettingValue::Text(other.to_string())),
    }
}

#[async_trait]
impl SettingsStore for JsonFileStore {
    async fn read(&self, key: &str) -> Result<Option<SettingValue>> {
        let _guard = self.lock.lock().await;
        let mut map = self.load_map().await?;
        Ok(map.remove(key).and_then(value_from_json))
    }

    async fn write(&self, key: &str, value: SettingValue) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut map = self.load_map_for_write().await?;

        let json = serde_json::to_value(&value)
            .with_context(|| format!("Failed to serialize setting {key}"))?;
        map.insert(key.to_string(), json);

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create settings directory {:?}", parent))?;
        }

        let json_string = serde_json::to_string_pretty(&map)
            .context("Failed to serialize settings to JSON")?;

        fs::write(&self.path, json_string)
            .await
            .with_context(|| format!("Failed to write settings to {:?}", self.path))?;

        debug!(key, value = %value, "Setting written");
        Ok(())
    }
}

impl fmt::Debug for JsonFileStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonFileStore")
            .field("path", &self.path)
            .finish()
    }
}

/// Log where settings will be persisted
pub fn log_store_location(store: &JsonFileStore) {
    info!(path = %store.path().display(), "Using settings file");
}

#[cfg(test)]
pub mod memory {
    //! In-memory store with failure injection for tests

    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[derive(Default)]
    pub struct MemoryStore {
        values: StdMutex<HashMap<String, SettingValue>>,
        pub fail_reads: AtomicBool,
        pub fail_writes: AtomicBool,
        /// Fail every write after this many have succeeded (0 = disabled)
        pub fail_writes_after: AtomicUsize,
        writes: AtomicUsize,
    }

    impl MemoryStore {
        pub fn with_values<I, K, V>(values: I) -> Self
        where
            I: IntoIterator<Item = (K, V)>,
            K: Into<String>,
            V: Into<SettingValue>,
        {
            let store = Self::default();
            {
                let mut map = store.values.lock().unwrap();
                for (key, value) in values {
                    map.insert(key.into(), value.into());
                }
            }
            store
        }

        pub fn get(&self, key: &str) -> Option<SettingValue> {
            self.values.lock().unwrap().get(key).cloned()
        }

        pub fn write_count(&self) -> usize {
            self.writes.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SettingsStore for MemoryStore {
        async fn read(&self, key: &str) -> Result<Option<SettingValue>> {
            if self.fail_reads.load(Ordering::SeqCst) {
                anyhow::bail!("store unavailable");
            }
            Ok(self.get(key))
        }

        async fn write(&self, key: &str, value: SettingValue) -> Result<()> {
            let limit = self.fail_writes_after.load(Ordering::SeqCst);
            if self.fail_writes.load(Ordering::SeqCst)
                || (limit > 0 && self.writes.load(Ordering::SeqCst) >= limit)
            {
                anyhow::bail!("disk full");
            }
            self.values.lock().unwrap().insert(key.to_string(), value);
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }
}
