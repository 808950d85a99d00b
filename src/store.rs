//! Persisted key-value store backing all timer and flag state
//!
//! Values live in a single JSON file that is rewritten on every set, so a
//! write is durable before the next read by any component. Missing keys are
//! reported as `None`; callers supply their own defaults.

use std::{
    collections::HashMap,
    fs,
    path::PathBuf,
    sync::Mutex,
};

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{debug, warn};

/// Key for the first-time-setup flag that gates the tick coordinator
pub const KEY_CONFIG: &str = "config";
/// Key for the persisted session-reset alarm flag (survives reboot)
pub const KEY_ALARM_WAS_SET: &str = "alarmWasSet";
/// Key for the session-reset alarm deadline in epoch milliseconds
pub const KEY_ALARM_DEADLINE: &str = "alarm_deadline";

/// File-backed key-value store for booleans, ints, and longs
#[derive(Debug)]
pub struct Store {
    path: PathBuf,
    values: Mutex<HashMap<String, Value>>,
}

impl Store {
    /// Open the store at the given path, loading any existing contents.
    ///
    /// Opening is idempotent: an existing file is read back as-is, never
    /// clobbered, so repeated opens preserve all stored values.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create store directory {:?}", parent))?;
        }

        let values = if path.exists() {
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read store file {:?}", path))?;
            match serde_json::from_str(&raw) {
                Ok(values) => values,
                Err(e) => {
                    // A corrupt file must not keep the widget undisplayable
                    warn!("Store file {:?} is corrupt ({}), starting empty", path, e);
                    HashMap::new()
                }
            }
        } else {
            HashMap::new()
        };

        debug!("Opened store at {:?} with {} keys", path, values.len());

        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    /// Get a boolean value, or `None` if the key is unset
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.values
            .lock()
            .ok()
            .and_then(|values| values.get(key).and_then(Value::as_bool))
    }

    /// Set a boolean value and persist it
    pub fn set_bool(&self, key: &str, value: bool) -> Result<(), String> {
        self.set(key, Value::Bool(value))
    }

    /// Get an integer value, or `None` if the key is unset
    pub fn get_int(&self, key: &str) -> Option<i32> {
        self.get_long(key).and_then(|v| i32::try_from(v).ok())
    }

    /// Set an integer value and persist it
    pub fn set_int(&self, key: &str, value: i32) -> Result<(), String> {
        self.set(key, Value::from(value))
    }

    /// Get a long integer value, or `None` if the key is unset
    pub fn get_long(&self, key: &str) -> Option<i64> {
        self.values
            .lock()
            .ok()
            .and_then(|values| values.get(key).and_then(Value::as_i64))
    }

    /// Set a long integer value and persist it
    pub fn set_long(&self, key: &str, value: i64) -> Result<(), String> {
        self.set(key, Value::from(value))
    }

    /// Clear all keys and remove the backing file
    pub fn reset(&self) -> Result<(), String> {
        let mut values = self
            .values
            .lock()
            .map_err(|e| format!("Failed to lock store: {}", e))?;

        values.clear();

        if self.path.exists() {
            fs::remove_file(&self.path)
                .map_err(|e| format!("Failed to remove store file: {}", e))?;
        }

        debug!("Store reset, all keys cleared");
        Ok(())
    }

    fn set(&self, key: &str, value: Value) -> Result<(), String> {
        let mut values = self
            .values
            .lock()
            .map_err(|e| format!("Failed to lock store: {}", e))?;

        values.insert(key.to_string(), value);
        self.persist(&values)
    }

    // Caller holds the lock, so writes are serialized
    fn persist(&self, values: &HashMap<String, Value>) -> Result<(), String> {
        let raw = serde_json::to_string_pretty(values)
            .map_err(|e| format!("Failed to serialize store: {}", e))?;

        fs::write(&self.path, raw)
            .map_err(|e| format!("Failed to write store file {:?}: {}", self.path, e))
    }
}
