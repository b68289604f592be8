use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::backend::StorageBackend;

/// A stored JSON array read one element at a time.
///
/// Elements that do not parse as `T` are kept verbatim in `unreadable` so a
/// later write puts them back instead of dropping them.
#[derive(Debug, Clone)]
pub struct Records<T> {
    pub items: Vec<T>,
    unreadable: Vec<Value>,
}

impl<T> Records<T> {
    pub fn unreadable_count(&self) -> usize {
        self.unreadable.len()
    }

    /// Numeric `id` fields of the unreadable elements, where present.
    pub fn unreadable_ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.unreadable
            .iter()
            .filter_map(|raw| raw.get("id").and_then(Value::as_i64))
    }
}

/// Typed JSON view over a `StorageBackend`.
///
/// Every failure is logged and swallowed: reads fall back to the caller's
/// default, writes report `false`.
pub struct PersistentStore {
    backend: Box<dyn StorageBackend>,
}

impl PersistentStore {
    pub fn new(backend: impl StorageBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
        }
    }

    /// Read `key`, or `None` when it is absent or does not parse as `T`.
    pub fn get_opt<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.backend.get_item(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(key, error = %e, "Error reading from storage");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "Stored value is corrupt, ignoring it");
                None
            }
        }
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get_opt(key).unwrap_or(default)
    }

    /// Read a JSON array under `key`, parsing each element separately.
    ///
    /// A missing key, or one that is not an array at all, reads as empty.
    pub fn get_records<T: DeserializeOwned>(&self, key: &str) -> Records<T> {
        let raw: Vec<Value> = self.get(key, Vec::new());
        let mut records = Records {
            items: Vec::with_capacity(raw.len()),
            unreadable: Vec::new(),
        };
        for (index, value) in raw.into_iter().enumerate() {
            match <T as Deserialize>::deserialize(&value) {
                Ok(item) => records.items.push(item),
                Err(e) => {
                    warn!(key, index, error = %e, "Skipping unreadable stored record");
                    records.unreadable.push(value);
                }
            }
        }
        records
    }

    /// Write `records` back under `key`, unreadable elements last.
    pub fn set_records<T: Serialize>(&self, key: &str, records: &Records<T>) -> bool {
        let mut raw = Vec::with_capacity(records.items.len() + records.unreadable.len());
        for item in &records.items {
            match serde_json::to_value(item) {
                Ok(value) => raw.push(value),
                Err(e) => {
                    warn!(key, error = %e, "Error serializing value for storage");
                    return false;
                }
            }
        }
        raw.extend(records.unreadable.iter().cloned());
        self.set(key, &raw)
    }

    pub fn contains(&self, key: &str) -> bool {
        matches!(self.backend.get_item(key), Ok(Some(_)))
    }

    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key, error = %e, "Error serializing value for storage");
                return false;
            }
        };

        match self.backend.set_item(key, &raw) {
            Ok(()) => {
                debug!(key, bytes = raw.len(), "Saved to storage");
                true
            }
            Err(e) => {
                warn!(key, error = %e, "Error saving to storage");
                false
            }
        }
    }

    pub fn remove(&self, key: &str) -> bool {
        match self.backend.remove_item(key) {
            Ok(()) => true,
            Err(e) => {
                warn!(key, error = %e, "Error removing from storage");
                false
            }
        }
    }

    /// Wipe every key. Only used for a full account reset.
    pub fn clear(&self) -> bool {
        match self.backend.clear() {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Error clearing storage");
                false
            }
        }
    }
}
