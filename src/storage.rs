//! Durable key/value storage for otherwise stateless workflow processes.
//!
//! The host spawns one short-lived process per query event, so anything a
//! workflow wants to remember between invocations (settings, usage counters,
//! per-item side data) goes through this store. Entries are JSON values with
//! an optional TTL, persisted as a single JSON document that is rewritten
//! synchronously on every mutation.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// A storage handle shared between the workflow, the usage tracker, and the
/// item data store within one invocation.
pub type SharedStorage = Arc<Mutex<Storage>>;

/// One stored entry with its expiry metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredEntry {
    /// The stored value
    data: Value,
    /// Unix epoch milliseconds at write time
    stored_at_ms: u64,
    /// Time-to-live in milliseconds; `None` means the entry never expires
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ttl_ms: Option<u64>,
}

impl StoredEntry {
    fn is_expired(&self, now_ms: u64) -> bool {
        match self.ttl_ms {
            Some(ttl) => now_ms.saturating_sub(self.stored_at_ms) >= ttl,
            None => false,
        }
    }
}

/// File-backed key/value store with optional per-entry expiry.
///
/// Not guarded against overlapping host-spawned processes racing on the same
/// file; the host waits for each invocation to exit before spawning the next.
#[derive(Debug)]
pub struct Storage {
    /// Path to the backing JSON file
    path: PathBuf,
    /// In-memory view of the stored entries
    entries: HashMap<String, StoredEntry>,
}

impl Storage {
    /// Open the store at the default location (`~/.barkit/storage.json`).
    pub fn new() -> Result<Self> {
        let home = dirs::home_dir().ok_or(Error::NoHomeDir)?;
        let dir = home.join(".barkit");
        if !dir.exists() {
            fs::create_dir_all(&dir)?;
        }
        Self::with_path(dir.join("storage.json"))
    }

    /// Open a store at a custom path (for testing).
    pub fn with_path(path: PathBuf) -> Result<Self> {
        let entries = Self::load(&path)?;
        Ok(Self { path, entries })
    }

    /// Wrap this store in a shareable handle.
    pub fn into_shared(self) -> SharedStorage {
        Arc::new(Mutex::new(self))
    }

    fn load(path: &PathBuf) -> Result<HashMap<String, StoredEntry>> {
        if !path.exists() {
            return Ok(HashMap::new());
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string(&self.entries)?;
        fs::write(&self.path, content)?;
        Ok(())
    }

    /// Store a value that never expires.
    pub fn set<T: Serialize>(&mut self, key: &str, value: &T) -> Result<()> {
        self.set_entry(key, value, None)
    }

    /// Store a value with a time-to-live.
    pub fn set_with_ttl<T: Serialize>(&mut self, key: &str, value: &T, ttl: Duration) -> Result<()> {
        self.set_entry(key, value, Some(ttl.as_millis() as u64))
    }

    fn set_entry<T: Serialize>(&mut self, key: &str, value: &T, ttl_ms: Option<u64>) -> Result<()> {
        let entry = StoredEntry {
            data: serde_json::to_value(value)?,
            stored_at_ms: now_ms(),
            ttl_ms,
        };
        self.entries.insert(key.to_string(), entry);
        self.save()
    }

    /// Retrieve a value, or `None` if the key is missing or expired.
    ///
    /// Expired entries are evicted and the eviction is persisted.
    pub fn get<T: DeserializeOwned>(&mut self, key: &str) -> Option<T> {
        let value = self.get_value(key)?;
        serde_json::from_value(value).ok()
    }

    /// Retrieve the raw JSON value for a key.
    pub fn get_value(&mut self, key: &str) -> Option<Value> {
        let entry = self.entries.get(key)?;
        if entry.is_expired(now_ms()) {
            tracing::debug!(key, "Evicting expired storage entry");
            self.entries.remove(key);
            // Missing keys never error; a failed eviction write surfaces on
            // the next mutation instead.
            let _ = self.save();
            return None;
        }
        Some(entry.data.clone())
    }

    /// Remove a key. Removing a missing key is a no-op.
    pub fn remove(&mut self, key: &str) -> Result<()> {
        if self.entries.remove(key).is_some() {
            self.save()?;
        }
        Ok(())
    }

    /// Delete every stored entry.
    pub fn clear(&mut self) -> Result<()> {
        self.entries.clear();
        self.save()
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn test_storage(dir: &tempfile::TempDir) -> Storage {
        Storage::with_path(dir.path().join("storage.json")).unwrap()
    }

    #[test]
    fn test_set_and_get() {
        let dir = tempdir().unwrap();
        let mut storage = test_storage(&dir);

        storage.set("key", &"abc").unwrap();
        let value: String = storage.get("key").unwrap();
        assert_eq!(value, "abc");
    }

    #[test]
    fn test_get_missing_key() {
        let dir = tempdir().unwrap();
        let mut storage = test_storage(&dir);

        assert!(storage.get::<String>("nope").is_none());
    }

    #[test]
    fn test_ttl_not_expired() {
        let dir = tempdir().unwrap();
        let mut storage = test_storage(&dir);

        storage.set_with_ttl("key", &"abc", Duration::from_secs(60)).unwrap();
        let value: String = storage.get("key").unwrap();
        assert_eq!(value, "abc");
    }

    #[test]
    fn test_ttl_expired() {
        let dir = tempdir().unwrap();
        let mut storage = test_storage(&dir);

        storage.set_with_ttl("key", &"abc", Duration::from_millis(0)).unwrap();
        assert!(storage.get::<String>("key").is_none());
        // Eviction removed the entry entirely
        assert!(storage.get_value("key").is_none());
    }

    #[test]
    fn test_remove() {
        let dir = tempdir().unwrap();
        let mut storage = test_storage(&dir);

        storage.set("key", &1u64).unwrap();
        storage.remove("key").unwrap();
        assert!(storage.get::<u64>("key").is_none());

        // Removing a missing key is fine
        storage.remove("key").unwrap();
    }

    #[test]
    fn test_clear() {
        let dir = tempdir().unwrap();
        let mut storage = test_storage(&dir);

        storage.set("a", &1u64).unwrap();
        storage.set("b", &2u64).unwrap();
        storage.clear().unwrap();
        assert!(storage.get::<u64>("a").is_none());
        assert!(storage.get::<u64>("b").is_none());
    }

    #[test]
    fn test_persists_across_instances() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("storage.json");

        {
            let mut storage = Storage::with_path(path.clone()).unwrap();
            storage.set("key", &"persisted").unwrap();
        }

        {
            let mut storage = Storage::with_path(path).unwrap();
            let value: String = storage.get("key").unwrap();
            assert_eq!(value, "persisted");
        }
    }
}
