//! Per-item auxiliary data, persisted by result title.
//!
//! Handlers can attach an opaque payload to a result item when they create
//! it. The payload is not part of the host-visible response; it is stored
//! here so the menu-item-selection dispatch can hand it back to the handler
//! when that title is later picked.

use std::collections::HashMap;

use serde_json::Value;
use unicode_normalization::UnicodeNormalization;

use crate::error::Result;
use crate::storage::SharedStorage;

/// Storage key holding the title -> payload map.
const ITEM_DATA_KEY: &str = "item_data";

/// Persistent mapping from result title to an opaque JSON payload.
#[derive(Debug, Clone)]
pub struct ItemDataStore {
    storage: SharedStorage,
}

impl ItemDataStore {
    /// Create a store over a shared storage handle.
    pub fn new(storage: SharedStorage) -> Self {
        Self { storage }
    }

    /// Persist `data` under the normalized title, overwriting any prior value.
    pub fn put(&self, title: &str, data: &Value) -> Result<()> {
        let mut storage = self.storage.lock();
        let mut map: HashMap<String, Value> = storage.get(ITEM_DATA_KEY).unwrap_or_default();
        map.insert(normalize_title(title), data.clone());
        storage.set(ITEM_DATA_KEY, &map)
    }

    /// Look up the payload stored for a title, if any.
    pub fn get(&self, title: &str) -> Option<Value> {
        let map: HashMap<String, Value> = self.storage.lock().get(ITEM_DATA_KEY)?;
        map.get(&normalize_title(title)).cloned()
    }

    /// Delete the entire mapping.
    ///
    /// Called whenever the result list is cleared, so stored payloads always
    /// correspond to the most recently shown results.
    pub fn clear(&self) -> Result<()> {
        self.storage.lock().remove(ITEM_DATA_KEY)
    }
}

/// Normalize a title to canonical Unicode form (NFC).
///
/// Titles round-trip through the host UI, which may alter their byte-level
/// representation; composing them before use as a key keeps lookups stable.
fn normalize_title(title: &str) -> String {
    title.nfc().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Storage;
    use serde_json::json;
    use tempfile::tempdir;

    fn test_store(dir: &tempfile::TempDir) -> ItemDataStore {
        let storage = Storage::with_path(dir.path().join("storage.json")).unwrap();
        ItemDataStore::new(storage.into_shared())
    }

    #[test]
    fn test_put_and_get() {
        let dir = tempdir().unwrap();
        let store = test_store(&dir);

        store.put("Alex", &json!({"age": 20})).unwrap();
        assert_eq!(store.get("Alex"), Some(json!({"age": 20})));
    }

    #[test]
    fn test_overwrite() {
        let dir = tempdir().unwrap();
        let store = test_store(&dir);

        store.put("Alex", &json!({"age": 20})).unwrap();
        store.put("Alex", &json!({"age": 21})).unwrap();
        assert_eq!(store.get("Alex"), Some(json!({"age": 21})));
    }

    #[test]
    fn test_get_missing() {
        let dir = tempdir().unwrap();
        let store = test_store(&dir);

        assert!(store.get("nobody").is_none());
    }

    #[test]
    fn test_clear() {
        let dir = tempdir().unwrap();
        let store = test_store(&dir);

        store.put("Alex", &json!(1)).unwrap();
        store.clear().unwrap();
        assert!(store.get("Alex").is_none());
    }

    #[test]
    fn test_unicode_normalization() {
        let dir = tempdir().unwrap();
        let store = test_store(&dir);

        // "é" written composed (U+00E9) vs decomposed (e + U+0301)
        store.put("caf\u{e9}", &json!("espresso")).unwrap();
        assert_eq!(store.get("cafe\u{301}"), Some(json!("espresso")));
    }
}
