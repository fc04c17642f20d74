//! Persistent key-value store.
//!
//! Same shape as the extension's local storage area: get a set of keys,
//! merge-set a map, remove keys. `JsonFileStore` keeps everything in one
//! JSON object on disk so it survives restarts; `MemoryStore` is the
//! in-process variant.

use crate::error::StoreError;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

pub trait LocalStore: Send + Sync {
    /// Values for the requested keys; missing keys are simply absent.
    fn get(&self, keys: &[&str]) -> Result<Map<String, Value>, StoreError>;

    /// Insert or overwrite every key in `items`.
    fn set(&self, items: Map<String, Value>) -> Result<(), StoreError>;

    /// Delete the given keys. Missing keys are not an error.
    fn remove(&self, keys: &[&str]) -> Result<(), StoreError>;
}

/// One JSON object per file, rewritten on every change.
pub struct JsonFileStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Store at `path`, or at the default config location when `None`.
    pub fn open(path: Option<PathBuf>) -> Result<Self, StoreError> {
        path.or_else(crate::config::default_store_path)
            .map(Self::new)
            .ok_or(StoreError::NoStoreDir)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<Map<String, Value>, StoreError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(e.into()),
        };
        if raw.trim().is_empty() {
            return Ok(Map::new());
        }
        Ok(serde_json::from_str(&raw)?)
    }

    fn write_all(&self, items: &Map<String, Value>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(items)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

impl LocalStore for JsonFileStore {
    fn get(&self, keys: &[&str]) -> Result<Map<String, Value>, StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let all = self.read_all()?;
        Ok(pick(&all, keys))
    }

    fn set(&self, items: Map<String, Value>) -> Result<(), StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut all = self.read_all()?;
        all.extend(items);
        self.write_all(&all)?;
        log::debug!("[STORE] Wrote {}", self.path.display());
        Ok(())
    }

    fn remove(&self, keys: &[&str]) -> Result<(), StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut all = self.read_all()?;
        let before = all.len();
        for key in keys {
            all.remove(*key);
        }
        if all.len() != before {
            self.write_all(&all)?;
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryStore {
    items: Mutex<Map<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.items.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LocalStore for MemoryStore {
    fn get(&self, keys: &[&str]) -> Result<Map<String, Value>, StoreError> {
        let items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(pick(&items, keys))
    }

    fn set(&self, new_items: Map<String, Value>) -> Result<(), StoreError> {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(new_items);
        Ok(())
    }

    fn remove(&self, keys: &[&str]) -> Result<(), StoreError> {
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        for key in keys {
            items.remove(*key);
        }
        Ok(())
    }
}

fn pick(all: &Map<String, Value>, keys: &[&str]) -> Map<String, Value> {
    keys.iter()
        .filter_map(|k| all.get(*k).map(|v| (k.to_string(), v.clone())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn items(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested").join("storage.json"));
        assert!(store.get(&["lastSummary"]).unwrap().is_empty());
    }

    #[test]
    fn set_merges_and_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("briefly").join("storage.json");

        let store = JsonFileStore::new(&path);
        store.set(items(json!({ "lastSummary": "one", "other": 1 }))).unwrap();
        store.set(items(json!({ "lastSummary": "two" }))).unwrap();
        drop(store);

        let reopened = JsonFileStore::new(&path);
        let got = reopened.get(&["lastSummary", "other", "absent"]).unwrap();
        assert_eq!(Value::Object(got), json!({ "lastSummary": "two", "other": 1 }));
    }

    #[test]
    fn remove_only_touches_named_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("storage.json"));
        store.set(items(json!({ "a": 1, "b": 2 }))).unwrap();
        store.remove(&["a", "never-set"]).unwrap();
        assert_eq!(Value::Object(store.get(&["a", "b"]).unwrap()), json!({ "b": 2 }));
    }

    #[test]
    fn corrupt_file_is_a_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "{ not json").unwrap();
        let store = JsonFileStore::new(&path);
        assert!(matches!(store.get(&["a"]), Err(StoreError::Json(_))));
    }

    #[test]
    fn memory_store_behaves_like_file_store() {
        let store = MemoryStore::new();
        store.set(items(json!({ "a": "x" }))).unwrap();
        assert_eq!(store.len(), 1);
        store.remove(&["a"]).unwrap();
        assert!(store.is_empty());
    }
}
