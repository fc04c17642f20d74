//! Result cache: the single `lastSummary` / `lastType` slot.
//!
//! Written only after a fully successful request, read only when the popup
//! opens, removed on an explicit clear.

use crate::error::StoreError;
use crate::storage::LocalStore;
use crate::types::{CacheEntry, SummaryStyle};
use serde_json::{Map, Value};
use std::sync::Arc;

pub const KEY_LAST_SUMMARY: &str = "lastSummary";
pub const KEY_LAST_TYPE: &str = "lastType";

pub struct ResultCache {
    store: Arc<dyn LocalStore>,
}

impl ResultCache {
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        Self { store }
    }

    /// The cached entry, if a non-empty summary is stored.
    ///
    /// An unknown `lastType` is dropped rather than failing the load.
    pub fn load(&self) -> Result<Option<CacheEntry>, StoreError> {
        let items = self.store.get(&[KEY_LAST_SUMMARY, KEY_LAST_TYPE])?;

        let last_summary = match items.get(KEY_LAST_SUMMARY).and_then(Value::as_str) {
            Some(s) if !s.is_empty() => s.to_string(),
            _ => return Ok(None),
        };

        let last_type = match items.get(KEY_LAST_TYPE).and_then(Value::as_str) {
            Some(raw) => match raw.parse::<SummaryStyle>() {
                Ok(style) => Some(style),
                Err(e) => {
                    log::warn!("[CACHE] {} — ignoring stored lastType", e);
                    None
                }
            },
            None => None,
        };

        log::info!(
            "[CACHE] Loaded cached summary ({} chars, type={:?})",
            last_summary.len(),
            last_type
        );
        Ok(Some(CacheEntry {
            last_summary,
            last_type,
        }))
    }

    /// Overwrite the slot with `entry`.
    pub fn save(&self, entry: &CacheEntry) -> Result<(), StoreError> {
        let mut items = Map::new();
        items.insert(
            KEY_LAST_SUMMARY.to_string(),
            Value::String(entry.last_summary.clone()),
        );
        if let Some(style) = entry.last_type {
            items.insert(KEY_LAST_TYPE.to_string(), Value::String(style.to_string()));
        }
        self.store.set(items)?;
        if entry.last_type.is_none() {
            // A stale style must not outlive the summary it described.
            self.store.remove(&[KEY_LAST_TYPE])?;
        }
        log::info!("[CACHE] Saved summary ({} chars)", entry.last_summary.len());
        Ok(())
    }

    /// Remove the entry from the backing store.
    pub fn clear(&self) -> Result<(), StoreError> {
        self.store.remove(&[KEY_LAST_SUMMARY, KEY_LAST_TYPE])?;
        log::info!("[CACHE] Cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use serde_json::json;

    fn cache() -> (Arc<MemoryStore>, ResultCache) {
        let store = Arc::new(MemoryStore::new());
        (store.clone(), ResultCache::new(store))
    }

    #[test]
    fn empty_store_has_no_entry() {
        let (_, cache) = cache();
        assert_eq!(cache.load().unwrap(), None);
    }

    #[test]
    fn save_then_load() {
        let (_, cache) = cache();
        let entry = CacheEntry {
            last_summary: "Short summary.".into(),
            last_type: Some(SummaryStyle::Bullets),
        };
        cache.save(&entry).unwrap();
        assert_eq!(cache.load().unwrap(), Some(entry));
    }

    #[test]
    fn save_without_style_drops_old_style() {
        let (_, cache) = cache();
        cache
            .save(&CacheEntry {
                last_summary: "first".into(),
                last_type: Some(SummaryStyle::Detailed),
            })
            .unwrap();
        cache
            .save(&CacheEntry {
                last_summary: "second".into(),
                last_type: None,
            })
            .unwrap();
        assert_eq!(cache.load().unwrap().unwrap().last_type, None);
    }

    #[test]
    fn clear_is_idempotent() {
        let (store, cache) = cache();
        cache
            .save(&CacheEntry {
                last_summary: "x".into(),
                last_type: Some(SummaryStyle::Concise),
            })
            .unwrap();
        cache.clear().unwrap();
        cache.clear().unwrap();
        assert_eq!(cache.load().unwrap(), None);
        assert!(store.is_empty());
    }

    #[test]
    fn empty_summary_or_unknown_style() {
        let (store, cache) = cache();
        let Value::Object(items) = json!({ "lastSummary": "" }) else { unreachable!() };
        store.set(items).unwrap();
        assert_eq!(cache.load().unwrap(), None);

        let Value::Object(items) = json!({ "lastSummary": "kept", "lastType": "haiku" }) else {
            unreachable!()
        };
        store.set(items).unwrap();
        assert_eq!(
            cache.load().unwrap(),
            Some(CacheEntry {
                last_summary: "kept".into(),
                last_type: None,
            })
        );
    }
}
