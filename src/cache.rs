use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use serde_json::Value;

/// Last-known payload per request path.
///
/// Cloning the cache clones the handle; all clones share the same entries.
/// Entries are replaced whole, so readers always see a complete payload.
#[derive(Clone, Default)]
pub struct ResponseCache {
    entries: Arc<RwLock<HashMap<String, Arc<Value>>>>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self, path: &str, payload: Value) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(path.to_string(), Arc::new(payload));
    }

    pub fn get(&self, path: &str) -> Option<Arc<Value>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(path).cloned()
    }

    pub fn contains(&self, path: &str) -> bool {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn store_replaces_entry() {
        let cache = ResponseCache::new();
        cache.store("users/1/modules/a", json!({"v": 1}));
        cache.store("users/1/modules/a", json!({"v": 2}));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("users/1/modules/a").unwrap()["v"], 2);
    }

    #[test]
    fn miss_returns_none() {
        let cache = ResponseCache::new();
        assert!(cache.get("nope").is_none());
        assert!(!cache.contains("nope"));
        assert!(cache.is_empty());
    }

    #[test]
    fn clones_share_entries() {
        let cache = ResponseCache::new();
        let reader = cache.clone();
        cache.store("p", json!([]));
        assert!(reader.contains("p"));
    }

    #[test]
    fn reader_keeps_old_snapshot_after_replace() {
        let cache = ResponseCache::new();
        cache.store("p", json!({"v": 1}));
        let old = cache.get("p").unwrap();
        cache.store("p", json!({"v": 2}));
        assert_eq!(old["v"], 1);
        assert_eq!(cache.get("p").unwrap()["v"], 2);
    }
}
