use crate::core::storage::KeyValueStore;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use tracing::debug;

/// In-memory store implementation using HashMap and RwLock
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        let entries = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let value = entries.get(key).cloned();
        if value.is_some() {
            debug!("Store HIT for key: {:?}", key);
        } else {
            debug!("Store MISS for key: {:?}", key);
        }
        value
    }

    fn put(&self, key: &str, value: &str) {
        let mut entries = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        debug!("Store PUT for key: {:?}", key);
        entries.insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        let mut entries = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        debug!("Store REMOVE for key: {:?}", key);
    }
}
