pub mod disk;
pub mod memory;

use crate::core::config::AppConfig;
use crate::core::storage::KeyValueStore;
use disk::DiskStore;
use memory::MemoryStore;
use std::sync::Arc;
use tracing::warn;

const SESSION_PARTITION: &str = "session";

/// Opens the durable session store under the configured data directory.
///
/// Falls back to a process-local store when the data directory cannot be
/// resolved or opened, so a session then lasts only for this run.
pub fn open_session_store(config: &AppConfig) -> Arc<dyn KeyValueStore> {
    let disk = config
        .data_path()
        .and_then(|path| DiskStore::open(&path.join("store"), SESSION_PARTITION));

    match disk {
        Ok(store) => Arc::new(store),
        Err(e) => {
            warn!("Durable storage unavailable, session will not persist: {e:#}");
            Arc::new(MemoryStore::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_open_session_store_uses_data_path() {
        let dir = tempdir().unwrap();
        let mut config = AppConfig::default();
        config.data_path = Some(dir.path().to_string_lossy().into_owned());

        let store = open_session_store(&config);
        store.put("userId", "user42");

        assert!(dir.path().join("store").exists());
        assert_eq!(store.get("userId").as_deref(), Some("user42"));
    }
}
