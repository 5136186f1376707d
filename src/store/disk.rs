use crate::core::storage::KeyValueStore;
use anyhow::{Context, Result};
use fjall::{Config, Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::path::Path;
use tracing::{debug, warn};

/// A fjall-backed partition that survives process restarts.
pub struct DiskStore {
    keyspace: Keyspace,
    partition: PartitionHandle,
}

impl DiskStore {
    pub fn open(path: &Path, partition: &str) -> Result<Self> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create data directory: {}", path.display()))?;

        let keyspace = Config::new(path)
            .open()
            .with_context(|| format!("Failed to open keyspace at {}", path.display()))?;
        let partition = keyspace
            .open_partition(partition, PartitionCreateOptions::default())
            .with_context(|| format!("Failed to open partition: {partition}"))?;

        Ok(Self {
            keyspace,
            partition,
        })
    }

    fn sync(&self) -> Result<()> {
        self.keyspace.persist(PersistMode::SyncAll)?;
        Ok(())
    }
}

impl KeyValueStore for DiskStore {
    fn get(&self, key: &str) -> Option<String> {
        let res: Result<Option<String>> = (|| {
            let Some(value) = self.partition.get(key.as_bytes())? else {
                debug!("Store MISS for key: {:?}", key);
                return Ok(None);
            };
            debug!("Store HIT for key: {:?}", key);
            Ok(Some(String::from_utf8(value.to_vec())?))
        })();

        match res {
            Ok(val) => val,
            Err(e) => {
                warn!("DiskStore get error for key {:?}: {}", key, e);
                None
            }
        }
    }

    fn put(&self, key: &str, value: &str) {
        let res: Result<()> = (|| {
            self.partition.insert(key.as_bytes(), value.as_bytes())?;
            self.sync()?;
            debug!("Store PUT for key: {:?}", key);
            Ok(())
        })();
        if let Err(e) = res {
            warn!("DiskStore put error for key {:?}: {}", key, e);
        }
    }

    fn remove(&self, key: &str) {
        let res: Result<()> = (|| {
            self.partition.remove(key.as_bytes())?;
            self.sync()?;
            debug!("Store REMOVE for key: {:?}", key);
            Ok(())
        })();
        if let Err(e) = res {
            warn!("DiskStore remove error for key {:?}: {}", key, e);
        }
    }
}
