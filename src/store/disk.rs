use crate::core::model::Dataset;
use crate::core::store::{LocalState, LocalStore};
use anyhow::{Context, Result};
use async_trait::async_trait;
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use serde::{Serialize, de::DeserializeOwned};
use std::path::Path;
use tracing::debug;

const PARTITION: &str = "dataset";

pub const INVESTORS_KEY: &str = "investors";
pub const INVESTMENTS_KEY: &str = "investments";
pub const OPERATIONS_KEY: &str = "operations";
pub const SETTINGS_KEY: &str = "settings";
pub const CARDS_KEY: &str = "investorCards";
pub const LAST_MODIFIED_KEY: &str = "meta:lastModified";
pub const LAST_SYNC_KEY: &str = "meta:lastSync";

/// Dataset persisted in a fjall keyspace, one JSON blob per collection.
pub struct DiskStore {
    keyspace: Keyspace,
    partition: PartitionHandle,
}

impl DiskStore {
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create data directory: {}", path.display()))?;
        let keyspace = fjall::Config::new(path)
            .open()
            .with_context(|| format!("Failed to open keyspace at {}", path.display()))?;
        let partition = keyspace.open_partition(PARTITION, PartitionCreateOptions::default())?;
        debug!("Opened local store at {}", path.display());
        Ok(Self {
            keyspace,
            partition,
        })
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.partition.get(key.as_bytes())? {
            Some(bytes) => {
                let value = serde_json::from_slice(&bytes)
                    .with_context(|| format!("Failed to decode stored '{key}'"))?;
                debug!("Store HIT for key: {key}");
                Ok(Some(value))
            }
            None => {
                debug!("Store MISS for key: {key}");
                Ok(None)
            }
        }
    }
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(value)?)
}

#[async_trait]
impl LocalStore for DiskStore {
    async fn load(&self) -> Result<LocalState> {
        let data = Dataset {
            investors: self.read(INVESTORS_KEY)?.unwrap_or_default(),
            investments: self.read(INVESTMENTS_KEY)?.unwrap_or_default(),
            operations: self.read(OPERATIONS_KEY)?.unwrap_or_default(),
            settings: self.read(SETTINGS_KEY)?.unwrap_or_default(),
            investor_cards: self.read(CARDS_KEY)?.unwrap_or_default(),
        };
        Ok(LocalState {
            data,
            last_modified: self.read(LAST_MODIFIED_KEY)?,
            last_sync: self.read(LAST_SYNC_KEY)?,
        })
    }

    async fn save(&self, state: &LocalState) -> Result<()> {
        let data = &state.data;
        let mut batch = self.keyspace.batch();
        batch.insert(&self.partition, INVESTORS_KEY.as_bytes(), encode(&data.investors)?);
        batch.insert(&self.partition, INVESTMENTS_KEY.as_bytes(), encode(&data.investments)?);
        batch.insert(&self.partition, OPERATIONS_KEY.as_bytes(), encode(&data.operations)?);
        batch.insert(&self.partition, SETTINGS_KEY.as_bytes(), encode(&data.settings)?);
        batch.insert(&self.partition, CARDS_KEY.as_bytes(), encode(&data.investor_cards)?);
        for (key, value) in [
            (LAST_MODIFIED_KEY, state.last_modified),
            (LAST_SYNC_KEY, state.last_sync),
        ] {
            match value {
                Some(ts) => batch.insert(&self.partition, key.as_bytes(), encode(&ts)?),
                None => batch.remove(&self.partition, key.as_bytes()),
            }
        }
        batch.commit().context("Failed to write dataset")?;
        self.keyspace
            .persist(PersistMode::SyncAll)
            .context("Failed to flush dataset to disk")?;
        debug!("Saved dataset with {} operations", data.operations.len());
        Ok(())
    }
}
