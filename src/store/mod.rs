pub mod disk;
pub mod memory;

use crate::core::config::AppConfig;
use crate::core::store::LocalStore;
use anyhow::Result;
use disk::DiskStore;
use std::sync::Arc;

/// Opens the on-disk store under the configured data directory.
pub fn open_local_store(config: &AppConfig) -> Result<Arc<dyn LocalStore>> {
    let path = config.default_data_path()?.join("store");
    Ok(Arc::new(DiskStore::open(&path)?))
}
