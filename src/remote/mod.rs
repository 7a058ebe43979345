pub mod firebase;
pub mod memory;
pub mod util;

use crate::core::config::AppConfig;
use crate::core::store::RemoteStore;
use anyhow::{Context, Result};
use firebase::FirebaseRemote;
use std::sync::Arc;

/// Builds the remote store from the `remote` section of the config.
pub fn open_remote_store(config: &AppConfig) -> Result<Arc<dyn RemoteStore>> {
    let remote = config
        .remote
        .as_ref()
        .context("No remote configured, add a `remote` section to the config file")?;
    Ok(Arc::new(FirebaseRemote::new(remote)?))
}
