//! Persistence abstractions for the local cache and the remote document store

use crate::core::model::Dataset;
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Locally cached dataset plus its sync bookkeeping. Timestamps are epoch millis.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocalState {
    pub data: Dataset,
    /// Last local mutation.
    pub last_modified: Option<i64>,
    /// Last successful sync with the remote.
    pub last_sync: Option<i64>,
}

impl LocalState {
    pub fn has_local_changes(&self) -> bool {
        match (self.last_modified, self.last_sync) {
            (Some(modified), Some(synced)) => modified > synced,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }
}

/// The dataset as stored remotely, stamped with the time of the last sync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteDocument {
    #[serde(flatten)]
    pub data: Dataset,
    pub last_sync: i64,
}

#[async_trait]
pub trait LocalStore: Send + Sync {
    /// Loads the cached state; an empty state when nothing was stored yet.
    async fn load(&self) -> Result<LocalState>;
    async fn save(&self, state: &LocalState) -> Result<()>;
}

#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Fetches the remote document, `None` when it does not exist.
    async fn fetch(&self) -> Result<Option<RemoteDocument>>;
    /// Replaces the remote document wholesale.
    async fn push(&self, doc: &RemoteDocument) -> Result<()>;
}
