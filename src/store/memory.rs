use crate::core::store::{LocalState, LocalStore};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// In-memory local store, used when nothing should touch the disk.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<LocalState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: LocalState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(state)),
        }
    }
}

#[async_trait]
impl LocalStore for MemoryStore {
    async fn load(&self) -> Result<LocalState> {
        let state = self.inner.lock().await;
        debug!("Memory store LOAD");
        Ok(state.clone())
    }

    async fn save(&self, state: &LocalState) -> Result<()> {
        let mut current = self.inner.lock().await;
        debug!("Memory store SAVE");
        *current = state.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_load_save() {
        let store = MemoryStore::new();

        // Initially, store is empty
        assert_eq!(store.load().await.unwrap(), LocalState::default());

        let state = LocalState {
            last_modified: Some(10),
            last_sync: Some(5),
            ..Default::default()
        };
        store.save(&state).await.unwrap();
        assert_eq!(store.load().await.unwrap(), state);
        assert!(store.load().await.unwrap().has_local_changes());
    }
}
