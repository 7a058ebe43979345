use crate::core::store::{RemoteDocument, RemoteStore};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;
use tracing::debug;

/// Remote store kept in memory. Counts pushes so callers can check what was sent.
#[derive(Default)]
pub struct MemoryRemote {
    doc: Mutex<Option<RemoteDocument>>,
    pushes: AtomicUsize,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(doc: RemoteDocument) -> Self {
        Self {
            doc: Mutex::new(Some(doc)),
            pushes: AtomicUsize::new(0),
        }
    }

    pub async fn document(&self) -> Option<RemoteDocument> {
        self.doc.lock().await.clone()
    }

    pub fn push_count(&self) -> usize {
        self.pushes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteStore for MemoryRemote {
    async fn fetch(&self) -> Result<Option<RemoteDocument>> {
        debug!("Memory remote FETCH");
        Ok(self.doc.lock().await.clone())
    }

    async fn push(&self, doc: &RemoteDocument) -> Result<()> {
        debug!("Memory remote PUSH");
        *self.doc.lock().await = Some(doc.clone());
        self.pushes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
