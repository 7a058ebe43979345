//! Loads the local dataset into a [`Ledger`] and writes it back after changes.
use crate::core::ledger::Ledger;
use crate::core::model::Settings;
use crate::core::store::{LocalState, LocalStore};
use anyhow::{Context, Result};
use chrono::Utc;
use std::sync::Arc;
use tracing::debug;

/// Stamp for a local change made at `now`. It always lands after the last
/// sync, since `last_sync` may come from another device's clock.
fn modification_stamp(now: i64, last_modified: Option<i64>, last_sync: Option<i64>) -> i64 {
    let floor = last_sync.map_or(i64::MIN, |synced| synced.saturating_add(1));
    now.max(last_modified.unwrap_or(i64::MIN)).max(floor)
}

pub struct Session {
    store: Arc<dyn LocalStore>,
    ledger: Ledger,
    last_modified: Option<i64>,
    last_sync: Option<i64>,
}

impl Session {
    /// Opens the stored dataset. A store that was never written is seeded with
    /// `initial_settings`.
    pub async fn open(store: Arc<dyn LocalStore>, initial_settings: &Settings) -> Result<Self> {
        let LocalState {
            mut data,
            last_modified,
            last_sync,
        } = store.load().await.context("Failed to load local dataset")?;

        if last_modified.is_none() && last_sync.is_none() && data.is_empty() {
            debug!("Fresh local store, seeding settings from config");
            data.settings = initial_settings.clone();
        }

        Ok(Self {
            store,
            ledger: Ledger::new(data),
            last_modified,
            last_sync,
        })
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut Ledger {
        &mut self.ledger
    }

    /// Saves the dataset if the ledger changed. Returns whether anything was written.
    pub async fn commit(self) -> Result<bool> {
        self.commit_at(Utc::now().timestamp_millis()).await
    }

    pub async fn commit_at(self, now: i64) -> Result<bool> {
        if !self.ledger.is_modified() {
            return Ok(false);
        }
        let state = LocalState {
            data: self.ledger.into_dataset(),
            last_modified: Some(modification_stamp(now, self.last_modified, self.last_sync)),
            last_sync: self.last_sync,
        };
        self.store
            .save(&state)
            .await
            .context("Failed to save local dataset")?;
        debug!("Committed local changes at {now}");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ledger::NewInvestor;
    use crate::core::model::InterestModel;
    use crate::core::store::RemoteDocument;
    use crate::core::sync::{SyncAction, SyncEngine};
    use crate::remote::memory::MemoryRemote;
    use crate::store::memory::MemoryStore;
    use chrono::NaiveDate;

    fn settings() -> Settings {
        Settings {
            monthly_rate: 4.0,
            interest_model: InterestModel::Compound,
            currency: "GBP".to_string(),
        }
    }

    #[tokio::test]
    async fn test_fresh_store_is_seeded_and_committed() {
        let store = Arc::new(MemoryStore::new());
        let mut session = Session::open(store.clone(), &settings()).await.unwrap();
        assert_eq!(session.ledger().dataset().settings, settings());

        session
            .ledger_mut()
            .add_investor(NewInvestor {
                name: "Ada".to_string(),
                join_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                ..Default::default()
            })
            .unwrap();
        assert!(session.commit_at(1_000).await.unwrap());

        let state = store.load().await.unwrap();
        assert_eq!(state.last_modified, Some(1_000));
        assert_eq!(state.data.investors.len(), 1);
        assert_eq!(state.data.settings, settings());
    }

    #[test]
    fn test_modification_stamp() {
        assert_eq!(modification_stamp(100, None, None), 100);
        assert_eq!(modification_stamp(100, Some(150), None), 150);
        assert_eq!(modification_stamp(100, Some(500), Some(500)), 501);
        assert_eq!(modification_stamp(900, Some(500), Some(500)), 900);
    }

    #[tokio::test]
    async fn test_edit_after_pull_from_faster_clock_is_pushed() {
        // Another device synced at 500 while this clock still reads 400.
        let store = Arc::new(MemoryStore::new());
        let remote = Arc::new(MemoryRemote::with_document(RemoteDocument {
            data: Default::default(),
            last_sync: 500,
        }));
        let engine = SyncEngine::new(store.clone(), remote.clone());
        assert_eq!(engine.sync_at(390).await.unwrap().action, SyncAction::Pull);

        let mut session = Session::open(store.clone(), &settings()).await.unwrap();
        session
            .ledger_mut()
            .add_investor(NewInvestor {
                name: "Ada".to_string(),
                join_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                ..Default::default()
            })
            .unwrap();
        assert!(session.commit_at(400).await.unwrap());

        let state = store.load().await.unwrap();
        assert!(state.has_local_changes());

        let report = engine.sync_at(450).await.unwrap();
        assert_eq!(report.action, SyncAction::Push);
        let doc = remote.document().await.unwrap();
        assert_eq!(doc.data.investors.len(), 1);
        assert!(doc.last_sync > 500);
    }

    #[tokio::test]
    async fn test_read_only_session_writes_nothing() {
        let stored = LocalState {
            last_modified: Some(50),
            last_sync: Some(50),
            ..Default::default()
        };
        let store = Arc::new(MemoryStore::with_state(stored.clone()));
        let session = Session::open(store.clone(), &settings()).await.unwrap();

        // Existing data keeps its own settings.
        assert_eq!(session.ledger().dataset().settings, Settings::default());
        assert!(!session.commit_at(100).await.unwrap());
        assert_eq!(store.load().await.unwrap(), stored);
    }
}
