//! Last-write-wins reconciliation between the local cache and the remote store.
//!
//! Whichever side changed since the last sync wins wholesale. Collections are
//! overwritten as a whole, there is no field level merge. When both sides
//! changed the newer timestamp wins and the conflict is logged.
use crate::core::store::{LocalState, LocalStore, RemoteDocument, RemoteStore};
use anyhow::{Context, Result};
use chrono::Utc;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_SYNC_INTERVAL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    /// Local dataset replaces the remote document.
    Push,
    /// Remote document replaces the local dataset.
    Pull,
    InSync,
}

impl Display for SyncAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                SyncAction::Push => "push",
                SyncAction::Pull => "pull",
                SyncAction::InSync => "in sync",
            }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncDecision {
    pub action: SyncAction,
    /// Both sides changed since the last sync.
    pub conflict: bool,
}

pub fn decide(local: &LocalState, remote: Option<&RemoteDocument>) -> SyncDecision {
    let Some(remote) = remote else {
        return SyncDecision {
            action: SyncAction::Push,
            conflict: false,
        };
    };

    let local_changed = local.has_local_changes();
    let remote_changed = local
        .last_sync
        .is_none_or(|synced| remote.last_sync > synced);

    let action = match (local_changed, remote_changed) {
        (false, false) => SyncAction::InSync,
        (false, true) => SyncAction::Pull,
        (true, false) => SyncAction::Push,
        (true, true) => {
            // Ties go to the remote copy.
            if local.last_modified.unwrap_or(i64::MIN) > remote.last_sync {
                SyncAction::Push
            } else {
                SyncAction::Pull
            }
        }
    };

    SyncDecision {
        action,
        conflict: local_changed && remote_changed,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub action: SyncAction,
    pub conflict: bool,
    /// Sync timestamp recorded on both sides, epoch millis.
    pub synced_at: Option<i64>,
}

pub struct SyncEngine {
    local: Arc<dyn LocalStore>,
    remote: Arc<dyn RemoteStore>,
}

impl SyncEngine {
    pub fn new(local: Arc<dyn LocalStore>, remote: Arc<dyn RemoteStore>) -> Self {
        Self { local, remote }
    }

    pub async fn sync_once(&self) -> Result<SyncReport> {
        self.sync_at(Utc::now().timestamp_millis()).await
    }

    /// Runs one reconciliation using `now` (epoch millis) as the sync time.
    pub async fn sync_at(&self, now: i64) -> Result<SyncReport> {
        let (mut local, remote) = futures::try_join!(self.local.load(), self.remote.fetch())
            .context("Failed to load datasets for sync")?;

        let decision = decide(&local, remote.as_ref());
        debug!(?decision, "Sync decision");
        if decision.conflict {
            warn!(
                local_modified = ?local.last_modified,
                remote_synced = ?remote.as_ref().map(|r| r.last_sync),
                "Both copies changed since the last sync, keeping the {} side",
                if decision.action == SyncAction::Push { "local" } else { "remote" }
            );
        }

        let synced_at = match (decision.action, remote) {
            (SyncAction::Push, _) => {
                let stamp = local.last_modified.map_or(now, |m| now.max(m));
                let doc = RemoteDocument {
                    data: local.data.clone(),
                    last_sync: stamp,
                };
                self.remote
                    .push(&doc)
                    .await
                    .context("Failed to push dataset to remote")?;
                local.last_sync = Some(stamp);
                self.local.save(&local).await?;
                info!("Pushed local dataset to remote");
                Some(stamp)
            }
            (SyncAction::Pull, Some(doc)) => {
                let stamp = doc.last_sync;
                local = LocalState {
                    data: doc.data,
                    last_modified: Some(stamp),
                    last_sync: Some(stamp),
                };
                self.local.save(&local).await?;
                info!("Pulled remote dataset");
                Some(stamp)
            }
            _ => {
                debug!("Local and remote datasets are in sync");
                local.last_sync
            }
        };

        Ok(SyncReport {
            action: decision.action,
            conflict: decision.conflict,
            synced_at,
        })
    }

    /// Syncs every `interval` until `shutdown` resolves. Failed runs are logged
    /// and retried on the next tick. Returns the number of completed runs.
    pub async fn run_periodic<F>(&self, interval: Duration, shutdown: F) -> usize
    where
        F: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        let mut runs = 0;
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Stopping periodic sync after {runs} runs");
                    return runs;
                }
                _ = ticker.tick() => {
                    match self.sync_once().await {
                        Ok(report) => {
                            runs += 1;
                            debug!("Periodic sync finished: {}", report.action);
                        }
                        Err(e) => warn!(error = %e, "Periodic sync failed"),
                    }
                }
            }
        }
    }
}
