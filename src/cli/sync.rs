use super::ui;
use crate::core::config::AppConfig;
use crate::core::sync::{SyncAction, SyncEngine, SyncReport};
use crate::remote::open_remote_store;
use crate::store::open_local_store;
use anyhow::Result;
use chrono::{DateTime, Local};
use tracing::{info, warn};

fn describe(report: &SyncReport) -> String {
    let what = match report.action {
        SyncAction::Push => "Pushed local changes to the remote",
        SyncAction::Pull => "Pulled remote changes",
        SyncAction::InSync => "Already in sync",
    };
    match report
        .synced_at
        .and_then(DateTime::from_timestamp_millis)
    {
        Some(at) => format!(
            "{what} (last sync {})",
            at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
        ),
        None => what.to_string(),
    }
}

/// Reconciles the local store with the remote once, or every configured
/// interval until interrupted when `watch` is set.
pub async fn run(config: &AppConfig, watch: bool) -> Result<()> {
    let local = open_local_store(config)?;
    let remote = open_remote_store(config)?;
    let engine = SyncEngine::new(local, remote);

    if watch {
        let interval = config.sync.interval();
        println!(
            "Syncing every {}s, press Ctrl-C to stop",
            interval.as_secs()
        );
        let shutdown = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "Failed to listen for Ctrl-C");
            }
        };
        let runs = engine.run_periodic(interval, shutdown).await;
        info!("Completed {runs} sync runs");
        return Ok(());
    }

    let spinner = ui::new_spinner("Syncing with remote...");
    let result = engine.sync_once().await;
    spinner.finish_and_clear();

    let report = result?;
    println!("{}", ui::style_text(&describe(&report), ui::StyleType::Success));
    if report.conflict {
        println!(
            "{}",
            ui::style_text(
                "Both copies had changed, the most recent one was kept",
                ui::StyleType::Error
            )
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_report() {
        let report = SyncReport {
            action: SyncAction::InSync,
            conflict: false,
            synced_at: None,
        };
        assert_eq!(describe(&report), "Already in sync");

        let report = SyncReport {
            action: SyncAction::Push,
            conflict: false,
            synced_at: Some(1_700_000_000_000),
        };
        assert!(describe(&report).starts_with("Pushed local changes to the remote (last sync "));
    }
}
