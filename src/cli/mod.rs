pub mod cards;
pub mod investors;
pub mod operations;
pub mod profit;
pub mod setup;
pub mod sync;
pub mod ui;

use crate::AppCommand;
use crate::core::config::AppConfig;
use crate::core::ledger::NewInvestor;
use crate::core::session::Session;
use crate::core::store::LocalStore;
use anyhow::{Result, anyhow};
use chrono::{Local, NaiveDate};
use std::sync::Arc;
use tracing::debug;

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Shortened id for table output.
pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(8) {
        Some((end, _)) => &id[..end],
        None => id,
    }
}

/// Resolves `query` to a full id: an exact match or a unique prefix.
pub fn resolve_id<'a>(
    ids: impl IntoIterator<Item = &'a str>,
    query: &str,
    kind: &str,
) -> Result<String> {
    let query = query.trim();
    let matches: Vec<&str> = ids.into_iter().filter(|id| id.starts_with(query)).collect();
    if let Some(exact) = matches.iter().find(|id| **id == query) {
        return Ok(exact.to_string());
    }
    match matches.as_slice() {
        [id] => Ok(id.to_string()),
        [] => Err(anyhow!("No {kind} matches '{query}'")),
        _ => Err(anyhow!("'{query}' matches more than one {kind}")),
    }
}

/// Runs a ledger command against the local store, saving any changes.
pub async fn run(command: AppCommand, local: Arc<dyn LocalStore>, config: &AppConfig) -> Result<()> {
    let mut session = Session::open(local, &config.settings).await?;
    let today = today();
    let ledger = session.ledger_mut();

    match command {
        AppCommand::InvestorAdd {
            name,
            phone,
            email,
            join_date,
        } => investors::add(
            ledger,
            NewInvestor {
                name,
                phone,
                email,
                join_date: join_date.unwrap_or(today),
            },
        )?,
        AppCommand::InvestorList => investors::list(ledger, today),
        AppCommand::InvestorShow { investor } => investors::show(ledger, &investor, today)?,
        AppCommand::InvestorUpdate { investor, update } => {
            investors::update(ledger, &investor, update)?
        }
        AppCommand::InvestorRemove { investor } => investors::remove(ledger, &investor)?,
        AppCommand::Deposit {
            investor,
            amount,
            date,
            pending,
        } => operations::deposit(ledger, &investor, amount, date.unwrap_or(today), pending)?,
        AppCommand::Withdraw {
            investor,
            amount,
            date,
        } => operations::withdraw(ledger, &investor, amount, date.unwrap_or(today))?,
        AppCommand::PayProfit {
            investor,
            amount,
            date,
        } => operations::pay_profit(ledger, &investor, amount, date.unwrap_or(today))?,
        AppCommand::Close {
            investment_id,
            date,
        } => operations::close(ledger, &investment_id, date.unwrap_or(today))?,
        AppCommand::Confirm { operation_id } => operations::confirm(ledger, &operation_id)?,
        AppCommand::Profit { as_of } => profit::report(ledger, as_of.unwrap_or(today)),
        AppCommand::Project { principal, months } => profit::project(ledger, principal, months)?,
        AppCommand::CardIssue { investor, tier } => {
            cards::issue(ledger, &investor, tier, today, &mut rand::thread_rng())?
        }
        AppCommand::CardShow { investor } => cards::show(ledger, &investor)?,
        AppCommand::CardBlock { card_id } => cards::block(ledger, &card_id)?,
        AppCommand::CardReplace { investor } => {
            cards::replace(ledger, &investor, today, &mut rand::thread_rng())?
        }
        AppCommand::Sync { .. } => {
            return Err(anyhow!("Sync runs against the remote, not a ledger session"));
        }
    }

    if session.commit().await? {
        debug!("Saved local changes");
    }
    Ok(())
}
