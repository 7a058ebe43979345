pub mod cli;
pub mod core;
pub mod remote;
pub mod store;

use crate::core::config::AppConfig;
use crate::core::ledger::InvestorUpdate;
use crate::core::model::CardTier;
use anyhow::Result;
use chrono::NaiveDate;
use tracing::debug;

/// Commands the application can run against the investor dataset.
#[derive(Debug, Clone)]
pub enum AppCommand {
    InvestorAdd {
        name: String,
        phone: Option<String>,
        email: Option<String>,
        join_date: Option<NaiveDate>,
    },
    InvestorList,
    InvestorShow {
        investor: String,
    },
    InvestorUpdate {
        investor: String,
        update: InvestorUpdate,
    },
    InvestorRemove {
        investor: String,
    },
    Deposit {
        investor: String,
        amount: f64,
        date: Option<NaiveDate>,
        pending: bool,
    },
    Withdraw {
        investor: String,
        amount: f64,
        date: Option<NaiveDate>,
    },
    /// Pays `amount`, or everything due when `None`.
    PayProfit {
        investor: String,
        amount: Option<f64>,
        date: Option<NaiveDate>,
    },
    Close {
        investment_id: String,
        date: Option<NaiveDate>,
    },
    Confirm {
        operation_id: String,
    },
    Profit {
        as_of: Option<NaiveDate>,
    },
    Project {
        principal: f64,
        months: u32,
    },
    CardIssue {
        investor: String,
        tier: Option<CardTier>,
    },
    CardShow {
        investor: String,
    },
    CardBlock {
        card_id: String,
    },
    CardReplace {
        investor: String,
    },
    Sync {
        watch: bool,
    },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    match command {
        AppCommand::Sync { watch } => cli::sync::run(&config, watch).await,
        command => {
            let local = store::open_local_store(&config)?;
            cli::run(command, local, &config).await
        }
    }
}
