use anyhow::Result;
use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand};
use ivt::AppCommand;
use ivt::core::ledger::InvestorUpdate;
use ivt::core::log::init_logging;
use ivt::core::model::CardTier;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Manage investors
    Investor {
        #[command(subcommand)]
        action: InvestorCommands,
    },
    /// Record a deposit
    Deposit {
        /// Investor id, id prefix or name
        investor: String,
        amount: f64,
        /// Operation date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<NaiveDate>,
        /// Record as pending until confirmed
        #[arg(long)]
        pending: bool,
    },
    /// Withdraw principal, oldest investments first
    Withdraw {
        investor: String,
        amount: f64,
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },
    /// Pay out accrued profit
    PayProfit {
        investor: String,
        /// Amount to pay, defaults to everything due
        amount: Option<f64>,
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },
    /// Close an investment, returning its remaining principal
    Close {
        /// Investment id or id prefix
        investment: String,
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },
    /// Confirm a pending operation
    Confirm {
        /// Operation id or id prefix
        operation: String,
    },
    /// Display accrued and due profit for all investors
    Profit {
        /// Report date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        as_of: Option<NaiveDate>,
    },
    /// Project the growth of a principal under the current settings
    Project {
        principal: f64,
        #[arg(short, long, default_value_t = 12)]
        months: u32,
    },
    /// Manage investor cards
    Card {
        #[command(subcommand)]
        action: CardCommands,
    },
    /// Reconcile the local dataset with the remote copy
    Sync {
        /// Keep syncing at the configured interval
        #[arg(short, long)]
        watch: bool,
    },
}

#[derive(Subcommand)]
enum InvestorCommands {
    /// Add an investor
    Add {
        name: String,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        email: Option<String>,
        /// Join date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        joined: Option<NaiveDate>,
    },
    /// List investors
    List,
    /// Show an investor with investments, operations and profit
    Show { investor: String },
    /// Update contact details
    Update {
        investor: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    /// Remove an investor without recorded operations
    Remove { investor: String },
}

#[derive(Subcommand)]
enum CardCommands {
    /// Issue a card, tier defaults from the active principal
    Issue {
        investor: String,
        /// standard, gold or platinum
        #[arg(short, long, value_parser = parse_tier)]
        tier: Option<CardTier>,
    },
    /// Show an investor's cards
    Show { investor: String },
    /// Block a card
    Block {
        /// Card id or id prefix
        card: String,
    },
    /// Block the active card and issue a new one
    Replace { investor: String },
}

fn parse_tier(s: &str) -> Result<CardTier, String> {
    s.parse().map_err(|e: anyhow::Error| e.to_string())
}

impl From<Commands> for AppCommand {
    fn from(cmd: Commands) -> AppCommand {
        match cmd {
            Commands::Investor { action } => match action {
                InvestorCommands::Add {
                    name,
                    phone,
                    email,
                    joined,
                } => AppCommand::InvestorAdd {
                    name,
                    phone,
                    email,
                    join_date: joined,
                },
                InvestorCommands::List => AppCommand::InvestorList,
                InvestorCommands::Show { investor } => AppCommand::InvestorShow { investor },
                InvestorCommands::Update {
                    investor,
                    name,
                    phone,
                    email,
                } => AppCommand::InvestorUpdate {
                    investor,
                    update: InvestorUpdate { name, phone, email },
                },
                InvestorCommands::Remove { investor } => AppCommand::InvestorRemove { investor },
            },
            Commands::Deposit {
                investor,
                amount,
                date,
                pending,
            } => AppCommand::Deposit {
                investor,
                amount,
                date,
                pending,
            },
            Commands::Withdraw {
                investor,
                amount,
                date,
            } => AppCommand::Withdraw {
                investor,
                amount,
                date,
            },
            Commands::PayProfit {
                investor,
                amount,
                date,
            } => AppCommand::PayProfit {
                investor,
                amount,
                date,
            },
            Commands::Close { investment, date } => AppCommand::Close {
                investment_id: investment,
                date,
            },
            Commands::Confirm { operation } => AppCommand::Confirm {
                operation_id: operation,
            },
            Commands::Profit { as_of } => AppCommand::Profit { as_of },
            Commands::Project { principal, months } => AppCommand::Project { principal, months },
            Commands::Card { action } => match action {
                CardCommands::Issue { investor, tier } => AppCommand::CardIssue { investor, tier },
                CardCommands::Show { investor } => AppCommand::CardShow { investor },
                CardCommands::Block { card } => AppCommand::CardBlock { card_id: card },
                CardCommands::Replace { investor } => AppCommand::CardReplace { investor },
            },
            Commands::Sync { watch } => AppCommand::Sync { watch },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => match cli.config_path.as_deref() {
            Some(path) => ivt::cli::setup::setup_at_path(path),
            None => ivt::cli::setup::setup(),
        },
        Some(cmd) => ivt::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
