//! Investor ledger domain: records, profit accrual, cards and sync

pub mod card;
pub mod config;
pub mod error;
pub mod ledger;
pub mod log;
pub mod model;
pub mod profit;
pub mod session;
pub mod store;
pub mod sync;

// Re-export main types for cleaner imports
pub use error::LedgerError;
pub use ledger::Ledger;
pub use session::Session;
pub use store::{LocalState, LocalStore, RemoteDocument, RemoteStore};
pub use sync::{SyncAction, SyncEngine};
