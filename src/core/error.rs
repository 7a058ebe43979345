//! Domain errors raised by the ledger and card registry.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LedgerError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("Investor not found: {0}")]
    InvestorNotFound(String),

    #[error("Investment not found: {0}")]
    InvestmentNotFound(String),

    #[error("Operation not found: {0}")]
    OperationNotFound(String),

    #[error("Card not found: {0}")]
    CardNotFound(String),

    #[error("Amount must be positive, got {0}")]
    InvalidAmount(f64),

    #[error("Input validation failed: {0}")]
    Validation(String),

    #[error("Withdrawal of {requested:.2} exceeds active principal {available:.2}")]
    InsufficientPrincipal { requested: f64, available: f64 },

    #[error("Profit payout of {requested:.2} exceeds profit due {due:.2}")]
    ExceedsProfitDue { requested: f64, due: f64 },

    #[error("Investor {0} already has an active card")]
    ActiveCardExists(String),

    #[error("Investor {0} has no active card")]
    NoActiveCard(String),

    #[error("Investor {0} has recorded operations and cannot be removed")]
    InvestorHasHistory(String),

    #[error("Investment {0} is already closed")]
    InvestmentClosed(String),

    #[error("Operation {0} is not pending")]
    OperationNotPending(String),
}
