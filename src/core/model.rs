//! Records kept in the investor dataset

use chrono::NaiveDate;
use crate::core::card::CardRegistry;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Investor {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    pub join_date: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvestmentStatus {
    Active,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Investment {
    pub id: String,
    pub investor_id: String,
    /// Remaining principal. Reduced by withdrawals.
    pub amount: f64,
    pub date: NaiveDate,
    pub status: InvestmentStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationType {
    Investment,
    Withdrawal,
    Profit,
    Close,
}

impl Display for OperationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                OperationType::Investment => "investment",
                OperationType::Withdrawal => "withdrawal",
                OperationType::Profit => "profit",
                OperationType::Close => "close",
            }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationStatus {
    Pending,
    Active,
}

/// An entry of the append-only operation log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub id: String,
    pub investor_id: String,
    #[serde(rename = "type")]
    pub kind: OperationType,
    pub amount: f64,
    pub date: NaiveDate,
    pub status: OperationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub investment_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Operation {
    pub fn is_active(&self) -> bool {
        self.status == OperationStatus::Active
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CardTier {
    #[default]
    Standard,
    Gold,
    Platinum,
}

impl CardTier {
    /// Suggested design tier for the principal an investor has placed.
    pub fn for_balance(invested: f64) -> Self {
        if invested < 10_000.0 {
            CardTier::Standard
        } else if invested < 50_000.0 {
            CardTier::Gold
        } else {
            CardTier::Platinum
        }
    }
}

impl Display for CardTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                CardTier::Standard => "standard",
                CardTier::Gold => "gold",
                CardTier::Platinum => "platinum",
            }
        )
    }
}

impl FromStr for CardTier {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "standard" => Ok(CardTier::Standard),
            "gold" => Ok(CardTier::Gold),
            "platinum" => Ok(CardTier::Platinum),
            _ => Err(anyhow::anyhow!("Invalid card tier: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardStatus {
    Active,
    Blocked,
    Expired,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardTransaction {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: OperationType,
    pub amount: f64,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    #[serde(default)]
    pub description: String,
}

/// A synthetic payment card. Numbers are cosmetic and carry no value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    pub investor_id: String,
    pub card_number: String,
    pub cvv: String,
    pub expiry_date: NaiveDate,
    pub tier: CardTier,
    pub status: CardStatus,
    pub issued_on: NaiveDate,
    #[serde(default)]
    pub transactions: Vec<CardTransaction>,
}

impl Card {
    pub fn is_active(&self) -> bool {
        self.status == CardStatus::Active
    }

    /// Expiry as printed on the card, `MM/YY`.
    pub fn expiry_display(&self) -> String {
        self.expiry_date.format("%m/%y").to_string()
    }

    /// Number grouped in blocks of four.
    pub fn formatted_number(&self) -> String {
        let digits: Vec<char> = self.card_number.chars().collect();
        digits
            .chunks(4)
            .map(|chunk| chunk.iter().collect::<String>())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Number with all but the last four digits hidden.
    pub fn masked_number(&self) -> String {
        let digits: Vec<char> = self.card_number.chars().collect();
        let last4: String = digits[digits.len().saturating_sub(4)..].iter().collect();
        format!("**** **** **** {last4}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InterestModel {
    #[default]
    Simple,
    Compound,
}

impl Display for InterestModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                InterestModel::Simple => "simple",
                InterestModel::Compound => "compound",
            }
        )
    }
}

impl FromStr for InterestModel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "simple" => Ok(InterestModel::Simple),
            "compound" => Ok(InterestModel::Compound),
            _ => Err(anyhow::anyhow!("Invalid interest model: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Monthly profit rate in percent.
    #[serde(alias = "monthly_rate")]
    pub monthly_rate: f64,
    #[serde(default, alias = "interest_model")]
    pub interest_model: InterestModel,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "USD".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            monthly_rate: 2.0,
            interest_model: InterestModel::Simple,
            currency: default_currency(),
        }
    }
}

/// Every collection the application persists and syncs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    #[serde(default)]
    pub investors: Vec<Investor>,
    #[serde(default)]
    pub investments: Vec<Investment>,
    #[serde(default)]
    pub operations: Vec<Operation>,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub investor_cards: CardRegistry,
}

impl Dataset {
    pub fn with_settings(settings: Settings) -> Self {
        Self {
            settings,
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.investors.is_empty()
            && self.investments.is_empty()
            && self.operations.is_empty()
            && self.investor_cards.is_empty()
    }
}
