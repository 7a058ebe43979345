//! Financial operations over an investor [`Dataset`].
//!
//! The operation log is append-only: operations are never removed and only
//! their status may move from pending to active. Investments hold the remaining
//! principal and are adjusted by withdrawals and closures.
use crate::core::error::{LedgerError, Result};
use crate::core::model::{
    Card, CardTier, CardTransaction, Dataset, Investment, InvestmentStatus, Investor, Operation,
    OperationStatus, OperationType, new_id,
};
use crate::core::profit;
use chrono::NaiveDate;
use rand::Rng;
use tracing::{debug, info};

const EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Default)]
pub struct NewInvestor {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub join_date: NaiveDate,
}

/// Fields to change on an investor. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct InvestorUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvestorSummary {
    pub investor_id: String,
    pub invested: f64,
    pub withdrawn: f64,
    pub active_principal: f64,
    pub accrued: f64,
    pub paid: f64,
    pub due: f64,
    pub annualized_return: Option<f64>,
}

pub struct Ledger {
    data: Dataset,
    modified: bool,
}

fn validate_amount(amount: f64) -> Result<()> {
    if amount.is_finite() && amount > 0.0 {
        Ok(())
    } else {
        Err(LedgerError::InvalidAmount(amount))
    }
}

fn validate_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(LedgerError::Validation("investor name is empty".to_string()));
    }
    Ok(name.to_string())
}

fn validate_email(email: Option<String>) -> Result<Option<String>> {
    match email.map(|e| e.trim().to_string()) {
        Some(e) if e.is_empty() => Ok(None),
        Some(e) if !e.contains('@') => {
            Err(LedgerError::Validation(format!("invalid email address: {e}")))
        }
        other => Ok(other),
    }
}

impl Ledger {
    pub fn new(data: Dataset) -> Self {
        Self {
            data,
            modified: false,
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.data
    }

    pub fn into_dataset(self) -> Dataset {
        self.data
    }

    /// Whether any mutation happened since the ledger was loaded.
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    fn touch(&mut self) {
        self.modified = true;
    }

    pub fn investors(&self) -> &[Investor] {
        &self.data.investors
    }

    pub fn investor(&self, id: &str) -> Result<&Investor> {
        self.data
            .investors
            .iter()
            .find(|i| i.id == id)
            .ok_or_else(|| LedgerError::InvestorNotFound(id.to_string()))
    }

    /// Looks an investor up by id, unique id prefix or unique name.
    pub fn find_investor(&self, query: &str) -> Result<&Investor> {
        let query = query.trim();
        if let Ok(investor) = self.investor(query) {
            return Ok(investor);
        }

        let by_prefix: Vec<&Investor> = self
            .data
            .investors
            .iter()
            .filter(|i| query.len() >= 4 && i.id.starts_with(query))
            .collect();
        if let [investor] = by_prefix.as_slice() {
            return Ok(*investor);
        }

        let by_name: Vec<&Investor> = self
            .data
            .investors
            .iter()
            .filter(|i| i.name.eq_ignore_ascii_case(query))
            .collect();
        match by_name.as_slice() {
            [investor] => Ok(*investor),
            [] if by_prefix.is_empty() => Err(LedgerError::InvestorNotFound(query.to_string())),
            _ => Err(LedgerError::Validation(format!(
                "'{query}' matches more than one investor"
            ))),
        }
    }

    fn investor_mut(&mut self, id: &str) -> Result<&mut Investor> {
        self.data
            .investors
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| LedgerError::InvestorNotFound(id.to_string()))
    }

    pub fn add_investor(&mut self, new: NewInvestor) -> Result<Investor> {
        let investor = Investor {
            id: new_id(),
            name: validate_name(&new.name)?,
            phone: new.phone.filter(|p| !p.trim().is_empty()),
            email: validate_email(new.email)?,
            join_date: new.join_date,
        };
        info!(id = %investor.id, "Added investor {}", investor.name);
        self.data.investors.push(investor.clone());
        self.touch();
        Ok(investor)
    }

    pub fn update_investor(&mut self, id: &str, update: InvestorUpdate) -> Result<Investor> {
        let name = update.name.as_deref().map(validate_name).transpose()?;
        let email = validate_email(update.email)?;

        let investor = self.investor_mut(id)?;
        if let Some(name) = name {
            investor.name = name;
        }
        if let Some(phone) = update.phone {
            investor.phone = Some(phone);
        }
        if email.is_some() {
            investor.email = email;
        }
        let updated = investor.clone();
        self.touch();
        Ok(updated)
    }

    /// Removes an investor that has no recorded operations, along with their cards.
    pub fn remove_investor(&mut self, id: &str) -> Result<Investor> {
        self.investor(id)?;
        if self.data.operations.iter().any(|op| op.investor_id == id) {
            return Err(LedgerError::InvestorHasHistory(id.to_string()));
        }
        let position = self
            .data
            .investors
            .iter()
            .position(|i| i.id == id)
            .ok_or_else(|| LedgerError::InvestorNotFound(id.to_string()))?;
        let removed = self.data.investors.remove(position);
        self.data.investor_cards.remove_investor(id);
        info!(id, "Removed investor {}", removed.name);
        self.touch();
        Ok(removed)
    }

    pub fn investments_for(&self, investor_id: &str) -> Vec<&Investment> {
        self.data
            .investments
            .iter()
            .filter(|inv| inv.investor_id == investor_id)
            .collect()
    }

    pub fn operations_for(&self, investor_id: &str) -> Vec<&Operation> {
        self.data
            .operations
            .iter()
            .filter(|op| op.investor_id == investor_id)
            .collect()
    }

    pub fn active_principal(&self, investor_id: &str) -> f64 {
        self.data
            .investments
            .iter()
            .filter(|inv| inv.investor_id == investor_id && inv.status == InvestmentStatus::Active)
            .map(|inv| inv.amount)
            .sum()
    }

    fn append_operation(&mut self, op: Operation) -> Operation {
        let tx = CardTransaction {
            id: new_id(),
            kind: op.kind,
            amount: op.amount,
            date: op.date,
            operation_id: Some(op.id.clone()),
            description: op.notes.clone().unwrap_or_else(|| op.kind.to_string()),
        };
        if op.is_active() {
            if let Err(e) = self
                .data
                .investor_cards
                .record_transaction(&op.investor_id, tx)
            {
                debug!("Operation not mirrored on a card: {e}");
            }
        }
        debug!(id = %op.id, "Appending {} operation of {:.2}", op.kind, op.amount);
        self.data.operations.push(op.clone());
        self.touch();
        op
    }

    fn open_investment(&mut self, investor_id: &str, amount: f64, date: NaiveDate) -> String {
        let investment = Investment {
            id: new_id(),
            investor_id: investor_id.to_string(),
            amount,
            date,
            status: InvestmentStatus::Active,
        };
        let id = investment.id.clone();
        self.data.investments.push(investment);
        id
    }

    /// Records a deposit. Pending deposits open their investment on confirmation.
    pub fn deposit(
        &mut self,
        investor_id: &str,
        amount: f64,
        date: NaiveDate,
        pending: bool,
    ) -> Result<Operation> {
        validate_amount(amount)?;
        self.investor(investor_id)?;

        let (status, investment_id) = if pending {
            (OperationStatus::Pending, None)
        } else {
            (
                OperationStatus::Active,
                Some(self.open_investment(investor_id, amount, date)),
            )
        };
        let op = self.append_operation(Operation {
            id: new_id(),
            investor_id: investor_id.to_string(),
            kind: OperationType::Investment,
            amount,
            date,
            status,
            investment_id,
            notes: None,
        });
        info!(investor = investor_id, "Deposited {amount:.2}");
        Ok(op)
    }

    /// Activates a pending operation.
    pub fn confirm_operation(&mut self, operation_id: &str) -> Result<Operation> {
        let index = self
            .data
            .operations
            .iter()
            .position(|op| op.id == operation_id)
            .ok_or_else(|| LedgerError::OperationNotFound(operation_id.to_string()))?;
        if self.data.operations[index].status != OperationStatus::Pending {
            return Err(LedgerError::OperationNotPending(operation_id.to_string()));
        }

        let (kind, investor_id, amount, date) = {
            let op = &self.data.operations[index];
            (op.kind, op.investor_id.clone(), op.amount, op.date)
        };
        if kind == OperationType::Investment {
            let investment_id = self.open_investment(&investor_id, amount, date);
            self.data.operations[index].investment_id = Some(investment_id);
        }
        self.data.operations[index].status = OperationStatus::Active;
        self.touch();
        info!(operation = operation_id, "Confirmed pending {kind}");
        Ok(self.data.operations[index].clone())
    }

    /// Withdraws principal, consuming the oldest active investments first.
    pub fn withdraw(&mut self, investor_id: &str, amount: f64, date: NaiveDate) -> Result<Operation> {
        validate_amount(amount)?;
        self.investor(investor_id)?;

        // Only principal invested by `date` can be withdrawn on `date`.
        let mut order: Vec<usize> = self
            .data
            .investments
            .iter()
            .enumerate()
            .filter(|(_, inv)| {
                inv.investor_id == investor_id
                    && inv.status == InvestmentStatus::Active
                    && inv.date <= date
            })
            .map(|(i, _)| i)
            .collect();
        order.sort_by_key(|&i| self.data.investments[i].date);

        let available: f64 = order.iter().map(|&i| self.data.investments[i].amount).sum();
        if amount > available + EPSILON {
            return Err(LedgerError::InsufficientPrincipal {
                requested: amount,
                available,
            });
        }

        let mut remaining = amount;
        for i in order {
            if remaining <= EPSILON {
                break;
            }
            let investment = &mut self.data.investments[i];
            let taken = remaining.min(investment.amount);
            investment.amount -= taken;
            remaining -= taken;
            if investment.amount <= EPSILON {
                investment.amount = 0.0;
                investment.status = InvestmentStatus::Closed;
                debug!(investment = %investment.id, "Investment exhausted by withdrawal");
            }
        }

        let op = self.append_operation(Operation {
            id: new_id(),
            investor_id: investor_id.to_string(),
            kind: OperationType::Withdrawal,
            amount,
            date,
            status: OperationStatus::Active,
            investment_id: None,
            notes: None,
        });
        info!(investor = investor_id, "Withdrew {amount:.2}");
        Ok(op)
    }

    /// Pays out accrued profit. The payout may not exceed the profit due on `date`.
    pub fn pay_profit(
        &mut self,
        investor_id: &str,
        amount: f64,
        date: NaiveDate,
    ) -> Result<Operation> {
        validate_amount(amount)?;
        self.investor(investor_id)?;

        let due = profit::profit_due(&self.data.operations, investor_id, &self.data.settings, date);
        if amount > due + EPSILON {
            return Err(LedgerError::ExceedsProfitDue {
                requested: amount,
                due,
            });
        }

        let op = self.append_operation(Operation {
            id: new_id(),
            investor_id: investor_id.to_string(),
            kind: OperationType::Profit,
            amount,
            date,
            status: OperationStatus::Active,
            investment_id: None,
            notes: None,
        });
        info!(investor = investor_id, "Paid profit {amount:.2}");
        Ok(op)
    }

    /// Closes an investment, returning its remaining principal.
    pub fn close_investment(&mut self, investment_id: &str, date: NaiveDate) -> Result<Operation> {
        let investment = self
            .data
            .investments
            .iter_mut()
            .find(|inv| inv.id == investment_id)
            .ok_or_else(|| LedgerError::InvestmentNotFound(investment_id.to_string()))?;
        if investment.status == InvestmentStatus::Closed {
            return Err(LedgerError::InvestmentClosed(investment_id.to_string()));
        }
        if date < investment.date {
            return Err(LedgerError::Validation(format!(
                "Investment {investment_id} was made on {}, it cannot be closed on {date}",
                investment.date
            )));
        }
        investment.status = InvestmentStatus::Closed;
        let amount = investment.amount;
        let investor_id = investment.investor_id.clone();

        let op = self.append_operation(Operation {
            id: new_id(),
            investor_id: investor_id.clone(),
            kind: OperationType::Close,
            amount,
            date,
            status: OperationStatus::Active,
            investment_id: Some(investment_id.to_string()),
            notes: None,
        });
        info!(investor = %investor_id, investment = investment_id, "Closed investment of {amount:.2}");
        Ok(op)
    }

    pub fn summary(&self, investor_id: &str, as_of: NaiveDate) -> Result<InvestorSummary> {
        self.investor(investor_id)?;
        let ops = &self.data.operations;
        let settings = &self.data.settings;

        let sum_of = |kinds: &[OperationType]| -> f64 {
            ops.iter()
                .filter(|op| {
                    op.investor_id == investor_id && op.is_active() && kinds.contains(&op.kind)
                })
                .map(|op| op.amount)
                .sum()
        };
        let invested = sum_of(&[OperationType::Investment]);
        let withdrawn = sum_of(&[OperationType::Withdrawal, OperationType::Close]);
        let accrued = profit::accrued_profit(ops, investor_id, settings, as_of);
        let paid = profit::paid_profit(ops, investor_id);

        let first_deposit = ops
            .iter()
            .filter(|op| {
                op.investor_id == investor_id
                    && op.is_active()
                    && op.kind == OperationType::Investment
            })
            .map(|op| op.date)
            .min();
        let annualized_return = first_deposit.and_then(|start| {
            let years = (as_of - start).num_days() as f64 / 365.0;
            profit::annualized_return(invested, accrued, years).ok()
        });

        Ok(InvestorSummary {
            investor_id: investor_id.to_string(),
            invested,
            withdrawn,
            active_principal: self.active_principal(investor_id),
            accrued,
            paid,
            due: accrued - paid,
            annualized_return,
        })
    }

    /// Issues a card, defaulting the tier from the investor's active principal.
    pub fn issue_card<R: Rng>(
        &mut self,
        investor_id: &str,
        tier: Option<CardTier>,
        today: NaiveDate,
        rng: &mut R,
    ) -> Result<Card> {
        self.investor(investor_id)?;
        let tier = tier.unwrap_or_else(|| CardTier::for_balance(self.active_principal(investor_id)));
        self.data.investor_cards.expire_due(today);
        let card = self.data.investor_cards.issue(investor_id, tier, today, rng)?;
        self.touch();
        Ok(card)
    }

    pub fn block_card(&mut self, card_id: &str) -> Result<()> {
        self.data.investor_cards.block(card_id)?;
        self.touch();
        Ok(())
    }

    pub fn replace_card<R: Rng>(
        &mut self,
        investor_id: &str,
        today: NaiveDate,
        rng: &mut R,
    ) -> Result<Card> {
        self.investor(investor_id)?;
        let card = self.data.investor_cards.replace(investor_id, today, rng)?;
        self.touch();
        Ok(card)
    }

    pub fn cards_for(&self, investor_id: &str) -> &[Card] {
        self.data.investor_cards.cards(investor_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{CardStatus, Settings};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ledger_with_investor() -> (Ledger, String) {
        let mut ledger = Ledger::new(Dataset::with_settings(Settings::default()));
        let investor = ledger
            .add_investor(NewInvestor {
                name: "  Grace Hopper ".to_string(),
                phone: Some("+1 555 0100".to_string()),
                email: Some("grace@example.com".to_string()),
                join_date: date(2025, 1, 1),
            })
            .unwrap();
        (ledger, investor.id)
    }

    #[test]
    fn test_add_and_update_investor() {
        let (mut ledger, id) = ledger_with_investor();
        assert!(ledger.is_modified());
        assert_eq!(ledger.investor(&id).unwrap().name, "Grace Hopper");

        let updated = ledger
            .update_investor(
                &id,
                InvestorUpdate {
                    email: Some("hopper@example.com".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.email.as_deref(), Some("hopper@example.com"));
        assert_eq!(updated.name, "Grace Hopper");

        let err = ledger
            .update_investor(
                &id,
                InvestorUpdate {
                    name: Some("   ".to_string()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));

        let err = ledger
            .add_investor(NewInvestor {
                name: "Bad".to_string(),
                email: Some("not-an-email".to_string()),
                join_date: date(2025, 1, 1),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
    }

    #[test]
    fn test_find_investor_by_prefix_or_name() {
        let (mut ledger, id) = ledger_with_investor();
        assert_eq!(ledger.find_investor(&id).unwrap().id, id);
        assert_eq!(ledger.find_investor(&id[..8]).unwrap().id, id);
        assert_eq!(ledger.find_investor("grace hopper").unwrap().id, id);
        assert!(matches!(
            ledger.find_investor("nobody"),
            Err(LedgerError::InvestorNotFound(_))
        ));

        ledger
            .add_investor(NewInvestor {
                name: "Grace Hopper".to_string(),
                join_date: date(2025, 3, 1),
                ..Default::default()
            })
            .unwrap();
        assert!(matches!(
            ledger.find_investor("Grace Hopper"),
            Err(LedgerError::Validation(_))
        ));
    }

    #[test]
    fn test_remove_investor_requires_empty_history() {
        let (mut ledger, id) = ledger_with_investor();
        ledger.deposit(&id, 100.0, date(2025, 1, 2), false).unwrap();
        assert_eq!(
            ledger.remove_investor(&id).unwrap_err(),
            LedgerError::InvestorHasHistory(id.clone())
        );

        let other = ledger
            .add_investor(NewInvestor {
                name: "Alan".to_string(),
                join_date: date(2025, 2, 1),
                ..Default::default()
            })
            .unwrap();
        ledger.remove_investor(&other.id).unwrap();
        assert_eq!(ledger.investors().len(), 1);
    }

    #[test]
    fn test_withdraw_consumes_oldest_first() {
        let (mut ledger, id) = ledger_with_investor();
        ledger.deposit(&id, 300.0, date(2025, 2, 1), false).unwrap();
        ledger.deposit(&id, 500.0, date(2025, 1, 1), false).unwrap();

        ledger.withdraw(&id, 600.0, date(2025, 3, 1)).unwrap();
        let investments = ledger.investments_for(&id);
        let older = investments.iter().find(|i| i.date == date(2025, 1, 1)).unwrap();
        let newer = investments.iter().find(|i| i.date == date(2025, 2, 1)).unwrap();
        assert_eq!(older.status, InvestmentStatus::Closed);
        assert_eq!(older.amount, 0.0);
        assert_eq!(newer.status, InvestmentStatus::Active);
        assert!((newer.amount - 200.0).abs() < 1e-9);
        assert!((ledger.active_principal(&id) - 200.0).abs() < 1e-9);

        let err = ledger.withdraw(&id, 250.0, date(2025, 3, 2)).unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientPrincipal { .. }));
        assert_eq!(
            ledger.withdraw(&id, -5.0, date(2025, 3, 2)).unwrap_err(),
            LedgerError::InvalidAmount(-5.0)
        );
    }

    #[test]
    fn test_withdraw_only_reaches_principal_invested_by_its_date() {
        let (mut ledger, id) = ledger_with_investor();
        ledger.deposit(&id, 1000.0, date(2025, 1, 1), false).unwrap();
        ledger.deposit(&id, 1000.0, date(2025, 6, 1), false).unwrap();

        let err = ledger.withdraw(&id, 1500.0, date(2025, 3, 2)).unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientPrincipal {
                requested: 1500.0,
                available: 1000.0,
            }
        );

        ledger.withdraw(&id, 400.0, date(2025, 3, 2)).unwrap();
        let investments = ledger.investments_for(&id);
        let later = investments.iter().find(|i| i.date == date(2025, 6, 1)).unwrap();
        assert_eq!(later.amount, 1000.0);

        // 60 days on 1000, then 600 for 30 days: 40 + 12
        let summary = ledger.summary(&id, date(2025, 4, 1)).unwrap();
        assert!((summary.accrued - 52.0).abs() < 1e-9);
        assert!((summary.active_principal - 1600.0).abs() < 1e-9);
    }

    #[test]
    fn test_close_before_investment_date_is_rejected() {
        let (mut ledger, id) = ledger_with_investor();
        let deposit = ledger.deposit(&id, 1000.0, date(2025, 5, 1), false).unwrap();
        let investment_id = deposit.investment_id.unwrap();

        let err = ledger
            .close_investment(&investment_id, date(2025, 4, 30))
            .unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
        assert_eq!(ledger.active_principal(&id), 1000.0);
        assert_eq!(ledger.operations_for(&id).len(), 1);

        ledger.close_investment(&investment_id, date(2025, 5, 1)).unwrap();
        assert_eq!(ledger.active_principal(&id), 0.0);
    }

    #[test]
    fn test_pending_deposit_counts_after_confirmation() {
        let (mut ledger, id) = ledger_with_investor();
        let op = ledger.deposit(&id, 1000.0, date(2025, 1, 1), true).unwrap();
        assert_eq!(op.status, OperationStatus::Pending);
        assert_eq!(ledger.active_principal(&id), 0.0);
        assert_eq!(ledger.summary(&id, date(2025, 3, 2)).unwrap().accrued, 0.0);

        let confirmed = ledger.confirm_operation(&op.id).unwrap();
        assert!(confirmed.is_active());
        assert!(confirmed.investment_id.is_some());
        assert_eq!(ledger.active_principal(&id), 1000.0);
        assert_eq!(
            ledger.confirm_operation(&op.id).unwrap_err(),
            LedgerError::OperationNotPending(op.id.clone())
        );
    }

    #[test]
    fn test_profit_due_and_payout_limit() {
        let (mut ledger, id) = ledger_with_investor();
        ledger.deposit(&id, 1000.0, date(2025, 1, 1), false).unwrap();

        // 60 days at 2% simple = 40
        let as_of = date(2025, 3, 2);
        let err = ledger.pay_profit(&id, 50.0, as_of).unwrap_err();
        assert!(matches!(err, LedgerError::ExceedsProfitDue { .. }));
        ledger.pay_profit(&id, 30.0, as_of).unwrap();

        let summary = ledger.summary(&id, as_of).unwrap();
        assert!((summary.accrued - 40.0).abs() < 1e-9);
        assert!((summary.paid - 30.0).abs() < 1e-9);
        assert!((summary.due - 10.0).abs() < 1e-9);
        assert_eq!(summary.invested, 1000.0);
        assert!(summary.annualized_return.unwrap() > 0.0);
    }

    #[test]
    fn test_close_investment_stops_accrual() {
        let (mut ledger, id) = ledger_with_investor();
        let deposit = ledger.deposit(&id, 1000.0, date(2025, 1, 1), false).unwrap();
        let investment_id = deposit.investment_id.unwrap();

        let close = ledger.close_investment(&investment_id, date(2025, 1, 31)).unwrap();
        assert_eq!(close.kind, OperationType::Close);
        assert_eq!(close.amount, 1000.0);
        assert_eq!(
            ledger.close_investment(&investment_id, date(2025, 2, 1)).unwrap_err(),
            LedgerError::InvestmentClosed(investment_id.clone())
        );

        // One month of accrual, frozen after the closure.
        let summary = ledger.summary(&id, date(2025, 12, 31)).unwrap();
        assert!((summary.accrued - 20.0).abs() < 1e-9);
        assert_eq!(summary.withdrawn, 1000.0);
        assert_eq!(summary.active_principal, 0.0);
    }

    #[test]
    fn test_operations_are_mirrored_on_active_card() {
        let (mut ledger, id) = ledger_with_investor();
        ledger.deposit(&id, 20_000.0, date(2025, 1, 1), false).unwrap();

        let mut rng = StdRng::seed_from_u64(11);
        let card = ledger.issue_card(&id, None, date(2025, 1, 2), &mut rng).unwrap();
        assert_eq!(card.tier, CardTier::Gold);

        ledger.withdraw(&id, 1_000.0, date(2025, 1, 3)).unwrap();
        let active = ledger.dataset().investor_cards.active_card(&id).unwrap();
        assert_eq!(active.transactions.len(), 1);
        assert_eq!(active.transactions[0].kind, OperationType::Withdrawal);

        ledger.block_card(&card.id).unwrap();
        assert_eq!(ledger.cards_for(&id)[0].status, CardStatus::Blocked);
        assert!(matches!(
            ledger.replace_card(&id, date(2025, 1, 4), &mut rng),
            Err(LedgerError::NoActiveCard(_))
        ));
        assert!(matches!(
            ledger.issue_card("missing", None, date(2025, 1, 4), &mut rng),
            Err(LedgerError::InvestorNotFound(_))
        ));
    }
}
