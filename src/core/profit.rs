//! Profit accrual calculations.
//!
//! Every profit figure in the application goes through [`InterestModel::accrue`]
//! with the model configured in [`Settings`], so running totals, projections and
//! profit due always agree with each other.
use crate::core::model::{InterestModel, Operation, OperationType, Settings};
use anyhow::{Result, anyhow};
use chrono::NaiveDate;
use rust_decimal::{Decimal, prelude::*};
use rust_finprim::rate::cagr;
use tracing::debug;

/// Number of days counted as one month.
pub const DAYS_PER_MONTH: f64 = 30.0;

/// Fractional months between two dates, zero when `end` precedes `start`.
pub fn elapsed_months(start: NaiveDate, end: NaiveDate) -> f64 {
    let days = (end - start).num_days().max(0) as f64;
    days / DAYS_PER_MONTH
}

/// `principal * rate * months`, with `monthly_rate` in percent.
pub fn simple_accrual(principal: f64, monthly_rate: f64, months: f64) -> f64 {
    principal * (monthly_rate / 100.0) * months
}

/// `principal * ((1 + rate)^months - 1)`, with `monthly_rate` in percent.
pub fn compound_accrual(principal: f64, monthly_rate: f64, months: f64) -> f64 {
    principal * ((1.0 + monthly_rate / 100.0).powf(months) - 1.0)
}

impl InterestModel {
    pub fn accrue(&self, principal: f64, monthly_rate: f64, months: f64) -> f64 {
        match self {
            InterestModel::Simple => simple_accrual(principal, monthly_rate, months),
            InterestModel::Compound => compound_accrual(principal, monthly_rate, months),
        }
    }
}

fn principal_delta(op: &Operation) -> Option<f64> {
    match op.kind {
        OperationType::Investment => Some(op.amount),
        OperationType::Withdrawal | OperationType::Close => Some(-op.amount),
        OperationType::Profit => None,
    }
}

/// Profit accrued by an investor up to `as_of`, derived from the operation log.
///
/// Deposits start accruing from their date and withdrawals or closures stop the
/// accrual on the amount they remove. Pending operations are ignored.
pub fn accrued_profit(
    operations: &[Operation],
    investor_id: &str,
    settings: &Settings,
    as_of: NaiveDate,
) -> f64 {
    let total: f64 = operations
        .iter()
        .filter(|op| op.investor_id == investor_id && op.is_active() && op.date <= as_of)
        .filter_map(|op| {
            principal_delta(op).map(|delta| {
                let months = elapsed_months(op.date, as_of);
                settings
                    .interest_model
                    .accrue(delta, settings.monthly_rate, months)
            })
        })
        .sum();
    debug!("accrued profit for {investor_id} as of {as_of}: {total}");
    total.max(0.0)
}

/// Sum of the active profit payouts already made to an investor.
pub fn paid_profit(operations: &[Operation], investor_id: &str) -> f64 {
    operations
        .iter()
        .filter(|op| {
            op.investor_id == investor_id && op.is_active() && op.kind == OperationType::Profit
        })
        .map(|op| op.amount)
        .sum()
}

/// Accrual minus payouts. Negative when more profit was paid than accrued.
pub fn profit_due(
    operations: &[Operation],
    investor_id: &str,
    settings: &Settings,
    as_of: NaiveDate,
) -> f64 {
    accrued_profit(operations, investor_id, settings, as_of) - paid_profit(operations, investor_id)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionRow {
    pub month: u32,
    pub accrued: f64,
    pub balance: f64,
}

/// Month by month growth of `principal` under the configured model.
pub fn project(principal: f64, settings: &Settings, months: u32) -> Vec<ProjectionRow> {
    (1..=months)
        .map(|month| {
            let accrued =
                settings
                    .interest_model
                    .accrue(principal, settings.monthly_rate, month as f64);
            ProjectionRow {
                month,
                accrued,
                balance: principal + accrued,
            }
        })
        .collect()
}

/// Annualised growth in percent of `invested` growing to `invested + accrued`
/// over `years`.
pub fn annualized_return(invested: f64, accrued: f64, years: f64) -> Result<f64> {
    if invested <= 0.0 || years <= 0.0 {
        return Err(anyhow!(
            "Annualised return needs positive principal and duration"
        ));
    }

    let begin_bal = Decimal::from_f64(invested).ok_or_else(|| anyhow!("Invalid principal"))?;
    let end_bal =
        Decimal::from_f64(invested + accrued).ok_or_else(|| anyhow!("Invalid end balance"))?;
    let n_years = Decimal::from_f64(years).ok_or_else(|| anyhow!("Invalid duration"))?;

    let rate = cagr(begin_bal, end_bal, n_years);
    let percentage = (rate * Decimal::from(100))
        .to_f64()
        .ok_or_else(|| anyhow!("Annualised return conversion failed"))?;
    debug!("cagr: {begin_bal}, {end_bal}, {n_years} = {rate}, {percentage}");
    Ok(percentage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::OperationStatus;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn op(kind: OperationType, amount: f64, on: NaiveDate) -> Operation {
        Operation {
            id: format!("{kind}-{on}"),
            investor_id: "inv-1".to_string(),
            kind,
            amount,
            date: on,
            status: OperationStatus::Active,
            investment_id: None,
            notes: None,
        }
    }

    fn settings(model: InterestModel) -> Settings {
        Settings {
            monthly_rate: 2.0,
            interest_model: model,
            currency: "USD".to_string(),
        }
    }

    #[test]
    fn test_elapsed_months() {
        assert_eq!(elapsed_months(date(2025, 1, 1), date(2025, 1, 31)), 1.0);
        assert_eq!(elapsed_months(date(2025, 1, 1), date(2025, 1, 16)), 0.5);
        assert_eq!(elapsed_months(date(2025, 2, 1), date(2025, 1, 1)), 0.0);
    }

    #[test]
    fn test_simple_and_compound_formulas() {
        assert!((simple_accrual(1000.0, 2.0, 3.0) - 60.0).abs() < 1e-9);
        // 1000 * (1.02^3 - 1) = 61.208
        assert!((compound_accrual(1000.0, 2.0, 3.0) - 61.208).abs() < 1e-9);
        assert_eq!(compound_accrual(1000.0, 2.0, 0.0), 0.0);
    }

    #[test]
    fn test_compound_accrual_is_monotonic_in_months() {
        for rate in [0.0, 0.5, 2.0, 10.0] {
            let mut previous = compound_accrual(2500.0, rate, 0.0);
            for step in 1..=240 {
                let months = step as f64 * 0.25;
                let current = compound_accrual(2500.0, rate, months);
                assert!(
                    current >= previous,
                    "rate {rate}: accrual decreased at {months} months"
                );
                previous = current;
            }
        }
    }

    #[test]
    fn test_accrued_profit_from_operation_log() {
        let ops = vec![
            op(OperationType::Investment, 1000.0, date(2025, 1, 1)),
            // 400 stops accruing after one month
            op(OperationType::Withdrawal, 400.0, date(2025, 1, 31)),
            op(OperationType::Profit, 20.0, date(2025, 1, 31)),
        ];
        let as_of = date(2025, 3, 2); // two months after the deposit
        let accrued = accrued_profit(&ops, "inv-1", &settings(InterestModel::Simple), as_of);
        // 1000 * 2% * 2 - 400 * 2% * 1 = 40 - 8
        assert!((accrued - 32.0).abs() < 1e-9);

        assert_eq!(paid_profit(&ops, "inv-1"), 20.0);
        let due = profit_due(&ops, "inv-1", &settings(InterestModel::Simple), as_of);
        assert!((due - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_pending_and_foreign_operations_are_ignored() {
        let mut pending = op(OperationType::Investment, 5000.0, date(2025, 1, 1));
        pending.status = OperationStatus::Pending;
        let mut other = op(OperationType::Investment, 5000.0, date(2025, 1, 1));
        other.investor_id = "inv-2".to_string();

        let accrued = accrued_profit(
            &[pending, other],
            "inv-1",
            &settings(InterestModel::Simple),
            date(2025, 6, 1),
        );
        assert_eq!(accrued, 0.0);
    }

    #[test]
    fn test_model_is_used_consistently() {
        let ops = vec![op(OperationType::Investment, 1000.0, date(2025, 1, 1))];
        let as_of = date(2025, 4, 1); // 90 days
        let compound = settings(InterestModel::Compound);

        let accrued = accrued_profit(&ops, "inv-1", &compound, as_of);
        let projected = project(1000.0, &compound, 3);
        assert!((accrued - projected[2].accrued).abs() < 1e-9);
        assert!((projected[2].balance - 1061.208).abs() < 1e-9);
    }

    #[test]
    fn test_projection_rows() {
        let rows = project(1000.0, &settings(InterestModel::Simple), 12);
        assert_eq!(rows.len(), 12);
        assert_eq!(rows[0].month, 1);
        assert!((rows[11].accrued - 240.0).abs() < 1e-9);
        assert!((rows[11].balance - 1240.0).abs() < 1e-9);
        assert!(project(1000.0, &settings(InterestModel::Simple), 0).is_empty());
    }

    #[test]
    fn test_annualized_return() {
        let rate = annualized_return(1000.0, 250.0, 1.0).unwrap();
        assert!((rate - 25.0).abs() < 0.1);
        assert!(annualized_return(0.0, 10.0, 1.0).is_err());
        assert!(annualized_return(1000.0, 10.0, 0.0).is_err());
    }
}
