use super::{resolve_id, short_id, ui};
use crate::core::ledger::Ledger;
use crate::core::model::Operation;
use crate::core::profit;
use anyhow::{Result, anyhow};
use chrono::NaiveDate;

fn print_recorded(op: &Operation) {
    println!(
        "Recorded {} of {:.2} on {} ({})",
        op.kind,
        op.amount,
        op.date,
        ui::style_text(short_id(&op.id), ui::StyleType::Subtle)
    );
}

pub fn deposit(
    ledger: &mut Ledger,
    investor: &str,
    amount: f64,
    date: NaiveDate,
    pending: bool,
) -> Result<()> {
    let id = ledger.find_investor(investor)?.id.clone();
    let op = ledger.deposit(&id, amount, date, pending)?;
    print_recorded(&op);
    if pending {
        println!("Deposit is pending, confirm it with `ivt confirm {}`", short_id(&op.id));
    }
    Ok(())
}

pub fn withdraw(ledger: &mut Ledger, investor: &str, amount: f64, date: NaiveDate) -> Result<()> {
    let id = ledger.find_investor(investor)?.id.clone();
    let op = ledger.withdraw(&id, amount, date)?;
    print_recorded(&op);
    Ok(())
}

/// Pays `amount` of profit, or the whole amount due when `amount` is `None`.
pub fn pay_profit(
    ledger: &mut Ledger,
    investor: &str,
    amount: Option<f64>,
    date: NaiveDate,
) -> Result<()> {
    let id = ledger.find_investor(investor)?.id.clone();
    let amount = match amount {
        Some(amount) => amount,
        None => {
            let dataset = ledger.dataset();
            let due = profit::profit_due(&dataset.operations, &id, &dataset.settings, date);
            if due <= 0.0 {
                return Err(anyhow!("No profit due on {date}"));
            }
            // Payouts are made in whole cents.
            (due * 100.0).floor() / 100.0
        }
    };
    let op = ledger.pay_profit(&id, amount, date)?;
    print_recorded(&op);
    Ok(())
}

pub fn close(ledger: &mut Ledger, investment: &str, date: NaiveDate) -> Result<()> {
    let id = resolve_id(
        ledger.dataset().investments.iter().map(|i| i.id.as_str()),
        investment,
        "investment",
    )?;
    let op = ledger.close_investment(&id, date)?;
    print_recorded(&op);
    Ok(())
}

pub fn confirm(ledger: &mut Ledger, operation: &str) -> Result<()> {
    let id = resolve_id(
        ledger.dataset().operations.iter().map(|op| op.id.as_str()),
        operation,
        "operation",
    )?;
    let op = ledger.confirm_operation(&id)?;
    println!(
        "Confirmed {} of {:.2} ({})",
        op.kind,
        op.amount,
        short_id(&op.id)
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ledger::NewInvestor;
    use crate::core::model::{Dataset, OperationType};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_pay_all_due_profit() {
        let mut ledger = Ledger::new(Dataset::default());
        ledger
            .add_investor(NewInvestor {
                name: "Ada".to_string(),
                join_date: date(2025, 1, 1),
                ..Default::default()
            })
            .unwrap();
        deposit(&mut ledger, "ada", 1000.0, date(2025, 1, 1), false).unwrap();

        // 45 days at 2% simple = 30
        pay_profit(&mut ledger, "Ada", None, date(2025, 2, 15)).unwrap();
        let paid = ledger
            .dataset()
            .operations
            .iter()
            .find(|op| op.kind == OperationType::Profit)
            .unwrap();
        assert!((paid.amount - 30.0).abs() < 0.02);
        assert!(pay_profit(&mut ledger, "Ada", None, date(2025, 2, 15)).is_err());
    }

    #[test]
    fn test_confirm_and_close_by_prefix() {
        let mut ledger = Ledger::new(Dataset::default());
        let investor = ledger
            .add_investor(NewInvestor {
                name: "Ada".to_string(),
                join_date: date(2025, 1, 1),
                ..Default::default()
            })
            .unwrap();
        let op = ledger
            .deposit(&investor.id, 500.0, date(2025, 1, 1), true)
            .unwrap();

        confirm(&mut ledger, &op.id[..8]).unwrap();
        let investment_id = ledger.dataset().investments[0].id.clone();
        close(&mut ledger, &investment_id[..8], date(2025, 2, 1)).unwrap();
        assert_eq!(ledger.active_principal(&investor.id), 0.0);
    }
}
