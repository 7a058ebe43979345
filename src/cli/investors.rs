use super::{short_id, ui};
use crate::core::ledger::{InvestorUpdate, Ledger, NewInvestor};
use crate::core::model::{InvestmentStatus, OperationStatus};
use anyhow::Result;
use chrono::NaiveDate;
use comfy_table::{Attribute, Cell};

pub fn add(ledger: &mut Ledger, new: NewInvestor) -> Result<()> {
    let investor = ledger.add_investor(new)?;
    println!(
        "Added investor {} ({})",
        ui::style_text(&investor.name, ui::StyleType::TotalLabel),
        investor.id
    );
    Ok(())
}

pub fn list(ledger: &Ledger, as_of: NaiveDate) {
    if ledger.investors().is_empty() {
        println!("No investors recorded yet.");
        return;
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("ID"),
        ui::header_cell("Name"),
        ui::header_cell("Phone"),
        ui::header_cell("Email"),
        ui::header_cell("Joined"),
        ui::header_cell("Principal"),
        ui::header_cell("Profit Due"),
    ]);

    for investor in ledger.investors() {
        let due = ledger.summary(&investor.id, as_of).map(|s| s.due).ok();
        table.add_row(vec![
            Cell::new(short_id(&investor.id)),
            Cell::new(&investor.name),
            Cell::new(investor.phone.as_deref().unwrap_or("-")),
            Cell::new(investor.email.as_deref().unwrap_or("-")),
            Cell::new(investor.join_date),
            ui::money_cell(ledger.active_principal(&investor.id)),
            ui::format_optional_cell(due, |d| format!("{d:.2}")),
        ]);
    }

    println!("{table}");
}

pub fn show(ledger: &Ledger, query: &str, as_of: NaiveDate) -> Result<()> {
    let investor = ledger.find_investor(query)?;
    let summary = ledger.summary(&investor.id, as_of)?;
    let currency = &ledger.dataset().settings.currency;

    println!(
        "\nInvestor: {}",
        ui::style_text(&investor.name, ui::StyleType::Title)
    );
    println!(
        "{}",
        ui::style_text(
            &format!("{} · joined {}", investor.id, investor.join_date),
            ui::StyleType::Subtle
        )
    );

    let mut totals = ui::new_styled_table();
    totals.set_header(vec![
        ui::header_cell(&format!("As of {as_of} ({currency})")),
        ui::header_cell("Amount"),
    ]);
    totals.add_row(vec![Cell::new("Invested"), ui::money_cell(summary.invested)]);
    totals.add_row(vec![Cell::new("Withdrawn"), ui::money_cell(summary.withdrawn)]);
    totals.add_row(vec![
        Cell::new("Active principal"),
        ui::money_cell(summary.active_principal),
    ]);
    totals.add_row(vec![Cell::new("Accrued profit"), ui::money_cell(summary.accrued)]);
    totals.add_row(vec![Cell::new("Profit paid"), ui::money_cell(summary.paid)]);
    totals.add_row(vec![
        Cell::new("Profit due").add_attribute(Attribute::Bold),
        ui::balance_cell(summary.due),
    ]);
    totals.add_row(vec![
        Cell::new("Annualised return"),
        summary
            .annualized_return
            .map_or_else(|| ui::na_cell(false), ui::change_cell),
    ]);
    println!("{totals}");

    let investments = ledger.investments_for(&investor.id);
    if !investments.is_empty() {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Investment"),
            ui::header_cell("Date"),
            ui::header_cell("Remaining"),
            ui::header_cell("Status"),
        ]);
        for investment in investments {
            let active = investment.status == InvestmentStatus::Active;
            table.add_row(vec![
                Cell::new(short_id(&investment.id)),
                Cell::new(investment.date),
                ui::money_cell(investment.amount),
                ui::status_cell(if active { "active" } else { "closed" }, active),
            ]);
        }
        println!("{table}");
    }

    let operations = ledger.operations_for(&investor.id);
    if !operations.is_empty() {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Operation"),
            ui::header_cell("Date"),
            ui::header_cell("Type"),
            ui::header_cell("Amount"),
            ui::header_cell("Status"),
        ]);
        for op in operations {
            let active = op.status == OperationStatus::Active;
            table.add_row(vec![
                Cell::new(short_id(&op.id)),
                Cell::new(op.date),
                Cell::new(op.kind),
                ui::money_cell(op.amount),
                ui::status_cell(if active { "active" } else { "pending" }, active),
            ]);
        }
        println!("{table}");
    }

    if let Some(card) = ledger.dataset().investor_cards.active_card(&investor.id) {
        println!(
            "Card: {} ({}, expires {})",
            card.masked_number(),
            card.tier,
            card.expiry_display()
        );
    }
    Ok(())
}

pub fn update(ledger: &mut Ledger, query: &str, update: InvestorUpdate) -> Result<()> {
    let id = ledger.find_investor(query)?.id.clone();
    let investor = ledger.update_investor(&id, update)?;
    println!("Updated investor {}", investor.name);
    Ok(())
}

pub fn remove(ledger: &mut Ledger, query: &str) -> Result<()> {
    let id = ledger.find_investor(query)?.id.clone();
    let investor = ledger.remove_investor(&id)?;
    println!("Removed investor {}", investor.name);
    Ok(())
}
