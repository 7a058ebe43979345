use super::ui;
use crate::core::ledger::{InvestorSummary, Ledger};
use crate::core::profit;
use anyhow::{Result, anyhow};
use chrono::NaiveDate;
use comfy_table::{Attribute, Cell};
use tracing::{debug, info};

struct ProfitRow {
    name: String,
    summary: InvestorSummary,
}

#[derive(Debug, Default, PartialEq)]
struct ProfitTotals {
    active_principal: f64,
    accrued: f64,
    paid: f64,
    due: f64,
}

fn profit_rows(ledger: &Ledger, as_of: NaiveDate) -> Vec<ProfitRow> {
    ledger
        .investors()
        .iter()
        .filter_map(|investor| match ledger.summary(&investor.id, as_of) {
            Ok(summary) => Some(ProfitRow {
                name: investor.name.clone(),
                summary,
            }),
            Err(e) => {
                debug!("Skipping investor {}: {e}", investor.id);
                None
            }
        })
        .collect()
}

fn totals(rows: &[ProfitRow]) -> ProfitTotals {
    rows.iter().fold(ProfitTotals::default(), |mut acc, row| {
        acc.active_principal += row.summary.active_principal;
        acc.accrued += row.summary.accrued;
        acc.paid += row.summary.paid;
        acc.due += row.summary.due;
        acc
    })
}

/// Prints accrued, paid and due profit for every investor.
pub fn report(ledger: &Ledger, as_of: NaiveDate) {
    info!("Calculating profit as of {as_of}...");
    let rows = profit_rows(ledger, as_of);
    if rows.is_empty() {
        println!("No investors to report profit for.");
        return;
    }

    let settings = &ledger.dataset().settings;
    println!(
        "\nProfit as of {} {}",
        ui::style_text(&as_of.to_string(), ui::StyleType::Title),
        ui::style_text(
            &format!(
                "({:.2}% monthly, {} interest, {})",
                settings.monthly_rate,
                settings.interest_model,
                settings.currency
            ),
            ui::StyleType::Subtle
        )
    );

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Investor"),
        ui::header_cell("Principal"),
        ui::header_cell("Accrued"),
        ui::header_cell("Paid"),
        ui::header_cell("Due"),
        ui::header_cell("Annualised"),
    ]);

    for row in &rows {
        table.add_row(vec![
            Cell::new(&row.name),
            ui::money_cell(row.summary.active_principal),
            ui::money_cell(row.summary.accrued),
            ui::money_cell(row.summary.paid),
            ui::balance_cell(row.summary.due),
            row.summary
                .annualized_return
                .map_or_else(|| ui::na_cell(false), ui::change_cell),
        ]);
    }

    if rows.len() > 1 {
        let total = totals(&rows);
        table.add_row(vec![
            Cell::new("Total").add_attribute(Attribute::Bold),
            ui::money_cell(total.active_principal).add_attribute(Attribute::Bold),
            ui::money_cell(total.accrued).add_attribute(Attribute::Bold),
            ui::money_cell(total.paid).add_attribute(Attribute::Bold),
            ui::balance_cell(total.due).add_attribute(Attribute::Bold),
            Cell::new(""),
        ]);
    }

    println!("{table}");
}

/// Prints month by month growth of `principal` under the configured settings.
pub fn project(ledger: &Ledger, principal: f64, months: u32) -> Result<()> {
    if !(principal.is_finite() && principal > 0.0) {
        return Err(anyhow!("Principal must be positive, got {principal}"));
    }
    if months == 0 {
        return Err(anyhow!("Projection needs at least one month"));
    }

    let settings = &ledger.dataset().settings;
    let rows = profit::project(principal, settings, months);

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Month"),
        ui::header_cell("Accrued"),
        ui::header_cell(&format!("Balance ({})", settings.currency)),
    ]);
    for row in &rows {
        table.add_row(vec![
            Cell::new(row.month),
            ui::money_cell(row.accrued),
            ui::money_cell(row.balance),
        ]);
    }
    println!("{table}");

    if let Some(last) = rows.last() {
        println!(
            "{} {}",
            ui::style_text("Projected balance:", ui::StyleType::TotalLabel),
            ui::style_text(&format!("{:.2}", last.balance), ui::StyleType::TotalValue)
        );
    }
    Ok(())
}
