use super::{resolve_id, short_id, ui};
use crate::core::ledger::Ledger;
use crate::core::model::{Card, CardStatus, CardTier};
use anyhow::Result;
use chrono::NaiveDate;
use comfy_table::Cell;
use rand::Rng;

fn status_label(status: CardStatus) -> &'static str {
    match status {
        CardStatus::Active => "active",
        CardStatus::Blocked => "blocked",
        CardStatus::Expired => "expired",
    }
}

fn print_card(card: &Card) {
    println!(
        "\n{}  {}",
        ui::style_text(&card.formatted_number(), ui::StyleType::Title),
        ui::style_text(&card.tier.to_string(), ui::StyleType::TotalLabel)
    );
    println!("Expires {}  CVV {}", card.expiry_display(), card.cvv);
    println!(
        "{}",
        ui::style_text(&format!("card id {}", card.id), ui::StyleType::Subtle)
    );
}

pub fn issue<R: Rng>(
    ledger: &mut Ledger,
    investor: &str,
    tier: Option<CardTier>,
    today: NaiveDate,
    rng: &mut R,
) -> Result<()> {
    let id = ledger.find_investor(investor)?.id.clone();
    let card = ledger.issue_card(&id, tier, today, rng)?;
    print_card(&card);
    Ok(())
}

/// Lists every card of an investor, followed by the active card's transactions.
pub fn show(ledger: &Ledger, investor: &str) -> Result<()> {
    let investor = ledger.find_investor(investor)?;
    let cards = ledger.cards_for(&investor.id);
    if cards.is_empty() {
        println!("{} has no cards.", investor.name);
        return Ok(());
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Card"),
        ui::header_cell("Number"),
        ui::header_cell("Tier"),
        ui::header_cell("Issued"),
        ui::header_cell("Expires"),
        ui::header_cell("Status"),
    ]);
    for card in cards {
        table.add_row(vec![
            Cell::new(short_id(&card.id)),
            Cell::new(card.masked_number()),
            Cell::new(card.tier),
            Cell::new(card.issued_on),
            Cell::new(card.expiry_display()),
            ui::status_cell(status_label(card.status), card.is_active()),
        ]);
    }
    println!("{table}");

    let Some(active) = cards.iter().find(|c| c.is_active()) else {
        return Ok(());
    };
    if active.transactions.is_empty() {
        println!("No transactions on the active card yet.");
        return Ok(());
    }

    let mut transactions = ui::new_styled_table();
    transactions.set_header(vec![
        ui::header_cell("Date"),
        ui::header_cell("Type"),
        ui::header_cell("Amount"),
        ui::header_cell("Description"),
    ]);
    for tx in &active.transactions {
        transactions.add_row(vec![
            Cell::new(tx.date),
            Cell::new(tx.kind),
            ui::money_cell(tx.amount),
            Cell::new(&tx.description),
        ]);
    }
    println!("{transactions}");
    Ok(())
}

pub fn block(ledger: &mut Ledger, card: &str) -> Result<()> {
    let id = resolve_id(
        ledger.dataset().investor_cards.all().map(|c| c.id.as_str()),
        card,
        "card",
    )?;
    ledger.block_card(&id)?;
    println!("Blocked card {}", short_id(&id));
    Ok(())
}

pub fn replace<R: Rng>(
    ledger: &mut Ledger,
    investor: &str,
    today: NaiveDate,
    rng: &mut R,
) -> Result<()> {
    let id = ledger.find_investor(investor)?.id.clone();
    let card = ledger.replace_card(&id, today, rng)?;
    println!("Previous card blocked, replacement issued:");
    print_card(&card);
    Ok(())
}
