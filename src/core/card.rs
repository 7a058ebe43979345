//! Registry of synthetic investor cards.
//!
//! Card numbers and CVVs come from a non-cryptographic RNG and are purely
//! cosmetic. The registry does enforce that an investor holds at most one
//! active card.
use crate::core::error::{LedgerError, Result};
use crate::core::model::{Card, CardStatus, CardTier, CardTransaction, new_id};
use chrono::{Months, NaiveDate};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Leading digit of every generated card number.
pub const CARD_PREFIX: char = '4';
pub const CARD_NUMBER_LEN: usize = 16;
pub const CARD_VALIDITY_MONTHS: u32 = 36;

/// Luhn check digit for `payload`, a string of ASCII digits.
pub fn luhn_check_digit(payload: &str) -> u32 {
    let sum: u32 = payload
        .chars()
        .rev()
        .filter_map(|c| c.to_digit(10))
        .enumerate()
        .map(|(i, d)| {
            if i % 2 == 0 {
                let doubled = d * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                d
            }
        })
        .sum();
    (10 - sum % 10) % 10
}

pub fn is_luhn_valid(number: &str) -> bool {
    if number.len() < 2 || !number.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    let (payload, check) = number.split_at(number.len() - 1);
    check.chars().next().and_then(|c| c.to_digit(10)) == Some(luhn_check_digit(payload))
}

/// A 16 digit number starting with [`CARD_PREFIX`] and ending in a Luhn check digit.
pub fn generate_card_number<R: Rng>(rng: &mut R) -> String {
    let mut number = String::with_capacity(CARD_NUMBER_LEN);
    number.push(CARD_PREFIX);
    while number.len() < CARD_NUMBER_LEN - 1 {
        let digit = rng.gen_range(0..10u32);
        number.push(char::from_digit(digit, 10).unwrap_or('0'));
    }
    let check = luhn_check_digit(&number);
    number.push(char::from_digit(check, 10).unwrap_or('0'));
    number
}

pub fn generate_cvv<R: Rng>(rng: &mut R) -> String {
    format!("{:03}", rng.gen_range(0..1000u32))
}

pub fn expiry_for(issued_on: NaiveDate) -> NaiveDate {
    issued_on
        .checked_add_months(Months::new(CARD_VALIDITY_MONTHS))
        .unwrap_or(issued_on)
}

/// Cards keyed by investor id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardRegistry {
    cards: BTreeMap<String, Vec<Card>>,
}

impl CardRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.values().all(|cards| cards.is_empty())
    }

    pub fn cards(&self, investor_id: &str) -> &[Card] {
        self.cards
            .get(investor_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn all(&self) -> impl Iterator<Item = &Card> {
        self.cards.values().flatten()
    }

    pub fn active_card(&self, investor_id: &str) -> Option<&Card> {
        self.cards(investor_id).iter().find(|card| card.is_active())
    }

    fn active_card_mut(&mut self, investor_id: &str) -> Option<&mut Card> {
        self.cards
            .get_mut(investor_id)
            .and_then(|cards| cards.iter_mut().find(|card| card.is_active()))
    }

    fn card_mut(&mut self, card_id: &str) -> Option<&mut Card> {
        self.cards
            .values_mut()
            .flatten()
            .find(|card| card.id == card_id)
    }

    pub fn contains_number(&self, number: &str) -> bool {
        self.all().any(|card| card.card_number == number)
    }

    fn unique_number<R: Rng>(&self, rng: &mut R) -> String {
        loop {
            let number = generate_card_number(rng);
            if !self.contains_number(&number) {
                return number;
            }
            debug!("Generated card number collided, retrying");
        }
    }

    /// Issues a new active card for `investor_id`.
    pub fn issue<R: Rng>(
        &mut self,
        investor_id: &str,
        tier: CardTier,
        today: NaiveDate,
        rng: &mut R,
    ) -> Result<Card> {
        if self.active_card(investor_id).is_some() {
            return Err(LedgerError::ActiveCardExists(investor_id.to_string()));
        }

        let card = Card {
            id: new_id(),
            investor_id: investor_id.to_string(),
            card_number: self.unique_number(rng),
            cvv: generate_cvv(rng),
            expiry_date: expiry_for(today),
            tier,
            status: CardStatus::Active,
            issued_on: today,
            transactions: Vec::new(),
        };
        info!(investor = investor_id, card = %card.masked_number(), "Issued {tier} card");
        self.cards
            .entry(investor_id.to_string())
            .or_default()
            .push(card.clone());
        Ok(card)
    }

    pub fn block(&mut self, card_id: &str) -> Result<()> {
        let card = self
            .card_mut(card_id)
            .ok_or_else(|| LedgerError::CardNotFound(card_id.to_string()))?;
        card.status = CardStatus::Blocked;
        info!(card = card_id, "Blocked card");
        Ok(())
    }

    /// Blocks the active card and issues a fresh one with the same tier.
    pub fn replace<R: Rng>(
        &mut self,
        investor_id: &str,
        today: NaiveDate,
        rng: &mut R,
    ) -> Result<Card> {
        let current = self
            .active_card_mut(investor_id)
            .ok_or_else(|| LedgerError::NoActiveCard(investor_id.to_string()))?;
        current.status = CardStatus::Blocked;
        let tier = current.tier;
        self.issue(investor_id, tier, today, rng)
    }

    /// Marks active cards past their expiry date as expired.
    pub fn expire_due(&mut self, today: NaiveDate) -> usize {
        let mut expired = 0;
        for card in self.cards.values_mut().flatten() {
            if card.is_active() && card.expiry_date < today {
                card.status = CardStatus::Expired;
                expired += 1;
            }
        }
        if expired > 0 {
            debug!("Expired {expired} cards");
        }
        expired
    }

    pub fn record_transaction(&mut self, investor_id: &str, tx: CardTransaction) -> Result<()> {
        let card = self
            .active_card_mut(investor_id)
            .ok_or_else(|| LedgerError::NoActiveCard(investor_id.to_string()))?;
        card.transactions.push(tx);
        Ok(())
    }

    pub(crate) fn remove_investor(&mut self, investor_id: &str) {
        self.cards.remove(investor_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::OperationType;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 15).unwrap()
    }

    #[test]
    fn test_card_numbers_are_16_digits_with_fixed_prefix() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let number = generate_card_number(&mut rng);
            assert_eq!(number.len(), CARD_NUMBER_LEN);
            assert!(number.chars().all(|c| c.is_ascii_digit()));
            assert!(number.starts_with(CARD_PREFIX));
            assert!(is_luhn_valid(&number), "{number} fails the Luhn check");
        }
    }

    #[test]
    fn test_luhn() {
        assert_eq!(luhn_check_digit("411111111111111"), 1);
        assert!(is_luhn_valid("4111111111111111"));
        assert!(!is_luhn_valid("4111111111111112"));
        assert!(!is_luhn_valid("41x1"));
    }

    #[test]
    fn test_cvv_and_expiry() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..100 {
            let cvv = generate_cvv(&mut rng);
            assert_eq!(cvv.len(), 3);
            assert!(cvv.chars().all(|c| c.is_ascii_digit()));
        }
        assert_eq!(
            expiry_for(today()),
            NaiveDate::from_ymd_opt(2029, 3, 15).unwrap()
        );
    }

    #[test]
    fn test_single_active_card_per_investor() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut registry = CardRegistry::new();

        let card = registry
            .issue("inv-1", CardTier::Gold, today(), &mut rng)
            .unwrap();
        assert_eq!(registry.active_card("inv-1").unwrap().id, card.id);

        let err = registry
            .issue("inv-1", CardTier::Standard, today(), &mut rng)
            .unwrap_err();
        assert_eq!(err, LedgerError::ActiveCardExists("inv-1".to_string()));

        registry.block(&card.id).unwrap();
        assert!(registry.active_card("inv-1").is_none());
        registry
            .issue("inv-1", CardTier::Standard, today(), &mut rng)
            .unwrap();
        assert_eq!(registry.cards("inv-1").len(), 2);
    }

    #[test]
    fn test_replace_keeps_tier() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut registry = CardRegistry::new();
        let first = registry
            .issue("inv-1", CardTier::Platinum, today(), &mut rng)
            .unwrap();

        let second = registry.replace("inv-1", today(), &mut rng).unwrap();
        assert_ne!(first.card_number, second.card_number);
        assert_eq!(second.tier, CardTier::Platinum);
        assert_eq!(registry.cards("inv-1")[0].status, CardStatus::Blocked);
        assert_eq!(
            registry.replace("inv-2", today(), &mut rng).unwrap_err(),
            LedgerError::NoActiveCard("inv-2".to_string())
        );
    }

    #[test]
    fn test_expire_and_transactions() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut registry = CardRegistry::new();
        registry
            .issue("inv-1", CardTier::Standard, today(), &mut rng)
            .unwrap();

        let tx = CardTransaction {
            id: "t1".to_string(),
            kind: OperationType::Investment,
            amount: 500.0,
            date: today(),
            operation_id: None,
            description: "Deposit".to_string(),
        };
        registry.record_transaction("inv-1", tx.clone()).unwrap();
        assert_eq!(registry.active_card("inv-1").unwrap().transactions, vec![tx.clone()]);

        assert_eq!(registry.expire_due(today()), 0);
        let later = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();
        assert_eq!(registry.expire_due(later), 1);
        assert!(registry.record_transaction("inv-1", tx).is_err());
    }

    #[test]
    fn test_registry_serializes_as_plain_map() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut registry = CardRegistry::new();
        registry
            .issue("inv-1", CardTier::Gold, today(), &mut rng)
            .unwrap();

        let value = serde_json::to_value(&registry).unwrap();
        assert_eq!(value["inv-1"][0]["tier"], "gold");
        assert_eq!(value["inv-1"][0]["cardNumber"].as_str().unwrap().len(), 16);
    }
}
