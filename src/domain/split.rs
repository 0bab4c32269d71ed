//! Split calculator.
//!
//! Even splits round the payer's share down to the cent and everyone
//! else's share up, so the payer never absorbs a fractional cent and
//! `your_share + other_count * other_share >= total` always holds.

use super::money::{MAX_AMOUNT, Money};
use crate::error::{BilsError, Result};
use rust_decimal::Decimal;
use std::str::FromStr;

const CENTS: Decimal = Decimal::ONE_HUNDRED;

/// Per-head result of an even split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvenSplit {
    /// What the payer keeps on their own tab.
    pub your_share: Money,
    /// What each other participant owes.
    pub other_share: Money,
}

impl EvenSplit {
    /// Sum of what the payer and all `other_count` participants cover.
    pub fn covered(&self, other_count: usize) -> Money {
        Money::new(self.your_share.value() + self.other_share.value() * Decimal::from(other_count))
    }
}

/// Splits `total` between the payer and `other_count` other people.
///
/// With no other people the payer's share is the whole total (rounded down
/// to the cent) and the other share is zero. Totals are clamped to
/// `0..=MAX_AMOUNT`.
pub fn even_split(total: Money, other_count: usize) -> EvenSplit {
    let total = total.value().clamp(Decimal::ZERO, MAX_AMOUNT);
    let heads = Decimal::from(other_count + 1);
    let your_share = floor_cent(total / heads);

    let other_share = if other_count == 0 {
        to_cents(Decimal::ZERO)
    } else {
        ceil_cent((total - your_share) / Decimal::from(other_count))
    };

    EvenSplit {
        your_share: Money::new(your_share),
        other_share: Money::new(other_share),
    }
}

fn floor_cent(value: Decimal) -> Decimal {
    to_cents((value * CENTS).floor() / CENTS)
}

fn ceil_cent(value: Decimal) -> Decimal {
    to_cents((value * CENTS).ceil() / CENTS)
}

fn to_cents(mut value: Decimal) -> Decimal {
    value.rescale(2);
    value
}

/// One included entry of a custom split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation<K> {
    pub key: K,
    pub amount: Money,
}

/// Result of parsing user-entered custom amounts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomSplit<K> {
    /// Entries with a strictly positive amount, in input order.
    pub allocations: Vec<Allocation<K>>,
    /// Sum of the included amounts.
    pub allocated: Money,
    /// `total - allocated`. Display only; may be non-zero or negative.
    pub remaining: Money,
}

impl<K> CustomSplit<K> {
    pub fn is_balanced(&self) -> bool {
        self.remaining.value().abs() < Decimal::new(1, 2)
    }
}

/// Parses each entry's amount text, dropping entries that come out as zero.
/// The total is clamped to `-MAX_AMOUNT..=MAX_AMOUNT`.
pub fn custom_split<K, S, I>(total: Money, entries: I) -> CustomSplit<K>
where
    S: AsRef<str>,
    I: IntoIterator<Item = (K, S)>,
{
    let allocations: Vec<Allocation<K>> = entries
        .into_iter()
        .filter_map(|(key, text)| {
            let amount = parse_amount(text.as_ref());
            (amount > Decimal::ZERO).then(|| Allocation {
                key,
                amount: Money::new(amount),
            })
        })
        .collect();

    let allocated: Money = allocations.iter().map(|a| a.amount).sum();
    let total = Money::new(total.value().clamp(-MAX_AMOUNT, MAX_AMOUNT));
    CustomSplit {
        allocations,
        allocated,
        remaining: total - allocated,
    }
}

/// Strict parse of an amount field. Accepts surrounding whitespace and an
/// optional leading `$`; rejects negatives and anything above
/// [`MAX_AMOUNT`].
pub fn try_parse_amount(text: &str) -> Result<Decimal> {
    let trimmed = text.trim();
    let digits = trimmed.strip_prefix('$').unwrap_or(trimmed).trim();
    match Decimal::from_str(digits) {
        Ok(value) if value >= Decimal::ZERO && value <= MAX_AMOUNT => Ok(value),
        _ => Err(BilsError::InvalidNumericInput(text.to_string())),
    }
}

/// Lenient parse used by the custom split form: anything malformed is zero.
pub fn parse_amount(text: &str) -> Decimal {
    try_parse_amount(text).unwrap_or_else(|e| {
        if !text.trim().is_empty() {
            tracing::debug!(error = %e, "treating amount as zero");
        }
        Decimal::ZERO
    })
}
