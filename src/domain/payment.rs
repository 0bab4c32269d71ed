use super::ids::PaymentId;
use super::money::Amount;
use chrono::{DateTime, Duration, Utc};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PaymentCategory {
    #[default]
    Restaurant,
    Groceries,
    Utilities,
    Entertainment,
    Other,
}

impl PaymentCategory {
    pub fn label(&self) -> &'static str {
        match self {
            PaymentCategory::Restaurant => "Restaurant",
            PaymentCategory::Groceries => "Groceries",
            PaymentCategory::Utilities => "Utilities",
            PaymentCategory::Entertainment => "Entertainment",
            PaymentCategory::Other => "Other",
        }
    }
}

impl fmt::Display for PaymentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How the user disposed of a payment's split prompt.
///
/// `Pending` is the only non-terminal state; every other state is reached
/// exactly once and never left.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum SplitStatus {
    #[default]
    Pending,
    SplitEvenly,
    CustomSplit,
    Ignored,
}

impl SplitStatus {
    pub fn label(&self) -> &'static str {
        match self {
            SplitStatus::Pending => "Pending",
            SplitStatus::SplitEvenly => "Split Evenly",
            SplitStatus::CustomSplit => "Custom Split",
            SplitStatus::Ignored => "Ignored",
        }
    }

    pub fn is_terminal(&self) -> bool {
        *self != SplitStatus::Pending
    }

    pub fn can_transition_to(&self, next: SplitStatus) -> bool {
        *self == SplitStatus::Pending && next.is_terminal()
    }
}

impl fmt::Display for SplitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A logged expenditure awaiting, or having, a split disposition.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Payment {
    pub id: PaymentId,
    pub merchant: String,
    pub amount: Amount,
    pub date: DateTime<Utc>,
    pub category: PaymentCategory,
    pub split_status: SplitStatus,
}

impl Payment {
    pub fn new(merchant: impl Into<String>, amount: Amount, category: PaymentCategory) -> Self {
        Self {
            id: PaymentId::new(),
            merchant: merchant.into(),
            amount,
            date: Utc::now(),
            category,
            split_status: SplitStatus::Pending,
        }
    }

    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = date;
        self
    }

    /// Moves the payment out of `Pending`. Returns `false` and leaves the
    /// status untouched if the transition is not allowed.
    pub fn apply_split_status(&mut self, status: SplitStatus) -> bool {
        if self.split_status.can_transition_to(status) {
            self.split_status = status;
            true
        } else {
            false
        }
    }
}

/// Sample history used to populate an empty home screen, newest first.
pub fn demo_payments(now: DateTime<Utc>) -> Vec<Payment> {
    let seeds = [
        ("Raising Cane's Chicken Fingers", dec!(21.76), PaymentCategory::Restaurant, Duration::hours(14)),
        ("Blue Bottle Coffee", dec!(8.44), PaymentCategory::Restaurant, Duration::days(1)),
        ("Metropolitan Transportation", dec!(3.00), PaymentCategory::Utilities, Duration::days(2)),
        ("Mojo East", dec!(61.70), PaymentCategory::Restaurant, Duration::days(3)),
        ("Metropolitan Transportation", dec!(3.00), PaymentCategory::Utilities, Duration::days(4)),
        ("CVS Pharmacy", dec!(19.04), PaymentCategory::Other, Duration::days(7)),
        ("Metropolitan Transportation", dec!(3.00), PaymentCategory::Utilities, Duration::days(7)),
        ("Blue Bottle Coffee", dec!(8.44), PaymentCategory::Restaurant, Duration::days(9)),
    ];

    seeds
        .into_iter()
        .filter_map(|(merchant, amount, category, ago)| {
            let amount = Amount::new(amount).ok()?;
            Some(Payment::new(merchant, amount, category).with_date(now - ago))
        })
        .collect()
}
