use super::ids::{ParticipantId, PaymentId, PresetId, SplitRequestId};
use super::money::Money;
use super::preset::Preset;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SplitRequestStatus {
    #[default]
    Unresolved,
    Resolved,
    Canceled,
}

impl SplitRequestStatus {
    pub fn is_terminal(&self) -> bool {
        *self != SplitRequestStatus::Unresolved
    }

    /// Allowed edges of the request lifecycle. Setting the current status
    /// again is allowed, which makes "mark resolved" idempotent.
    pub fn can_transition_to(&self, next: SplitRequestStatus) -> bool {
        *self == next || *self == SplitRequestStatus::Unresolved
    }

    pub fn label(&self) -> &'static str {
        match self {
            SplitRequestStatus::Unresolved => "Unresolved",
            SplitRequestStatus::Resolved => "Resolved",
            SplitRequestStatus::Canceled => "Canceled",
        }
    }
}

impl fmt::Display for SplitRequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantStatus {
    #[default]
    Requested,
    Paid,
}

/// Who owes whom.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SplitDirection {
    /// I paid; the participants owe me.
    Outgoing,
    /// Someone else paid; I owe them.
    Incoming,
}

impl fmt::Display for SplitDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SplitDirection::Outgoing => f.write_str("outgoing"),
            SplitDirection::Incoming => f.write_str("incoming"),
        }
    }
}

/// One person's share of a split request.
///
/// Holds a snapshot of the preset's name so later edits or deletion of the
/// preset do not change what the request shows.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct SplitParticipant {
    pub id: ParticipantId,
    pub preset_id: PresetId,
    pub name_snapshot: String,
    pub amount_owed: Money,
    pub status: ParticipantStatus,
}

impl SplitParticipant {
    pub fn from_preset(preset: &Preset, amount_owed: Money) -> Self {
        Self {
            id: ParticipantId::new(),
            preset_id: preset.id,
            name_snapshot: preset.name.clone(),
            amount_owed,
            status: ParticipantStatus::Requested,
        }
    }
}

/// The record of a bill split.
///
/// Participant amounts do not have to add up to `total_amount`; custom
/// splits may leave a remainder, reported by [`SplitRequest::remaining`].
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct SplitRequest {
    pub id: SplitRequestId,
    pub payment_id: PaymentId,
    pub merchant: String,
    pub total_amount: Money,
    pub created_at: DateTime<Utc>,
    pub direction: SplitDirection,
    pub note: String,
    pub participants: Vec<SplitParticipant>,
    pub status: SplitRequestStatus,
}

impl SplitRequest {
    pub fn new(
        payment_id: PaymentId,
        merchant: impl Into<String>,
        total_amount: Money,
        direction: SplitDirection,
        participants: Vec<SplitParticipant>,
    ) -> Self {
        Self {
            id: SplitRequestId::new(),
            payment_id,
            merchant: merchant.into(),
            total_amount,
            created_at: Utc::now(),
            direction,
            note: String::new(),
            participants,
            status: SplitRequestStatus::Unresolved,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    /// Applies a lifecycle transition. Returns `false` if the edge is not
    /// allowed; the status is left as is.
    pub fn apply_status(&mut self, status: SplitRequestStatus) -> bool {
        if self.status.can_transition_to(status) {
            self.status = status;
            true
        } else {
            false
        }
    }

    pub fn owed_total(&self) -> Money {
        self.participants.iter().map(|p| p.amount_owed).sum()
    }

    pub fn remaining(&self) -> Money {
        self.total_amount - self.owed_total()
    }

    pub fn is_balanced(&self) -> bool {
        self.remaining().value().abs() < Decimal::new(1, 2)
    }

    pub fn primary_name(&self) -> &str {
        self.participants
            .first()
            .map(|p| p.name_snapshot.as_str())
            .unwrap_or("Split")
    }

    pub fn initials(&self) -> String {
        self.participants
            .first()
            .and_then(|p| p.name_snapshot.chars().next())
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_else(|| "?".to_string())
    }

    pub fn title(&self) -> String {
        match self.direction {
            SplitDirection::Incoming => format!(
                "From {}",
                self.participants
                    .first()
                    .map(|p| p.name_snapshot.as_str())
                    .unwrap_or("Friend")
            ),
            SplitDirection::Outgoing => format!("To {} people", self.participants.len()),
        }
    }
}

/// Tabs of the split history screen.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum HistoryFilter {
    #[default]
    Unresolved,
    Resolved,
}

impl HistoryFilter {
    pub fn matches(&self, request: &SplitRequest) -> bool {
        match self {
            HistoryFilter::Unresolved => request.status == SplitRequestStatus::Unresolved,
            HistoryFilter::Resolved => request.status == SplitRequestStatus::Resolved,
        }
    }
}
