use crate::domain::ids::{PaymentId, PresetId, SplitRequestId};
use crate::domain::payment::{Payment, SplitStatus};
use crate::domain::ports::{PaymentStoreHandle, PresetStoreHandle, SplitRequestStoreHandle};
use crate::domain::preset::Preset;
use crate::domain::split_request::{SplitRequest, SplitRequestStatus};
use crate::error::Result;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// The explicitly constructed state container handed to the UI layer and
/// to the notification handler.
///
/// Cloning is cheap and every clone sees the same stores. Reads go straight
/// to the stores; writes must go through the [`MainQueue`].
///
/// [`MainQueue`]: crate::application::queue::MainQueue
#[derive(Clone)]
pub struct AppState {
    pub payments: PaymentStoreHandle,
    pub split_requests: SplitRequestStoreHandle,
    pub presets: PresetStoreHandle,
    notifications_authorized: Arc<AtomicBool>,
}

impl AppState {
    pub fn new(
        payments: PaymentStoreHandle,
        split_requests: SplitRequestStoreHandle,
        presets: PresetStoreHandle,
    ) -> Self {
        Self {
            payments,
            split_requests,
            presets,
            notifications_authorized: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn notifications_authorized(&self) -> bool {
        self.notifications_authorized.load(Ordering::Acquire)
    }
}

/// A single write against the state. Only the main queue applies these.
#[derive(Debug, Clone)]
pub enum Mutation {
    AddPayment(Payment),
    SetPaymentStatus { id: PaymentId, status: SplitStatus },
    AddSplitRequest(SplitRequest),
    SetSplitRequestStatus { id: SplitRequestId, status: SplitRequestStatus },
    AddPreset(Preset),
    UpdatePreset(Preset),
    RemovePreset(PresetId),
    SetNotificationsAuthorized(bool),
}

/// Published to subscribers after a mutation has changed the state.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    PaymentAdded(PaymentId),
    PaymentStatusChanged { id: PaymentId, status: SplitStatus },
    SplitRequestAdded(SplitRequestId),
    SplitRequestStatusChanged { id: SplitRequestId, status: SplitRequestStatus },
    PresetAdded(PresetId),
    PresetUpdated(PresetId),
    PresetRemoved(PresetId),
    NotificationsAuthorized(bool),
}

impl Mutation {
    pub fn kind(&self) -> &'static str {
        match self {
            Mutation::AddPayment(_) => "add_payment",
            Mutation::SetPaymentStatus { .. } => "set_payment_status",
            Mutation::AddSplitRequest(_) => "add_split_request",
            Mutation::SetSplitRequestStatus { .. } => "set_split_request_status",
            Mutation::AddPreset(_) => "add_preset",
            Mutation::UpdatePreset(_) => "update_preset",
            Mutation::RemovePreset(_) => "remove_preset",
            Mutation::SetNotificationsAuthorized(_) => "set_notifications_authorized",
        }
    }

    /// Applies the mutation. Returns `None` when the state did not change,
    /// e.g. an update aimed at an unknown id.
    pub async fn apply(self, state: &AppState) -> Result<Option<StoreEvent>> {
        let event = match self {
            Mutation::AddPayment(payment) => {
                let id = payment.id;
                state.payments.add(payment).await?;
                Some(StoreEvent::PaymentAdded(id))
            }
            Mutation::SetPaymentStatus { id, status } => state
                .payments
                .update_status(id, status)
                .await?
                .then_some(StoreEvent::PaymentStatusChanged { id, status }),
            Mutation::AddSplitRequest(request) => {
                let id = request.id;
                state.split_requests.add(request).await?;
                Some(StoreEvent::SplitRequestAdded(id))
            }
            Mutation::SetSplitRequestStatus { id, status } => state
                .split_requests
                .update_status(id, status)
                .await?
                .then_some(StoreEvent::SplitRequestStatusChanged { id, status }),
            Mutation::AddPreset(preset) => {
                let id = preset.id;
                state.presets.add(preset).await?;
                Some(StoreEvent::PresetAdded(id))
            }
            Mutation::UpdatePreset(preset) => {
                let id = preset.id;
                state
                    .presets
                    .update(preset)
                    .await?
                    .then_some(StoreEvent::PresetUpdated(id))
            }
            Mutation::RemovePreset(id) => state
                .presets
                .remove(id)
                .await?
                .then_some(StoreEvent::PresetRemoved(id)),
            Mutation::SetNotificationsAuthorized(granted) => {
                let previous = state
                    .notifications_authorized
                    .swap(granted, Ordering::AcqRel);
                (previous != granted).then_some(StoreEvent::NotificationsAuthorized(granted))
            }
        };
        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::money::Amount;
    use crate::domain::payment::PaymentCategory;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_apply_reports_changes_only() {
        let state = AppState::in_memory(Vec::new());
        let payment = Payment::new(
            "CVS Pharmacy",
            Amount::new(dec!(19.04)).unwrap(),
            PaymentCategory::Other,
        );
        let id = payment.id;

        let event = Mutation::AddPayment(payment).apply(&state).await.unwrap();
        assert_eq!(event, Some(StoreEvent::PaymentAdded(id)));

        let event = Mutation::SetPaymentStatus {
            id: PaymentId::new(),
            status: SplitStatus::Ignored,
        }
        .apply(&state)
        .await
        .unwrap();
        assert_eq!(event, None);
        assert_eq!(state.payments.all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_authorization_flag() {
        let state = AppState::in_memory(Vec::new());
        assert!(!state.notifications_authorized());

        let event = Mutation::SetNotificationsAuthorized(true)
            .apply(&state)
            .await
            .unwrap();
        assert_eq!(event, Some(StoreEvent::NotificationsAuthorized(true)));
        assert!(state.notifications_authorized());

        let again = Mutation::SetNotificationsAuthorized(true)
            .apply(&state)
            .await
            .unwrap();
        assert_eq!(again, None);
    }
}
