use super::feed::{ChangeFeed, Subscription};
use super::queue::{MainQueue, MainQueueSender};
use super::state::{AppState, Mutation, StoreEvent};
use crate::config::AppConfig;
use crate::domain::destination::Destination;
use crate::domain::ids::{PaymentId, PresetId, SplitRequestId};
use crate::domain::money::{Amount, Money};
use crate::domain::notification::{
    CategoryTag, NotificationActionKind, NotificationCategory, NotificationEvent,
    NotificationRequest,
};
use crate::domain::payment::{Payment, PaymentCategory, SplitStatus, demo_payments};
use crate::domain::ports::SchedulerHandle;
use crate::domain::preset::{Preset, default_presets};
use crate::domain::split::{EvenSplit, custom_split, even_split};
use crate::domain::split_request::{
    HistoryFilter, SplitDirection, SplitParticipant, SplitRequest, SplitRequestStatus,
};
use crate::error::{BilsError, Result};
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::HashSet;

/// What the UI should do after a notification action has been handled.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    /// A one-tap split went out; show `message` as a toast.
    QuickSplitSent {
        request: SplitRequest,
        message: String,
    },
    Navigate(Destination),
    /// The user chose not to split this payment.
    Dismissed(PaymentId),
    NoOp,
}

/// A split request someone else sent us.
#[derive(Debug, Clone)]
pub struct IncomingRequest {
    pub from: PresetId,
    pub merchant: String,
    pub total: Decimal,
    pub amount_owed: Decimal,
    pub note: String,
}

/// The main entry point for split actions.
///
/// `SplitEngine` owns the state container, the notification scheduler and
/// the main queue. Reads go straight to the stores; every write is sent
/// through the queue and awaited, so callers observe their own writes.
pub struct SplitEngine {
    state: AppState,
    feed: ChangeFeed,
    queue: MainQueue,
    scheduler: SchedulerHandle,
    config: AppConfig,
}

impl SplitEngine {
    /// Creates the engine and spawns its main queue on the current runtime.
    pub fn new(state: AppState, scheduler: SchedulerHandle, config: AppConfig) -> Self {
        let feed = ChangeFeed::new();
        let queue = MainQueue::spawn(state.clone(), feed.clone());
        Self {
            state,
            feed,
            queue,
            scheduler,
            config,
        }
    }

    /// Engine over fresh in-memory stores, seeded with the default
    /// contacts unless the config says otherwise.
    pub fn in_memory(scheduler: SchedulerHandle, config: AppConfig) -> Self {
        let presets = if config.seed_presets {
            default_presets()
        } else {
            Vec::new()
        };
        Self::new(AppState::in_memory(presets), scheduler, config)
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn queue_sender(&self) -> MainQueueSender {
        self.queue.sender()
    }

    #[must_use = "dropping the subscription unsubscribes the listener"]
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&StoreEvent) + Send + Sync + 'static,
    {
        self.feed.subscribe(listener)
    }

    /// Drains the main queue and stops it.
    pub async fn shutdown(self) -> Result<()> {
        self.queue.shutdown().await
    }

    // Lookups

    pub async fn payment(&self, id: PaymentId) -> Result<Payment> {
        self.state
            .payments
            .get(id)
            .await?
            .ok_or_else(|| BilsError::not_found("Payment", id))
    }

    pub async fn split_request(&self, id: SplitRequestId) -> Result<SplitRequest> {
        self.state
            .split_requests
            .get(id)
            .await?
            .ok_or_else(|| BilsError::not_found("Request", id))
    }

    pub async fn payments(&self) -> Result<Vec<Payment>> {
        self.state.payments.all().await
    }

    pub async fn split_requests(&self) -> Result<Vec<SplitRequest>> {
        self.state.split_requests.all().await
    }

    pub async fn presets(&self) -> Result<Vec<Preset>> {
        self.state.presets.all().await
    }

    pub async fn history(&self, filter: HistoryFilter) -> Result<Vec<SplitRequest>> {
        let requests = self.state.split_requests.all().await?;
        Ok(requests.into_iter().filter(|r| filter.matches(r)).collect())
    }

    /// Requests created from `payment_id`, newest first.
    pub async fn requests_for_payment(&self, payment_id: PaymentId) -> Result<Vec<SplitRequest>> {
        let requests = self.state.split_requests.all().await?;
        Ok(requests
            .into_iter()
            .filter(|r| r.payment_id == payment_id)
            .collect())
    }

    // Presets

    pub async fn add_preset(&self, name: &str, phone: &str) -> Result<Preset> {
        let name = preset_name(name)?;
        let preset = Preset::new(name, phone.trim());
        self.queue.commit(Mutation::AddPreset(preset.clone())).await?;
        tracing::info!(preset_id = %preset.id, name = %preset.name, "preset added");
        Ok(preset)
    }

    /// Existing split participants keep the name they were created with.
    pub async fn rename_preset(&self, id: PresetId, name: &str, phone: &str) -> Result<Preset> {
        let name = preset_name(name)?;
        let mut preset = self
            .state
            .presets
            .get(id)
            .await?
            .ok_or_else(|| BilsError::not_found("Preset", id))?;
        preset.name = name.to_string();
        preset.phone = phone.trim().to_string();
        self.queue.commit(Mutation::UpdatePreset(preset.clone())).await?;
        Ok(preset)
    }

    pub async fn remove_preset(&self, id: PresetId) -> Result<bool> {
        let event = self.queue.commit(Mutation::RemovePreset(id)).await?;
        Ok(event.is_some())
    }

    // Notifications

    pub async fn request_notification_permission(&self) -> Result<bool> {
        let granted = self.scheduler.request_authorization().await?;
        self.queue
            .commit(Mutation::SetNotificationsAuthorized(granted))
            .await?;
        tracing::info!(granted, "notification permission answered");
        Ok(granted)
    }

    /// Registers the notification categories, replacing any earlier
    /// registration so quick-split buttons match the current presets.
    pub async fn register_categories(&self) -> Result<()> {
        let presets = self.state.presets.all().await?;
        self.scheduler
            .register_categories(vec![
                NotificationCategory::payment_split(&presets, self.config.quick_split_presets),
                NotificationCategory::incoming_request(),
                NotificationCategory::generic(),
            ])
            .await
    }

    async fn notify(&self, request: NotificationRequest) {
        if let Err(e) = self.scheduler.schedule(request).await {
            tracing::warn!(error = %e, "failed to schedule notification");
        }
    }

    // Payments

    /// Logs a payment from the "I paid" form and schedules the split prompt.
    pub async fn log_payment(
        &self,
        merchant: &str,
        amount: Decimal,
        category: PaymentCategory,
    ) -> Result<Payment> {
        let merchant = merchant.trim();
        if merchant.is_empty() {
            return Err(BilsError::Validation(
                "Merchant must not be empty".to_string(),
            ));
        }
        let payment = Payment::new(merchant, Amount::new(amount)?, category);
        self.queue.commit(Mutation::AddPayment(payment.clone())).await?;
        tracing::info!(
            payment_id = %payment.id,
            merchant = %payment.merchant,
            amount = %payment.amount,
            "payment logged"
        );

        if let Err(e) = self.register_categories().await {
            tracing::warn!(error = %e, "failed to register notification categories");
        }
        self.notify(NotificationRequest {
            title: "Split this bill?".to_string(),
            body: format!(
                "You paid {} at {}. Want to split it?",
                payment.amount, payment.merchant
            ),
            delay: self.config.payment_prompt_delay(),
            category: CategoryTag::PaymentSplit,
            correlation_id: Some(payment.id.as_uuid()),
        })
        .await;

        Ok(payment)
    }

    /// Fills an empty payment list with the demo history. Returns how many
    /// payments were added. No prompts are scheduled for them.
    pub async fn seed_demo_payments(&self) -> Result<usize> {
        if !self.state.payments.all().await?.is_empty() {
            return Ok(0);
        }
        let seeds = demo_payments(Utc::now());
        let count = seeds.len();
        // Oldest first so the newest ends up at the head.
        for payment in seeds.into_iter().rev() {
            self.queue.commit(Mutation::AddPayment(payment)).await?;
        }
        tracing::debug!(count, "seeded demo payments");
        Ok(count)
    }

    pub async fn preview_even_split(&self, payment_id: PaymentId, other_count: usize) -> Result<EvenSplit> {
        let payment = self.payment(payment_id).await?;
        Ok(even_split(payment.amount.into(), other_count))
    }

    async fn selected_presets(&self, ids: &[PresetId]) -> Result<Vec<Preset>> {
        let presets = self.state.presets.all().await?;
        for id in ids {
            if !presets.iter().any(|p| p.id == *id) {
                return Err(BilsError::not_found("Preset", id));
            }
        }
        Ok(presets.into_iter().filter(|p| ids.contains(&p.id)).collect())
    }

    /// Splits the payment evenly between the payer and the selected presets.
    /// Each preset owes the rounded-up share.
    pub async fn split_evenly(
        &self,
        payment_id: PaymentId,
        preset_ids: &[PresetId],
        note: &str,
    ) -> Result<SplitRequest> {
        let payment = self.payment(payment_id).await?;
        let people = self.selected_presets(preset_ids).await?;
        if people.is_empty() {
            return Err(BilsError::Validation(
                "Select at least one person to split with".to_string(),
            ));
        }

        let split = even_split(payment.amount.into(), people.len());
        let participants = people
            .iter()
            .map(|p| SplitParticipant::from_preset(p, split.other_share))
            .collect();
        self.send_split(&payment, SplitStatus::SplitEvenly, participants, note)
            .await
    }

    /// Splits the payment by user-entered amounts. Entries that do not
    /// parse to a positive amount are left out; the rest need not add up to
    /// the total. Each preset may appear only once.
    pub async fn split_custom(
        &self,
        payment_id: PaymentId,
        entries: &[(PresetId, String)],
        note: &str,
    ) -> Result<SplitRequest> {
        let payment = self.payment(payment_id).await?;
        let ids: Vec<PresetId> = entries.iter().map(|(id, _)| *id).collect();
        let mut seen = HashSet::new();
        if let Some(dup) = ids.iter().find(|id| !seen.insert(**id)) {
            return Err(BilsError::Validation(format!(
                "Preset {dup} appears more than once"
            )));
        }
        let people = self.selected_presets(&ids).await?;

        let split = custom_split(
            payment.amount.into(),
            entries.iter().map(|(id, text)| (*id, text.as_str())),
        );
        let participants: Vec<SplitParticipant> = people
            .iter()
            .filter_map(|preset| {
                split
                    .allocations
                    .iter()
                    .find(|a| a.key == preset.id)
                    .map(|a| SplitParticipant::from_preset(preset, a.amount))
            })
            .collect();

        if participants.is_empty() {
            return Err(BilsError::Validation(
                "Enter an amount for at least one person".to_string(),
            ));
        }
        if !split.is_balanced() {
            tracing::info!(
                payment_id = %payment.id,
                remaining = %split.remaining,
                "custom split does not cover the total"
            );
        }
        self.send_split(&payment, SplitStatus::CustomSplit, participants, note)
            .await
    }

    async fn send_split(
        &self,
        payment: &Payment,
        status: SplitStatus,
        participants: Vec<SplitParticipant>,
        note: &str,
    ) -> Result<SplitRequest> {
        if payment.split_status.is_terminal() {
            tracing::warn!(
                payment_id = %payment.id,
                current = %payment.split_status,
                "payment already has a disposition; keeping it"
            );
        }
        self.queue.enqueue(Mutation::SetPaymentStatus {
            id: payment.id,
            status,
        })?;

        let request = SplitRequest::new(
            payment.id,
            payment.merchant.clone(),
            Money::from(payment.amount),
            SplitDirection::Outgoing,
            participants,
        )
        .with_note(note.trim());
        self.queue
            .commit(Mutation::AddSplitRequest(request.clone()))
            .await?;

        tracing::info!(
            request_id = %request.id,
            payment_id = %payment.id,
            people = request.participants.len(),
            owed = %request.owed_total(),
            "split request sent"
        );
        Ok(request)
    }

    pub async fn dont_split(&self, payment_id: PaymentId) -> Result<()> {
        let payment = self.payment(payment_id).await?;
        let changed = self
            .queue
            .commit(Mutation::SetPaymentStatus {
                id: payment.id,
                status: SplitStatus::Ignored,
            })
            .await?;
        if changed.is_none() {
            tracing::warn!(payment_id = %payment.id, current = %payment.split_status, "payment not ignored");
        }
        Ok(())
    }

    // Split requests

    pub async fn receive_incoming_request(&self, incoming: IncomingRequest) -> Result<SplitRequest> {
        let preset = self
            .state
            .presets
            .get(incoming.from)
            .await?
            .ok_or_else(|| BilsError::not_found("Preset", incoming.from))?;
        let total = Amount::new(incoming.total)?;
        let owed = Amount::new(incoming.amount_owed)?;

        // The originating payment lives on the sender's device.
        let request = SplitRequest::new(
            PaymentId::new(),
            incoming.merchant.trim(),
            total.into(),
            SplitDirection::Incoming,
            vec![SplitParticipant::from_preset(&preset, owed.into())],
        )
        .with_note(incoming.note.trim());
        self.queue
            .commit(Mutation::AddSplitRequest(request.clone()))
            .await?;
        tracing::info!(request_id = %request.id, from = %preset.name, "incoming split request");

        self.notify(NotificationRequest {
            title: format!("{} requested {}", preset.name, owed),
            body: format!("For {}. Tap to view.", request.merchant),
            delay: self.config.incoming_prompt_delay(),
            category: CategoryTag::IncomingRequest,
            correlation_id: Some(request.id.as_uuid()),
        })
        .await;
        Ok(request)
    }

    /// Marks the request resolved. Calling it again is harmless.
    pub async fn mark_resolved(&self, id: SplitRequestId) -> Result<()> {
        let request = self.split_request(id).await?;
        let event = self
            .queue
            .commit(Mutation::SetSplitRequestStatus {
                id: request.id,
                status: SplitRequestStatus::Resolved,
            })
            .await?;
        if event.is_some() {
            tracing::info!(request_id = %id, "split request resolved");
        } else if request.status != SplitRequestStatus::Resolved {
            tracing::warn!(request_id = %id, current = %request.status, "cannot resolve request");
        }
        Ok(())
    }

    /// Schedules a reminder for an unresolved request. The request itself
    /// does not change. Returns whether a reminder was scheduled.
    pub async fn send_reminder(&self, id: SplitRequestId) -> Result<bool> {
        let request = self.split_request(id).await?;
        if request.status != SplitRequestStatus::Unresolved {
            tracing::debug!(request_id = %id, status = %request.status, "no reminder for closed request");
            return Ok(false);
        }
        let who = request
            .participants
            .first()
            .map(|p| p.name_snapshot.as_str())
            .unwrap_or("a friend");
        self.notify(NotificationRequest {
            title: "Reminder sent".to_string(),
            body: format!("You reminded {who}."),
            delay: self.config.reminder_delay(),
            category: CategoryTag::Generic,
            correlation_id: Some(request.id.as_uuid()),
        })
        .await;
        Ok(true)
    }

    /// Reminds everyone with an unresolved request. Returns how many
    /// requests were open.
    pub async fn remind_all(&self) -> Result<usize> {
        let open = self.history(HistoryFilter::Unresolved).await?.len();
        if open > 0 {
            self.notify(NotificationRequest {
                title: "Reminders sent".to_string(),
                body: "You reminded everyone about their split.".to_string(),
                delay: self.config.reminder_delay(),
                category: CategoryTag::Generic,
                correlation_id: None,
            })
            .await;
        }
        Ok(open)
    }

    // Notification actions

    /// Maps a notification action onto the payment and request lifecycle.
    ///
    /// Actions for payments or requests that no longer exist are ignored.
    pub async fn handle_action(&self, event: NotificationEvent) -> Result<ActionOutcome> {
        let Some(correlation) = event.correlation_id else {
            tracing::debug!(?event, "notification action without correlation id");
            return Ok(ActionOutcome::NoOp);
        };
        let payment_id = PaymentId::from_uuid(correlation);

        let outcome = match (event.category, event.action) {
            (_, NotificationActionKind::IncomingRequestOpened)
            | (CategoryTag::IncomingRequest, NotificationActionKind::DefaultTap) => self
                .split_request(SplitRequestId::from_uuid(correlation))
                .await
                .map(|r| ActionOutcome::Navigate(Destination::SplitRequestDetail { id: r.id })),
            (CategoryTag::PaymentSplit, NotificationActionKind::PresetQuickSplit(index)) => {
                self.quick_split(payment_id, index).await
            }
            (
                CategoryTag::PaymentSplit,
                NotificationActionKind::CustomSplit | NotificationActionKind::DefaultTap,
            ) => self
                .payment(payment_id)
                .await
                .map(|p| ActionOutcome::Navigate(Destination::Split { payment_id: p.id })),
            (CategoryTag::PaymentSplit, NotificationActionKind::DontSplit) => self
                .dont_split(payment_id)
                .await
                .map(|_| ActionOutcome::Dismissed(payment_id)),
            (category, action) => {
                tracing::debug!(?category, ?action, "notification action not handled");
                Ok(ActionOutcome::NoOp)
            }
        };

        match outcome {
            Err(e) if e.is_not_found() => {
                tracing::warn!(error = %e, "notification action for unknown entity");
                Ok(ActionOutcome::NoOp)
            }
            other => other,
        }
    }

    /// One-tap split with the preset at `index`. Always records a split
    /// request alongside the payment status change.
    async fn quick_split(&self, payment_id: PaymentId, index: usize) -> Result<ActionOutcome> {
        let presets = self.state.presets.all().await?;
        let Some(preset) = presets.get(index) else {
            tracing::warn!(index, "quick split for a preset that no longer exists");
            return Ok(ActionOutcome::NoOp);
        };
        let request = self.split_evenly(payment_id, &[preset.id], "").await?;
        Ok(ActionOutcome::QuickSplitSent {
            message: format!("Split request sent to {}!", preset.name),
            request,
        })
    }
}

fn preset_name(name: &str) -> Result<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(BilsError::Validation("Name must not be empty".to_string()));
    }
    Ok(name)
}
