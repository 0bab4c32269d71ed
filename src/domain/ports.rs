use super::ids::{PaymentId, PresetId, SplitRequestId};
use super::notification::{NotificationCategory, NotificationRequest};
use super::payment::{Payment, SplitStatus};
use super::preset::Preset;
use super::split_request::{SplitRequest, SplitRequestStatus};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Newest-first collection of logged payments.
///
/// `update_status` returns whether anything changed; an unknown id is not
/// an error.
#[async_trait]
pub trait PaymentStore: Send + Sync {
    async fn add(&self, payment: Payment) -> Result<()>;
    async fn update_status(&self, id: PaymentId, status: SplitStatus) -> Result<bool>;
    async fn get(&self, id: PaymentId) -> Result<Option<Payment>>;
    async fn all(&self) -> Result<Vec<Payment>>;
}

/// Newest-first collection of split requests.
#[async_trait]
pub trait SplitRequestStore: Send + Sync {
    async fn add(&self, request: SplitRequest) -> Result<()>;
    async fn update_status(&self, id: SplitRequestId, status: SplitRequestStatus) -> Result<bool>;
    async fn get(&self, id: SplitRequestId) -> Result<Option<SplitRequest>>;
    async fn all(&self) -> Result<Vec<SplitRequest>>;
}

/// Contacts in the order the user added them. Notification quick-split
/// actions address presets by their index in this order.
#[async_trait]
pub trait PresetStore: Send + Sync {
    async fn add(&self, preset: Preset) -> Result<()>;
    async fn update(&self, preset: Preset) -> Result<bool>;
    async fn remove(&self, id: PresetId) -> Result<bool>;
    async fn get(&self, id: PresetId) -> Result<Option<Preset>>;
    async fn all(&self) -> Result<Vec<Preset>>;
}

/// Local notification center.
#[async_trait]
pub trait NotificationScheduler: Send + Sync {
    /// Asks the user for permission. Resolves to whether it was granted.
    async fn request_authorization(&self) -> Result<bool>;
    /// Replaces every previously registered category.
    async fn register_categories(&self, categories: Vec<NotificationCategory>) -> Result<()>;
    async fn schedule(&self, request: NotificationRequest) -> Result<()>;
}

pub type PaymentStoreHandle = Arc<dyn PaymentStore>;
pub type SplitRequestStoreHandle = Arc<dyn SplitRequestStore>;
pub type PresetStoreHandle = Arc<dyn PresetStore>;
pub type SchedulerHandle = Arc<dyn NotificationScheduler>;
