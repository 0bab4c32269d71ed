use crate::application::state::AppState;
use crate::domain::ids::{PaymentId, PresetId, SplitRequestId};
use crate::domain::payment::{Payment, SplitStatus};
use crate::domain::ports::{PaymentStore, PresetStore, SplitRequestStore};
use crate::domain::preset::Preset;
use crate::domain::split_request::{SplitRequest, SplitRequestStatus};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory payment list, newest first.
///
/// Uses `Arc<RwLock<Vec<Payment>>>` so UI readers can take snapshots while
/// the main queue holds the only writer.
#[derive(Default, Clone)]
pub struct InMemoryPaymentStore {
    payments: Arc<RwLock<Vec<Payment>>>,
}

impl InMemoryPaymentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentStore for InMemoryPaymentStore {
    async fn add(&self, payment: Payment) -> Result<()> {
        let mut payments = self.payments.write().await;
        payments.insert(0, payment);
        Ok(())
    }

    async fn update_status(&self, id: PaymentId, status: SplitStatus) -> Result<bool> {
        let mut payments = self.payments.write().await;
        Ok(payments
            .iter_mut()
            .find(|p| p.id == id)
            .is_some_and(|p| p.apply_split_status(status)))
    }

    async fn get(&self, id: PaymentId) -> Result<Option<Payment>> {
        let payments = self.payments.read().await;
        Ok(payments.iter().find(|p| p.id == id).cloned())
    }

    async fn all(&self) -> Result<Vec<Payment>> {
        Ok(self.payments.read().await.clone())
    }
}

/// In-memory split request list, newest first.
#[derive(Default, Clone)]
pub struct InMemorySplitRequestStore {
    requests: Arc<RwLock<Vec<SplitRequest>>>,
}

impl InMemorySplitRequestStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SplitRequestStore for InMemorySplitRequestStore {
    async fn add(&self, request: SplitRequest) -> Result<()> {
        let mut requests = self.requests.write().await;
        requests.insert(0, request);
        Ok(())
    }

    async fn update_status(&self, id: SplitRequestId, status: SplitRequestStatus) -> Result<bool> {
        let mut requests = self.requests.write().await;
        Ok(match requests.iter_mut().find(|r| r.id == id) {
            Some(request) => request.status != status && request.apply_status(status),
            None => false,
        })
    }

    async fn get(&self, id: SplitRequestId) -> Result<Option<SplitRequest>> {
        let requests = self.requests.read().await;
        Ok(requests.iter().find(|r| r.id == id).cloned())
    }

    async fn all(&self) -> Result<Vec<SplitRequest>> {
        Ok(self.requests.read().await.clone())
    }
}

/// In-memory contact list in insertion order.
#[derive(Default, Clone)]
pub struct InMemoryPresetStore {
    presets: Arc<RwLock<Vec<Preset>>>,
}

impl InMemoryPresetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_presets(presets: Vec<Preset>) -> Self {
        Self {
            presets: Arc::new(RwLock::new(presets)),
        }
    }
}

#[async_trait]
impl PresetStore for InMemoryPresetStore {
    async fn add(&self, preset: Preset) -> Result<()> {
        self.presets.write().await.push(preset);
        Ok(())
    }

    async fn update(&self, preset: Preset) -> Result<bool> {
        let mut presets = self.presets.write().await;
        match presets.iter_mut().find(|p| p.id == preset.id) {
            Some(existing) if *existing != preset => {
                *existing = preset;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn remove(&self, id: PresetId) -> Result<bool> {
        let mut presets = self.presets.write().await;
        let before = presets.len();
        presets.retain(|p| p.id != id);
        Ok(presets.len() != before)
    }

    async fn get(&self, id: PresetId) -> Result<Option<Preset>> {
        let presets = self.presets.read().await;
        Ok(presets.iter().find(|p| p.id == id).cloned())
    }

    async fn all(&self) -> Result<Vec<Preset>> {
        Ok(self.presets.read().await.clone())
    }
}

impl AppState {
    /// State backed entirely by the in-memory stores.
    pub fn in_memory(presets: Vec<Preset>) -> Self {
        Self::new(
            Arc::new(InMemoryPaymentStore::new()),
            Arc::new(InMemorySplitRequestStore::new()),
            Arc::new(InMemoryPresetStore::with_presets(presets)),
        )
    }
}
