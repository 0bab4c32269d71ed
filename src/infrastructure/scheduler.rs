use crate::domain::notification::{NotificationCategory, NotificationRequest};
use crate::domain::ports::NotificationScheduler;
use crate::error::Result;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Default)]
struct Inner {
    grant_permission: bool,
    scheduled: Mutex<Vec<NotificationRequest>>,
    categories: Mutex<Vec<NotificationCategory>>,
    delivery: Option<mpsc::UnboundedSender<NotificationRequest>>,
}

/// Notification scheduler that lives inside the process.
///
/// Every scheduled request is recorded. When built with
/// [`InProcessScheduler::with_delivery`], each request is also handed to the
/// returned receiver once its delay has elapsed, standing in for the
/// platform showing it.
#[derive(Default, Clone)]
pub struct InProcessScheduler {
    inner: Arc<Inner>,
}

impl InProcessScheduler {
    pub fn new(grant_permission: bool) -> Self {
        Self {
            inner: Arc::new(Inner {
                grant_permission,
                ..Default::default()
            }),
        }
    }

    pub fn with_delivery(
        grant_permission: bool,
    ) -> (Self, mpsc::UnboundedReceiver<NotificationRequest>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let scheduler = Self {
            inner: Arc::new(Inner {
                grant_permission,
                delivery: Some(tx),
                ..Default::default()
            }),
        };
        (scheduler, rx)
    }

    /// Everything scheduled so far, oldest first.
    pub fn scheduled(&self) -> Vec<NotificationRequest> {
        self.inner.scheduled.lock().clone()
    }

    /// The most recent registration.
    pub fn categories(&self) -> Vec<NotificationCategory> {
        self.inner.categories.lock().clone()
    }
}

#[async_trait]
impl NotificationScheduler for InProcessScheduler {
    async fn request_authorization(&self) -> Result<bool> {
        Ok(self.inner.grant_permission)
    }

    async fn register_categories(&self, categories: Vec<NotificationCategory>) -> Result<()> {
        *self.inner.categories.lock() = categories;
        Ok(())
    }

    async fn schedule(&self, request: NotificationRequest) -> Result<()> {
        tracing::info!(
            title = %request.title,
            body = %request.body,
            delay_ms = request.delay.as_millis() as u64,
            category = request.category.identifier(),
            "notification scheduled"
        );
        self.inner.scheduled.lock().push(request.clone());

        if let Some(delivery) = self.inner.delivery.clone() {
            tokio::spawn(async move {
                tokio::time::sleep(request.delay).await;
                // Receiver gone means nobody is listening any more.
                let _ = delivery.send(request);
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::notification::CategoryTag;
    use std::time::Duration;

    fn request(title: &str, delay: Duration) -> NotificationRequest {
        NotificationRequest {
            title: title.to_string(),
            body: String::new(),
            delay,
            category: CategoryTag::Generic,
            correlation_id: None,
        }
    }

    #[tokio::test]
    async fn test_records_schedule_and_categories() {
        let scheduler = InProcessScheduler::new(true);
        assert!(scheduler.request_authorization().await.unwrap());

        scheduler.schedule(request("a", Duration::ZERO)).await.unwrap();
        scheduler.schedule(request("b", Duration::ZERO)).await.unwrap();
        let titles: Vec<_> = scheduler.scheduled().into_iter().map(|r| r.title).collect();
        assert_eq!(titles, vec!["a", "b"]);

        scheduler
            .register_categories(vec![NotificationCategory::generic()])
            .await
            .unwrap();
        scheduler
            .register_categories(vec![NotificationCategory::incoming_request()])
            .await
            .unwrap();
        let categories = scheduler.categories();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].tag, CategoryTag::IncomingRequest);
    }

    #[tokio::test]
    async fn test_delivery_after_delay() {
        let (scheduler, mut delivered) = InProcessScheduler::with_delivery(false);
        assert!(!scheduler.request_authorization().await.unwrap());

        scheduler
            .schedule(request("later", Duration::from_millis(20)))
            .await
            .unwrap();
        scheduler.schedule(request("now", Duration::ZERO)).await.unwrap();

        let first = delivered.recv().await.unwrap();
        let second = delivered.recv().await.unwrap();
        assert_eq!(first.title, "now");
        assert_eq!(second.title, "later");
    }
}
