use super::feed::ChangeFeed;
use super::state::{AppState, Mutation, StoreEvent};
use crate::error::{BilsError, Result};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

type Ack = oneshot::Sender<Result<Option<StoreEvent>>>;

enum Envelope {
    Apply { mutation: Mutation, ack: Option<Ack> },
    Shutdown,
}

/// Cloneable producer side of the [`MainQueue`].
///
/// Any task may hold one (a permission callback, a notification handler);
/// every mutation it sends is applied by the single queue worker in the
/// order it was enqueued.
#[derive(Clone)]
pub struct MainQueueSender {
    tx: mpsc::UnboundedSender<Envelope>,
}

impl MainQueueSender {
    /// Fire-and-forget. The mutation is applied later on the worker.
    pub fn enqueue(&self, mutation: Mutation) -> Result<()> {
        self.tx
            .send(Envelope::Apply {
                mutation,
                ack: None,
            })
            .map_err(|_| BilsError::QueueClosed)
    }

    /// Enqueues the mutation and waits until it has been applied and
    /// published. Everything enqueued before it has been applied too.
    pub async fn commit(&self, mutation: Mutation) -> Result<Option<StoreEvent>> {
        let (ack, done) = oneshot::channel();
        self.tx
            .send(Envelope::Apply {
                mutation,
                ack: Some(ack),
            })
            .map_err(|_| BilsError::QueueClosed)?;
        done.await.map_err(|_| BilsError::QueueClosed)?
    }
}

/// The single writer. A spawned task owns the write side of every store
/// and applies mutations one at a time, which gives all writes a total
/// order without any cross-store locking.
pub struct MainQueue {
    sender: MainQueueSender,
    worker: JoinHandle<()>,
}

impl MainQueue {
    /// Spawns the worker on the current tokio runtime.
    pub fn spawn(state: AppState, feed: ChangeFeed) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let worker = tokio::spawn(run(state, feed, rx));
        Self {
            sender: MainQueueSender { tx },
            worker,
        }
    }

    pub fn sender(&self) -> MainQueueSender {
        self.sender.clone()
    }

    pub fn enqueue(&self, mutation: Mutation) -> Result<()> {
        self.sender.enqueue(mutation)
    }

    pub async fn commit(&self, mutation: Mutation) -> Result<Option<StoreEvent>> {
        self.sender.commit(mutation).await
    }

    /// Applies everything already enqueued, then stops the worker. Senders
    /// still held elsewhere get `QueueClosed` afterwards.
    pub async fn shutdown(self) -> Result<()> {
        // Worker may already be gone; joining below reports that.
        let _ = self.sender.tx.send(Envelope::Shutdown);
        self.worker.await.map_err(|_| BilsError::QueueClosed)
    }
}

async fn run(state: AppState, feed: ChangeFeed, mut rx: mpsc::UnboundedReceiver<Envelope>) {
    while let Some(envelope) = rx.recv().await {
        let (mutation, ack) = match envelope {
            Envelope::Apply { mutation, ack } => (mutation, ack),
            Envelope::Shutdown => break,
        };

        let kind = mutation.kind();
        let result = mutation.apply(&state).await;
        match &result {
            Ok(Some(event)) => {
                tracing::debug!(mutation = kind, ?event, "mutation applied");
                feed.publish(event);
            }
            Ok(None) => tracing::debug!(mutation = kind, "mutation changed nothing"),
            Err(e) => tracing::warn!(mutation = kind, error = %e, "mutation failed"),
        }

        if let Some(ack) = ack {
            // The committer may have stopped waiting.
            let _ = ack.send(result);
        }
    }
    tracing::debug!("main queue stopped");
}
