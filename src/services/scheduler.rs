use crate::services::transport::{ChatId, MessageId, Transport, TransportError};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};

/// Handle to a scheduled batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BatchId(pub u64);

#[derive(Debug)]
struct ScheduledBatch {
    id: BatchId,
    chat_id: ChatId,
    message_ids: Vec<MessageId>,
    fire_at: Instant,
}

/// Delayed message removal. Batches go into a queue owned by one consumer
/// task, which keeps them ordered by fire time and deletes each batch once.
#[derive(Clone)]
pub struct AutoDeleteScheduler {
    tx: mpsc::UnboundedSender<ScheduledBatch>,
    next_id: Arc<AtomicU64>,
}

impl AutoDeleteScheduler {
    /// Starts the consumer. It stops when `shutdown` flips to true, or once
    /// every handle is dropped and the queue has drained.
    pub fn spawn(
        transport: Arc<dyn Transport>,
        shutdown: watch::Receiver<bool>,
    ) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run_queue(transport, rx, shutdown));
        (
            Self {
                tx,
                next_id: Arc::new(AtomicU64::new(1)),
            },
            handle,
        )
    }

    pub fn schedule(
        &self,
        chat_id: ChatId,
        message_ids: Vec<MessageId>,
        delay: Duration,
    ) -> BatchId {
        let id = BatchId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let batch = ScheduledBatch {
            id,
            chat_id,
            message_ids,
            fire_at: Instant::now() + delay,
        };

        if self.tx.send(batch).is_err() {
            tracing::warn!("Auto-delete queue closed, batch {:?} dropped", id);
        } else {
            tracing::debug!("⏳ Batch {:?} for chat {} scheduled in {:?}", id, chat_id, delay);
        }
        id
    }
}

async fn run_queue(
    transport: Arc<dyn Transport>,
    mut rx: mpsc::UnboundedReceiver<ScheduledBatch>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut timeline: BinaryHeap<Reverse<(Instant, BatchId)>> = BinaryHeap::new();
    let mut pending: HashMap<BatchId, ScheduledBatch> = HashMap::new();
    let mut accepting = true;

    tracing::info!("🧹 Auto-delete scheduler started");

    loop {
        if !accepting && timeline.is_empty() {
            break;
        }

        let next_fire = timeline.peek().map(|Reverse((at, _))| *at);

        tokio::select! {
            changed = shutdown.changed() => {
                // A dropped sender counts as shutdown.
                if changed.is_err() || *shutdown.borrow() {
                    tracing::info!(
                        "Auto-delete scheduler stopping, {} batch(es) not yet due",
                        pending.len()
                    );
                    break;
                }
            }
            received = rx.recv(), if accepting => match received {
                Some(batch) => {
                    timeline.push(Reverse((batch.fire_at, batch.id)));
                    pending.insert(batch.id, batch);
                }
                None => accepting = false,
            },
            _ = sleep_until(next_fire.unwrap_or_else(Instant::now)), if next_fire.is_some() => {
                let now = Instant::now();
                while let Some(Reverse((at, id))) = timeline.peek().copied() {
                    if at > now {
                        break;
                    }
                    timeline.pop();
                    if let Some(batch) = pending.remove(&id) {
                        let transport = transport.clone();
                        tokio::spawn(async move {
                            delete_batch(transport.as_ref(), batch.chat_id, &batch.message_ids)
                                .await;
                        });
                    }
                }
            }
        }
    }
}

/// Deletes every message independently. Returns how many were removed.
/// Messages that are already gone are not failures.
pub async fn delete_batch(
    transport: &dyn Transport,
    chat_id: ChatId,
    message_ids: &[MessageId],
) -> usize {
    let results = futures::future::join_all(
        message_ids
            .iter()
            .map(|id| transport.delete_message(chat_id, *id)),
    )
    .await;

    let mut deleted = 0;
    for (id, result) in message_ids.iter().zip(results) {
        match result {
            Ok(()) => deleted += 1,
            Err(TransportError::MessageNotFound) => {}
            Err(TransportError::Api { code, description }) => {
                tracing::debug!(
                    "Could not delete message {} in chat {}: {} {}",
                    id,
                    chat_id,
                    code,
                    description
                );
            }
            Err(e) => {
                tracing::warn!("Delete of message {} in chat {} failed: {}", id, chat_id, e);
            }
        }
    }

    tracing::debug!(
        "🧹 Auto-deleted {}/{} message(s) in chat {}",
        deleted,
        message_ids.len(),
        chat_id
    );
    deleted
}
