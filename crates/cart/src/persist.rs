//! Debounced cart persistence.
//!
//! A single background task owns the store writes. Each scheduled snapshot
//! replaces the pending one and restarts the quiet-period timer, so a burst
//! of mutations costs one write. Writes are serialized by construction.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::snapshot::CartSnapshot;
use crate::store::KeyValueStore;

#[derive(Debug)]
enum PersistCommand {
    Write(CartSnapshot),
    Erase,
    Flush(oneshot::Sender<()>),
}

enum Next {
    Command(Option<PersistCommand>),
    Deadline,
}

/// Background writer for cart snapshots.
pub struct PersistWorker {
    store: Arc<dyn KeyValueStore>,
    delay: Duration,
    rx: mpsc::UnboundedReceiver<PersistCommand>,
}

impl PersistWorker {
    /// Spawn the worker on the current tokio runtime.
    pub fn start(store: Arc<dyn KeyValueStore>, delay: Duration) -> PersistHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        let worker = Self { store, delay, rx };
        let task = tokio::spawn(worker.run());
        PersistHandle { tx, task }
    }

    async fn run(mut self) {
        tracing::debug!(delay_ms = self.delay.as_millis() as u64, "cart persist worker started");
        let mut pending: Option<CartSnapshot> = None;

        loop {
            let next = if pending.is_some() {
                tokio::select! {
                    cmd = self.rx.recv() => Next::Command(cmd),
                    _ = tokio::time::sleep(self.delay) => Next::Deadline,
                }
            } else {
                Next::Command(self.rx.recv().await)
            };

            match next {
                Next::Deadline => self.write(pending.take()).await,
                Next::Command(Some(PersistCommand::Write(snapshot))) => pending = Some(snapshot),
                Next::Command(Some(PersistCommand::Erase)) => {
                    pending = None;
                    if let Err(e) = CartSnapshot::erase(self.store.as_ref()).await {
                        tracing::warn!(error = %e, "failed to erase persisted cart");
                    }
                }
                Next::Command(Some(PersistCommand::Flush(ack))) => {
                    self.write(pending.take()).await;
                    let _ = ack.send(());
                }
                Next::Command(None) => {
                    self.write(pending.take()).await;
                    break;
                }
            }
        }

        tracing::debug!("cart persist worker stopped");
    }

    async fn write(&self, snapshot: Option<CartSnapshot>) {
        let Some(snapshot) = snapshot else {
            return;
        };
        match snapshot.save(self.store.as_ref()).await {
            Ok(()) => tracing::debug!(items = snapshot.items.len(), "cart persisted"),
            Err(e) => tracing::warn!(error = %e, "failed to persist cart"),
        }
    }
}

/// Sending side of a running [`PersistWorker`].
///
/// Dropping the handle closes the channel; the worker writes whatever is
/// still pending and exits.
pub struct PersistHandle {
    tx: mpsc::UnboundedSender<PersistCommand>,
    task: JoinHandle<()>,
}

impl PersistHandle {
    /// Replace the pending snapshot and restart the debounce timer.
    pub fn schedule(&self, snapshot: CartSnapshot) {
        if self.tx.send(PersistCommand::Write(snapshot)).is_err() {
            tracing::warn!("cart persist worker is gone; snapshot dropped");
        }
    }

    /// Cancel any pending write and remove the persisted cart.
    pub fn erase(&self) {
        if self.tx.send(PersistCommand::Erase).is_err() {
            tracing::warn!("cart persist worker is gone; erase dropped");
        }
    }

    /// Write the pending snapshot now and wait for the store to accept it.
    pub async fn flush(&self) {
        let (ack, done) = oneshot::channel();
        if self.tx.send(PersistCommand::Flush(ack)).is_ok() {
            let _ = done.await;
        }
    }

    /// Write anything pending and wait for the worker to exit.
    pub async fn shutdown(self) {
        drop(self.tx);
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "cart persist worker panicked");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::CART_ITEMS_KEY;
    use crate::store::InMemoryKeyValueStore;
    use bookstore_catalog::Book;
    use bookstore_core::Sku;

    fn snapshot(skus: &[&str]) -> CartSnapshot {
        let mut s = CartSnapshot::default();
        for sku in skus {
            let sku = Sku::new(*sku).unwrap();
            s.items.push(Book::new(sku.clone(), "b", "1"));
            s.quantities.insert(sku, 1);
        }
        s
    }

    #[tokio::test(start_paused = true)]
    async fn burst_is_coalesced_into_one_write() {
        let store = Arc::new(InMemoryKeyValueStore::new());
        let handle = PersistWorker::start(store.clone(), Duration::from_millis(300));

        handle.schedule(snapshot(&["A"]));
        handle.schedule(snapshot(&["A", "B"]));
        handle.schedule(snapshot(&["A", "B", "C"]));

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(store.set_calls(), 0);

        tokio::time::sleep(Duration::from_millis(250)).await;
        // One snapshot is two keys.
        assert_eq!(store.set_calls(), 2);
        assert!(store.raw(CART_ITEMS_KEY).unwrap().contains("\"C\""));
    }

    #[tokio::test(start_paused = true)]
    async fn each_schedule_restarts_the_timer() {
        let store = Arc::new(InMemoryKeyValueStore::new());
        let handle = PersistWorker::start(store.clone(), Duration::from_millis(300));

        handle.schedule(snapshot(&["A"]));
        tokio::time::sleep(Duration::from_millis(200)).await;
        handle.schedule(snapshot(&["A", "B"]));
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(store.set_calls(), 0);

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(store.set_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn flush_writes_without_waiting() {
        let store = Arc::new(InMemoryKeyValueStore::new());
        let handle = PersistWorker::start(store.clone(), Duration::from_secs(60));

        handle.schedule(snapshot(&["A"]));
        handle.flush().await;
        assert_eq!(store.set_calls(), 2);

        // Nothing pending: flushing again is a no-op.
        handle.flush().await;
        assert_eq!(store.set_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn erase_cancels_pending_write() {
        let store = Arc::new(InMemoryKeyValueStore::new());
        store.put(CART_ITEMS_KEY, "[]");
        let handle = PersistWorker::start(store.clone(), Duration::from_millis(300));

        handle.schedule(snapshot(&["A"]));
        handle.erase();
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert_eq!(store.set_calls(), 0);
        assert!(store.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_writes_pending_snapshot() {
        let store = Arc::new(InMemoryKeyValueStore::new());
        let handle = PersistWorker::start(store.clone(), Duration::from_secs(60));

        handle.schedule(snapshot(&["A"]));
        handle.shutdown().await;
        assert_eq!(store.set_calls(), 2);
    }
}
