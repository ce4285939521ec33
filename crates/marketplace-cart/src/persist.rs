//! # Persistence Writer
//!
//! Writes cart snapshots to the key-value store in the order the mutations
//! that produced them were applied.
//!
//! ## Write Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Snapshot Persistence                                 │
//! │                                                                         │
//! │  CartStore (cart mutex held)                                            │
//! │  ├── apply mutation                                                     │
//! │  ├── clone the resulting cart                                           │
//! │  └── handle.enqueue(cart) ──► seq = n, mpsc (unbounded, FIFO)           │
//! │                                    │                                    │
//! │                                    ▼                                    │
//! │  Persister task                                                         │
//! │  ├── recv Write { seq: n, cart }                                        │
//! │  ├── coalesce: drain queue, keep newest (n+k)                           │
//! │  ├── storage.set(key, cart.to_snapshot())                               │
//! │  │     └── Err ──► error!, not retried                                  │
//! │  └── done.send(n+k) ──► wakes flush() waiters                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Snapshots are enqueued while the cart lock is held, so sequence numbers,
//! channel order and mutation order all agree. The writer only ever stores
//! the exact post-mutation value it was handed, never a re-read of shared
//! state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

use marketplace_core::Cart;
use marketplace_storage::KeyValueStore;

use crate::error::{CartError, CartResult};

// =============================================================================
// Messages
// =============================================================================

#[derive(Debug)]
enum PersistMessage {
    /// Store this snapshot.
    Write { seq: u64, cart: Cart },

    /// Stop after everything queued before this message is handled.
    Shutdown,
}

// =============================================================================
// Persister
// =============================================================================

/// Background task that owns all writes of the cart snapshot.
pub struct Persister {
    storage: Arc<dyn KeyValueStore>,
    key: String,
    coalesce: bool,
    rx: mpsc::UnboundedReceiver<PersistMessage>,
    done_tx: watch::Sender<u64>,
}

/// Handle for queuing snapshots and waiting on the writer.
#[derive(Debug)]
pub struct PersisterHandle {
    tx: mpsc::UnboundedSender<PersistMessage>,
    last_seq: AtomicU64,
    done_rx: watch::Receiver<u64>,
}

impl PersisterHandle {
    /// Queues a snapshot for writing. Never blocks.
    ///
    /// Callers must serialize calls (the cart store does so under its lock)
    /// for sequence numbers to follow mutation order.
    pub fn enqueue(&self, cart: Cart) {
        let seq = self.last_seq.fetch_add(1, Ordering::SeqCst) + 1;

        if self.tx.send(PersistMessage::Write { seq, cart }).is_err() {
            warn!(seq, "Persistence writer stopped, snapshot dropped");
        }
    }

    /// Waits until every snapshot queued so far has been handled (written,
    /// superseded, or failed and logged).
    pub async fn flush(&self) -> CartResult<()> {
        let target = self.last_seq.load(Ordering::SeqCst);
        let mut done = self.done_rx.clone();

        done.wait_for(|handled| *handled >= target)
            .await
            .map(|_| ())
            .map_err(|_| CartError::PersisterClosed)
    }

    /// Asks the writer to stop once the queue is drained.
    pub fn shutdown(&self) -> CartResult<()> {
        self.tx
            .send(PersistMessage::Shutdown)
            .map_err(|_| CartError::PersisterClosed)
    }

    /// Number of snapshots queued since start.
    pub fn queued(&self) -> u64 {
        self.last_seq.load(Ordering::SeqCst)
    }
}

impl Persister {
    /// Creates a writer for `key` and the handle that feeds it.
    ///
    /// The writer does nothing until [`run`](Self::run) is spawned.
    pub fn new(
        storage: Arc<dyn KeyValueStore>,
        key: impl Into<String>,
        coalesce: bool,
    ) -> (Self, PersisterHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let (done_tx, done_rx) = watch::channel(0);

        let persister = Persister {
            storage,
            key: key.into(),
            coalesce,
            rx,
            done_tx,
        };

        let handle = PersisterHandle {
            tx,
            last_seq: AtomicU64::new(0),
            done_rx,
        };

        (persister, handle)
    }

    /// Runs the writer loop until shutdown or until every handle is gone.
    ///
    /// This should be spawned as a background task.
    pub async fn run(mut self) {
        info!(key = %self.key, coalesce = self.coalesce, "Cart persistence writer starting");

        while let Some(message) = self.rx.recv().await {
            let (seq, cart) = match message {
                PersistMessage::Write { seq, cart } => (seq, cart),
                PersistMessage::Shutdown => break,
            };

            let (seq, cart, stop) = if self.coalesce {
                self.take_newest(seq, cart)
            } else {
                (seq, cart, false)
            };

            self.write(seq, &cart).await;
            self.done_tx.send_replace(seq);

            if stop {
                break;
            }
        }

        info!("Cart persistence writer stopped");
    }

    /// Drains already-queued writes, keeping only the newest snapshot.
    fn take_newest(&mut self, mut seq: u64, mut cart: Cart) -> (u64, Cart, bool) {
        let mut skipped = 0usize;

        while let Ok(message) = self.rx.try_recv() {
            match message {
                PersistMessage::Write {
                    seq: next_seq,
                    cart: next,
                } => {
                    seq = next_seq;
                    cart = next;
                    skipped += 1;
                }
                PersistMessage::Shutdown => return (seq, cart, true),
            }
        }

        if skipped > 0 {
            debug!(skipped, seq, "Coalesced queued cart snapshots");
        }
        (seq, cart, false)
    }

    async fn write(&self, seq: u64, cart: &Cart) {
        let snapshot = match cart.to_snapshot() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                error!(seq, error = %e, "Failed to encode cart snapshot");
                return;
            }
        };

        match self.storage.set(&self.key, &snapshot).await {
            Ok(()) => debug!(seq, items = cart.item_count(), "Cart snapshot persisted"),
            Err(e) => error!(seq, key = %self.key, error = %e, "Failed to persist cart snapshot"),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use marketplace_core::NewCartItem;
    use marketplace_storage::MemoryStore;
    use std::time::Duration;

    const KEY: &str = "@Test:cart";

    fn spawn(storage: Arc<MemoryStore>, coalesce: bool) -> (PersisterHandle, tokio::task::JoinHandle<()>) {
        let (persister, handle) = Persister::new(storage, KEY, coalesce);
        (handle, tokio::spawn(persister.run()))
    }

    fn cart_of(titles: &[&str]) -> Cart {
        let mut cart = Cart::new();
        for (i, title) in titles.iter().enumerate() {
            cart.add(NewCartItem::new(i.to_string(), *title, "", 1.0));
        }
        cart
    }

    #[tokio::test]
    async fn test_writes_in_order() {
        let storage = Arc::new(MemoryStore::new());
        let (handle, task) = spawn(storage.clone(), false);

        handle.enqueue(cart_of(&["Apple"]));
        handle.enqueue(cart_of(&["Apple", "Banana"]));
        handle.flush().await.unwrap();

        assert_eq!(storage.write_count(), 2);
        let stored = storage.get(KEY).await.unwrap().unwrap();
        assert_eq!(Cart::from_snapshot(&stored).unwrap(), cart_of(&["Apple", "Banana"]));

        handle.shutdown().unwrap();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_coalesces_queued_snapshots() {
        let storage = Arc::new(MemoryStore::new());
        storage.set_write_delay(Duration::from_millis(20));
        let (handle, task) = spawn(storage.clone(), true);

        for n in 1..=5 {
            let titles: Vec<String> = (0..n).map(|i| format!("Item {i}")).collect();
            let titles: Vec<&str> = titles.iter().map(String::as_str).collect();
            handle.enqueue(cart_of(&titles));
        }
        handle.flush().await.unwrap();

        assert!(storage.write_count() <= 5);
        let stored = storage.get(KEY).await.unwrap().unwrap();
        assert_eq!(Cart::from_snapshot(&stored).unwrap().item_count(), 5);

        handle.shutdown().unwrap();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_write_failure_does_not_stop_writer() {
        let storage = Arc::new(MemoryStore::new());
        let (handle, task) = spawn(storage.clone(), false);

        storage.set_fail_writes(true);
        handle.enqueue(cart_of(&["Apple"]));
        handle.flush().await.unwrap();
        assert_eq!(storage.get(KEY).await.unwrap(), None);

        storage.set_fail_writes(false);
        handle.enqueue(cart_of(&["Banana"]));
        handle.flush().await.unwrap();
        assert!(storage.get(KEY).await.unwrap().is_some());

        handle.shutdown().unwrap();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_drains_queue() {
        let storage = Arc::new(MemoryStore::new());
        let (handle, task) = spawn(storage.clone(), false);

        handle.enqueue(cart_of(&["Apple"]));
        handle.shutdown().unwrap();
        task.await.unwrap();

        assert_eq!(storage.write_count(), 1);
        assert_eq!(handle.queued(), 1);

        // Writer is gone: flush still succeeds for work already done,
        // new work cannot be waited on.
        handle.flush().await.unwrap();
        handle.enqueue(cart_of(&["Banana"]));
        assert!(matches!(handle.flush().await, Err(CartError::PersisterClosed)));
    }

    #[tokio::test]
    async fn test_flush_with_nothing_queued() {
        let storage = Arc::new(MemoryStore::new());
        let (handle, task) = spawn(storage, true);

        handle.flush().await.unwrap();

        handle.shutdown().unwrap();
        task.await.unwrap();
    }
}
