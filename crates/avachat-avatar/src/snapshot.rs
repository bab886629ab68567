//! Snapshot fan-out: full-history conversation updates
//!
//! Every notification replaces the previous view wholesale; there are no
//! deltas. Subscriptions unregister deterministically on drop, so teardown
//! can never leave a duplicate listener behind.

use avachat_core::{normalize_snapshot, RawEntry, TranscriptEntry};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

type Snapshot = Arc<Vec<TranscriptEntry>>;

#[derive(Clone, Default)]
pub struct SnapshotBus {
    inner: Arc<BusInner>,
}

#[derive(Default)]
struct BusInner {
    subscribers: DashMap<u64, mpsc::UnboundedSender<Snapshot>>,
    next_id: AtomicU64,
}

impl SnapshotBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize wire-shaped entries once at the boundary, then fan out.
    pub fn publish_raw(&self, raw: &[RawEntry]) {
        self.publish(normalize_snapshot(raw));
    }

    /// Fan a normalized snapshot out to all live subscribers. Subscribers
    /// whose receiver is gone are dropped from the registry.
    pub fn publish(&self, snapshot: Vec<TranscriptEntry>) {
        let snapshot: Snapshot = Arc::new(snapshot);
        self.inner
            .subscribers
            .retain(|_, tx| tx.send(snapshot.clone()).is_ok());
    }

    pub fn subscribe(&self) -> SnapshotSubscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner.subscribers.insert(id, tx);
        debug!("snapshot subscriber registered: id={}", id);
        SnapshotSubscription {
            id,
            bus: self.inner.clone(),
            rx,
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.len()
    }
}

pub struct SnapshotSubscription {
    id: u64,
    bus: Arc<BusInner>,
    rx: mpsc::UnboundedReceiver<Snapshot>,
}

impl SnapshotSubscription {
    pub async fn recv(&mut self) -> Option<Snapshot> {
        self.rx.recv().await
    }

    pub fn try_recv(&mut self) -> Option<Snapshot> {
        self.rx.try_recv().ok()
    }
}

impl Drop for SnapshotSubscription {
    fn drop(&mut self) {
        self.bus.subscribers.remove(&self.id);
        debug!("snapshot subscriber removed: id={}", self.id);
    }
}
