//! Stock change fan-out.
//!
//! ```text
//! receive()/ship() → commit → reserve slot → release gate → PublishSlot::publish
//!                                                             ├─ bounded queue → worker thread → handler
//!                                                             └─ bounded queue → Subscription (pull)
//! ```
//!
//! The publish slot is reserved while the gate is still held, so snapshots go
//! out in commit order and the last one delivered matches the ledger.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use stockledger_events::{Event, EventBus, InMemoryEventBus, Subscription};
use stockledger_inventory::MovementKind;

use crate::error::{LedgerError, LedgerResult};
use crate::projections::StockRow;

/// Full stock-by-item snapshot taken right after one movement call committed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockNotification {
    /// Commit order, starting at 1.
    pub sequence: u64,
    #[serde(rename = "type")]
    pub kind: MovementKind,
    pub stock: Vec<StockRow>,
    pub occurred_at: DateTime<Utc>,
}

impl Event for StockNotification {
    fn event_type(&self) -> &'static str {
        match self.kind {
            MovementKind::In => "stock.received",
            MovementKind::Out => "stock.shipped",
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}

/// Delivers stock notifications without ever blocking the ledger.
///
/// Each subscriber owns a bounded queue. A subscriber that falls behind loses
/// notifications (each one is a full snapshot, so the next one catches it up);
/// a subscriber that went away is dropped on the next publish.
#[derive(Debug)]
pub struct StockNotifier {
    bus: InMemoryEventBus<StockNotification>,
    last_sequence: Mutex<u64>,
}

/// Exclusive right to publish the next notification.
///
/// Reserve it before releasing the commit gate and publish after; the next
/// writer cannot publish until this slot is used or dropped.
#[must_use = "a reserved slot blocks later publishers until it is used"]
pub struct PublishSlot<'a> {
    notifier: &'a StockNotifier,
    last_sequence: MutexGuard<'a, u64>,
}

impl PublishSlot<'_> {
    pub fn publish(mut self, kind: MovementKind, stock: Vec<StockRow>) {
        *self.last_sequence += 1;
        let notification = StockNotification {
            sequence: *self.last_sequence,
            kind,
            stock,
            occurred_at: Utc::now(),
        };
        let event_type = notification.event_type();
        let bus = &self.notifier.bus;
        match bus.publish(notification) {
            Ok(()) => debug!(
                event_type,
                sequence = *self.last_sequence,
                subscribers = bus.subscriber_count(),
                "stock notification published"
            ),
            Err(err) => warn!(event_type, error = ?err, "stock notification not published"),
        }
    }
}

impl StockNotifier {
    pub fn new(capacity: usize) -> Self {
        Self {
            bus: InMemoryEventBus::with_capacity(capacity),
            last_sequence: Mutex::new(0),
        }
    }

    /// Run `handler` on a dedicated worker thread for every notification.
    ///
    /// A panic inside `handler` ends that worker only. The worker exits on its
    /// own once the notifier is dropped.
    pub fn subscribe<F>(&self, mut handler: F) -> LedgerResult<JoinHandle<()>>
    where
        F: FnMut(StockNotification) + Send + 'static,
    {
        let subscription = self.bus.subscribe();
        thread::Builder::new()
            .name("stock-subscriber".to_string())
            .spawn(move || {
                while let Ok(notification) = subscription.recv() {
                    handler(notification);
                }
            })
            .map_err(LedgerError::Subscriber)
    }

    /// Pull-style subscription for callers that run their own loop.
    pub fn subscribe_channel(&self) -> Subscription<StockNotification> {
        self.bus.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.bus.subscriber_count()
    }

    /// Wait for the publish slot. Publishing never panics, so a poisoned
    /// lock still holds a valid sequence number.
    pub fn reserve(&self) -> PublishSlot<'_> {
        PublishSlot {
            notifier: self,
            last_sequence: self.last_sequence.lock().unwrap_or_else(PoisonError::into_inner),
        }
    }

    /// Publish one snapshot outside any commit.
    pub fn notify(&self, kind: MovementKind, stock: Vec<StockRow>) {
        self.reserve().publish(kind, stock);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    #[test]
    fn handler_runs_for_each_notification() {
        let notifier = StockNotifier::new(8);
        let (tx, rx) = mpsc::channel();
        notifier
            .subscribe(move |n: StockNotification| {
                let _ = tx.send(n.event_type());
            })
            .unwrap();

        notifier.notify(MovementKind::In, vec![]);
        notifier.notify(MovementKind::Out, vec![]);

        let timeout = Duration::from_secs(5);
        assert_eq!(rx.recv_timeout(timeout).unwrap(), "stock.received");
        assert_eq!(rx.recv_timeout(timeout).unwrap(), "stock.shipped");
    }

    #[test]
    fn panicking_handler_only_stops_its_own_worker() {
        let notifier = StockNotifier::new(8);
        let crashing = notifier.subscribe(|_| panic!("subscriber failure")).unwrap();
        let healthy = notifier.subscribe_channel();

        notifier.notify(MovementKind::In, vec![]);
        assert!(crashing.join().is_err());

        notifier.notify(MovementKind::Out, vec![]);
        let kinds: Vec<_> = healthy.drain().into_iter().map(|n| n.kind).collect();
        assert_eq!(kinds, vec![MovementKind::In, MovementKind::Out]);
        // The crashed worker's queue was pruned by the second publish.
        assert_eq!(notifier.subscriber_count(), 1);
    }

    #[test]
    fn sequence_numbers_follow_publish_order() {
        let notifier = StockNotifier::new(8);
        let feed = notifier.subscribe_channel();

        let slot = notifier.reserve();
        assert!(notifier.last_sequence.try_lock().is_err());
        slot.publish(MovementKind::In, vec![]);
        notifier.notify(MovementKind::Out, vec![]);

        let sequences: Vec<u64> = feed.drain().into_iter().map(|n| n.sequence).collect();
        assert_eq!(sequences, vec![1, 2]);
    }

    #[test]
    fn worker_exits_when_notifier_is_dropped() {
        let notifier = StockNotifier::new(1);
        let worker = notifier.subscribe(|_| {}).unwrap();
        drop(notifier);
        assert!(worker.join().is_ok());
    }
}
