//! Lifecycle event broadcast
//!
//! Engines publish every committed transition here; the notification
//! front-end (and any other consumer) subscribes. Publishing is
//! fire-and-forget: a send failure is logged and never rolls back the
//! transition that produced it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Event broadcast channel capacity
const EVENT_CHANNEL_CAPACITY: usize = 4096;

/// Committed lifecycle transitions, in wire form
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifecycleEvent {
    BookingCreated {
        booking_id: String,
        room_id: String,
        member_id: String,
        at: DateTime<Utc>,
    },
    SlipUploaded {
        booking_id: String,
        at: DateTime<Utc>,
    },
    DepositPaid {
        booking_id: String,
        manager_id: String,
        at: DateTime<Utc>,
    },
    DepositRejected {
        booking_id: String,
        manager_id: String,
        reason: Option<String>,
        at: DateTime<Utc>,
    },
    BookingApproved {
        booking_id: String,
        manager_id: String,
        at: DateTime<Utc>,
    },
    BookingRejected {
        booking_id: String,
        manager_id: String,
        reason: Option<String>,
        at: DateTime<Utc>,
    },
    BookingCancelled {
        booking_id: String,
        reason: Option<String>,
        at: DateTime<Utc>,
    },
    BookingExpired {
        booking_id: String,
        room_id: String,
        at: DateTime<Utc>,
    },
    BookingCompleted {
        booking_id: String,
        at: DateTime<Utc>,
    },
    BillIssued {
        bill_id: String,
        member_id: String,
        at: DateTime<Utc>,
    },
    BillSlipUploaded {
        bill_id: String,
        at: DateTime<Utc>,
    },
    BillPaid {
        bill_id: String,
        at: DateTime<Utc>,
    },
    BillRejected {
        bill_id: String,
        reason: Option<String>,
        at: DateTime<Utc>,
    },
    BillOverdue {
        bill_id: String,
        penalty_days: i64,
        at: DateTime<Utc>,
    },
}

/// Broadcast handle shared by the engines
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: broadcast::Sender<LifecycleEvent>,
}

impl EventSink {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Publish an event. Never fails; a lagging or absent consumer must not
    /// affect the state transition that produced the event.
    pub fn publish(&self, event: LifecycleEvent) {
        if self.tx.send(event).is_err() {
            tracing::debug!("Lifecycle event dropped: no active subscribers");
        }
    }

    /// Subscribe to event broadcasts
    pub fn subscribe(&self) -> broadcast::Receiver<LifecycleEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventSink {
    fn default() -> Self {
        Self::new()
    }
}
