//! Lifecycle sweeper
//!
//! Periodic pass over open bookings and bills: expire unpaid bookings whose
//! window has elapsed and persist the OVERDUE flag for issued bills past
//! their due date. Pure acceleration — correctness comes from the lazy
//! reconciliation every read already performs — so a missed tick costs
//! nothing but latency on dashboards.

use super::billing::BillEngine;
use super::booking::BookingEngine;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Background sweep task
///
/// Started from `ServerState::start_background_tasks()`.
pub struct LifecycleSweeper {
    bookings: Arc<BookingEngine>,
    bills: Arc<BillEngine>,
    shutdown: CancellationToken,
    interval: Duration,
}

impl LifecycleSweeper {
    pub fn new(
        bookings: Arc<BookingEngine>,
        bills: Arc<BillEngine>,
        shutdown: CancellationToken,
        interval: Duration,
    ) -> Self {
        Self {
            bookings,
            bills,
            shutdown,
            interval,
        }
    }

    /// Main loop: one catch-up pass at startup, then periodic ticks until
    /// shutdown
    pub async fn run(self) {
        tracing::info!(interval_secs = self.interval.as_secs(), "Lifecycle sweeper started");

        // Catch-up pass: deadlines may have elapsed while the process was down
        self.sweep_once();

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        ticker.tick().await; // first tick completes immediately

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = ticker.tick() => self.sweep_once(),
            }
        }

        tracing::info!("Lifecycle sweeper stopped");
    }

    fn sweep_once(&self) {
        let now = Utc::now();
        let expired = self.bookings.sweep_expired(now);
        let overdue = self.bills.sweep_overdue(now);
        if expired > 0 || overdue > 0 {
            tracing::info!(expired, overdue, "Sweep pass completed");
        } else {
            tracing::debug!("Sweep pass completed, nothing to do");
        }
    }
}
