//! Reservation-to-occupancy lifecycle engine
//!
//! This module owns the combined state machine governing a room booking,
//! its deposit payment, and the recurring monthly bill:
//!
//! - **state**: the legal `(booking_status, deposit_status)` pairs and the
//!   single transition table every mutation goes through
//! - **booking**: BookingEngine - creation, the 60-minute payment window,
//!   timer reconciliation, cancellation
//! - **billing**: BillEngine - monthly bills, slip review, penalty freezing
//! - **penalty**: the one pure overdue/penalty computation shared by every
//!   read path and the sweep
//! - **approval**: role-gated transition layer (manager/admin)
//! - **rooms**: Room Inventory boundary with conditional status updates
//! - **events**: fire-and-forget lifecycle event broadcast
//! - **sweeper**: periodic expiry/overdue acceleration task
//!
//! # Timer Flow
//!
//! ```text
//! CreateBooking ──> payment_deadline = now + 60m (stored, immutable)
//!        │
//!        ├─ any read/mutation ──> reconcile: expired? ──> CANCELLED, room released
//!        └─ sweeper tick ───────> same reconcile, in bulk
//! ```
//!
//! There is no live timer object; the stored timestamp is the authority, so
//! restarts and horizontally-scaled instances agree by construction.

pub mod approval;
pub mod billing;
pub mod booking;
pub mod error;
pub mod events;
pub mod penalty;
pub mod rooms;
pub mod state;
pub mod sweeper;

#[cfg(test)]
mod tests;

// Re-exports
pub use approval::{ApprovalWorkflow, ReviewAction};
pub use billing::BillEngine;
pub use booking::{BookingEngine, AUTO_CANCEL_REASON, MIN_STAY_MONTHS, PAYMENT_WINDOW_MINUTES};
pub use error::{LifecycleError, LifecycleResult};
pub use events::{EventSink, LifecycleEvent};
pub use penalty::PENALTY_RATE_PER_DAY;
pub use rooms::{InMemoryRoomCatalog, RoomCatalog};
pub use state::{BookingAction, BookingPhase, BookingState};
pub use sweeper::LifecycleSweeper;
