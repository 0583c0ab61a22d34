//! Booking composite state and the legal-transition table
//!
//! A booking advances along two axes at once: `booking_status` (the room
//! side) and `deposit_status` (the money side). Checking the two flags ad
//! hoc at every call site is how illegal combinations slip in, so the legal
//! pairs are classified into one [`BookingPhase`] union and every mutation
//! in the engine goes through the single [`apply`] transition table.

use super::error::{LifecycleError, LifecycleResult};
use shared::models::{Booking, BookingStatus, DepositStatus};
use std::fmt;

/// The two status axes of a booking, taken together
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingState {
    pub status: BookingStatus,
    pub deposit: DepositStatus,
}

impl BookingState {
    pub fn new(status: BookingStatus, deposit: DepositStatus) -> Self {
        Self { status, deposit }
    }

    pub fn of(booking: &Booking) -> Self {
        Self {
            status: booking.booking_status,
            deposit: booking.deposit_status,
        }
    }

    /// Classify the pair into its lifecycle phase.
    ///
    /// Returns `None` for combinations the transition table can never
    /// produce (e.g. `APPROVED` with an unpaid deposit).
    pub fn phase(&self) -> Option<BookingPhase> {
        match (self.status, self.deposit) {
            (BookingStatus::Pending, DepositStatus::None) => Some(BookingPhase::AwaitingDeposit),
            (BookingStatus::Pending, DepositStatus::Pending) => {
                Some(BookingPhase::DepositUnderReview)
            }
            (BookingStatus::Pending, DepositStatus::Paid) => Some(BookingPhase::DepositPaid),
            (BookingStatus::Approved, DepositStatus::Paid) => Some(BookingPhase::Approved),
            (BookingStatus::Rejected, _) => Some(BookingPhase::Rejected),
            (BookingStatus::Cancelled, _) => Some(BookingPhase::Cancelled),
            (BookingStatus::Completed, DepositStatus::Paid) => Some(BookingPhase::Completed),
            _ => None,
        }
    }

    /// Whether the booking permits no further transitions
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

impl fmt::Display for BookingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}/{:?}", self.status, self.deposit)
    }
}

/// Legal `(booking_status, deposit_status)` pairs as a tagged union
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingPhase {
    /// Pending booking, no slip yet; the payment-deadline clock is running
    AwaitingDeposit,
    /// Slip uploaded, waiting for a reviewer
    DepositUnderReview,
    /// Deposit confirmed; booking itself still needs approval
    DepositPaid,
    /// Booking approved, room occupied
    Approved,
    Rejected,
    Cancelled,
    Completed,
}

/// Requested transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingAction {
    /// Student uploads the deposit slip
    UploadSlip,
    /// Reviewer confirms the deposit slip
    ApproveDeposit,
    /// Reviewer rejects the deposit slip (deadline is NOT extended)
    RejectDeposit,
    /// Reviewer approves the booking; requires a paid deposit
    ApproveBooking,
    /// Reviewer rejects the booking outright
    RejectBooking,
    /// Student (or staff) cancels a pending booking
    Cancel,
    /// Timer-driven auto-cancellation of an unpaid booking
    Expire,
    /// Move-out: an approved stay is finished
    Complete,
}

impl fmt::Display for BookingAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// The legal-transition table.
///
/// Returns the successor state, or `IllegalState` naming the offending
/// state/action pair. Time preconditions (the 60-minute window) live in the
/// engine; this table is pure state.
pub fn apply(state: BookingState, action: BookingAction) -> LifecycleResult<BookingState> {
    use BookingAction::*;
    use BookingPhase::*;

    let phase = state.phase().ok_or_else(|| {
        LifecycleError::IllegalState(format!("booking in unrepresentable state {}", state))
    })?;

    let next = match (phase, action) {
        (AwaitingDeposit, UploadSlip) => {
            BookingState::new(BookingStatus::Pending, DepositStatus::Pending)
        }
        (DepositUnderReview, ApproveDeposit) => {
            BookingState::new(BookingStatus::Pending, DepositStatus::Paid)
        }
        (DepositUnderReview, RejectDeposit) => {
            BookingState::new(BookingStatus::Pending, DepositStatus::None)
        }
        (DepositPaid, ApproveBooking) => {
            BookingState::new(BookingStatus::Approved, DepositStatus::Paid)
        }
        (AwaitingDeposit | DepositUnderReview | DepositPaid | Approved, RejectBooking) => {
            BookingState::new(BookingStatus::Rejected, state.deposit)
        }
        (AwaitingDeposit | DepositUnderReview | DepositPaid, Cancel) => {
            BookingState::new(BookingStatus::Cancelled, state.deposit)
        }
        (AwaitingDeposit, Expire) => {
            BookingState::new(BookingStatus::Cancelled, DepositStatus::None)
        }
        (Approved, Complete) => {
            BookingState::new(BookingStatus::Completed, DepositStatus::Paid)
        }
        _ => {
            return Err(LifecycleError::IllegalState(format!(
                "cannot {} from {}",
                action, state
            )));
        }
    };

    Ok(next)
}
