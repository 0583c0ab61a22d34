//! Approval Workflow - the single role gate in front of reviewer transitions
//!
//! Role checks are not duplicated per endpoint: every transition that needs
//! a manager or admin goes through this layer, which consults one capability
//! table keyed by `(role, action)` and then delegates to the engines. A
//! non-privileged actor gets `Unauthorized`; a precondition mismatch
//! surfaces as `IllegalState` from the engine (double-approval and
//! approval-after-cancel are caller bugs that must not be swallowed).

use super::billing::BillEngine;
use super::booking::BookingEngine;
use super::error::{LifecycleError, LifecycleResult};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use shared::models::{Actor, Bill, BillCreate, Booking, Role};
use std::fmt;
use std::sync::Arc;

/// Reviewer-gated transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewAction {
    ApproveDeposit,
    RejectDeposit,
    ApproveBooking,
    RejectBooking,
    CompleteBooking,
    IssueBill,
    FinalizeBill,
    ApproveBill,
    RejectBill,
    RecordCashPayment,
    CancelBill,
}

impl fmt::Display for ReviewAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Capability table: which role may request which transition
pub fn is_permitted(role: Role, action: ReviewAction) -> bool {
    use ReviewAction::*;
    match (role, action) {
        (Role::Student, _) => false,
        (
            Role::Manager,
            ApproveDeposit | RejectDeposit | ApproveBooking | RejectBooking | CompleteBooking
            | IssueBill | FinalizeBill | ApproveBill | RejectBill | RecordCashPayment
            | CancelBill,
        ) => true,
        (Role::Admin, _) => true,
    }
}

/// Role-gated transition layer over the booking and bill engines
#[derive(Debug)]
pub struct ApprovalWorkflow {
    bookings: Arc<BookingEngine>,
    bills: Arc<BillEngine>,
}

impl ApprovalWorkflow {
    pub fn new(bookings: Arc<BookingEngine>, bills: Arc<BillEngine>) -> Self {
        Self { bookings, bills }
    }

    fn authorize(&self, actor: &Actor, action: ReviewAction) -> LifecycleResult<()> {
        if is_permitted(actor.role, action) {
            return Ok(());
        }
        tracing::warn!(
            actor_id = %actor.id,
            role = %actor.role,
            action = %action,
            "Review action denied"
        );
        Err(LifecycleError::Unauthorized(format!(
            "{} requires manager or admin role",
            action
        )))
    }

    // ==================== Booking transitions ====================

    pub fn approve_deposit(
        &self,
        booking_id: &str,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> LifecycleResult<Booking> {
        self.authorize(actor, ReviewAction::ApproveDeposit)?;
        self.bookings.approve_deposit(booking_id, actor, now)
    }

    pub fn reject_deposit(
        &self,
        booking_id: &str,
        actor: &Actor,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> LifecycleResult<Booking> {
        self.authorize(actor, ReviewAction::RejectDeposit)?;
        self.bookings.reject_deposit(booking_id, actor, reason, now)
    }

    pub fn approve_booking(
        &self,
        booking_id: &str,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> LifecycleResult<Booking> {
        self.authorize(actor, ReviewAction::ApproveBooking)?;
        self.bookings.approve_booking(booking_id, actor, now)
    }

    pub fn reject_booking(
        &self,
        booking_id: &str,
        actor: &Actor,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> LifecycleResult<Booking> {
        self.authorize(actor, ReviewAction::RejectBooking)?;
        self.bookings.reject_booking(booking_id, actor, reason, now)
    }

    pub fn complete_booking(
        &self,
        booking_id: &str,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> LifecycleResult<Booking> {
        self.authorize(actor, ReviewAction::CompleteBooking)?;
        self.bookings.complete_booking(booking_id, actor, now)
    }

    // ==================== Bill transitions ====================

    pub fn issue_bill(&self, actor: &Actor, payload: &BillCreate) -> LifecycleResult<Bill> {
        self.authorize(actor, ReviewAction::IssueBill)?;
        self.bills.issue_bill(payload)
    }

    pub fn finalize_bill(
        &self,
        bill_id: &str,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> LifecycleResult<Bill> {
        self.authorize(actor, ReviewAction::FinalizeBill)?;
        self.bills.finalize_bill(bill_id, now)
    }

    pub fn approve_bill(
        &self,
        bill_id: &str,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> LifecycleResult<Bill> {
        self.authorize(actor, ReviewAction::ApproveBill)?;
        self.bills.approve_bill(bill_id, actor, now)
    }

    pub fn reject_bill(
        &self,
        bill_id: &str,
        actor: &Actor,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> LifecycleResult<Bill> {
        self.authorize(actor, ReviewAction::RejectBill)?;
        self.bills.reject_bill(bill_id, actor, reason, now)
    }

    pub fn record_cash_payment(
        &self,
        bill_id: &str,
        actor: &Actor,
        amount: Decimal,
        now: DateTime<Utc>,
    ) -> LifecycleResult<Bill> {
        self.authorize(actor, ReviewAction::RecordCashPayment)?;
        self.bills.record_cash_payment(bill_id, actor, amount, now)
    }

    pub fn cancel_bill(
        &self,
        bill_id: &str,
        actor: &Actor,
        reason: Option<String>,
    ) -> LifecycleResult<Bill> {
        self.authorize(actor, ReviewAction::CancelBill)?;
        self.bills.cancel_bill(bill_id, actor, reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_students_hold_no_review_capability() {
        let actions = [
            ReviewAction::ApproveDeposit,
            ReviewAction::RejectDeposit,
            ReviewAction::ApproveBooking,
            ReviewAction::RejectBooking,
            ReviewAction::CompleteBooking,
            ReviewAction::IssueBill,
            ReviewAction::FinalizeBill,
            ReviewAction::ApproveBill,
            ReviewAction::RejectBill,
            ReviewAction::RecordCashPayment,
            ReviewAction::CancelBill,
        ];
        for action in actions {
            assert!(!is_permitted(Role::Student, action));
            assert!(is_permitted(Role::Manager, action));
            assert!(is_permitted(Role::Admin, action));
        }
    }
}
