//! Late-payment penalty computation
//!
//! This is the single place the day-difference/rate arithmetic lives. Every
//! consumer of a bill's amount — detail reads, list views, the overdue
//! sweep, the payment freeze — goes through [`overdue_view`], so a
//! "preview" can never drift from the value that eventually gets stored.
//!
//! All monetary arithmetic uses `Decimal`; penalties accrue in whole days
//! only, with no partial-day proration.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use shared::models::{Bill, BillStatus, BillView};

/// Late fee per day past the due date, in currency units
pub const PENALTY_RATE_PER_DAY: Decimal = Decimal::from_parts(10, 0, 0, false, 0);

/// Whole days late at `at`; zero on or before the due date
pub fn penalty_days(due_date: NaiveDate, at: DateTime<Utc>) -> i64 {
    (at.date_naive() - due_date).num_days().max(0)
}

/// Penalty accrued for the given number of late days
pub fn penalty_amount(days: i64) -> Decimal {
    Decimal::from(days.max(0)) * PENALTY_RATE_PER_DAY
}

/// Whether a stored status accrues penalty while the due date slips past
fn accrues_penalty(status: BillStatus) -> bool {
    matches!(
        status,
        BillStatus::Issued | BillStatus::PendingApproval | BillStatus::Overdue
    )
}

/// Read-time projection of a bill as of `now`.
///
/// Pure: same bill + same `now` always yields the same view. Once
/// `paid_date` is set the frozen fields are returned and elapsed time is
/// ignored, so the amount a member paid never changes retroactively.
pub fn overdue_view(bill: &Bill, now: DateTime<Utc>) -> BillView {
    if bill.paid_date.is_some() {
        let days = bill.paid_penalty_days.unwrap_or(0);
        let amount = bill.paid_penalty_amount.unwrap_or_else(|| penalty_amount(days));
        let total = bill
            .paid_total_amount
            .unwrap_or_else(|| bill.base_amount() + amount);
        return BillView {
            bill: bill.clone(),
            display_status: bill.bill_status,
            penalty_days: days,
            penalty_amount: amount,
            total_amount: total,
        };
    }

    if !accrues_penalty(bill.bill_status) {
        return BillView {
            bill: bill.clone(),
            display_status: bill.bill_status,
            penalty_days: 0,
            penalty_amount: Decimal::ZERO,
            total_amount: bill.base_amount(),
        };
    }

    let days = penalty_days(bill.due_date, now);
    let amount = penalty_amount(days);
    let display_status = if days > 0 {
        BillStatus::Overdue
    } else {
        bill.bill_status
    };

    BillView {
        bill: bill.clone(),
        display_status,
        penalty_days: days,
        penalty_amount: amount,
        total_amount: bill.base_amount() + amount,
    }
}
