//! Booking Model

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Booking status
///
/// Terminal states (`REJECTED`, `CANCELLED`, `COMPLETED`) permit no further
/// transition; bookings are never physically deleted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    Cancelled,
    Completed,
}

impl BookingStatus {
    /// Whether no further status transition is permitted
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BookingStatus::Rejected | BookingStatus::Cancelled | BookingStatus::Completed
        )
    }
}

/// Deposit payment status, tracked independently of [`BookingStatus`]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DepositStatus {
    #[default]
    None,
    Pending,
    Paid,
}

/// Booking entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    /// Booking reference (String ID, assigned at creation)
    pub booking_id: String,
    pub room_id: String,
    pub member_id: String,
    pub check_in_date: NaiveDate,
    /// Strictly after check-in; minimum span is 3 calendar months
    pub check_out_date: NaiveDate,
    /// Derived: billed months × monthly rate, in currency units
    pub total_price: Decimal,
    pub remarks: Option<String>,

    pub booking_status: BookingStatus,
    pub deposit_status: DepositStatus,

    /// Creation time
    pub booking_date: DateTime<Utc>,
    /// Creation time + payment window; set once, never extended
    pub payment_deadline: DateTime<Utc>,

    /// Opaque reference into the external file store
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_slip_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_slip_uploaded_at: Option<DateTime<Utc>>,

    /// Reviewer who approved/rejected the booking
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager_approved_at: Option<DateTime<Utc>>,

    /// Reason recorded on cancel/reject, surfaced to the student verbatim
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_reason: Option<String>,
}

impl Booking {
    /// Seconds left in the payment window at `now`, clamped to zero.
    ///
    /// The server holds no live countdown; any client recomputes the
    /// remaining time from the stored deadline.
    pub fn seconds_until_deadline(&self, now: DateTime<Utc>) -> i64 {
        (self.payment_deadline - now).num_seconds().max(0)
    }
}

/// Create booking payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BookingCreate {
    #[validate(length(min = 1, max = 64))]
    pub room_id: String,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    #[validate(length(max = 500))]
    pub remarks: Option<String>,
}

/// Upload payment slip payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SlipUpload {
    /// Opaque reference returned by the file-store upload call
    #[validate(length(min = 1, max = 255))]
    pub slip_ref: String,
}

/// Cancel/reject payload carrying the actor-supplied reason
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReasonPayload {
    #[validate(length(max = 500))]
    pub reason: Option<String>,
}
