//! Bill Model

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Bill status
///
/// `OVERDUE` is stored only by the batch sweep; readers derive the same
/// decoration live from `due_date`, so a missed sweep never changes what a
/// consumer sees.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillStatus {
    #[default]
    Draft,
    Issued,
    PendingApproval,
    Paid,
    Overdue,
    Cancelled,
}

impl BillStatus {
    /// Whether no further status transition is permitted
    pub fn is_terminal(&self) -> bool {
        matches!(self, BillStatus::Paid | BillStatus::Cancelled)
    }
}

/// Monthly bill entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bill {
    /// Bill reference (String ID)
    pub bill_id: String,
    pub room_id: String,
    pub member_id: String,
    /// Billing month, 1-12
    pub bill_month: u32,
    pub bill_year: i32,

    /// Amounts in currency units
    pub room_rent: Decimal,
    pub water_cost: Decimal,
    pub electricity_cost: Decimal,
    pub other_charges: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other_charges_reason: Option<String>,

    pub due_date: NaiveDate,
    pub bill_status: BillStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_slip_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_slip_uploaded_at: Option<DateTime<Utc>>,

    /// Set exactly once, when the bill is approved or settled in cash;
    /// freezes the penalty fields below
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_date: Option<DateTime<Utc>>,
    /// Frozen at payment time; None while unpaid (derive live instead)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_penalty_days: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_penalty_amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_total_amount: Option<Decimal>,
}

impl Bill {
    /// Sum of the fixed charges, before any penalty
    pub fn base_amount(&self) -> Decimal {
        self.room_rent + self.water_cost + self.electricity_cost + self.other_charges
    }
}

/// Read-time projection of a bill with the live (or frozen) penalty applied
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillView {
    #[serde(flatten)]
    pub bill: Bill,
    /// Status as presented to the reader; `OVERDUE` once past the due date
    /// and still unpaid, regardless of what is stored
    pub display_status: BillStatus,
    pub penalty_days: i64,
    pub penalty_amount: Decimal,
    pub total_amount: Decimal,
}

/// Issue bill payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BillCreate {
    #[validate(length(min = 1, max = 64))]
    pub room_id: String,
    #[validate(length(min = 1, max = 64))]
    pub member_id: String,
    #[validate(range(min = 1, max = 12))]
    pub bill_month: u32,
    #[validate(range(min = 2000, max = 2200))]
    pub bill_year: i32,
    pub room_rent: Decimal,
    pub water_cost: Decimal,
    pub electricity_cost: Decimal,
    #[serde(default)]
    pub other_charges: Decimal,
    #[validate(length(max = 255))]
    pub other_charges_reason: Option<String>,
    pub due_date: NaiveDate,
}

/// Record cash payment payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashPayment {
    /// Amount handed over, recorded for the audit trail
    pub amount: Decimal,
}
