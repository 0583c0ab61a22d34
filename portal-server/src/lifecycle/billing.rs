//! BillEngine - monthly bill lifecycle and penalty freezing
//!
//! Bills move `DRAFT → ISSUED → PENDING_APPROVAL → PAID`, with `OVERDUE` as
//! a time-derived decoration of an unpaid bill. There is no stored timer:
//! every read derives overdueness from `due_date` via
//! [`penalty::overdue_view`], and the batch sweep persists the same answer
//! for issued bills. Approving or cash-settling a bill freezes the penalty
//! at the value computed at that moment.

use super::error::{LifecycleError, LifecycleResult};
use super::events::{EventSink, LifecycleEvent};
use super::penalty;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rust_decimal::Decimal;
use shared::models::{Actor, Bill, BillCreate, BillStatus, BillView, Role};

/// BillEngine for bill command processing
pub struct BillEngine {
    bills: DashMap<String, Bill>,
    events: EventSink,
}

impl std::fmt::Debug for BillEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BillEngine")
            .field("bills", &self.bills.len())
            .finish()
    }
}

impl BillEngine {
    pub fn new(events: EventSink) -> Self {
        Self {
            bills: DashMap::new(),
            events,
        }
    }

    /// Create a bill in DRAFT; amounts are editable until finalized
    pub fn issue_bill(&self, payload: &BillCreate) -> LifecycleResult<Bill> {
        if !(1..=12).contains(&payload.bill_month) {
            return Err(LifecycleError::InvalidAmount(format!(
                "bill month must be 1-12, got {}",
                payload.bill_month
            )));
        }
        for (name, amount) in [
            ("room_rent", payload.room_rent),
            ("water_cost", payload.water_cost),
            ("electricity_cost", payload.electricity_cost),
            ("other_charges", payload.other_charges),
        ] {
            if amount < Decimal::ZERO {
                return Err(LifecycleError::InvalidAmount(format!(
                    "{} must be non-negative, got {}",
                    name, amount
                )));
            }
        }

        let bill = Bill {
            bill_id: uuid::Uuid::new_v4().to_string(),
            room_id: payload.room_id.clone(),
            member_id: payload.member_id.clone(),
            bill_month: payload.bill_month,
            bill_year: payload.bill_year,
            room_rent: payload.room_rent,
            water_cost: payload.water_cost,
            electricity_cost: payload.electricity_cost,
            other_charges: payload.other_charges,
            other_charges_reason: payload.other_charges_reason.clone(),
            due_date: payload.due_date,
            bill_status: BillStatus::Draft,
            payment_slip_ref: None,
            payment_slip_uploaded_at: None,
            paid_date: None,
            paid_penalty_days: None,
            paid_penalty_amount: None,
            paid_total_amount: None,
        };

        self.bills.insert(bill.bill_id.clone(), bill.clone());
        tracing::info!(
            bill_id = %bill.bill_id,
            room_id = %bill.room_id,
            member_id = %bill.member_id,
            month = bill.bill_month,
            year = bill.bill_year,
            "Bill drafted"
        );
        Ok(bill)
    }

    /// Promote a draft to ISSUED; from here the member sees it and the
    /// due-date clock matters
    pub fn finalize_bill(&self, bill_id: &str, now: DateTime<Utc>) -> LifecycleResult<Bill> {
        let mut entry = self.entry(bill_id)?;
        let bill = entry.value_mut();

        if bill.bill_status != BillStatus::Draft {
            return Err(LifecycleError::IllegalState(format!(
                "cannot finalize bill in {:?}",
                bill.bill_status
            )));
        }
        bill.bill_status = BillStatus::Issued;

        tracing::info!(bill_id = %bill.bill_id, due_date = %bill.due_date, "Bill issued");
        self.events.publish(LifecycleEvent::BillIssued {
            bill_id: bill.bill_id.clone(),
            member_id: bill.member_id.clone(),
            at: now,
        });
        Ok(bill.clone())
    }

    /// Upload a payment slip; legal from ISSUED or OVERDUE
    pub fn upload_slip(
        &self,
        bill_id: &str,
        actor: &Actor,
        slip_ref: &str,
        now: DateTime<Utc>,
    ) -> LifecycleResult<Bill> {
        let mut entry = self.entry(bill_id)?;
        let bill = entry.value_mut();
        ensure_owner(bill, actor)?;

        if !matches!(bill.bill_status, BillStatus::Issued | BillStatus::Overdue) {
            return Err(LifecycleError::IllegalState(format!(
                "cannot upload slip for bill in {:?}",
                bill.bill_status
            )));
        }
        bill.bill_status = BillStatus::PendingApproval;
        bill.payment_slip_ref = Some(slip_ref.to_string());
        bill.payment_slip_uploaded_at = Some(now);

        tracing::info!(bill_id = %bill.bill_id, "Bill slip uploaded");
        self.events.publish(LifecycleEvent::BillSlipUploaded {
            bill_id: bill.bill_id.clone(),
            at: now,
        });
        Ok(bill.clone())
    }

    /// Approve the slip: PAID, penalty frozen at this moment (reviewer op,
    /// gated by the approval workflow)
    pub fn approve_bill(
        &self,
        bill_id: &str,
        reviewer: &Actor,
        now: DateTime<Utc>,
    ) -> LifecycleResult<Bill> {
        let mut entry = self.entry(bill_id)?;
        let bill = entry.value_mut();

        if bill.bill_status != BillStatus::PendingApproval {
            return Err(LifecycleError::IllegalState(format!(
                "cannot approve bill in {:?}",
                bill.bill_status
            )));
        }
        freeze_payment(bill, now);

        tracing::info!(
            bill_id = %bill.bill_id,
            manager_id = %reviewer.id,
            penalty_days = bill.paid_penalty_days.unwrap_or(0),
            "Bill approved as paid"
        );
        self.events.publish(LifecycleEvent::BillPaid {
            bill_id: bill.bill_id.clone(),
            at: now,
        });
        Ok(bill.clone())
    }

    /// Reject the slip: back to ISSUED, slip cleared; penalty keeps accruing
    pub fn reject_bill(
        &self,
        bill_id: &str,
        reviewer: &Actor,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> LifecycleResult<Bill> {
        let mut entry = self.entry(bill_id)?;
        let bill = entry.value_mut();

        if bill.bill_status != BillStatus::PendingApproval {
            return Err(LifecycleError::IllegalState(format!(
                "cannot reject bill in {:?}",
                bill.bill_status
            )));
        }
        bill.bill_status = BillStatus::Issued;
        bill.payment_slip_ref = None;
        bill.payment_slip_uploaded_at = None;

        tracing::info!(
            bill_id = %bill.bill_id,
            manager_id = %reviewer.id,
            reason = reason.as_deref().unwrap_or(""),
            "Bill slip rejected"
        );
        self.events.publish(LifecycleEvent::BillRejected {
            bill_id: bill.bill_id.clone(),
            reason,
            at: now,
        });
        Ok(bill.clone())
    }

    /// Manual settlement at the front desk: PAID directly, bypassing slip
    /// review; penalty frozen at the moment of recording
    pub fn record_cash_payment(
        &self,
        bill_id: &str,
        reviewer: &Actor,
        amount: Decimal,
        now: DateTime<Utc>,
    ) -> LifecycleResult<Bill> {
        if amount <= Decimal::ZERO {
            return Err(LifecycleError::InvalidAmount(format!(
                "cash amount must be positive, got {}",
                amount
            )));
        }

        let mut entry = self.entry(bill_id)?;
        let bill = entry.value_mut();

        if !matches!(bill.bill_status, BillStatus::Issued | BillStatus::Overdue) {
            return Err(LifecycleError::IllegalState(format!(
                "cannot record cash payment for bill in {:?}",
                bill.bill_status
            )));
        }
        freeze_payment(bill, now);

        tracing::info!(
            bill_id = %bill.bill_id,
            manager_id = %reviewer.id,
            amount = %amount,
            total = %bill.paid_total_amount.unwrap_or_default(),
            "Cash payment recorded"
        );
        self.events.publish(LifecycleEvent::BillPaid {
            bill_id: bill.bill_id.clone(),
            at: now,
        });
        Ok(bill.clone())
    }

    /// Void a draft or issued bill (data-entry mistakes); terminal
    pub fn cancel_bill(
        &self,
        bill_id: &str,
        reviewer: &Actor,
        reason: Option<String>,
    ) -> LifecycleResult<Bill> {
        let mut entry = self.entry(bill_id)?;
        let bill = entry.value_mut();

        if !matches!(bill.bill_status, BillStatus::Draft | BillStatus::Issued) {
            return Err(LifecycleError::IllegalState(format!(
                "cannot cancel bill in {:?}",
                bill.bill_status
            )));
        }
        bill.bill_status = BillStatus::Cancelled;

        tracing::info!(
            bill_id = %bill.bill_id,
            manager_id = %reviewer.id,
            reason = reason.as_deref().unwrap_or(""),
            "Bill cancelled"
        );
        Ok(bill.clone())
    }

    pub fn get_bill(&self, bill_id: &str) -> LifecycleResult<Bill> {
        self.bills
            .get(bill_id)
            .map(|b| b.clone())
            .ok_or_else(|| LifecycleError::BillNotFound(bill_id.to_string()))
    }

    /// Bill with the live (or frozen) penalty applied as of `now`
    pub fn view_bill(&self, bill_id: &str, now: DateTime<Utc>) -> LifecycleResult<BillView> {
        let bill = self.get_bill(bill_id)?;
        Ok(penalty::overdue_view(&bill, now))
    }

    /// All bills as penalty views, newest billing period first
    pub fn list_views(&self, now: DateTime<Utc>) -> Vec<BillView> {
        let mut views: Vec<BillView> = self
            .bills
            .iter()
            .map(|entry| penalty::overdue_view(entry.value(), now))
            .collect();
        views.sort_by(|a, b| {
            (b.bill.bill_year, b.bill.bill_month).cmp(&(a.bill.bill_year, a.bill.bill_month))
        });
        views
    }

    /// Persist the OVERDUE decoration for issued bills past their due date.
    ///
    /// Bills under review keep their stored status (the slip must not be
    /// lost); readers see them decorated anyway. Returns how many bills this
    /// pass flipped.
    pub fn sweep_overdue(&self, now: DateTime<Utc>) -> usize {
        let ids: Vec<String> = self.bills.iter().map(|e| e.key().clone()).collect();
        let mut flipped = 0;
        for id in ids {
            let Some(mut entry) = self.bills.get_mut(&id) else {
                continue;
            };
            let bill = entry.value_mut();
            if bill.bill_status != BillStatus::Issued {
                continue;
            }
            let days = penalty::penalty_days(bill.due_date, now);
            if days == 0 {
                continue;
            }
            bill.bill_status = BillStatus::Overdue;
            flipped += 1;

            tracing::info!(
                bill_id = %bill.bill_id,
                penalty_days = days,
                "Bill marked overdue"
            );
            self.events.publish(LifecycleEvent::BillOverdue {
                bill_id: bill.bill_id.clone(),
                penalty_days: days,
                at: now,
            });
        }
        flipped
    }

    fn entry(
        &self,
        bill_id: &str,
    ) -> LifecycleResult<dashmap::mapref::one::RefMut<'_, String, Bill>> {
        self.bills
            .get_mut(bill_id)
            .ok_or_else(|| LifecycleError::BillNotFound(bill_id.to_string()))
    }
}

/// Set `paid_date` and freeze the penalty at the value the shared view
/// computes right now; later reads ignore elapsed time
fn freeze_payment(bill: &mut Bill, now: DateTime<Utc>) {
    let view = penalty::overdue_view(bill, now);
    bill.bill_status = BillStatus::Paid;
    bill.paid_date = Some(now);
    bill.paid_penalty_days = Some(view.penalty_days);
    bill.paid_penalty_amount = Some(view.penalty_amount);
    bill.paid_total_amount = Some(view.total_amount);
}

/// Students may only touch their own bills; staff may act on any
fn ensure_owner(bill: &Bill, actor: &Actor) -> LifecycleResult<()> {
    if actor.role == Role::Student && actor.id != bill.member_id {
        return Err(LifecycleError::Unauthorized(format!(
            "member {} does not own bill {}",
            actor.id, bill.bill_id
        )));
    }
    Ok(())
}
