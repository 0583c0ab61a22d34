//! BookingEngine - booking creation, the payment-deadline timer, and every
//! booking/deposit transition
//!
//! # Timer semantics
//!
//! The 60-minute payment window is a stored timestamp, not a live timer.
//! Every operation (reads included) first reconciles an elapsed deadline
//! before doing anything else, so a booking whose deadline passed while no
//! scheduled callback fired (process restart, missed tick) self-heals on the
//! next touch. The background sweeper only accelerates this.
//!
//! # Atomicity
//!
//! Each operation holds the booking's map entry guard across the
//! check-and-write, so racing transitions serialize per booking: exactly one
//! of "deposit approved" and "auto-cancelled" can win, never both.

use super::error::{LifecycleError, LifecycleResult};
use super::events::{EventSink, LifecycleEvent};
use super::rooms::RoomCatalog;
use super::state::{self, BookingAction, BookingPhase, BookingState};
use crate::utils::time as time_util;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use rust_decimal::Decimal;
use shared::models::{Actor, Booking, BookingCreate, BookingStatus, DepositStatus, Role, RoomStatus};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Payment window for the deposit slip, in minutes
pub const PAYMENT_WINDOW_MINUTES: i64 = 60;

/// Minimum stay, in calendar months
pub const MIN_STAY_MONTHS: u32 = 3;

/// Reason recorded on timer-driven cancellation, surfaced to the student
/// verbatim
pub const AUTO_CANCEL_REASON: &str = "auto-cancelled: payment deadline exceeded";

/// BookingEngine for booking/deposit command processing
pub struct BookingEngine {
    bookings: DashMap<String, Booking>,
    rooms: Arc<dyn RoomCatalog>,
    events: EventSink,
}

impl std::fmt::Debug for BookingEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BookingEngine")
            .field("bookings", &self.bookings.len())
            .finish()
    }
}

impl BookingEngine {
    pub fn new(rooms: Arc<dyn RoomCatalog>, events: EventSink) -> Self {
        Self {
            bookings: DashMap::new(),
            rooms,
            events,
        }
    }

    /// Subscribe to lifecycle event broadcasts
    pub fn subscribe(&self) -> broadcast::Receiver<LifecycleEvent> {
        self.events.subscribe()
    }

    /// Create a booking against an available room.
    ///
    /// Re-validates the date invariants even if a client bypassed form
    /// checks, reserves the room with a conditional update (a lost race is
    /// `RoomUnavailable`, never a blind retry), and starts the payment
    /// window.
    pub fn create_booking(
        &self,
        actor: &Actor,
        payload: &BookingCreate,
        now: DateTime<Utc>,
    ) -> LifecycleResult<Booking> {
        if payload.check_out_date <= payload.check_in_date {
            return Err(LifecycleError::InvalidDateRange(
                "check-out must be after check-in".to_string(),
            ));
        }
        if !time_util::min_stay_satisfied(
            payload.check_in_date,
            payload.check_out_date,
            MIN_STAY_MONTHS,
        ) {
            return Err(LifecycleError::InvalidDateRange(format!(
                "minimum stay is {} calendar months",
                MIN_STAY_MONTHS
            )));
        }

        let room = self.rooms.get_room(&payload.room_id)?;

        // Conditional update: "set RESERVED where AVAILABLE". Losing this
        // race means the room was taken between the search and the click.
        let reserved =
            self.rooms
                .set_status(&payload.room_id, RoomStatus::Reserved, RoomStatus::Available)?;
        if !reserved {
            return Err(LifecycleError::RoomUnavailable(format!(
                "room {} is not available",
                payload.room_id
            )));
        }

        let months = time_util::billed_months(payload.check_in_date, payload.check_out_date);
        let booking = Booking {
            booking_id: uuid::Uuid::new_v4().to_string(),
            room_id: payload.room_id.clone(),
            member_id: actor.id.clone(),
            check_in_date: payload.check_in_date,
            check_out_date: payload.check_out_date,
            total_price: Decimal::from(months) * room.monthly_rate,
            remarks: payload.remarks.clone(),
            booking_status: BookingStatus::Pending,
            deposit_status: DepositStatus::None,
            booking_date: now,
            payment_deadline: now + Duration::minutes(PAYMENT_WINDOW_MINUTES),
            payment_slip_ref: None,
            payment_slip_uploaded_at: None,
            manager_id: None,
            manager_approved_at: None,
            status_reason: None,
        };

        self.bookings
            .insert(booking.booking_id.clone(), booking.clone());

        tracing::info!(
            booking_id = %booking.booking_id,
            room_id = %booking.room_id,
            member_id = %booking.member_id,
            total_price = %booking.total_price,
            payment_deadline = %booking.payment_deadline,
            "Booking created, room reserved"
        );
        self.events.publish(LifecycleEvent::BookingCreated {
            booking_id: booking.booking_id.clone(),
            room_id: booking.room_id.clone(),
            member_id: booking.member_id.clone(),
            at: now,
        });

        Ok(booking)
    }

    /// Upload the deposit payment slip.
    ///
    /// Legal only while the booking is still awaiting its deposit and the
    /// payment window is open. An elapsed deadline cancels the booking right
    /// here and reports `DeadlineExpired`.
    pub fn upload_payment_slip(
        &self,
        booking_id: &str,
        actor: &Actor,
        slip_ref: &str,
        now: DateTime<Utc>,
    ) -> LifecycleResult<Booking> {
        let mut entry = self.entry(booking_id)?;
        let booking = entry.value_mut();
        ensure_owner(booking, actor)?;

        if self.reconcile_deadline(booking, now) {
            return Err(LifecycleError::DeadlineExpired);
        }

        let next = state::apply(BookingState::of(booking), BookingAction::UploadSlip)?;
        set_state(booking, next);
        booking.payment_slip_ref = Some(slip_ref.to_string());
        booking.payment_slip_uploaded_at = Some(now);

        tracing::info!(booking_id = %booking.booking_id, "Deposit slip uploaded");
        self.events.publish(LifecycleEvent::SlipUploaded {
            booking_id: booking.booking_id.clone(),
            at: now,
        });
        Ok(booking.clone())
    }

    /// Timer-driven auto-cancellation; also invoked lazily on every read.
    ///
    /// Idempotent: returns `Ok(true)` exactly once, when this call performed
    /// the cancellation; any later (or premature) call is a successful
    /// no-op, tolerating legitimate progress in between.
    pub fn expire_if_unpaid(&self, booking_id: &str, now: DateTime<Utc>) -> LifecycleResult<bool> {
        let mut entry = self.entry(booking_id)?;
        Ok(self.reconcile_deadline(entry.value_mut(), now))
    }

    /// Cancel a pending booking (student, or staff on their behalf)
    pub fn cancel_booking(
        &self,
        booking_id: &str,
        actor: &Actor,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> LifecycleResult<Booking> {
        let mut entry = self.entry(booking_id)?;
        let booking = entry.value_mut();
        ensure_owner(booking, actor)?;
        self.reconcile_deadline(booking, now);

        let next = state::apply(BookingState::of(booking), BookingAction::Cancel)?;
        set_state(booking, next);
        booking.status_reason = reason.clone();
        self.release_room(&booking.room_id);

        tracing::info!(
            booking_id = %booking.booking_id,
            actor_id = %actor.id,
            reason = reason.as_deref().unwrap_or(""),
            "Booking cancelled"
        );
        self.events.publish(LifecycleEvent::BookingCancelled {
            booking_id: booking.booking_id.clone(),
            reason,
            at: now,
        });
        Ok(booking.clone())
    }

    /// Confirm the deposit slip (reviewer op, gated by the approval
    /// workflow). Does not by itself approve the booking.
    pub fn approve_deposit(
        &self,
        booking_id: &str,
        reviewer: &Actor,
        now: DateTime<Utc>,
    ) -> LifecycleResult<Booking> {
        let mut entry = self.entry(booking_id)?;
        let booking = entry.value_mut();
        self.reconcile_deadline(booking, now);

        let next = state::apply(BookingState::of(booking), BookingAction::ApproveDeposit)?;
        set_state(booking, next);

        tracing::info!(
            booking_id = %booking.booking_id,
            manager_id = %reviewer.id,
            "Deposit approved"
        );
        self.events.publish(LifecycleEvent::DepositPaid {
            booking_id: booking.booking_id.clone(),
            manager_id: reviewer.id.clone(),
            at: now,
        });
        Ok(booking.clone())
    }

    /// Reject the deposit slip: back to no deposit, slip cleared.
    ///
    /// The original `payment_deadline` is NOT extended; a rejected slip does
    /// not buy extra time, and the booking may still expire independently.
    pub fn reject_deposit(
        &self,
        booking_id: &str,
        reviewer: &Actor,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> LifecycleResult<Booking> {
        let mut entry = self.entry(booking_id)?;
        let booking = entry.value_mut();
        self.reconcile_deadline(booking, now);

        let next = state::apply(BookingState::of(booking), BookingAction::RejectDeposit)?;
        set_state(booking, next);
        booking.payment_slip_ref = None;
        booking.payment_slip_uploaded_at = None;

        tracing::info!(
            booking_id = %booking.booking_id,
            manager_id = %reviewer.id,
            reason = reason.as_deref().unwrap_or(""),
            "Deposit slip rejected"
        );
        self.events.publish(LifecycleEvent::DepositRejected {
            booking_id: booking.booking_id.clone(),
            manager_id: reviewer.id.clone(),
            reason,
            at: now,
        });
        Ok(booking.clone())
    }

    /// Approve the booking; requires a paid deposit. Room goes to OCCUPIED.
    pub fn approve_booking(
        &self,
        booking_id: &str,
        reviewer: &Actor,
        now: DateTime<Utc>,
    ) -> LifecycleResult<Booking> {
        let mut entry = self.entry(booking_id)?;
        let booking = entry.value_mut();
        self.reconcile_deadline(booking, now);

        let next = state::apply(BookingState::of(booking), BookingAction::ApproveBooking)?;
        set_state(booking, next);
        booking.manager_id = Some(reviewer.id.clone());
        booking.manager_approved_at = Some(now);

        match self
            .rooms
            .set_status(&booking.room_id, RoomStatus::Occupied, RoomStatus::Reserved)
        {
            Ok(true) => {}
            Ok(false) => tracing::warn!(
                booking_id = %booking.booking_id,
                room_id = %booking.room_id,
                "Room was not RESERVED at booking approval; catalog drifted"
            ),
            Err(e) => tracing::warn!(
                booking_id = %booking.booking_id,
                room_id = %booking.room_id,
                error = %e,
                "Failed to mark room OCCUPIED"
            ),
        }

        tracing::info!(
            booking_id = %booking.booking_id,
            manager_id = %reviewer.id,
            "Booking approved, room occupied"
        );
        self.events.publish(LifecycleEvent::BookingApproved {
            booking_id: booking.booking_id.clone(),
            manager_id: reviewer.id.clone(),
            at: now,
        });
        Ok(booking.clone())
    }

    /// Reject the booking from any non-terminal state; room is released
    pub fn reject_booking(
        &self,
        booking_id: &str,
        reviewer: &Actor,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> LifecycleResult<Booking> {
        let mut entry = self.entry(booking_id)?;
        let booking = entry.value_mut();
        self.reconcile_deadline(booking, now);

        let next = state::apply(BookingState::of(booking), BookingAction::RejectBooking)?;
        set_state(booking, next);
        booking.manager_id = Some(reviewer.id.clone());
        booking.manager_approved_at = Some(now);
        booking.status_reason = reason.clone();
        self.release_room(&booking.room_id);

        tracing::info!(
            booking_id = %booking.booking_id,
            manager_id = %reviewer.id,
            reason = reason.as_deref().unwrap_or(""),
            "Booking rejected"
        );
        self.events.publish(LifecycleEvent::BookingRejected {
            booking_id: booking.booking_id.clone(),
            manager_id: reviewer.id.clone(),
            reason,
            at: now,
        });
        Ok(booking.clone())
    }

    /// Move-out: mark an approved stay finished, room back to AVAILABLE
    pub fn complete_booking(
        &self,
        booking_id: &str,
        reviewer: &Actor,
        now: DateTime<Utc>,
    ) -> LifecycleResult<Booking> {
        let mut entry = self.entry(booking_id)?;
        let booking = entry.value_mut();

        let next = state::apply(BookingState::of(booking), BookingAction::Complete)?;
        set_state(booking, next);
        self.release_room(&booking.room_id);

        tracing::info!(
            booking_id = %booking.booking_id,
            manager_id = %reviewer.id,
            "Booking completed, room released"
        );
        self.events.publish(LifecycleEvent::BookingCompleted {
            booking_id: booking.booking_id.clone(),
            at: now,
        });
        Ok(booking.clone())
    }

    /// Fetch a booking, reconciling an elapsed deadline first so stale
    /// dashboards self-heal on read
    pub fn get_booking(&self, booking_id: &str, now: DateTime<Utc>) -> LifecycleResult<Booking> {
        let mut entry = self.entry(booking_id)?;
        let booking = entry.value_mut();
        self.reconcile_deadline(booking, now);
        Ok(booking.clone())
    }

    /// All bookings, deadline-reconciled, newest first
    pub fn list_bookings(&self, now: DateTime<Utc>) -> Vec<Booking> {
        let ids: Vec<String> = self.bookings.iter().map(|e| e.key().clone()).collect();
        let mut bookings: Vec<Booking> = ids
            .iter()
            .filter_map(|id| self.get_booking(id, now).ok())
            .collect();
        bookings.sort_by(|a, b| b.booking_date.cmp(&a.booking_date));
        bookings
    }

    /// Expire every booking whose window has elapsed; returns how many were
    /// cancelled by this pass
    pub fn sweep_expired(&self, now: DateTime<Utc>) -> usize {
        let ids: Vec<String> = self.bookings.iter().map(|e| e.key().clone()).collect();
        ids.iter()
            .filter(|id| self.expire_if_unpaid(id, now).unwrap_or(false))
            .count()
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn entry(
        &self,
        booking_id: &str,
    ) -> LifecycleResult<dashmap::mapref::one::RefMut<'_, String, Booking>> {
        self.bookings
            .get_mut(booking_id)
            .ok_or_else(|| LifecycleError::BookingNotFound(booking_id.to_string()))
    }

    /// Lazily reconcile the payment deadline while holding the entry guard.
    ///
    /// Returns `true` when this call performed the auto-cancellation; any
    /// other state (window still open, slip uploaded, already terminal) is a
    /// no-op.
    fn reconcile_deadline(&self, booking: &mut Booking, now: DateTime<Utc>) -> bool {
        let current = BookingState::of(booking);
        if current.phase() != Some(BookingPhase::AwaitingDeposit)
            || now < booking.payment_deadline
        {
            return false;
        }
        let Ok(next) = state::apply(current, BookingAction::Expire) else {
            return false;
        };
        set_state(booking, next);
        booking.status_reason = Some(AUTO_CANCEL_REASON.to_string());
        self.release_room(&booking.room_id);

        tracing::info!(
            booking_id = %booking.booking_id,
            room_id = %booking.room_id,
            payment_deadline = %booking.payment_deadline,
            "Booking auto-cancelled, payment deadline exceeded"
        );
        self.events.publish(LifecycleEvent::BookingExpired {
            booking_id: booking.booking_id.clone(),
            room_id: booking.room_id.clone(),
            at: now,
        });
        true
    }

    /// Release a held room back to AVAILABLE.
    ///
    /// Idempotent and safe to retry: the booking transition has already
    /// committed, so a failed release is logged, not propagated.
    fn release_room(&self, room_id: &str) {
        for held in [RoomStatus::Reserved, RoomStatus::Occupied] {
            match self.rooms.set_status(room_id, RoomStatus::Available, held) {
                Ok(true) => return,
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(room_id = %room_id, error = %e, "Failed to release room");
                    return;
                }
            }
        }
        tracing::debug!(room_id = %room_id, "Room already released");
    }
}

fn set_state(booking: &mut Booking, next: BookingState) {
    booking.booking_status = next.status;
    booking.deposit_status = next.deposit;
}

/// Students may only touch their own bookings; staff may act on any
fn ensure_owner(booking: &Booking, actor: &Actor) -> LifecycleResult<()> {
    if actor.role == Role::Student && actor.id != booking.member_id {
        return Err(LifecycleError::Unauthorized(format!(
            "member {} does not own booking {}",
            actor.id, booking.booking_id
        )));
    }
    Ok(())
}
