//! Booking API Handlers
//!
//! Thin layer over the lifecycle engine: payload validation, identity, and
//! ownership filtering. Every read passes through the engine so elapsed
//! payment deadlines self-heal on fetch.

use axum::{
    Json,
    extract::{Path, State},
};
use chrono::Utc;
use validator::Validate;

use crate::auth::CurrentActor;
use crate::core::ServerState;
use crate::utils::{AppError, AppResult};
use shared::models::{Booking, BookingCreate, ReasonPayload, Role, SlipUpload};

/// POST /api/bookings - create a booking for the calling member
pub async fn create(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Json(payload): Json<BookingCreate>,
) -> AppResult<Json<Booking>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    let booking = state.bookings.create_booking(&actor, &payload, Utc::now())?;
    Ok(Json(booking))
}

/// GET /api/bookings - list bookings (students see only their own)
pub async fn list(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
) -> AppResult<Json<Vec<Booking>>> {
    let mut bookings = state.bookings.list_bookings(Utc::now());
    if actor.role == Role::Student {
        bookings.retain(|b| b.member_id == actor.id);
    }
    Ok(Json(bookings))
}

/// GET /api/bookings/:id - fetch one booking, reconciling its deadline
pub async fn get_by_id(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
) -> AppResult<Json<Booking>> {
    let booking = state.bookings.get_booking(&id, Utc::now())?;
    if actor.role == Role::Student && booking.member_id != actor.id {
        return Err(AppError::permission_denied("Not your booking"));
    }
    Ok(Json(booking))
}

/// POST /api/bookings/:id/slip - upload the deposit payment slip
pub async fn upload_slip(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
    Json(payload): Json<SlipUpload>,
) -> AppResult<Json<Booking>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    let booking = state
        .bookings
        .upload_payment_slip(&id, &actor, &payload.slip_ref, Utc::now())?;
    Ok(Json(booking))
}

/// POST /api/bookings/:id/cancel - cancel a pending booking
pub async fn cancel(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
    Json(payload): Json<ReasonPayload>,
) -> AppResult<Json<Booking>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    let booking = state
        .bookings
        .cancel_booking(&id, &actor, payload.reason, Utc::now())?;
    Ok(Json(booking))
}

/// POST /api/bookings/:id/deposit/approve - confirm the deposit slip
pub async fn approve_deposit(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
) -> AppResult<Json<Booking>> {
    let booking = state.approvals.approve_deposit(&id, &actor, Utc::now())?;
    Ok(Json(booking))
}

/// POST /api/bookings/:id/deposit/reject - reject the deposit slip
pub async fn reject_deposit(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
    Json(payload): Json<ReasonPayload>,
) -> AppResult<Json<Booking>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    let booking = state
        .approvals
        .reject_deposit(&id, &actor, payload.reason, Utc::now())?;
    Ok(Json(booking))
}

/// POST /api/bookings/:id/approve - approve the booking (deposit must be paid)
pub async fn approve(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
) -> AppResult<Json<Booking>> {
    let booking = state.approvals.approve_booking(&id, &actor, Utc::now())?;
    Ok(Json(booking))
}

/// POST /api/bookings/:id/reject - reject the booking
pub async fn reject(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
    Json(payload): Json<ReasonPayload>,
) -> AppResult<Json<Booking>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    let booking = state
        .approvals
        .reject_booking(&id, &actor, payload.reason, Utc::now())?;
    Ok(Json(booking))
}

/// POST /api/bookings/:id/complete - mark an approved stay finished
pub async fn complete(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
) -> AppResult<Json<Booking>> {
    let booking = state.approvals.complete_booking(&id, &actor, Utc::now())?;
    Ok(Json(booking))
}
