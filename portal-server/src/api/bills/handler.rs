//! Bill API Handlers
//!
//! All amounts returned to clients come from the shared penalty view, so a
//! bill detail, the dashboard list, and the value frozen at payment can
//! never disagree.

use axum::{
    Json,
    extract::{Path, State},
};
use chrono::Utc;
use validator::Validate;

use crate::auth::CurrentActor;
use crate::core::ServerState;
use crate::utils::{AppError, AppResult};
use shared::models::{Bill, BillCreate, BillView, CashPayment, ReasonPayload, Role, SlipUpload};

/// POST /api/bills - draft a monthly bill
pub async fn issue(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Json(payload): Json<BillCreate>,
) -> AppResult<Json<Bill>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    let bill = state.approvals.issue_bill(&actor, &payload)?;
    Ok(Json(bill))
}

/// GET /api/bills - list bills with live penalty (students see only their own)
pub async fn list(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
) -> AppResult<Json<Vec<BillView>>> {
    let mut views = state.bills.list_views(Utc::now());
    if actor.role == Role::Student {
        views.retain(|v| v.bill.member_id == actor.id);
    }
    Ok(Json(views))
}

/// GET /api/bills/:id - fetch one bill with live (or frozen) penalty
pub async fn get_by_id(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
) -> AppResult<Json<BillView>> {
    let view = state.bills.view_bill(&id, Utc::now())?;
    if actor.role == Role::Student && view.bill.member_id != actor.id {
        return Err(AppError::permission_denied("Not your bill"));
    }
    Ok(Json(view))
}

/// POST /api/bills/:id/finalize - promote a draft to issued
pub async fn finalize(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
) -> AppResult<Json<Bill>> {
    let bill = state.approvals.finalize_bill(&id, &actor, Utc::now())?;
    Ok(Json(bill))
}

/// POST /api/bills/:id/slip - upload a payment slip
pub async fn upload_slip(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
    Json(payload): Json<SlipUpload>,
) -> AppResult<Json<Bill>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    let bill = state
        .bills
        .upload_slip(&id, &actor, &payload.slip_ref, Utc::now())?;
    Ok(Json(bill))
}

/// POST /api/bills/:id/approve - approve the slip, bill becomes paid
pub async fn approve(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
) -> AppResult<Json<Bill>> {
    let bill = state.approvals.approve_bill(&id, &actor, Utc::now())?;
    Ok(Json(bill))
}

/// POST /api/bills/:id/reject - reject the slip, bill back to issued
pub async fn reject(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
    Json(payload): Json<ReasonPayload>,
) -> AppResult<Json<Bill>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    let bill = state
        .approvals
        .reject_bill(&id, &actor, payload.reason, Utc::now())?;
    Ok(Json(bill))
}

/// POST /api/bills/:id/cash - record a front-desk cash settlement
pub async fn record_cash(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
    Json(payload): Json<CashPayment>,
) -> AppResult<Json<Bill>> {
    let bill = state
        .approvals
        .record_cash_payment(&id, &actor, payload.amount, Utc::now())?;
    Ok(Json(bill))
}

/// POST /api/bills/:id/cancel - void a draft or issued bill
pub async fn cancel(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
    Json(payload): Json<ReasonPayload>,
) -> AppResult<Json<Bill>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    let bill = state.approvals.cancel_bill(&id, &actor, payload.reason)?;
    Ok(Json(bill))
}
