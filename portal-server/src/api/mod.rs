//! API route modules
//!
//! # Structure
//!
//! - [`health`] - liveness probe
//! - [`bookings`] - booking lifecycle: create, slip upload, cancel, and the
//!   reviewer transitions (deposit/booking approve & reject, complete)
//! - [`bills`] - monthly bill lifecycle: issue, slip upload, approve,
//!   reject, cash settlement

pub mod bills;
pub mod bookings;
pub mod health;

use crate::core::ServerState;
use axum::Router;

/// Assemble the full API router
pub fn router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(bookings::router())
        .merge(bills::router())
}
