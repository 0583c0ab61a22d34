//! Booking API module

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/bookings", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::create).get(handler::list))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/slip", post(handler::upload_slip))
        .route("/{id}/cancel", post(handler::cancel))
        .route("/{id}/deposit/approve", post(handler::approve_deposit))
        .route("/{id}/deposit/reject", post(handler::reject_deposit))
        .route("/{id}/approve", post(handler::approve))
        .route("/{id}/reject", post(handler::reject))
        .route("/{id}/complete", post(handler::complete))
}
