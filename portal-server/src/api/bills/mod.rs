//! Bill API module

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/bills", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::issue).get(handler::list))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/finalize", post(handler::finalize))
        .route("/{id}/slip", post(handler::upload_slip))
        .route("/{id}/approve", post(handler::approve))
        .route("/{id}/reject", post(handler::reject))
        .route("/{id}/cash", post(handler::record_cash))
        .route("/{id}/cancel", post(handler::cancel))
}
