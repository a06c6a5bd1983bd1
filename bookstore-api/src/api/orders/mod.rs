//! Order API Module

mod handler;

use axum::{Router, routing::get};

use crate::state::AppState;

/// Order router; every route requires an authenticated caller
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", get(handler::list_mine).post(handler::create))
        .route("/orders/{id}", get(handler::get_by_id))
}
