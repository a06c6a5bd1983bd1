//! Author API Module

mod handler;

use axum::{Router, routing::get};

use crate::state::AppState;

/// Author router; writes are gated by the `AdminUser` extractor
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/authors", get(handler::list).post(handler::create))
        .route("/authors/{id}", get(handler::get_by_id))
}
