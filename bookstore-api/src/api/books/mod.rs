//! Book API Module

mod handler;

use axum::{Router, routing::get};

use crate::state::AppState;

/// Book router; writes are gated by the `AdminUser` extractor
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/books", get(handler::list).post(handler::create))
        .route(
            "/books/{id}",
            get(handler::get_by_id)
                .patch(handler::update)
                .delete(handler::delete),
        )
}
