//! HTTP API routes

pub mod auth;
pub mod authors;
pub mod books;
pub mod extract;
pub mod health;
pub mod orders;

use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Create the full router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health_check))
        .merge(auth::router(state.clone()))
        .merge(authors::router())
        .merge(books::router())
        .merge(orders::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
