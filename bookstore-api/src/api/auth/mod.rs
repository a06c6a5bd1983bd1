//! Auth API Module

mod handler;

use axum::{Router, middleware, routing::post};

use crate::auth::rate_limit::{login_rate_limit, register_rate_limit};
use crate::state::AppState;

/// Auth router
pub fn router(state: AppState) -> Router<AppState> {
    let register = Router::new()
        .route("/auth/register", post(handler::register))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            register_rate_limit,
        ));

    let login = Router::new()
        .route("/auth/login", post(handler::login))
        .layer(middleware::from_fn_with_state(state, login_rate_limit));

    register.merge(login)
}
