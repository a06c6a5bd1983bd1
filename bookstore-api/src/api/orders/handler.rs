//! Order API Handlers

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{Order, OrderCreate};

use crate::api::extract::{ValidJson, ValidPath, ValidQuery};
use crate::auth::CurrentUser;
use crate::db::Page;
use crate::services::place_order;
use crate::state::AppState;
use crate::validation::{validate_page, validate_quantity};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    20
}

/// Place an order for the caller
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    ValidJson(payload): ValidJson<OrderCreate>,
) -> AppResult<(StatusCode, Json<Order>)> {
    validate_quantity(payload.quantity)?;

    let order = place_order(
        state.repos.orders.as_ref(),
        user.id(),
        payload.book_id,
        payload.quantity,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// The caller's orders, newest first
pub async fn list_mine(
    State(state): State<AppState>,
    user: CurrentUser,
    ValidQuery(query): ValidQuery<ListQuery>,
) -> AppResult<Json<Vec<Order>>> {
    validate_page(query.limit, query.offset)?;
    let orders = state
        .repos
        .orders
        .list_by_user(
            user.id(),
            Page {
                offset: query.offset,
                limit: query.limit,
            },
        )
        .await?;
    Ok(Json(orders))
}

/// One order; other users' orders are reported as absent unless the caller is admin
pub async fn get_by_id(
    State(state): State<AppState>,
    user: CurrentUser,
    ValidPath(id): ValidPath<i64>,
) -> AppResult<Json<Order>> {
    let order = state
        .repos
        .orders
        .find_by_id(id)
        .await?
        .filter(|order| order.user_id == user.id() || user.is_admin())
        .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound).with_detail("order_id", id))?;
    Ok(Json(order))
}
