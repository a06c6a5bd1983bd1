//! Author API Handlers

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{Author, AuthorCreate, AuthorWithBooks};

use crate::api::extract::{ValidJson, ValidPath, ValidQuery};
use crate::auth::AdminUser;
use crate::db::Page;
use crate::state::AppState;
use crate::validation::{validate_author, validate_page};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    100
}

/// List authors
pub async fn list(
    State(state): State<AppState>,
    ValidQuery(query): ValidQuery<ListQuery>,
) -> AppResult<Json<Vec<Author>>> {
    validate_page(query.limit, query.skip)?;
    let authors = state
        .repos
        .authors
        .list(Page {
            offset: query.skip,
            limit: query.limit,
        })
        .await?;
    Ok(Json(authors))
}

/// Get author with their books
pub async fn get_by_id(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<i64>,
) -> AppResult<Json<AuthorWithBooks>> {
    let author = state
        .repos
        .authors
        .find_with_books(id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::AuthorNotFound).with_detail("author_id", id))?;
    Ok(Json(author))
}

/// Create an author (admin)
pub async fn create(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    ValidJson(payload): ValidJson<AuthorCreate>,
) -> AppResult<(StatusCode, Json<Author>)> {
    validate_author(&payload)?;

    if state.repos.authors.find_by_name(&payload.name).await?.is_some() {
        return Err(AppError::new(ErrorCode::AuthorNameExists).with_detail("field", "name"));
    }

    let author = state.repos.authors.create(&payload).await?;
    tracing::info!(author_id = author.id, admin_id = admin.id, "Author created");
    Ok((StatusCode::CREATED, Json(author)))
}
