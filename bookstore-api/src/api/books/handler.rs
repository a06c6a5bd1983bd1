//! Book API Handlers

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{BookCreate, BookDetail, BookFilter, BookPage, BookUpdate};

use crate::api::extract::{ValidJson, ValidPath, ValidQuery};
use crate::auth::AdminUser;
use crate::db::{Page, RepoError};
use crate::state::AppState;
use crate::validation::{validate_book_create, validate_book_update, validate_page};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
    pub author_id: Option<i64>,
}

fn default_limit() -> i64 {
    20
}

fn book_not_found(id: i64) -> AppError {
    AppError::new(ErrorCode::BookNotFound).with_detail("book_id", id)
}

/// List books, optionally filtered by author
pub async fn list(
    State(state): State<AppState>,
    ValidQuery(query): ValidQuery<ListQuery>,
) -> AppResult<Json<BookPage>> {
    validate_page(query.limit, query.offset)?;
    let (items, total) = state
        .repos
        .books
        .list(
            BookFilter {
                author_id: query.author_id,
            },
            Page {
                offset: query.offset,
                limit: query.limit,
            },
        )
        .await?;
    Ok(Json(BookPage {
        items,
        total,
        limit: query.limit,
        offset: query.offset,
    }))
}

/// Get book by id
pub async fn get_by_id(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<i64>,
) -> AppResult<Json<BookDetail>> {
    let book = state
        .repos
        .books
        .find_by_id(id)
        .await?
        .ok_or_else(|| book_not_found(id))?;
    Ok(Json(book))
}

/// Create a book (admin)
pub async fn create(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    ValidJson(payload): ValidJson<BookCreate>,
) -> AppResult<(StatusCode, Json<BookDetail>)> {
    validate_book_create(&payload)?;

    if state.repos.authors.find_by_id(payload.author_id).await?.is_none() {
        return Err(unknown_author(payload.author_id));
    }

    // The author may vanish between the check and the insert
    let book = state
        .repos
        .books
        .create(&payload)
        .await
        .map_err(|e| match e {
            RepoError::ForeignKey(_) => unknown_author(payload.author_id),
            other => other.into(),
        })?;

    tracing::info!(book_id = book.book.id, admin_id = admin.id, "Book created");
    Ok((StatusCode::CREATED, Json(book)))
}

fn unknown_author(author_id: i64) -> AppError {
    AppError::new(ErrorCode::UnknownAuthor).with_detail("author_id", author_id)
}

/// Partially update a book (admin); absent fields keep their values
pub async fn update(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    ValidPath(id): ValidPath<i64>,
    ValidJson(payload): ValidJson<BookUpdate>,
) -> AppResult<Json<BookDetail>> {
    validate_book_update(&payload)?;

    let book = state
        .repos
        .books
        .update(id, &payload)
        .await?
        .ok_or_else(|| book_not_found(id))?;

    tracing::info!(book_id = id, admin_id = admin.id, "Book updated");
    Ok(Json(book))
}

/// Delete a book (admin); refused while orders reference it
pub async fn delete(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    ValidPath(id): ValidPath<i64>,
) -> AppResult<StatusCode> {
    let deleted = state.repos.books.delete(id).await.map_err(|e| match e {
        RepoError::ForeignKey(_) => {
            AppError::new(ErrorCode::BookHasOrders).with_detail("book_id", id)
        }
        other => other.into(),
    })?;

    if !deleted {
        return Err(book_not_found(id));
    }

    tracing::info!(book_id = id, admin_id = admin.id, "Book deleted");
    Ok(StatusCode::NO_CONTENT)
}
