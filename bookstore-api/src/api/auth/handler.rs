//! Registration and login handlers

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{LoginRequest, Role, TokenResponse, User, UserCreate};

use crate::api::extract::ValidJson;
use crate::auth::password;
use crate::db::{NewUser, RepoError};
use crate::error::duplicate_field;
use crate::security_log;
use crate::state::AppState;
use crate::validation::validate_registration;

/// Self-registration; always creates a regular user
pub async fn register(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<UserCreate>,
) -> AppResult<(StatusCode, Json<User>)> {
    validate_registration(&payload)?;

    let users = &state.repos.users;
    if users.find_by_username(&payload.username).await?.is_some() {
        return Err(AppError::new(ErrorCode::UsernameTaken).with_detail("field", "username"));
    }
    if users.find_by_email(&payload.email).await?.is_some() {
        return Err(AppError::new(ErrorCode::EmailTaken).with_detail("field", "email"));
    }

    let password_digest = password::hash(payload.password).await?;

    // The unique constraints still decide a race between two registrations
    let record = users
        .create(NewUser {
            username: payload.username,
            email: payload.email,
            password_digest,
            role: Role::User,
        })
        .await
        .map_err(|e| match e {
            RepoError::Duplicate(field) => duplicate_field(&field),
            other => other.into(),
        })?;

    tracing::info!(user_id = record.id, username = %record.username, "User registered");
    Ok((StatusCode::CREATED, Json(record.into())))
}

/// Exchange username and password for a bearer token
pub async fn login(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let record = state.repos.users.find_by_username(&payload.username).await?;

    // Unknown users still pay for one verification
    let digest = record.as_ref().map(|r| r.password.clone());
    let verified = password::verify(payload.password, digest).await?;

    let Some(user) = record.filter(|_| verified) else {
        security_log!("login_failed", username = payload.username.as_str());
        return Err(AppError::invalid_credentials());
    };

    let ttl = state.tokens.ttl();
    let access_token = state
        .tokens
        .issue(user.id, ttl)
        .map_err(|e| AppError::internal(format!("Failed to issue token: {e}")))?;

    tracing::info!(user_id = user.id, "User logged in");
    Ok(Json(TokenResponse::bearer(access_token, ttl.num_seconds())))
}
