//! Authentication extractors
//!
//! `CurrentUser` validates the bearer token and resolves its subject on every
//! request; `AdminUser` additionally requires the admin role. Both reject
//! before the handler body runs.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use shared::error::{AppError, ErrorCode};
use shared::models::{Role, User};

use super::jwt::{JwtError, TokenService};
use crate::security_log;
use crate::state::AppState;

/// Authenticated caller, freshly loaded from the user store
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    pub fn id(&self) -> i64 {
        self.0.id
    }

    pub fn is_admin(&self) -> bool {
        self.0.role == Role::Admin
    }
}

/// Authenticated caller holding the admin role
#[derive(Debug, Clone)]
pub struct AdminUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        let header = parts
            .headers
            .get(http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        let Some(token) = header.and_then(TokenService::extract_from_header) else {
            security_log!("auth_missing", uri = parts.uri.path());
            return Err(AppError::not_authenticated());
        };

        let subject = state.tokens.verify(token).map_err(|e| {
            security_log!("auth_failed", error = e.to_string(), uri = parts.uri.path());
            match e {
                JwtError::Expired => AppError::token_expired(),
                _ => AppError::invalid_token("Could not validate credentials"),
            }
        })?;

        let Some(record) = state.repos.users.find_by_id(subject).await? else {
            security_log!("auth_subject_gone", user_id = subject, uri = parts.uri.path());
            return Err(AppError::new(ErrorCode::SubjectNotFound));
        };

        let user = CurrentUser(record.into());
        parts.extensions.insert(user.clone());
        Ok(user)
    }
}

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            security_log!(
                "admin_required",
                user_id = user.id(),
                uri = parts.uri.path()
            );
            return Err(AppError::admin_required());
        }
        Ok(AdminUser(user.0))
    }
}
