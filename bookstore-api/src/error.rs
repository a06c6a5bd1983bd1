//! Repository error to API error mapping
//!
//! `RepoError` carries storage-level detail; `AppError` is what clients see.
//! The `From` impl lets handlers and services use `?` on repository calls.
//! Call sites that know more context (which foreign key, which unique field)
//! match on the `RepoError` first and fall back to this mapping.

use shared::error::{AppError, ErrorCode};

use crate::db::RepoError;

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::NotFound(what) => AppError::not_found(what),
            RepoError::Duplicate(field) => duplicate_field(&field),
            RepoError::ForeignKey(constraint) => {
                tracing::warn!(constraint = %constraint, "Foreign key violation");
                AppError::invalid_request("Referenced resource does not exist")
            }
            RepoError::LockTimeout => {
                tracing::warn!("Row lock wait exceeded");
                AppError::new(ErrorCode::SystemBusy)
            }
            RepoError::Database(msg) => {
                tracing::error!(error = %msg, "Repository database error");
                AppError::new(ErrorCode::DatabaseError)
            }
        }
    }
}

/// Map a unique-constraint field onto its client-facing code
pub fn duplicate_field(field: &str) -> AppError {
    let code = match field {
        "username" => ErrorCode::UsernameTaken,
        "email" => ErrorCode::EmailTaken,
        "name" => ErrorCode::AuthorNameExists,
        _ => ErrorCode::AlreadyExists,
    };
    AppError::new(code).with_detail("field", field)
}
