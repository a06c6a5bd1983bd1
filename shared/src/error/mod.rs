//! Error taxonomy shared by the server and its clients
//!
//! Codes are grouped by thousands:
//! 0xxx general, 1xxx authentication, 2xxx permission, 3xxx account,
//! 4xxx order, 5xxx catalog, 9xxx system.
//!
//! ```
//! use shared::error::{ApiResponse, AppError, ErrorCode};
//!
//! let err = AppError::new(ErrorCode::InsufficientStock)
//!     .with_detail("available", 4)
//!     .with_detail("requested", 6);
//!
//! assert_eq!(ApiResponse::from(&err).code, 4002);
//! assert_eq!(err.http_status(), http::StatusCode::BAD_REQUEST);
//! ```

mod codes;
mod types;

pub use codes::{ErrorCategory, ErrorCode, InvalidErrorCode};
pub use types::{ApiResponse, AppError, AppResult};
