//! Shared types for the bookstore service
//!
//! Error taxonomy and data models used by the API server, its tests and clients.

pub mod error;
pub mod models;

// Re-exports
pub use error::{ApiResponse, AppError, AppResult, ErrorCode};
pub use http;
pub use serde::{Deserialize, Serialize};
