//! bookstore-api: REST backend for a bookstore
//!
//! Authors, books, user accounts and orders over PostgreSQL (or an in-process
//! store), with bearer-token authentication and admin-gated writes. Order
//! placement checks and decrements stock under a per-book row lock.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod services;
pub mod state;
pub mod validation;

pub use config::Config;
pub use state::AppState;

/// Security event log, emitted at `warn` under the `security` target
#[macro_export]
macro_rules! security_log {
    ($event:expr, $($key:ident = $value:expr),* $(,)?) => {
        tracing::warn!(
            target: "security",
            event = $event,
            $($key = $value),*
        );
    };
}
