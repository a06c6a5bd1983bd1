//! Authentication
//!
//! - [`password`]: Argon2 hashing and verification
//! - [`jwt`]: access token issue/verify
//! - [`extractor`]: `CurrentUser` / `AdminUser` request extractors
//! - [`rate_limit`]: per-IP throttling of login and registration

pub mod extractor;
pub mod jwt;
pub mod password;
pub mod rate_limit;

pub use extractor::{AdminUser, CurrentUser};
pub use jwt::{Claims, JwtError, TokenService};
pub use rate_limit::RateLimiter;
