//! Server configuration

use jsonwebtoken::Algorithm;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL, or `memory://` for the in-process store
    pub database_url: String,
    /// HTTP port
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// HMAC secret used to sign access tokens
    pub jwt_secret: String,
    /// Token signing algorithm (HS256 / HS384 / HS512)
    pub jwt_algorithm: Algorithm,
    /// Access token lifetime in minutes
    pub access_token_expire_minutes: i64,
    /// Maximum pooled database connections
    pub db_max_connections: u32,
    /// Upper bound on waiting for a book row lock during order placement
    pub order_lock_timeout_ms: u64,
    /// Emit logs as JSON lines
    pub log_json: bool,
    /// Per-IP throttling of login and registration
    pub rate_limit_enabled: bool,
    /// Key rate limits on `X-Forwarded-For`; only safe behind a proxy that sets it
    pub trust_proxy_headers: bool,
}

/// Longest accepted access token lifetime: one year
pub const MAX_TOKEN_MINUTES: i64 = 525_600;

impl Config {
    /// Require a secret env var: must be set and non-empty in non-development environments.
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                format!("dev-{name}-not-for-production-use-only")
            }
        };
        if environment != "development" && val.len() < 32 {
            return Err(format!("{name} must be at least 32 characters long").into());
        }
        Ok(val)
    }

    fn parse_or<T: std::str::FromStr>(name: &str, default: T) -> Result<T, BoxError> {
        match std::env::var(name) {
            Ok(raw) if !raw.trim().is_empty() => raw
                .trim()
                .parse()
                .map_err(|_| format!("{name} has an invalid value: {raw}").into()),
            _ => Ok(default),
        }
    }

    /// Token lifetime must be positive and at most [`MAX_TOKEN_MINUTES`]
    pub fn check_token_minutes(minutes: i64) -> Result<i64, BoxError> {
        if (1..=MAX_TOKEN_MINUTES).contains(&minutes) {
            Ok(minutes)
        } else {
            Err(format!(
                "ACCESS_TOKEN_EXPIRE_MINUTES must be between 1 and {MAX_TOKEN_MINUTES}, got {minutes}"
            )
            .into())
        }
    }

    /// Parse a signing algorithm name; only HMAC variants are accepted
    pub fn parse_algorithm(raw: &str) -> Result<Algorithm, BoxError> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "HS256" => Ok(Algorithm::HS256),
            "HS384" => Ok(Algorithm::HS384),
            "HS512" => Ok(Algorithm::HS512),
            other => Err(format!("unsupported JWT_ALGORITHM: {other}").into()),
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let jwt_algorithm = match std::env::var("JWT_ALGORITHM") {
            Ok(raw) => Self::parse_algorithm(&raw)?,
            Err(_) => Algorithm::HS256,
        };

        Ok(Self {
            database_url: std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?,
            http_port: Self::parse_or("HTTP_PORT", 8000)?,
            jwt_secret: Self::require_secret("JWT_SECRET", &environment)?,
            environment,
            jwt_algorithm,
            access_token_expire_minutes: Self::check_token_minutes(Self::parse_or(
                "ACCESS_TOKEN_EXPIRE_MINUTES",
                30,
            )?)?,
            db_max_connections: Self::parse_or("DB_MAX_CONNECTIONS", 10)?,
            order_lock_timeout_ms: Self::parse_or("ORDER_LOCK_TIMEOUT_MS", 5000)?,
            log_json: std::env::var("LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
            rate_limit_enabled: Self::parse_or("RATE_LIMIT_ENABLED", true)?,
            trust_proxy_headers: Self::parse_or("TRUST_PROXY_HEADERS", false)?,
        })
    }

    /// True when the in-process store is requested
    pub fn uses_memory_store(&self) -> bool {
        self.database_url.starts_with("memory:")
    }

    /// Configuration for tests and local experiments: in-memory store, no throttling
    pub fn for_memory() -> Self {
        Self {
            database_url: "memory://".to_string(),
            http_port: 0,
            environment: "development".to_string(),
            jwt_secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            jwt_algorithm: Algorithm::HS256,
            access_token_expire_minutes: 30,
            db_max_connections: 1,
            order_lock_timeout_ms: 5000,
            log_json: false,
            rate_limit_enabled: false,
            trust_proxy_headers: false,
        }
    }
}
