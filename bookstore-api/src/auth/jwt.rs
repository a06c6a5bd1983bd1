//! Access token service
//!
//! Issues and verifies HMAC-signed JWTs whose subject is a user id.
//! Tokens cannot be revoked; expiry is the only way a session ends.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const ISSUER: &str = "bookstore-api";

/// Claims carried by an access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
}

#[derive(Error, Debug)]
pub enum JwtError {
    #[error("token expired")]
    Expired,

    #[error("invalid signature")]
    InvalidSignature,

    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("token generation failed: {0}")]
    GenerationFailed(String),
}

#[derive(Clone)]
pub struct TokenService {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("algorithm", &self.algorithm)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(secret: &str, algorithm: Algorithm, ttl: Duration) -> Self {
        Self {
            algorithm,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    /// Default lifetime for tokens issued at login
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Sign a token for `subject` valid for `ttl`
    pub fn issue(&self, subject: i64, ttl: Duration) -> Result<String, JwtError> {
        let now = Utc::now();
        let claims = Claims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            iss: ISSUER.to_string(),
        };

        encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|e| JwtError::GenerationFailed(e.to_string()))
    }

    /// Verify signature, issuer and expiry; returns the subject
    pub fn verify(&self, token: &str) -> Result<i64, JwtError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;
        validation.set_issuer(&[ISSUER]);
        validation.set_required_spec_claims(&["sub", "exp", "iat", "iss"]);

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::Expired,
                ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                _ => JwtError::Malformed(e.to_string()),
            }
        })?;

        data.claims
            .sub
            .parse()
            .map_err(|_| JwtError::Malformed(format!("non-numeric subject '{}'", data.claims.sub)))
    }

    /// Extract the token from an `Authorization` header value.
    /// The scheme is matched case-insensitively.
    pub fn extract_from_header(header: &str) -> Option<&str> {
        let (scheme, token) = header.split_once(' ')?;
        let token = token.trim();
        (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new(
            "test-secret-that-is-long-enough-for-hmac",
            Algorithm::HS256,
            Duration::minutes(30),
        )
    }

    #[test]
    fn test_subject_round_trip() {
        let tokens = service();
        let token = tokens.issue(42, Duration::minutes(5)).unwrap();
        assert_eq!(tokens.verify(&token).unwrap(), 42);
    }

    #[test]
    fn test_expired_token_rejected() {
        let tokens = service();
        let token = tokens.issue(42, Duration::seconds(-60)).unwrap();
        assert!(matches!(tokens.verify(&token), Err(JwtError::Expired)));
    }

    #[test]
    fn test_other_secret_rejected() {
        let token = service().issue(7, Duration::minutes(5)).unwrap();
        let other = TokenService::new(
            "a-completely-different-secret-value-123",
            Algorithm::HS256,
            Duration::minutes(30),
        );
        assert!(matches!(other.verify(&token), Err(JwtError::InvalidSignature)));
    }

    #[test]
    fn test_tampered_token_rejected() {
        let tokens = service();
        let token = tokens.issue(7, Duration::minutes(5)).unwrap();
        let other = tokens.issue(8, Duration::minutes(5)).unwrap();
        let forged_payload = other.split('.').nth(1).unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        parts[1] = forged_payload;
        assert!(tokens.verify(&parts.join(".")).is_err());
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(matches!(service().verify("not.a.jwt"), Err(JwtError::Malformed(_))));
        assert!(service().verify("").is_err());
    }

    #[test]
    fn test_extract_from_header() {
        assert_eq!(TokenService::extract_from_header("Bearer abc"), Some("abc"));
        assert_eq!(TokenService::extract_from_header("bearer abc"), Some("abc"));
        assert_eq!(TokenService::extract_from_header("Basic abc"), None);
        assert_eq!(TokenService::extract_from_header("Bearer "), None);
        assert_eq!(TokenService::extract_from_header("Bearer"), None);
    }
}
