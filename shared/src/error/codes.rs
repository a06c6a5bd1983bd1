//! Error code table
//!
//! Each code is declared once with its numeric value, HTTP status and default
//! message. The thousands digit selects the [`ErrorCategory`].

use http::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! error_codes {
    ($(
        $(#[$attr:meta])*
        $name:ident = $value:literal => $status:ident, $message:literal;
    )*) => {
        /// Numeric error code sent to clients in every error body
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(into = "u16", try_from = "u16")]
        #[repr(u16)]
        pub enum ErrorCode {
            $( $(#[$attr])* $name = $value, )*
        }

        impl ErrorCode {
            /// Every declared code, in table order
            pub const ALL: &'static [ErrorCode] = &[ $( ErrorCode::$name, )* ];

            /// Default English message
            pub const fn message(&self) -> &'static str {
                match self {
                    $( ErrorCode::$name => $message, )*
                }
            }

            /// HTTP status the code is rendered with
            pub fn http_status(&self) -> StatusCode {
                match self {
                    $( ErrorCode::$name => StatusCode::$status, )*
                }
            }
        }

        impl TryFrom<u16> for ErrorCode {
            type Error = InvalidErrorCode;

            fn try_from(value: u16) -> Result<Self, Self::Error> {
                match value {
                    $( $value => Ok(ErrorCode::$name), )*
                    _ => Err(InvalidErrorCode(value)),
                }
            }
        }
    };
}

error_codes! {
    // General
    /// Input failed a field check
    ValidationFailed = 2 => UNPROCESSABLE_ENTITY, "Validation failed";
    NotFound = 3 => NOT_FOUND, "Resource not found";
    AlreadyExists = 4 => CONFLICT, "Resource already exists";
    /// Body or parameters could not be parsed at all
    InvalidRequest = 5 => BAD_REQUEST, "Invalid request";
    ValueOutOfRange = 8 => UNPROCESSABLE_ENTITY, "Value is out of range";

    // Authentication: no credentials is 403, rejected credentials are 401
    NotAuthenticated = 1001 => FORBIDDEN, "Not authenticated";
    InvalidCredentials = 1002 => UNAUTHORIZED, "Incorrect username or password";
    TokenExpired = 1003 => UNAUTHORIZED, "Token has expired";
    TokenInvalid = 1004 => UNAUTHORIZED, "Invalid token";
    /// Token is valid but its user no longer exists
    SubjectNotFound = 1005 => UNAUTHORIZED, "User not found";
    RateLimited = 1008 => TOO_MANY_REQUESTS, "Too many requests, try again later";

    // Permission
    AdminRequired = 2003 => FORBIDDEN, "Admin access required";

    // Account
    UsernameTaken = 3001 => BAD_REQUEST, "Username already registered";
    EmailTaken = 3002 => BAD_REQUEST, "Email already registered";

    // Order
    OrderNotFound = 4001 => NOT_FOUND, "Order not found";
    InsufficientStock = 4002 => BAD_REQUEST, "Not enough stock";
    InvalidQuantity = 4003 => UNPROCESSABLE_ENTITY, "Quantity must be greater than zero";

    // Catalog
    BookNotFound = 5001 => NOT_FOUND, "Book not found";
    AuthorNotFound = 5002 => NOT_FOUND, "Author not found";
    AuthorNameExists = 5003 => BAD_REQUEST, "Author with this name already exists";
    /// Book creation referenced a missing author
    UnknownAuthor = 5004 => BAD_REQUEST, "Author not found";
    BookHasOrders = 5005 => CONFLICT, "Book has existing orders and cannot be deleted";

    // System
    InternalError = 9001 => INTERNAL_SERVER_ERROR, "Internal server error";
    DatabaseError = 9002 => INTERNAL_SERVER_ERROR, "Database error";
    /// Row lock wait exceeded; safe to retry
    SystemBusy = 9404 => SERVICE_UNAVAILABLE, "System busy, please retry later";
}

impl ErrorCode {
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::of(self.code())
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A `u16` that is not in the table
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid error code: {0}")]
pub struct InvalidErrorCode(pub u16);

/// Domain an error code belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    General,
    Auth,
    Permission,
    Account,
    Order,
    Catalog,
    System,
}

impl ErrorCategory {
    pub fn of(code: u16) -> Self {
        match code / 1000 {
            0 => Self::General,
            1 => Self::Auth,
            2 => Self::Permission,
            3 => Self::Account,
            4 => Self::Order,
            5 => Self::Catalog,
            _ => Self::System,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_round_trips() {
        for code in ErrorCode::ALL {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(*code));
        }
        assert_eq!(ErrorCode::try_from(4242), Err(InvalidErrorCode(4242)));
        assert_eq!(InvalidErrorCode(4242).to_string(), "invalid error code: 4242");
    }

    #[test]
    fn test_serialized_as_number() {
        assert_eq!(
            serde_json::to_string(&ErrorCode::InsufficientStock).unwrap(),
            "4002"
        );
        let code: ErrorCode = serde_json::from_str("5001").unwrap();
        assert_eq!(code, ErrorCode::BookNotFound);
        assert!(serde_json::from_str::<ErrorCode>("7777").is_err());
    }

    #[test]
    fn test_statuses() {
        use StatusCode as S;
        let cases = [
            (ErrorCode::ValidationFailed, S::UNPROCESSABLE_ENTITY),
            (ErrorCode::InvalidQuantity, S::UNPROCESSABLE_ENTITY),
            (ErrorCode::InvalidRequest, S::BAD_REQUEST),
            (ErrorCode::UsernameTaken, S::BAD_REQUEST),
            (ErrorCode::InsufficientStock, S::BAD_REQUEST),
            (ErrorCode::UnknownAuthor, S::BAD_REQUEST),
            (ErrorCode::BookHasOrders, S::CONFLICT),
            (ErrorCode::BookNotFound, S::NOT_FOUND),
            (ErrorCode::NotAuthenticated, S::FORBIDDEN),
            (ErrorCode::AdminRequired, S::FORBIDDEN),
            (ErrorCode::TokenExpired, S::UNAUTHORIZED),
            (ErrorCode::SubjectNotFound, S::UNAUTHORIZED),
            (ErrorCode::RateLimited, S::TOO_MANY_REQUESTS),
            (ErrorCode::SystemBusy, S::SERVICE_UNAVAILABLE),
            (ErrorCode::DatabaseError, S::INTERNAL_SERVER_ERROR),
        ];
        for (code, status) in cases {
            assert_eq!(code.http_status(), status, "{code:?}");
        }
    }

    #[test]
    fn test_categories() {
        assert_eq!(ErrorCode::ValidationFailed.category(), ErrorCategory::General);
        assert_eq!(ErrorCode::TokenInvalid.category(), ErrorCategory::Auth);
        assert_eq!(ErrorCode::AdminRequired.category(), ErrorCategory::Permission);
        assert_eq!(ErrorCode::EmailTaken.category(), ErrorCategory::Account);
        assert_eq!(ErrorCode::InsufficientStock.category(), ErrorCategory::Order);
        assert_eq!(ErrorCode::AuthorNotFound.category(), ErrorCategory::Catalog);
        assert_eq!(ErrorCode::SystemBusy.category(), ErrorCategory::System);
    }
}
