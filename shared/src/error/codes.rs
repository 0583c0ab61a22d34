//! Unified error codes for the dormitory portal
//!
//! Error codes are shared between the server and every front-end consumer.
//! They are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 4xxx: Booking errors
//! - 5xxx: Bill errors
//! - 7xxx: Room errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,

    // ==================== 1xxx: Auth ====================
    /// Caller identity missing or unreadable
    NotAuthenticated = 1001,
    /// Unknown role in the forwarded identity
    InvalidRole = 1002,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Manager or admin role required
    ReviewerRequired = 2002,

    // ==================== 4xxx: Booking ====================
    /// Booking not found
    BookingNotFound = 4001,
    /// Check-in/check-out dates invalid or below minimum stay
    InvalidDateRange = 4002,
    /// Transition precondition not met
    IllegalState = 4003,
    /// Payment deadline exceeded
    DeadlineExpired = 4004,

    // ==================== 5xxx: Bill ====================
    /// Bill not found
    BillNotFound = 5001,

    // ==================== 7xxx: Room ====================
    /// Room not found
    RoomNotFound = 7001,
    /// Room is not available for booking
    RoomUnavailable = 7002,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
}

impl ErrorCode {
    /// Numeric wire value of the code
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Default human-readable message for the code
    pub fn message(&self) -> &'static str {
        match self {
            ErrorCode::Success => "OK",
            ErrorCode::Unknown => "Unknown error",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::NotAuthenticated => "Not authenticated",
            ErrorCode::InvalidRole => "Unknown role",
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::ReviewerRequired => "Manager or admin role required",
            ErrorCode::BookingNotFound => "Booking not found",
            ErrorCode::InvalidDateRange => "Invalid date range",
            ErrorCode::IllegalState => "Operation not allowed in current state",
            ErrorCode::DeadlineExpired => "Payment deadline exceeded",
            ErrorCode::BillNotFound => "Bill not found",
            ErrorCode::RoomNotFound => "Room not found",
            ErrorCode::RoomUnavailable => "Room is not available",
            ErrorCode::InternalError => "Internal server error",
        }
    }

    /// HTTP status code for the error
    pub fn http_status(&self) -> http::StatusCode {
        use http::StatusCode;
        match self {
            ErrorCode::Success => StatusCode::OK,
            ErrorCode::ValidationFailed | ErrorCode::InvalidRequest | ErrorCode::InvalidDateRange => {
                StatusCode::BAD_REQUEST
            }
            ErrorCode::NotAuthenticated | ErrorCode::InvalidRole => StatusCode::UNAUTHORIZED,
            ErrorCode::PermissionDenied | ErrorCode::ReviewerRequired => StatusCode::FORBIDDEN,
            ErrorCode::NotFound
            | ErrorCode::BookingNotFound
            | ErrorCode::BillNotFound
            | ErrorCode::RoomNotFound => StatusCode::NOT_FOUND,
            ErrorCode::AlreadyExists
            | ErrorCode::IllegalState
            | ErrorCode::DeadlineExpired
            | ErrorCode::RoomUnavailable => StatusCode::CONFLICT,
            ErrorCode::Unknown | ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self, self.code())
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

impl TryFrom<u16> for ErrorCode {
    type Error = String;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidRole),
            2001 => Ok(ErrorCode::PermissionDenied),
            2002 => Ok(ErrorCode::ReviewerRequired),
            4001 => Ok(ErrorCode::BookingNotFound),
            4002 => Ok(ErrorCode::InvalidDateRange),
            4003 => Ok(ErrorCode::IllegalState),
            4004 => Ok(ErrorCode::DeadlineExpired),
            5001 => Ok(ErrorCode::BillNotFound),
            7001 => Ok(ErrorCode::RoomNotFound),
            7002 => Ok(ErrorCode::RoomUnavailable),
            9001 => Ok(ErrorCode::InternalError),
            _ => Err(format!("Unknown error code: {}", value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_roundtrip() {
        for code in [
            ErrorCode::Success,
            ErrorCode::ValidationFailed,
            ErrorCode::BookingNotFound,
            ErrorCode::DeadlineExpired,
            ErrorCode::RoomUnavailable,
            ErrorCode::InternalError,
        ] {
            let raw = code.code();
            assert_eq!(ErrorCode::try_from(raw).unwrap(), code);
        }
    }

    #[test]
    fn test_unknown_code_rejected() {
        assert!(ErrorCode::try_from(60000).is_err());
    }

    #[test]
    fn test_http_status_mapping() {
        use http::StatusCode;
        assert_eq!(ErrorCode::InvalidDateRange.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::ReviewerRequired.http_status(), StatusCode::FORBIDDEN);
        assert_eq!(ErrorCode::BookingNotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::IllegalState.http_status(), StatusCode::CONFLICT);
        assert_eq!(ErrorCode::DeadlineExpired.http_status(), StatusCode::CONFLICT);
    }
}
