use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Lifecycle engine errors
///
/// Every validation and precondition failure is reported synchronously to
/// the caller; nothing is silently swallowed.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Invalid date range: {0}")]
    InvalidDateRange(String),

    #[error("Room unavailable: {0}")]
    RoomUnavailable(String),

    #[error("Illegal state: {0}")]
    IllegalState(String),

    #[error("Payment deadline exceeded")]
    DeadlineExpired,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Booking not found: {0}")]
    BookingNotFound(String),

    #[error("Bill not found: {0}")]
    BillNotFound(String),

    #[error("Room not found: {0}")]
    RoomNotFound(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
}

impl From<LifecycleError> for AppError {
    fn from(err: LifecycleError) -> Self {
        let (code, message) = match &err {
            LifecycleError::InvalidDateRange(msg) => {
                (ErrorCode::InvalidDateRange, format!("Invalid date range: {}", msg))
            }
            LifecycleError::RoomUnavailable(msg) => {
                (ErrorCode::RoomUnavailable, format!("Room unavailable: {}", msg))
            }
            LifecycleError::IllegalState(msg) => {
                (ErrorCode::IllegalState, format!("Illegal state: {}", msg))
            }
            LifecycleError::DeadlineExpired => {
                (ErrorCode::DeadlineExpired, err.to_string())
            }
            LifecycleError::Unauthorized(msg) => {
                (ErrorCode::PermissionDenied, format!("Unauthorized: {}", msg))
            }
            LifecycleError::BookingNotFound(id) => {
                (ErrorCode::BookingNotFound, format!("Booking not found: {}", id))
            }
            LifecycleError::BillNotFound(id) => {
                (ErrorCode::BillNotFound, format!("Bill not found: {}", id))
            }
            LifecycleError::RoomNotFound(id) => {
                (ErrorCode::RoomNotFound, format!("Room not found: {}", id))
            }
            LifecycleError::InvalidAmount(msg) => {
                (ErrorCode::ValidationFailed, format!("Invalid amount: {}", msg))
            }
        };
        AppError::with_message(code, message)
    }
}

pub type LifecycleResult<T> = Result<T, LifecycleError>;
