//! Shared types for the dormitory portal
//!
//! Common types used across the portal crates: entity models, error codes,
//! and the unified API response envelope.

pub mod error;
pub mod models;

// Re-exports
pub use axum::{Json, body};
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use models::{Actor, Role};
