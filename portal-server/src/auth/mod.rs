//! Caller identity
//!
//! Authentication and session management live in the external
//! Identity/Session service; by the time a request reaches this server the
//! gateway has already resolved the member and forwards the result in
//! trusted headers. This module only turns those headers into an [`Actor`].

mod extractor;

pub use extractor::CurrentActor;

/// Header carrying the resolved member id
pub const MEMBER_ID_HEADER: &str = "x-member-id";
/// Header carrying the resolved member role
pub const MEMBER_ROLE_HEADER: &str = "x-member-role";
