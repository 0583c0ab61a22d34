//! Actor Extractor
//!
//! Custom extractor that reads the identity headers forwarded by the session
//! gateway and hands handlers a resolved [`Actor`].

use axum::{extract::FromRequestParts, http::request::Parts};

use super::{MEMBER_ID_HEADER, MEMBER_ROLE_HEADER};
use crate::security_log;
use shared::error::{AppError, ErrorCode};
use shared::models::{Actor, Role};

/// Resolved caller identity for the current request
#[derive(Debug, Clone)]
pub struct CurrentActor(pub Actor);

impl<S> FromRequestParts<S> for CurrentActor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Check if already extracted (from middleware)
        if let Some(actor) = parts.extensions.get::<CurrentActor>() {
            return Ok(actor.clone());
        }

        let member_id = parts
            .headers
            .get(MEMBER_ID_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty());

        let Some(member_id) = member_id else {
            security_log!("WARN", "identity_missing", uri = format!("{:?}", parts.uri));
            return Err(AppError::not_authenticated());
        };

        let role_raw = parts
            .headers
            .get(MEMBER_ROLE_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty());

        let Some(role_raw) = role_raw else {
            security_log!(
                "WARN",
                "role_missing",
                member_id = member_id,
                uri = format!("{:?}", parts.uri)
            );
            return Err(AppError::not_authenticated());
        };

        let role: Role = role_raw.parse().map_err(|_| {
            security_log!(
                "WARN",
                "role_invalid",
                member_id = member_id,
                role = role_raw
            );
            AppError::with_message(ErrorCode::InvalidRole, format!("Unknown role: {}", role_raw))
        })?;

        let actor = CurrentActor(Actor::new(member_id, role));

        // Store in extensions for potential reuse
        parts.extensions.insert(actor.clone());

        Ok(actor)
    }
}
