//! Route guards.
//!
//! The two gating predicates the presentation layer consumes: "is there an
//! authenticated session" (the [`CurrentUser`] extractor) and "is the
//! current user the creator of thread X" ([`is_thread_owner`]). Both are
//! pure reads against `created_by` and the session registry.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use domains::{DomainError, Session, SessionToken, Thread, UserId};

use crate::error::ApiError;
use crate::AppState;

/// Extractor that rejects the request with 401 unless a live session is
/// presented as a bearer token.
pub struct CurrentUser(pub Session);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(ApiError(DomainError::Unauthorized))?;
        let session = state
            .auth
            .current(&token)
            .await?
            .ok_or(ApiError(DomainError::Unauthorized))?;
        Ok(CurrentUser(session))
    }
}

/// Extractor for the raw bearer token (sign-out needs the token itself).
pub struct BearerToken(pub SessionToken);

impl FromRequestParts<AppState> for BearerToken {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        bearer_token(parts)
            .map(BearerToken)
            .ok_or(ApiError(DomainError::Unauthorized))
    }
}

/// Owner predicate over the thread's `createdBy` field.
pub fn is_thread_owner(thread: &Thread, uid: &UserId) -> bool {
    thread.created_by == *uid
}

fn bearer_token(parts: &Parts) -> Option<SessionToken> {
    let header = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(SessionToken(token.to_owned()))
}
