//! Maps domain failures onto HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use domains::DomainError;
use serde_json::json;
use tracing::error;

/// Response-side wrapper for [`DomainError`].
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            DomainError::Validation(_) | DomainError::EmptyAnswer => StatusCode::BAD_REQUEST,
            DomainError::Unauthorized | DomainError::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            DomainError::Forbidden(_) => StatusCode::FORBIDDEN,
            DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
            DomainError::AnswerLimitReached { .. } | DomainError::Conflict(_) => {
                StatusCode::CONFLICT
            }
            DomainError::EventExpired => StatusCode::GONE,
            DomainError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!(error = %self.0, "request failed");
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: DomainError) -> StatusCode {
        ApiError(err).into_response().status()
    }

    #[test]
    fn domain_errors_map_to_expected_statuses() {
        assert_eq!(status_of(DomainError::EventExpired), StatusCode::GONE);
        assert_eq!(
            status_of(DomainError::AnswerLimitReached { max_responses: 1 }),
            StatusCode::CONFLICT
        );
        assert_eq!(status_of(DomainError::EmptyAnswer), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(DomainError::Unauthorized),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(DomainError::NotFound {
                kind: "thread",
                id: "x".into()
            }),
            StatusCode::NOT_FOUND
        );
    }
}
