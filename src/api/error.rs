use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::types::ErrorResponse;
use crate::error::MembershipError;

/// Converts [`MembershipError`] into appropriate HTTP responses.
#[derive(Debug)]
pub struct AppError(pub MembershipError);

impl From<MembershipError> for AppError {
    fn from(err: MembershipError) -> Self {
        Self(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let error_response = ErrorResponse::from(&self.0);
        let status = match &self.0 {
            MembershipError::Unauthorized => StatusCode::UNAUTHORIZED,
            MembershipError::Forbidden(_) => StatusCode::FORBIDDEN,
            MembershipError::Conflict | MembershipError::MemberLimitExceeded { .. } => {
                StatusCode::CONFLICT
            }
            MembershipError::NotFound => StatusCode::NOT_FOUND,
            MembershipError::InvalidToken
            | MembershipError::EmailMismatch { .. }
            | MembershipError::Validation(_) => StatusCode::BAD_REQUEST,
            MembershipError::ExternalService(_) | MembershipError::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(error_response)).into_response()
    }
}
