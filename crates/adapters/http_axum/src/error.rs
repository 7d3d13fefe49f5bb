//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use techhome_domain::error::{AuthError, HomeError};

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`HomeError`] to an HTTP response with appropriate status code.
pub struct ApiError(HomeError);

impl From<HomeError> for ApiError {
    fn from(err: HomeError) -> Self {
        Self(err)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        Self(err.into())
    }
}

impl From<techhome_domain::error::ValidationError> for ApiError {
    fn from(err: techhome_domain::error::ValidationError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            HomeError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            HomeError::NotFound(err) => (StatusCode::NOT_FOUND, err.to_string()),
            HomeError::Auth(err) => (auth_status(err), err.to_string()),
            HomeError::Storage(err) => {
                tracing::error!(error = %err, "storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
            HomeError::Hub(err) => {
                tracing::warn!(error = %err, "hub error");
                (StatusCode::BAD_GATEWAY, "hub request failed".to_string())
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

fn auth_status(err: &AuthError) -> StatusCode {
    match err {
        AuthError::InvalidCredentials | AuthError::InvalidToken | AuthError::TokenRevoked => {
            StatusCode::UNAUTHORIZED
        }
        AuthError::AccountDisabled => StatusCode::FORBIDDEN,
        AuthError::UsernameTaken | AuthError::EmailTaken => StatusCode::CONFLICT,
        AuthError::HashingFailed => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
