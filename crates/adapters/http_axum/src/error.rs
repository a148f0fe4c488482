//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use pothub_domain::error::PotHubError;

/// JSON error body returned by API endpoints.
///
/// `fields` is present only for validation failures and enumerates every
/// offending field in one response.
#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<Vec<String>>,
}

impl ErrorBody {
    fn message(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            fields: None,
        }
    }
}

/// Maps [`PotHubError`] to an HTTP response with the appropriate status.
pub struct ApiError(PotHubError);

impl From<PotHubError> for ApiError {
    fn from(err: PotHubError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self.0 {
            PotHubError::Validation(err) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    success: false,
                    message: "please fill in every required field".to_string(),
                    fields: Some(err.issues.iter().map(ToString::to_string).collect()),
                },
            ),
            PotHubError::NotFound(err) => {
                (StatusCode::NOT_FOUND, ErrorBody::message(err.to_string()))
            }
            PotHubError::NoData { .. } => (
                StatusCode::NOT_FOUND,
                ErrorBody::message("no soil moisture data recorded"),
            ),
            PotHubError::Transport(err) => {
                tracing::error!(error = %err, "transport error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody::message("server error"),
                )
            }
            PotHubError::Storage(err) => {
                tracing::error!(error = %err, "storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody::message("server error"),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
