//! HTTP translation of [`AttendanceError`].

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use services::AttendanceError;
use tracing::error;
use validator::ValidationErrors;

use crate::auth::guards::Empty;
use crate::response::ApiResponse;

/// Error half of every handler result. Renders as an [`ApiResponse`] with
/// `success: false`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

pub type ApiResult<T> = Result<(StatusCode, Json<ApiResponse<T>>), ApiError>;

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into() }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

pub fn status_for(err: &AttendanceError) -> StatusCode {
    use AttendanceError::*;
    match err {
        InvalidCode | NoActiveCode | CodeForWrongCohort | InvalidSession | Validation(_) => {
            StatusCode::BAD_REQUEST
        }
        CodeExpired => StatusCode::GONE,
        AlreadySubmitted | LeaveAlreadyProcessed => StatusCode::CONFLICT,
        SessionLocked => StatusCode::FORBIDDEN,
        StudentNotFound | RecordNotFound | LeaveRequestNotFound => StatusCode::NOT_FOUND,
        Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<AttendanceError> for ApiError {
    fn from(err: AttendanceError) -> Self {
        let status = status_for(&err);
        let message = match &err {
            AttendanceError::Database(db_err) => {
                error!(error = %db_err, "database error");
                "Internal server error".to_owned()
            }
            other => other.to_string(),
        };
        Self { status, message }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        Self::bad_request(format_validation_errors(&errors))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ApiResponse::<Empty>::error(self.message))).into_response()
    }
}

/// Joins every field message into one `; `-separated line.
pub fn format_validation_errors(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .values()
        .flat_map(|errs| {
            errs.iter()
                .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
        })
        .collect();
    messages.sort();
    messages.join("; ")
}
