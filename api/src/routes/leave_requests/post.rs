use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
};
use serde::Deserialize;
use services::leave_service::NewLeave;
use validator::Validate;

use crate::{
    auth::AuthUser,
    error::{ApiError, ApiResult},
    response::ApiResponse,
    routes::common::{
        LeaveRequestResponse, parse_day, parse_leave_type, parse_optional_session, validate_body,
    },
    state::AppState,
};

/// Body shared by the student and admin create endpoints. `user_id` is
/// only read on the admin route.
#[derive(Debug, Deserialize, Validate)]
pub struct LeaveReq {
    #[validate(range(min = 1, message = "user_id must be a positive number"))]
    pub user_id: Option<i64>,

    #[validate(required(message = "leave_type is required"))]
    pub leave_type: Option<String>,

    /// Required for `half_day`.
    pub session: Option<String>,

    #[validate(required(message = "date is required"))]
    pub date: Option<String>,

    #[validate(
        required(message = "reason is required"),
        length(min = 1, max = 1000, message = "reason must be 1-1000 characters")
    )]
    pub reason: Option<String>,
}

impl LeaveReq {
    pub fn into_new_leave(self, user_id: i64) -> Result<NewLeave, ApiError> {
        validate_body(&self)?;
        Ok(NewLeave {
            user_id,
            leave_type: parse_leave_type(self.leave_type.as_deref().unwrap_or_default())?,
            session: parse_optional_session(self.session.as_deref())?,
            date: parse_day(self.date.as_deref().unwrap_or_default())?,
            reason: self.reason.unwrap_or_default(),
        })
    }
}

/// POST /api/leave-requests
///
/// Files a leave request for the caller. It stays `pending` until an admin
/// reviews it; attendance is only written on approval.
///
/// ### Request Body
/// ```json
/// { "leave_type": "half_day", "session": "afternoon", "date": "2025-03-12", "reason": "Dentist" }
/// ```
///
/// ### Responses
/// - `201 Created` with the pending request
/// - `400 Bad Request` missing fields, bad leave type, or `half_day` without a session
/// - `404 Not Found` the caller is not a known student
pub async fn create_leave_request(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<LeaveReq>,
) -> ApiResult<LeaveRequestResponse> {
    let req = body.into_new_leave(user.user_id())?;
    let request = state.leave.create_leave_request(req).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            LeaveRequestResponse::from(request),
            "Leave request submitted",
        )),
    ))
}
