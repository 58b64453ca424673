use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
};

use crate::{
    auth::AuthUser,
    error::{ApiError, ApiResult},
    response::ApiResponse,
    routes::{common::LeaveOutcomeResponse, leave_requests::LeaveReq},
    state::AppState,
};

/// POST /api/admin/leave-requests
///
/// Manual entry on a student's behalf. The request is approved on creation
/// and the matching sessions are marked excused straight away.
///
/// ### Request Body
/// ```json
/// { "user_id": 12, "leave_type": "full_day", "date": "2025-03-12", "reason": "Hospital" }
/// ```
///
/// ### Responses
/// - `201 Created` with `{ request, marked, failures }`; `failures` lists any
///   session that could not be written
/// - `400 Bad Request` missing `user_id` or other invalid field
/// - `404 Not Found` unknown student
pub async fn admin_create_leave_request(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthUser>,
    Json(body): Json<LeaveReq>,
) -> ApiResult<LeaveOutcomeResponse> {
    let user_id = body
        .user_id
        .ok_or_else(|| ApiError::bad_request("user_id is required"))?;
    let req = body.into_new_leave(user_id)?;

    let outcome = state
        .leave
        .admin_create_leave_request(req, admin.user_id())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            LeaveOutcomeResponse::from(outcome),
            "Leave request created and approved",
        )),
    ))
}
