use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use db::models::leave_request::LeaveStatus;
use serde::Deserialize;
use validator::Validate;

use crate::{
    auth::AuthUser,
    error::ApiResult,
    response::ApiResponse,
    routes::common::{LeaveOutcomeResponse, parse_leave_status, validate_body},
    state::AppState,
};

#[derive(Debug, Deserialize, Validate)]
pub struct ReviewLeaveReq {
    #[validate(required(message = "status is required"))]
    pub status: Option<String>,

    #[validate(length(max = 1000, message = "review_notes must be at most 1000 characters"))]
    pub review_notes: Option<String>,
}

/// PUT /api/admin/leave-requests/{leave_id}
///
/// Approves or rejects a pending request. Approval marks the covered
/// sessions `late_excused` or `absent_excused`; a session that cannot be
/// written is reported in `failures` and does not undo the approval.
///
/// ### Request Body
/// ```json
/// { "status": "approved", "review_notes": "Doctor's note received" }
/// ```
///
/// ### Responses
/// - `200 OK` with `{ request, marked, failures }`
/// - `400 Bad Request` status other than `approved`/`rejected`
/// - `404 Not Found` unknown request
/// - `409 Conflict` the request was already reviewed
pub async fn review_leave_request(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthUser>,
    Path(leave_id): Path<i64>,
    Json(body): Json<ReviewLeaveReq>,
) -> ApiResult<LeaveOutcomeResponse> {
    validate_body(&body)?;
    let decision = parse_leave_status(body.status.as_deref().unwrap_or_default())?;

    let outcome = state
        .leave
        .review_leave_request(leave_id, decision, body.review_notes, admin.user_id())
        .await?;

    let message = match outcome.request.status {
        LeaveStatus::Approved => "Leave request approved",
        _ => "Leave request rejected",
    };
    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(
            LeaveOutcomeResponse::from(outcome),
            message,
        )),
    ))
}
