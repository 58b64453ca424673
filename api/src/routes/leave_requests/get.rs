use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
};

use crate::{
    auth::AuthUser,
    error::ApiResult,
    response::ApiResponse,
    routes::common::LeaveRequestResponse,
    state::AppState,
};

/// GET /api/leave-requests/me
///
/// The caller's own requests, newest first.
pub async fn my_leave_requests(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Vec<LeaveRequestResponse>> {
    let requests = state.leave.my_leave_requests(user.user_id()).await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(
            requests.into_iter().map(LeaveRequestResponse::from).collect(),
            "Leave requests retrieved",
        )),
    ))
}
