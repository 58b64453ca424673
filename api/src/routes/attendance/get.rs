use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use services::overview_service::AttendanceSummary;

use crate::{
    auth::AuthUser,
    error::{ApiError, ApiResult},
    response::ApiResponse,
    routes::common::{CodeResponse, RecordResponse, parse_session, records_response},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct ActiveCodeQuery {
    pub cohort: Option<i32>,
    pub session: Option<String>,
}

/// GET /api/attendance/code (also mounted at /api/admin/attendance/active-code)
///
/// The code currently redeemable for `(cohort, session)`. `data` is `null`
/// when nothing is active, which is not an error.
///
/// ### Query
/// - `cohort` (required, positive)
/// - `session` (required): `morning` or `afternoon`
///
/// ### Responses
/// - `200 OK` with the code or `null`
/// - `400 Bad Request` when either parameter is missing or invalid
pub async fn get_active_code(
    State(state): State<AppState>,
    Query(q): Query<ActiveCodeQuery>,
) -> ApiResult<Option<CodeResponse>> {
    let (Some(cohort), Some(raw_session)) = (q.cohort.filter(|c| *c > 0), q.session.as_deref())
    else {
        return Err(ApiError::bad_request("cohort and session are required"));
    };
    let session = parse_session(raw_session)?;

    let code = state.codes.get_active_code(cohort, session).await?;
    let message = if code.is_some() {
        "Active code retrieved"
    } else {
        "No active code"
    };

    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(code.map(CodeResponse::from), message)),
    ))
}

/// GET /api/attendance/me
///
/// All-time totals for the caller: per-status counts, `total_sessions`,
/// `present_days`, `absent_days` and `warning_level`.
pub async fn my_status(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<AttendanceSummary> {
    let summary = state
        .overview
        .get_my_attendance_status(user.user_id())
        .await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(summary, "Attendance status retrieved")),
    ))
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub days: Option<i64>,
}

/// GET /api/attendance/me/history?days=30
///
/// The caller's own records in the trailing window, newest day first.
/// `days` defaults to 30; `0` returns everything.
pub async fn my_history(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(q): Query<HistoryQuery>,
) -> ApiResult<Vec<RecordResponse>> {
    let records = state
        .marking
        .student_history(user.user_id(), q.days)
        .await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(
            records_response(records),
            "Attendance history retrieved",
        )),
    ))
}
