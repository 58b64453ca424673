use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use db::models::leave_request::LeaveFilter;
use serde::Deserialize;

use crate::{
    error::ApiResult,
    response::ApiResponse,
    routes::common::{LeaveRequestResponse, parse_leave_status, parse_optional_day},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct LeaveListQuery {
    pub cohort: Option<i32>,
    pub user_id: Option<i64>,
    pub status: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// GET /api/admin/leave-requests?cohort=9&status=pending&start_date=2025-03-01
///
/// Every filter is optional; results are newest first.
pub async fn list_leave_requests(
    State(state): State<AppState>,
    Query(q): Query<LeaveListQuery>,
) -> ApiResult<Vec<LeaveRequestResponse>> {
    let status = match q.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => Some(parse_leave_status(raw)?),
        None => None,
    };

    let filter = LeaveFilter {
        user_id: q.user_id,
        cohort_number: q.cohort.filter(|c| *c > 0),
        status,
        date_from: parse_optional_day(q.start_date.as_deref())?,
        date_to: parse_optional_day(q.end_date.as_deref())?,
    };
    let requests = state.leave.list_leave_requests(filter).await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(
            requests.into_iter().map(LeaveRequestResponse::from).collect(),
            "Leave requests retrieved",
        )),
    ))
}
