use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;

use crate::{
    auth::AuthUser,
    error::ApiResult,
    response::ApiResponse,
    routes::common::RecordResponse,
    state::AppState,
};

/// DELETE /api/admin/attendance/{record_id}
///
/// Soft-deletes a record. The `(user, date, session)` key becomes free, so a
/// later manual mark creates a visible record again.
///
/// ### Responses
/// - `200 OK` with the record as it was before deletion
/// - `404 Not Found` unknown or already deleted record
pub async fn delete_record(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthUser>,
    Path(record_id): Path<i64>,
) -> ApiResult<RecordResponse> {
    let record = state
        .marking
        .delete_record(record_id, admin.user_id())
        .await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(
            RecordResponse::from(record),
            "Attendance record deleted",
        )),
    ))
}

#[derive(Debug, Serialize)]
pub struct PurgeResponse {
    pub deleted: u64,
}

/// DELETE /api/admin/attendance/codes/expired
///
/// Hard-deletes every code past its expiry.
pub async fn purge_expired_codes(State(state): State<AppState>) -> ApiResult<PurgeResponse> {
    let deleted = state.codes.purge_expired_codes().await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(
            PurgeResponse { deleted },
            format!("Deleted {deleted} expired codes"),
        )),
    ))
}
