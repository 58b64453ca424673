use axum::{
    Extension, Json,
    extract::{ConnectInfo, State},
    http::StatusCode,
};
use serde::Deserialize;
use services::SubmitAttendance;
use std::net::SocketAddr;
use validator::Validate;

use crate::{
    auth::AuthUser,
    error::ApiResult,
    response::ApiResponse,
    routes::common::{RecordResponse, validate_body},
    state::AppState,
};

#[derive(Debug, Deserialize, Validate)]
pub struct SubmitAttendanceReq {
    #[validate(
        required(message = "code is required"),
        length(min = 1, message = "code is required")
    )]
    pub code: Option<String>,

    #[validate(
        required(message = "cohort is required"),
        range(min = 1, message = "cohort must be a positive number")
    )]
    pub cohort: Option<i32>,
}

/// POST /api/attendance/submit
///
/// Redeems an attendance code for the caller.
///
/// ### Request Body
/// ```json
/// { "code": "MORNING-7K2Q", "cohort": 9 }
/// ```
///
/// ### Responses
/// - `200 OK` with the new record (`status` is `present`, `late` or `absent`)
/// - `400 Bad Request` invalid code, no active code, or wrong cohort
/// - `403 Forbidden` the session is locked
/// - `404 Not Found` the caller is not a known student
/// - `409 Conflict` already submitted for this session today
/// - `410 Gone` the code has expired
pub async fn submit_attendance(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(body): Json<SubmitAttendanceReq>,
) -> ApiResult<RecordResponse> {
    validate_body(&body)?;

    let record = state
        .codes
        .submit_attendance(SubmitAttendance {
            user_id: user.user_id(),
            code: body.code.unwrap_or_default(),
            cohort_number: body.cohort.unwrap_or_default(),
            source_ip: Some(addr.ip().to_string()),
        })
        .await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(
            RecordResponse::from(record),
            "Attendance submitted",
        )),
    ))
}
