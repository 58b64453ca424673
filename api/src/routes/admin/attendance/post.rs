use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use services::marking_service::ManualMark;
use validator::Validate;

use crate::{
    auth::AuthUser,
    error::ApiResult,
    response::ApiResponse,
    routes::common::{
        CodeResponse, LockResponse, RecordResponse, parse_day, parse_session, parse_status,
        records_response, validate_body,
    },
    state::AppState,
};

#[derive(Debug, Deserialize, Validate)]
pub struct GenerateCodeReq {
    #[validate(
        required(message = "cohort is required"),
        range(min = 1, message = "cohort must be a positive number")
    )]
    pub cohort: Option<i32>,

    #[validate(required(message = "session is required"))]
    pub session: Option<String>,
}

/// POST /api/admin/attendance/generate-code
///
/// Issues a fresh code for `(cohort, session)`, deactivating any previous
/// code for the same pair. Other cohorts and sessions are untouched.
///
/// ### Request Body
/// ```json
/// { "cohort": 9, "session": "morning" }
/// ```
///
/// ### Responses
/// - `200 OK` with the new code
/// - `400 Bad Request` missing cohort or invalid session
pub async fn generate_code(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthUser>,
    Json(body): Json<GenerateCodeReq>,
) -> ApiResult<CodeResponse> {
    validate_body(&body)?;
    let session = parse_session(body.session.as_deref().unwrap_or_default())?;

    let code = state
        .codes
        .generate_code(body.cohort.unwrap_or_default(), session, admin.user_id())
        .await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(
            CodeResponse::from(code),
            "Attendance code generated",
        )),
    ))
}

#[derive(Debug, Deserialize, Validate)]
pub struct ManualMarkReq {
    #[validate(
        required(message = "user_id is required"),
        range(min = 1, message = "user_id must be a positive number")
    )]
    pub user_id: Option<i64>,

    #[validate(required(message = "date is required"))]
    pub date: Option<String>,

    #[validate(required(message = "session is required"))]
    pub session: Option<String>,

    #[validate(required(message = "status is required"))]
    pub status: Option<String>,
}

/// POST /api/admin/attendance/manual
///
/// Creates or overwrites the record for `(user_id, date, session)`. A
/// soft-deleted record for the same key is revived with the new status.
///
/// ### Request Body
/// ```json
/// { "user_id": 12, "date": "2025-03-10", "session": "morning", "status": "late" }
/// ```
///
/// ### Responses
/// - `200 OK` with the written record (`marked_by` is `admin`)
/// - `400 Bad Request` missing field, bad date, session or status
/// - `404 Not Found` unknown student
pub async fn manual_mark(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthUser>,
    Json(body): Json<ManualMarkReq>,
) -> ApiResult<RecordResponse> {
    validate_body(&body)?;
    let date = parse_day(body.date.as_deref().unwrap_or_default())?;
    let session = parse_session(body.session.as_deref().unwrap_or_default())?;
    let status = parse_status(body.status.as_deref().unwrap_or_default())?;

    let record = state
        .marking
        .manual_mark(ManualMark {
            user_id: body.user_id.unwrap_or_default(),
            date,
            session,
            status,
            marked_by: admin.user_id(),
        })
        .await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(
            RecordResponse::from(record),
            "Attendance marked",
        )),
    ))
}

#[derive(Debug, Deserialize, Validate)]
pub struct BulkMarkReq {
    #[validate(length(min = 1, message = "Request must include a non-empty list of user_ids"))]
    pub user_ids: Vec<i64>,

    #[validate(required(message = "date is required"))]
    pub date: Option<String>,

    #[validate(required(message = "session is required"))]
    pub session: Option<String>,

    #[validate(required(message = "status is required"))]
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BulkMarkResponse {
    pub marked_count: usize,
    pub records: Vec<RecordResponse>,
}

/// POST /api/admin/attendance/bulk
///
/// Marks many students at once. Students that cannot be marked (unknown id,
/// store error) are skipped; the response lists only the records written.
///
/// ### Request Body
/// ```json
/// { "user_ids": [12, 13, 14], "date": "2025-03-10", "session": "afternoon", "status": "present" }
/// ```
///
/// ### Responses
/// - `200 OK` with `{ marked_count, records }`
/// - `400 Bad Request` no valid user ids, or bad date, session or status
pub async fn bulk_mark(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthUser>,
    Json(body): Json<BulkMarkReq>,
) -> ApiResult<BulkMarkResponse> {
    validate_body(&body)?;
    let date = parse_day(body.date.as_deref().unwrap_or_default())?;
    let session = parse_session(body.session.as_deref().unwrap_or_default())?;
    let status = parse_status(body.status.as_deref().unwrap_or_default())?;

    let mut user_ids: Vec<i64> = body.user_ids.into_iter().filter(|id| *id > 0).collect();
    user_ids.sort_unstable();
    user_ids.dedup();

    let records = state
        .marking
        .bulk_mark(&user_ids, date, session, status, admin.user_id())
        .await?;

    let message = format!("Marked {} of {} students", records.len(), user_ids.len());
    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(
            BulkMarkResponse {
                marked_count: records.len(),
                records: records_response(records),
            },
            message,
        )),
    ))
}

#[derive(Debug, Deserialize, Validate)]
pub struct LockSessionReq {
    #[validate(required(message = "date is required"))]
    pub date: Option<String>,

    #[validate(required(message = "session is required"))]
    pub session: Option<String>,

    #[validate(required(message = "locked is required"))]
    pub locked: Option<bool>,

    /// Omit (or send `0`) to lock the session for every cohort.
    pub cohort: Option<i32>,
}

/// POST /api/admin/attendance/lock
///
/// Locks or unlocks a session. While locked, self-submission for that
/// date and session is refused with `403`. The lock exists independently of
/// any records, so a session can be locked before anyone has submitted.
///
/// ### Request Body
/// ```json
/// { "date": "2025-03-10", "session": "morning", "locked": true, "cohort": 9 }
/// ```
pub async fn lock_session(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthUser>,
    Json(body): Json<LockSessionReq>,
) -> ApiResult<LockResponse> {
    validate_body(&body)?;
    let date = parse_day(body.date.as_deref().unwrap_or_default())?;
    let session = parse_session(body.session.as_deref().unwrap_or_default())?;
    let locked = body.locked.unwrap_or_default();

    let row = state
        .locks
        .lock_session(date, session, body.cohort, locked, admin.user_id())
        .await?;

    let message = if locked { "Session locked" } else { "Session unlocked" };
    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(LockResponse::from(row), message)),
    ))
}
