use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use services::{
    marking_service::LogQuery,
    overview_service::{AttendanceOverview, DailyStats, StudentStats},
};

use crate::{
    error::{ApiError, ApiResult},
    response::ApiResponse,
    routes::common::{
        RecordResponse, parse_day, parse_optional_day, parse_optional_session, parse_session,
        records_response,
    },
    state::AppState,
};

/// Trailing window used by the `*-by-days` and daily endpoints when `days`
/// is not given.
const DEFAULT_STATS_DAYS: i64 = 7;

#[derive(Debug, Deserialize)]
pub struct TodayQuery {
    pub cohort: Option<i32>,
    pub session: Option<String>,
    pub date: Option<String>,
}

/// GET /api/admin/attendance/today?cohort=9&session=morning&date=2025-03-10
///
/// Roster for one cohort and day. Every student appears once with a
/// `morning` and an `afternoon` cell; `"-"` marks a session with no record.
/// When `session` is given and `date` is today, the live code for that
/// session is included.
///
/// ### Responses
/// - `200 OK` with the overview
/// - `400 Bad Request` missing cohort, bad session or date
pub async fn today_overview(
    State(state): State<AppState>,
    Query(q): Query<TodayQuery>,
) -> ApiResult<AttendanceOverview> {
    let cohort = q
        .cohort
        .filter(|c| *c > 0)
        .ok_or_else(|| ApiError::bad_request("cohort is required"))?;
    let session = parse_optional_session(q.session.as_deref())?;
    let date = parse_optional_day(q.date.as_deref())?;

    let overview = state
        .overview
        .get_attendance_overview(cohort, session, date)
        .await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(overview, "Attendance overview retrieved")),
    ))
}

#[derive(Debug, Deserialize)]
pub struct LogsQuery {
    pub cohort: Option<i32>,
    pub date: Option<String>,
    pub session: Option<String>,
    pub page: Option<u64>,
    #[serde(alias = "limit")]
    pub per_page: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct LogsResponse {
    pub records: Vec<RecordResponse>,
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
}

/// GET /api/admin/attendance/logs?cohort=9&date=2025-03-10&page=1&per_page=20
///
/// Live records, most recently submitted first. `per_page` is capped at 100.
pub async fn attendance_logs(
    State(state): State<AppState>,
    Query(q): Query<LogsQuery>,
) -> ApiResult<LogsResponse> {
    let page = state
        .marking
        .attendance_logs(LogQuery {
            cohort_number: q.cohort,
            date: parse_optional_day(q.date.as_deref())?,
            session: parse_optional_session(q.session.as_deref())?,
            page: q.page,
            per_page: q.per_page,
        })
        .await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(
            LogsResponse {
                records: records_response(page.records),
                page: page.page,
                per_page: page.per_page,
                total: page.total,
            },
            "Attendance logs retrieved",
        )),
    ))
}

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub cohort: Option<i32>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// GET /api/admin/attendance/stats?cohort=9&start_date=2025-03-01&end_date=2025-03-31
///
/// Per-student totals over an inclusive date range (open-ended when a bound
/// is omitted). Students with the most absent days come first.
///
/// Each entry carries the per-status counts, `total_sessions`,
/// `present_days`, `absent_days` and a `warning_level` of `normal`,
/// `yellow` (4+ absent days) or `red` (7+).
pub async fn attendance_stats(
    State(state): State<AppState>,
    Query(q): Query<StatsQuery>,
) -> ApiResult<Vec<StudentStats>> {
    let start = parse_optional_day(q.start_date.as_deref())?;
    let end = parse_optional_day(q.end_date.as_deref())?;
    if let (Some(s), Some(e)) = (start, end) {
        if s > e {
            return Err(ApiError::bad_request("start_date must not be after end_date"));
        }
    }

    let stats = state
        .overview
        .get_attendance_stats(q.cohort, start, end)
        .await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(stats, "Attendance stats retrieved")),
    ))
}

#[derive(Debug, Deserialize)]
pub struct DaysQuery {
    pub cohort: Option<i32>,
    pub days: Option<i64>,
}

/// GET /api/admin/attendance/stats-by-days?cohort=9&days=7
///
/// Same shape as `/stats`, over the trailing `days` (default 7, `0` for all
/// time).
pub async fn attendance_stats_by_days(
    State(state): State<AppState>,
    Query(q): Query<DaysQuery>,
) -> ApiResult<Vec<StudentStats>> {
    let stats = state
        .overview
        .get_attendance_stats_by_days(q.cohort, q.days.unwrap_or(DEFAULT_STATS_DAYS))
        .await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(stats, "Attendance stats retrieved")),
    ))
}

/// GET /api/admin/attendance/daily-stats?cohort=9&days=7
///
/// Status totals per day, oldest first.
pub async fn daily_stats(
    State(state): State<AppState>,
    Query(q): Query<DaysQuery>,
) -> ApiResult<Vec<DailyStats>> {
    let stats = state
        .overview
        .get_daily_attendance_stats(q.cohort, q.days.unwrap_or(DEFAULT_STATS_DAYS))
        .await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(stats, "Daily attendance stats retrieved")),
    ))
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub days: Option<i64>,
}

/// GET /api/admin/attendance/student/{user_id}?days=30
pub async fn student_history(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Query(q): Query<HistoryQuery>,
) -> ApiResult<Vec<RecordResponse>> {
    let records = state.marking.student_history(user_id, q.days).await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(
            records_response(records),
            "Attendance history retrieved",
        )),
    ))
}

#[derive(Debug, Deserialize)]
pub struct LockQuery {
    pub date: Option<String>,
    pub session: Option<String>,
    pub cohort: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct LockStatusResponse {
    pub locked: bool,
}

/// GET /api/admin/attendance/lock?date=2025-03-10&session=morning&cohort=9
///
/// Whether submissions are refused for the session, taking the all-cohorts
/// lock into account.
pub async fn lock_status(
    State(state): State<AppState>,
    Query(q): Query<LockQuery>,
) -> ApiResult<LockStatusResponse> {
    let (Some(raw_date), Some(raw_session)) = (q.date.as_deref(), q.session.as_deref()) else {
        return Err(ApiError::bad_request("date and session are required"));
    };
    let date = parse_day(raw_date)?;
    let session = parse_session(raw_session)?;

    let locked = state
        .locks
        .is_session_locked(date, session, q.cohort.unwrap_or_default())
        .await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(
            LockStatusResponse { locked },
            "Lock status retrieved",
        )),
    ))
}
