//! Request parsing helpers and response DTOs shared by the route groups.

use chrono::NaiveDate;
use db::models::{
    Session,
    attendance_code,
    attendance_record::{self, AttendanceStatus},
    attendance_session_lock,
    leave_request::{self, LeaveStatus, LeaveType},
};
use serde::Serialize;
use services::{leave_service::LeaveOutcome, reconciler::ReconcileFailure};
use std::str::FromStr;
use util::clock::{civil_timestamp, parse_date};
use validator::Validate;

use crate::error::ApiError;

/// Runs `validator` rules and turns failures into a `400`.
pub fn validate_body<T: Validate>(body: &T) -> Result<(), ApiError> {
    body.validate().map_err(ApiError::from)
}

pub fn parse_session(raw: &str) -> Result<Session, ApiError> {
    Session::from_str(raw.trim())
        .map_err(|_| ApiError::bad_request("Invalid session: must be morning or afternoon"))
}

pub fn parse_optional_session(raw: Option<&str>) -> Result<Option<Session>, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => parse_session(s).map(Some),
        None => Ok(None),
    }
}

pub fn parse_status(raw: &str) -> Result<AttendanceStatus, ApiError> {
    AttendanceStatus::from_str(raw.trim()).map_err(|_| {
        ApiError::bad_request(
            "Invalid status: must be present, late, absent, late_excused or absent_excused",
        )
    })
}

pub fn parse_day(raw: &str) -> Result<NaiveDate, ApiError> {
    parse_date(raw).ok_or_else(|| ApiError::bad_request("Invalid date: expected YYYY-MM-DD"))
}

pub fn parse_optional_day(raw: Option<&str>) -> Result<Option<NaiveDate>, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => parse_day(s).map(Some),
        None => Ok(None),
    }
}

pub fn parse_leave_type(raw: &str) -> Result<LeaveType, ApiError> {
    LeaveType::from_str(raw.trim()).map_err(|_| {
        ApiError::bad_request("Invalid leave type: must be late, half_day or full_day")
    })
}

pub fn parse_leave_status(raw: &str) -> Result<LeaveStatus, ApiError> {
    LeaveStatus::from_str(raw.trim()).map_err(|_| {
        ApiError::bad_request("Invalid status: must be pending, approved or rejected")
    })
}

#[derive(Debug, Serialize)]
pub struct CodeResponse {
    pub id: i64,
    pub code: String,
    pub cohort_number: i32,
    pub session: Session,
    pub generated_at: String,
    pub expires_at: String,
    pub active: bool,
    pub generated_by: i64,
}

impl From<attendance_code::Model> for CodeResponse {
    fn from(m: attendance_code::Model) -> Self {
        Self {
            id: m.id,
            code: m.code,
            cohort_number: m.cohort_number,
            session: m.session,
            generated_at: civil_timestamp(m.generated_at),
            expires_at: civil_timestamp(m.expires_at),
            active: m.active,
            generated_by: m.generated_by,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecordResponse {
    pub id: i64,
    pub user_id: i64,
    pub jsd_number: String,
    pub first_name: String,
    pub last_name: String,
    pub cohort_number: i32,
    pub date: NaiveDate,
    pub session: Session,
    pub status: AttendanceStatus,
    pub marked_by: attendance_record::MarkedBy,
    pub marked_by_user: Option<i64>,
    pub submitted_at: String,
    pub locked: bool,
    pub ip_address: Option<String>,
    pub deleted: bool,
}

impl From<attendance_record::Model> for RecordResponse {
    fn from(m: attendance_record::Model) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            jsd_number: m.jsd_number,
            first_name: m.first_name,
            last_name: m.last_name,
            cohort_number: m.cohort_number,
            date: m.date,
            session: m.session,
            status: m.status,
            marked_by: m.marked_by,
            marked_by_user: m.marked_by_user,
            submitted_at: civil_timestamp(m.submitted_at),
            locked: m.locked,
            ip_address: m.ip_address,
            deleted: m.deleted,
        }
    }
}

pub fn records_response(records: Vec<attendance_record::Model>) -> Vec<RecordResponse> {
    records.into_iter().map(RecordResponse::from).collect()
}

#[derive(Debug, Serialize)]
pub struct LockResponse {
    pub date: NaiveDate,
    pub session: Session,
    /// `0` for the all-cohorts lock.
    pub cohort_number: i32,
    pub locked: bool,
    pub updated_by: i64,
    pub updated_at: String,
}

impl From<attendance_session_lock::Model> for LockResponse {
    fn from(m: attendance_session_lock::Model) -> Self {
        Self {
            date: m.date,
            session: m.session,
            cohort_number: m.cohort_number,
            locked: m.locked,
            updated_by: m.updated_by,
            updated_at: civil_timestamp(m.updated_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LeaveRequestResponse {
    pub id: i64,
    pub user_id: i64,
    pub leave_type: LeaveType,
    pub session: Option<Session>,
    pub date: NaiveDate,
    pub reason: String,
    pub status: LeaveStatus,
    pub reviewed_by: Option<i64>,
    pub reviewed_at: Option<String>,
    pub review_notes: Option<String>,
    pub is_manual_entry: bool,
    pub created_by: i64,
    pub created_at: String,
}

impl From<leave_request::Model> for LeaveRequestResponse {
    fn from(m: leave_request::Model) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            leave_type: m.leave_type,
            session: m.session,
            date: m.date,
            reason: m.reason,
            status: m.status,
            reviewed_by: m.reviewed_by,
            reviewed_at: m.reviewed_at.map(civil_timestamp),
            review_notes: m.review_notes,
            is_manual_entry: m.is_manual_entry,
            created_by: m.created_by,
            created_at: civil_timestamp(m.created_at),
        }
    }
}

/// A reviewed or manually entered leave request and the attendance it wrote.
#[derive(Debug, Serialize)]
pub struct LeaveOutcomeResponse {
    pub request: LeaveRequestResponse,
    pub marked: Vec<RecordResponse>,
    pub failures: Vec<ReconcileFailure>,
}

impl From<LeaveOutcome> for LeaveOutcomeResponse {
    fn from(outcome: LeaveOutcome) -> Self {
        let (marked, failures) = match outcome.attendance {
            Some(report) => (records_response(report.marked), report.failures),
            None => (Vec::new(), Vec::new()),
        };
        Self {
            request: outcome.request.into(),
            marked,
            failures,
        }
    }
}
