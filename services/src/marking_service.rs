use crate::code_service::is_unique_violation;
use crate::context::ServiceContext;
use crate::directory::DirectoryUser;
use crate::error::{AttendanceError, AttendanceResult};
use chrono::{Days, NaiveDate};
use db::models::{
    Session,
    attendance_record::{self, AttendanceStatus, MarkedBy, NewAttendanceRecord, RecordFilter},
};
use serde::Serialize;
use tracing::{info, warn};
use util::clock::Clock;

pub const DEFAULT_HISTORY_DAYS: i64 = 30;
pub const DEFAULT_PER_PAGE: u64 = 20;
pub const MAX_PER_PAGE: u64 = 100;
/// Widest trailing window any history or stats query accepts.
pub const MAX_WINDOW_DAYS: i64 = 3650;

#[derive(Debug, Clone)]
pub struct ManualMark {
    pub user_id: i64,
    pub date: NaiveDate,
    pub session: Session,
    pub status: AttendanceStatus,
    pub marked_by: i64,
}

#[derive(Debug, Clone, Default)]
pub struct LogQuery {
    pub cohort_number: Option<i32>,
    pub date: Option<NaiveDate>,
    pub session: Option<Session>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogPage {
    pub records: Vec<attendance_record::Model>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

/// Admin-side writes and record queries.
#[derive(Clone)]
pub struct MarkingService {
    ctx: ServiceContext,
}

impl MarkingService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    /// Creates or overwrites the record at `(user_id, date, session)`.
    pub async fn manual_mark(&self, req: ManualMark) -> AttendanceResult<attendance_record::Model> {
        self.ctx
            .bounded("manual_mark", async {
                let student = resolve_student(&self.ctx, req.user_id).await?;
                let record =
                    mark_key(&self.ctx, &student, req.date, req.session, req.status, req.marked_by)
                        .await?;
                info!(
                    user_id = req.user_id,
                    date = %req.date,
                    session = %req.session,
                    status = %req.status,
                    marked_by = req.marked_by,
                    "attendance marked manually"
                );
                Ok::<_, AttendanceError>(record)
            })
            .await
    }

    /// Best-effort [`MarkingService::manual_mark`] for many students.
    ///
    /// A student that cannot be marked is logged and left out of the result.
    pub async fn bulk_mark(
        &self,
        user_ids: &[i64],
        date: NaiveDate,
        session: Session,
        status: AttendanceStatus,
        marked_by: i64,
    ) -> AttendanceResult<Vec<attendance_record::Model>> {
        if user_ids.is_empty() {
            return Err(AttendanceError::validation("no valid user ids"));
        }

        // Each student is its own bounded step; the bulk budget caps the whole
        // batch, and students not reached in time are skipped like failures.
        let deadline = tokio::time::Instant::now() + self.ctx.policy.bulk_timeout;
        let mut marked = Vec::with_capacity(user_ids.len());
        for (i, &user_id) in user_ids.iter().enumerate() {
            if tokio::time::Instant::now() >= deadline {
                warn!(
                    skipped = user_ids.len() - i,
                    date = %date,
                    session = %session,
                    "bulk mark budget exhausted"
                );
                break;
            }

            let outcome = self
                .ctx
                .bounded("bulk_mark", async {
                    let student = resolve_student(&self.ctx, user_id).await?;
                    mark_key(&self.ctx, &student, date, session, status, marked_by).await
                })
                .await;
            match outcome {
                Ok(record) => marked.push(record),
                Err(e) => warn!(
                    user_id,
                    date = %date,
                    session = %session,
                    error = %e,
                    "bulk mark skipped student"
                ),
            }
        }
        info!(
            requested = user_ids.len(),
            marked = marked.len(),
            date = %date,
            session = %session,
            status = %status,
            "bulk attendance marked"
        );
        Ok(marked)
    }

    /// Soft-deletes a record and returns it as it was before deletion.
    pub async fn delete_record(
        &self,
        record_id: i64,
        deleted_by: i64,
    ) -> AttendanceResult<attendance_record::Model> {
        self.ctx
            .bounded("delete_record", async {
                let now = self.ctx.clock.now();
                let record =
                    attendance_record::Model::soft_delete(&self.ctx.db, record_id, deleted_by, now)
                        .await?
                        .ok_or(AttendanceError::RecordNotFound)?;
                info!(record_id, deleted_by, "attendance record deleted");
                Ok::<_, AttendanceError>(record)
            })
            .await
    }

    /// Live records, newest submission first.
    pub async fn attendance_logs(&self, query: LogQuery) -> AttendanceResult<LogPage> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query
            .per_page
            .unwrap_or(DEFAULT_PER_PAGE)
            .clamp(1, MAX_PER_PAGE);

        let mut filter = RecordFilter::default().session(query.session);
        if let Some(c) = query.cohort_number.filter(|c| *c > 0) {
            filter = filter.cohort(c);
        }
        if let Some(d) = query.date {
            filter = filter.on(d);
        }

        self.ctx
            .bounded("attendance_logs", async {
                let (records, total) =
                    attendance_record::Model::paginate(&self.ctx.db, &filter, page, per_page)
                        .await?;
                Ok::<_, AttendanceError>(LogPage { records, total, page, per_page })
            })
            .await
    }

    /// A student's live records in the trailing `days` window, newest day first.
    pub async fn student_history(
        &self,
        user_id: i64,
        days: Option<i64>,
    ) -> AttendanceResult<Vec<attendance_record::Model>> {
        let days = days.unwrap_or(DEFAULT_HISTORY_DAYS);
        let today = self.ctx.clock.today();

        let mut filter = RecordFilter::default().user(user_id);
        if let Some(start) = window_start(today, days)? {
            filter = filter.between(start, today);
        }

        self.ctx
            .bounded("student_history", async {
                let mut records = attendance_record::Model::find_all(&self.ctx.db, &filter).await?;
                records.sort_by(|a, b| b.date.cmp(&a.date).then(a.session.cmp(&b.session)));
                Ok::<_, AttendanceError>(records)
            })
            .await
    }
}

/// First day of the trailing `days` window ending on `today`.
/// `days <= 0` means no lower bound.
pub(crate) fn window_start(today: NaiveDate, days: i64) -> AttendanceResult<Option<NaiveDate>> {
    if days <= 0 {
        return Ok(None);
    }
    if days > MAX_WINDOW_DAYS {
        return Err(AttendanceError::validation(format!(
            "days must be at most {MAX_WINDOW_DAYS}"
        )));
    }
    today
        .checked_sub_days(Days::new(days as u64))
        .map(Some)
        .ok_or_else(|| AttendanceError::validation("days reaches outside the supported calendar"))
}

pub(crate) async fn resolve_student(
    ctx: &ServiceContext,
    user_id: i64,
) -> AttendanceResult<DirectoryUser> {
    ctx.users
        .find_user(user_id)
        .await?
        .ok_or(AttendanceError::StudentNotFound)
}

/// Upsert by `(user, date, session)` shared by manual, bulk and leave marking.
///
/// An existing row, live or soft-deleted, is overwritten and undeleted;
/// otherwise a new admin-marked row is inserted.
pub(crate) async fn mark_key(
    ctx: &ServiceContext,
    student: &DirectoryUser,
    date: NaiveDate,
    session: Session,
    status: AttendanceStatus,
    marked_by: i64,
) -> AttendanceResult<attendance_record::Model> {
    let db = &ctx.db;
    let now = ctx.clock.now();

    if let Some(existing) =
        attendance_record::Model::find_by_key(db, student.id, date, session).await?
    {
        return Ok(existing.overwrite(db, status, marked_by, now).await?);
    }

    let inserted = attendance_record::Model::create(
        db,
        NewAttendanceRecord {
            user_id: student.id,
            jsd_number: student.jsd_number.clone(),
            first_name: student.first_name.clone(),
            last_name: student.last_name.clone(),
            cohort_number: student.cohort_number,
            date,
            session,
            status,
            marked_by: MarkedBy::Admin,
            marked_by_user: Some(marked_by),
            submitted_at: now,
            ip_address: None,
        },
    )
    .await;

    match inserted {
        Ok(record) => Ok(record),
        // Lost a race with a concurrent write on the same key; overwrite theirs.
        Err(err) if is_unique_violation(&err) => {
            let live = attendance_record::Model::find_live(db, student.id, date, session)
                .await?
                .ok_or(AttendanceError::Database(err))?;
            Ok(live.overwrite(db, status, marked_by, now).await?)
        }
        Err(err) => Err(err.into()),
    }
}
